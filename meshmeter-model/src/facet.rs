//! Facet types for the two storage layouts.

use crate::error::{ModelError, ModelResult};
use crate::meta::Metadata;
use crate::pool::VertexPool;
use crate::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A vertex argument that is either a resolved position or a pool index.
///
/// Per-facet-vertex storage accepts only positions; indexed-vertex storage
/// accepts both.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VertexRef {
    /// A resolved position.
    Position(Vector3),
    /// An index into the owning mesh's vertex pool.
    Index(usize),
}

impl From<Vector3> for VertexRef {
    fn from(v: Vector3) -> Self {
        Self::Position(v)
    }
}

impl From<usize> for VertexRef {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

/// A facet that stores its own vertex positions (STL-style layout).
///
/// Each facet's vertex list is independent storage: no sharing, no
/// deduplication, and removing one facet never affects another.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PfvFacet {
    vertices: Vec<Vector3>,
    normal: Vector3,
    data: Metadata,
}

impl PfvFacet {
    /// Create a facet from vertex positions and a normal.
    ///
    /// The auxiliary data bag is freshly allocated for every facet.
    #[must_use]
    pub fn new(vertices: Vec<Vector3>, normal: Vector3) -> Self {
        Self {
            vertices,
            normal,
            data: Metadata::new(),
        }
    }

    /// Create a facet with pre-populated auxiliary data.
    #[must_use]
    pub fn with_data(vertices: Vec<Vector3>, normal: Vector3, data: Metadata) -> Self {
        Self {
            vertices,
            normal,
            data,
        }
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Fetch a vertex position by local index.
    #[must_use]
    pub fn vertex(&self, index: usize) -> Option<Vector3> {
        self.vertices.get(index).copied()
    }

    /// Replace the vertex at a local index.
    pub fn set_vertex(&mut self, index: usize, position: Vector3) -> ModelResult<()> {
        let len = self.vertices.len();
        match self.vertices.get_mut(index) {
            Some(slot) => {
                *slot = position;
                Ok(())
            }
            None => Err(ModelError::VertexIndexOutOfBounds { index, len }),
        }
    }

    /// Append a vertex.
    pub fn push_vertex(&mut self, position: Vector3) {
        self.vertices.push(position);
    }

    /// Insert a vertex at a local index (existing vertices shift right).
    pub fn insert_vertex(&mut self, index: usize, position: Vector3) -> ModelResult<()> {
        if index > self.vertices.len() {
            return Err(ModelError::VertexIndexOutOfBounds {
                index,
                len: self.vertices.len(),
            });
        }
        self.vertices.insert(index, position);
        Ok(())
    }

    /// Remove and return the vertex at a local index.
    pub fn remove_vertex(&mut self, index: usize) -> ModelResult<Vector3> {
        if index >= self.vertices.len() {
            return Err(ModelError::VertexIndexOutOfBounds {
                index,
                len: self.vertices.len(),
            });
        }
        Ok(self.vertices.remove(index))
    }

    /// The facet normal.
    #[must_use]
    pub fn normal(&self) -> Vector3 {
        self.normal
    }

    /// Replace the facet normal.
    pub fn set_normal(&mut self, normal: Vector3) {
        self.normal = normal;
    }

    /// Iterate over vertex positions. Each call starts a fresh iteration
    /// at index 0.
    pub fn vertices(&self) -> impl Iterator<Item = Vector3> + '_ {
        self.vertices.iter().copied()
    }

    /// Auxiliary data, read-only.
    #[must_use]
    pub fn data(&self) -> &Metadata {
        &self.data
    }

    /// Auxiliary data, mutable.
    pub fn data_mut(&mut self) -> &mut Metadata {
        &mut self.data
    }
}

/// A facet that references shared vertex positions by pool index
/// (OBJ-style layout).
///
/// An `IvFacet` is meaningful only inside an owning
/// [`IvMesh`](crate::IvMesh); every operation that resolves or interns a
/// position goes through the mesh. Directly constructible only from
/// indices.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IvFacet {
    pub(crate) indices: Vec<usize>,
    pub(crate) normal: Vector3,
    pub(crate) data: Metadata,
}

impl IvFacet {
    /// Create a facet from pool indices and a normal.
    #[must_use]
    pub fn from_indices(indices: Vec<usize>, normal: Vector3) -> Self {
        Self {
            indices,
            normal,
            data: Metadata::new(),
        }
    }

    /// Create a facet from pool indices with pre-populated auxiliary data.
    #[must_use]
    pub fn with_data(indices: Vec<usize>, normal: Vector3, data: Metadata) -> Self {
        Self {
            indices,
            normal,
            data,
        }
    }

    /// Create a facet from vertex references.
    ///
    /// Fails with [`ModelError::DetachedIndexedFacet`] if any reference is
    /// a raw position: without an owning mesh there is no pool to intern
    /// positions in. Use [`IvMesh::add_facet_from_positions`] instead.
    ///
    /// [`IvMesh::add_facet_from_positions`]: crate::IvMesh::add_facet_from_positions
    pub fn from_vertex_refs(refs: Vec<VertexRef>, normal: Vector3) -> ModelResult<Self> {
        let indices = refs
            .into_iter()
            .map(|r| match r {
                VertexRef::Index(i) => Ok(i),
                VertexRef::Position(_) => Err(ModelError::DetachedIndexedFacet),
            })
            .collect::<ModelResult<Vec<_>>>()?;
        Ok(Self::from_indices(indices, normal))
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.indices.len()
    }

    /// The raw pool indices.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// The facet normal.
    #[must_use]
    pub fn normal(&self) -> Vector3 {
        self.normal
    }

    /// Auxiliary data, read-only.
    #[must_use]
    pub fn data(&self) -> &Metadata {
        &self.data
    }
}

/// A layout-polymorphic read view of one facet with resolved positions.
///
/// This is the uniform capability the measurement engine consumes: vertex
/// access resolves positions regardless of whether the mesh stores them
/// per facet or in a shared pool.
#[derive(Debug, Clone, Copy)]
pub enum FacetView<'a> {
    /// View over a per-facet-vertex facet.
    Pfv(&'a PfvFacet),
    /// View over an indexed-vertex facet and its owning pool.
    Iv {
        /// The facet.
        facet: &'a IvFacet,
        /// The owning mesh's vertex pool.
        pool: &'a VertexPool,
    },
}

impl FacetView<'_> {
    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        match self {
            Self::Pfv(facet) => facet.vertex_count(),
            Self::Iv { facet, .. } => facet.vertex_count(),
        }
    }

    /// Fetch a resolved vertex position by local index.
    #[must_use]
    pub fn vertex(&self, index: usize) -> Option<Vector3> {
        match self {
            Self::Pfv(facet) => facet.vertex(index),
            Self::Iv { facet, pool } => facet
                .indices
                .get(index)
                .and_then(|&slot| pool.position(slot)),
        }
    }

    /// Iterate over resolved vertex positions. Each call starts a fresh
    /// iteration at index 0, independent of any prior iteration.
    pub fn vertices(&self) -> impl Iterator<Item = Vector3> + '_ {
        let count = self.vertex_count();
        (0..count).filter_map(move |i| self.vertex(i))
    }

    /// Collect resolved vertex positions.
    #[must_use]
    pub fn positions(&self) -> Vec<Vector3> {
        self.vertices().collect()
    }

    /// The facet normal.
    #[must_use]
    pub fn normal(&self) -> Vector3 {
        match self {
            Self::Pfv(facet) => facet.normal(),
            Self::Iv { facet, .. } => facet.normal(),
        }
    }

    /// Auxiliary data.
    #[must_use]
    pub fn data(&self) -> &Metadata {
        match self {
            Self::Pfv(facet) => facet.data(),
            Self::Iv { facet, .. } => facet.data(),
        }
    }
}
