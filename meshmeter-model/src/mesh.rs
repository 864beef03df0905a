//! Mesh types for the two storage layouts and the closed polymorphic
//! wrapper over them.

use crate::error::{ModelError, ModelResult};
use crate::facet::{FacetView, IvFacet, PfvFacet, VertexRef};
use crate::meta::Metadata;
use crate::pool::VertexPool;
use crate::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The two facet/vertex storage layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MeshLayout {
    /// Each facet stores its own vertex positions (STL-style).
    PerFacetVertex,
    /// Facets index into a shared, deduplicated vertex pool (OBJ-style).
    IndexedVertex,
}

/// A mesh whose facets store their vertex positions directly.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PfvMesh {
    facets: Vec<PfvFacet>,
    meta: Metadata,
}

impl PfvMesh {
    /// Create an empty mesh.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            facets: Vec::new(),
            meta: Metadata::new(),
        }
    }

    /// Create a mesh from facets.
    #[must_use]
    pub fn from_facets(facets: Vec<PfvFacet>) -> Self {
        Self {
            facets,
            meta: Metadata::new(),
        }
    }

    /// Number of facets.
    #[must_use]
    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    /// Fetch a facet by index.
    #[must_use]
    pub fn facet(&self, index: usize) -> Option<&PfvFacet> {
        self.facets.get(index)
    }

    /// Fetch a facet mutably by index.
    pub fn facet_mut(&mut self, index: usize) -> Option<&mut PfvFacet> {
        self.facets.get_mut(index)
    }

    /// Replace the facet at an index.
    pub fn set_facet(&mut self, index: usize, facet: PfvFacet) -> ModelResult<()> {
        let len = self.facets.len();
        match self.facets.get_mut(index) {
            Some(slot) => {
                *slot = facet;
                Ok(())
            }
            None => Err(ModelError::FacetIndexOutOfBounds { index, len }),
        }
    }

    /// Add a facet at the given index, or append when `at` is omitted.
    pub fn add_facet(&mut self, facet: PfvFacet, at: Option<usize>) -> ModelResult<()> {
        match at {
            None => {
                self.facets.push(facet);
                Ok(())
            }
            Some(index) if index <= self.facets.len() => {
                self.facets.insert(index, facet);
                Ok(())
            }
            Some(index) => Err(ModelError::FacetIndexOutOfBounds {
                index,
                len: self.facets.len(),
            }),
        }
    }

    /// Remove and return the facet at an index. Other facets' storage is
    /// unaffected.
    pub fn remove_facet(&mut self, index: usize) -> ModelResult<PfvFacet> {
        if index >= self.facets.len() {
            return Err(ModelError::FacetIndexOutOfBounds {
                index,
                len: self.facets.len(),
            });
        }
        Ok(self.facets.remove(index))
    }

    /// Mesh metadata, read-only.
    #[must_use]
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    /// Mesh metadata, mutable.
    pub fn meta_mut(&mut self) -> &mut Metadata {
        &mut self.meta
    }

    /// Iterate over facets.
    pub fn facets(&self) -> impl Iterator<Item = &PfvFacet> {
        self.facets.iter()
    }

    /// Convert to the indexed-vertex layout by interning every facet's
    /// positions through the destination pool's dedup scan.
    #[must_use]
    pub fn to_iv(&self) -> IvMesh {
        let mut mesh = IvMesh::new();
        mesh.meta = self.meta.clone();
        for facet in &self.facets {
            mesh.add_facet_from_positions(
                facet.vertices().collect(),
                facet.normal(),
                facet.data().clone(),
            );
        }
        mesh
    }
}

/// A mesh that owns a deduplicated vertex pool which its facets reference
/// by index.
///
/// All facet mutation that touches the pool goes through the mesh, which
/// maintains the reverse lookup from pool slot to referencing facets.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IvMesh {
    facets: Vec<IvFacet>,
    pool: VertexPool,
    meta: Metadata,
}

impl IvMesh {
    /// Create an empty mesh.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            facets: Vec::new(),
            pool: VertexPool::new(),
            meta: Metadata::new(),
        }
    }

    /// Number of facets.
    #[must_use]
    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    /// Number of live vertices in the pool.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.pool.len()
    }

    /// The vertex pool, read-only.
    #[must_use]
    pub fn pool(&self) -> &VertexPool {
        &self.pool
    }

    /// Fetch a facet by index.
    #[must_use]
    pub fn facet(&self, index: usize) -> Option<&IvFacet> {
        self.facets.get(index)
    }

    /// Mesh metadata, read-only.
    #[must_use]
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    /// Mesh metadata, mutable.
    pub fn meta_mut(&mut self) -> &mut Metadata {
        &mut self.meta
    }

    /// Append a vertex position to the pool without a dedup scan.
    ///
    /// Used by decoders whose vertex records are authoritative (OBJ).
    pub fn push_vertex_raw(&mut self, position: Vector3) -> usize {
        self.pool.append_authoritative(position)
    }

    /// Append a facet built from resolved positions; each position is
    /// interned through the pool's dedup scan. Returns the facet index.
    pub fn add_facet_from_positions(
        &mut self,
        positions: Vec<Vector3>,
        normal: Vector3,
        data: Metadata,
    ) -> usize {
        let facet_index = self.facets.len();
        let indices = positions
            .into_iter()
            .map(|p| self.pool.insert(p, facet_index))
            .collect();
        self.facets.push(IvFacet::with_data(indices, normal, data));
        facet_index
    }

    /// Append a facet that references the pool by index.
    ///
    /// Every index must resolve to a live pool entry; the facet is
    /// registered in each slot's reverse-lookup set. Returns the facet
    /// index.
    pub fn add_facet_from_indices(
        &mut self,
        indices: Vec<usize>,
        normal: Vector3,
        data: Metadata,
    ) -> ModelResult<usize> {
        for &slot in &indices {
            self.pool.resolve(slot)?;
        }
        let facet_index = self.facets.len();
        for &slot in &indices {
            self.pool.register(slot, facet_index)?;
        }
        self.facets.push(IvFacet::with_data(indices, normal, data));
        Ok(facet_index)
    }

    /// Resolve all vertex positions of a facet.
    pub fn facet_positions(&self, index: usize) -> ModelResult<Vec<Vector3>> {
        let facet = self
            .facets
            .get(index)
            .ok_or(ModelError::FacetIndexOutOfBounds {
                index,
                len: self.facets.len(),
            })?;
        facet
            .indices
            .iter()
            .map(|&slot| self.pool.resolve(slot))
            .collect()
    }

    /// Resolve one vertex position of a facet.
    pub fn facet_vertex(&self, facet: usize, vertex: usize) -> ModelResult<Vector3> {
        let f = self
            .facets
            .get(facet)
            .ok_or(ModelError::FacetIndexOutOfBounds {
                index: facet,
                len: self.facets.len(),
            })?;
        let slot = *f
            .indices
            .get(vertex)
            .ok_or(ModelError::VertexIndexOutOfBounds {
                index: vertex,
                len: f.indices.len(),
            })?;
        self.pool.resolve(slot)
    }

    /// Replace one vertex of a facet with a position or a pool index.
    ///
    /// A position releases the old reference and interns the new position
    /// through the dedup scan; an index is bounds-checked against the pool
    /// and swaps the reverse-lookup registrations.
    pub fn set_facet_vertex(
        &mut self,
        facet: usize,
        vertex: usize,
        value: VertexRef,
    ) -> ModelResult<()> {
        let f = self
            .facets
            .get(facet)
            .ok_or(ModelError::FacetIndexOutOfBounds {
                index: facet,
                len: self.facets.len(),
            })?;
        let old_slot = *f
            .indices
            .get(vertex)
            .ok_or(ModelError::VertexIndexOutOfBounds {
                index: vertex,
                len: f.indices.len(),
            })?;
        let new_slot = match value {
            VertexRef::Index(slot) => {
                self.pool.resolve(slot)?;
                // Re-targeting a vertex to its current slot must not release
                // the registration it is about to need again.
                if slot != old_slot {
                    self.release_local_reference(facet, vertex, old_slot)?;
                    self.pool.register(slot, facet)?;
                }
                slot
            }
            VertexRef::Position(position) => {
                self.release_local_reference(facet, vertex, old_slot)?;
                self.pool.insert(position, facet)
            }
        };
        self.facets[facet].indices[vertex] = new_slot;
        Ok(())
    }

    /// Add a vertex to a facet at the given local index, or append when
    /// `at` is omitted. The position is interned through the dedup scan.
    pub fn facet_add_vertex(
        &mut self,
        facet: usize,
        position: Vector3,
        at: Option<usize>,
    ) -> ModelResult<()> {
        let len = self
            .facets
            .get(facet)
            .ok_or(ModelError::FacetIndexOutOfBounds {
                index: facet,
                len: self.facets.len(),
            })?
            .indices
            .len();
        if let Some(index) = at {
            if index > len {
                return Err(ModelError::VertexIndexOutOfBounds { index, len });
            }
        }
        let slot = self.pool.insert(position, facet);
        match at {
            None => self.facets[facet].indices.push(slot),
            Some(index) => self.facets[facet].indices.insert(index, slot),
        }
        Ok(())
    }

    /// Remove a vertex from a facet, returning its resolved position.
    ///
    /// The pool reference is released only when the facet holds no other
    /// local reference to the same slot; the slot itself is vacated only
    /// when its reverse-lookup set becomes empty.
    pub fn facet_remove_vertex(&mut self, facet: usize, vertex: usize) -> ModelResult<Vector3> {
        let len = self.facets.len();
        let f = self
            .facets
            .get_mut(facet)
            .ok_or(ModelError::FacetIndexOutOfBounds { index: facet, len })?;
        if vertex >= f.indices.len() {
            return Err(ModelError::VertexIndexOutOfBounds {
                index: vertex,
                len: f.indices.len(),
            });
        }
        let slot = f.indices.remove(vertex);
        if self.facets[facet].indices.contains(&slot) {
            self.pool.resolve(slot)
        } else {
            let (position, _) = self.pool.release(slot, facet)?;
            Ok(position)
        }
    }

    /// Replace a facet's normal.
    pub fn set_facet_normal(&mut self, index: usize, normal: Vector3) -> ModelResult<()> {
        let len = self.facets.len();
        match self.facets.get_mut(index) {
            Some(facet) => {
                facet.normal = normal;
                Ok(())
            }
            None => Err(ModelError::FacetIndexOutOfBounds { index, len }),
        }
    }

    /// A facet's auxiliary data, mutable.
    pub fn facet_data_mut(&mut self, index: usize) -> ModelResult<&mut Metadata> {
        let len = self.facets.len();
        self.facets
            .get_mut(index)
            .map(|facet| &mut facet.data)
            .ok_or(ModelError::FacetIndexOutOfBounds { index, len })
    }

    /// Add a denormalized facet at the given index, or append when `at` is
    /// omitted; its positions are interned through the dedup scan.
    pub fn add_facet(&mut self, facet: PfvFacet, at: Option<usize>) -> ModelResult<()> {
        match at {
            None => {
                self.add_facet_from_positions(
                    facet.vertices().collect(),
                    facet.normal(),
                    facet.data().clone(),
                );
                Ok(())
            }
            Some(index) => {
                if index > self.facets.len() {
                    return Err(ModelError::FacetIndexOutOfBounds {
                        index,
                        len: self.facets.len(),
                    });
                }
                // Later facets shift up; the reverse lookup must agree
                // before the new facet's registrations land.
                self.pool.renumber_after_facet_insertion(index);
                let indices = facet
                    .vertices()
                    .map(|p| self.pool.insert(p, index))
                    .collect();
                self.facets.insert(
                    index,
                    IvFacet::with_data(indices, facet.normal(), facet.data().clone()),
                );
                Ok(())
            }
        }
    }

    /// Remove a facet, returning it as a denormalized snapshot.
    ///
    /// Pool references are released (vacating slots whose reverse-lookup
    /// sets empty out) and facet ids above the removed index are
    /// renumbered in the reverse lookup. Vertex slot indices never shift.
    pub fn remove_facet(&mut self, index: usize) -> ModelResult<PfvFacet> {
        let positions = self.facet_positions(index)?;
        let facet = self.facets.remove(index);
        let mut released: Vec<usize> = facet.indices.clone();
        released.sort_unstable();
        released.dedup();
        for slot in released {
            self.pool.release(slot, index)?;
        }
        self.pool.renumber_after_facet_removal(index);
        Ok(PfvFacet::with_data(positions, facet.normal, facet.data))
    }

    /// Replace the facet at an index with a denormalized facet.
    ///
    /// The old facet's pool references are released, then the new facet's
    /// positions are interned under the same facet id.
    pub fn set_facet(&mut self, index: usize, facet: PfvFacet) -> ModelResult<()> {
        let old = self
            .facets
            .get(index)
            .ok_or(ModelError::FacetIndexOutOfBounds {
                index,
                len: self.facets.len(),
            })?;
        let mut released: Vec<usize> = old.indices.clone();
        released.sort_unstable();
        released.dedup();
        for slot in released {
            self.pool.release(slot, index)?;
        }
        let indices = facet
            .vertices()
            .map(|p| self.pool.insert(p, index))
            .collect();
        self.facets[index] = IvFacet::with_data(indices, facet.normal(), facet.data().clone());
        Ok(())
    }

    /// Convert to the per-facet-vertex layout by resolving every facet's
    /// positions into independent storage.
    #[must_use]
    pub fn to_pfv(&self) -> PfvMesh {
        let mut mesh = PfvMesh::new();
        mesh.meta = self.meta.clone();
        for facet in &self.facets {
            let positions = facet
                .indices
                .iter()
                .filter_map(|&slot| self.pool.position(slot))
                .collect();
            mesh.facets.push(PfvFacet::with_data(
                positions,
                facet.normal,
                facet.data.clone(),
            ));
        }
        mesh
    }

    /// Rebuild against a fresh pool by re-inserting every facet's resolved
    /// positions through the dedup scan; old indices are discarded.
    #[must_use]
    pub fn rebuilt(&self) -> IvMesh {
        let mut mesh = IvMesh::new();
        mesh.meta = self.meta.clone();
        for facet in &self.facets {
            let positions = facet
                .indices
                .iter()
                .filter_map(|&slot| self.pool.position(slot))
                .collect();
            mesh.add_facet_from_positions(positions, facet.normal, facet.data.clone());
        }
        mesh
    }

    /// Release the local reference at `(facet, vertex)` to `old_slot` when
    /// it is the facet's only reference to that slot.
    fn release_local_reference(
        &mut self,
        facet: usize,
        vertex: usize,
        old_slot: usize,
    ) -> ModelResult<()> {
        let others = self.facets[facet]
            .indices
            .iter()
            .enumerate()
            .filter(|&(i, &slot)| slot == old_slot && i != vertex)
            .count();
        if others == 0 {
            self.pool.release(old_slot, facet)?;
        }
        Ok(())
    }
}

/// A mesh of either storage layout behind one closed interface.
///
/// # Example
///
/// ```
/// use meshmeter_model::{Mesh, MeshLayout, PfvFacet, PfvMesh, Vector3};
///
/// let mut pfv = PfvMesh::new();
/// pfv.add_facet(
///     PfvFacet::new(
///         vec![
///             Vector3::new(0.0, 0.0, 0.0),
///             Vector3::new(1.0, 0.0, 0.0),
///             Vector3::new(0.0, 1.0, 0.0),
///         ],
///         Vector3::new(0.0, 0.0, 1.0),
///     ),
///     None,
/// ).unwrap();
///
/// let mesh = Mesh::Pfv(pfv);
/// assert_eq!(mesh.layout(), MeshLayout::PerFacetVertex);
///
/// let iv = mesh.to_iv();
/// assert_eq!(iv.facet_count(), 1);
/// assert_eq!(iv.vertex_count(), 3);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mesh {
    /// Per-facet-vertex layout.
    Pfv(PfvMesh),
    /// Indexed-vertex layout.
    Iv(IvMesh),
}

impl Mesh {
    /// Which layout this mesh uses.
    #[must_use]
    pub fn layout(&self) -> MeshLayout {
        match self {
            Self::Pfv(_) => MeshLayout::PerFacetVertex,
            Self::Iv(_) => MeshLayout::IndexedVertex,
        }
    }

    /// Number of facets.
    #[must_use]
    pub fn facet_count(&self) -> usize {
        match self {
            Self::Pfv(mesh) => mesh.facet_count(),
            Self::Iv(mesh) => mesh.facet_count(),
        }
    }

    /// True if the mesh has no facets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facet_count() == 0
    }

    /// A layout-polymorphic view of one facet.
    #[must_use]
    pub fn facet_view(&self, index: usize) -> Option<FacetView<'_>> {
        match self {
            Self::Pfv(mesh) => mesh.facet(index).map(FacetView::Pfv),
            Self::Iv(mesh) => mesh.facet(index).map(|facet| FacetView::Iv {
                facet,
                pool: mesh.pool(),
            }),
        }
    }

    /// Iterate over facet views. Every call starts a fresh iteration at
    /// facet 0, independent of prior iterations.
    #[must_use]
    pub fn facet_views(&self) -> FacetViews<'_> {
        FacetViews {
            mesh: self,
            index: 0,
        }
    }

    /// Mesh metadata, read-only.
    #[must_use]
    pub fn meta(&self) -> &Metadata {
        match self {
            Self::Pfv(mesh) => mesh.meta(),
            Self::Iv(mesh) => mesh.meta(),
        }
    }

    /// Mesh metadata, mutable.
    pub fn meta_mut(&mut self) -> &mut Metadata {
        match self {
            Self::Pfv(mesh) => mesh.meta_mut(),
            Self::Iv(mesh) => mesh.meta_mut(),
        }
    }

    /// Add a denormalized facet at the given index, or append when `at` is
    /// omitted; an indexed-vertex mesh interns its positions.
    pub fn add_facet(&mut self, facet: PfvFacet, at: Option<usize>) -> ModelResult<()> {
        match self {
            Self::Pfv(mesh) => mesh.add_facet(facet, at),
            Self::Iv(mesh) => mesh.add_facet(facet, at),
        }
    }

    /// Remove a facet, returning it as a denormalized snapshot.
    pub fn remove_facet(&mut self, index: usize) -> ModelResult<PfvFacet> {
        match self {
            Self::Pfv(mesh) => mesh.remove_facet(index),
            Self::Iv(mesh) => mesh.remove_facet(index),
        }
    }

    /// Replace the facet at an index.
    pub fn set_facet(&mut self, index: usize, facet: PfvFacet) -> ModelResult<()> {
        match self {
            Self::Pfv(mesh) => mesh.set_facet(index, facet),
            Self::Iv(mesh) => mesh.set_facet(index, facet),
        }
    }

    /// Replace one vertex of a facet.
    ///
    /// Per-facet-vertex storage holds no pool, so it accepts only
    /// positions and rejects indices with
    /// [`ModelError::PositionRequired`].
    pub fn set_facet_vertex(
        &mut self,
        facet: usize,
        vertex: usize,
        value: VertexRef,
    ) -> ModelResult<()> {
        match self {
            Self::Pfv(mesh) => {
                let len = mesh.facet_count();
                let target = mesh
                    .facet_mut(facet)
                    .ok_or(ModelError::FacetIndexOutOfBounds { index: facet, len })?;
                match value {
                    VertexRef::Position(position) => target.set_vertex(vertex, position),
                    VertexRef::Index(_) => Err(ModelError::PositionRequired),
                }
            }
            Self::Iv(mesh) => mesh.set_facet_vertex(facet, vertex, value),
        }
    }

    /// Convert to the per-facet-vertex layout. Total: an already-PFV mesh
    /// is cloned.
    #[must_use]
    pub fn to_pfv(&self) -> PfvMesh {
        match self {
            Self::Pfv(mesh) => mesh.clone(),
            Self::Iv(mesh) => mesh.to_pfv(),
        }
    }

    /// Convert to the indexed-vertex layout. Total: positions are always
    /// re-inserted through the destination pool's dedup scan, so an
    /// already-IV mesh is re-targeted against a fresh pool rather than
    /// copied index-for-index.
    #[must_use]
    pub fn to_iv(&self) -> IvMesh {
        match self {
            Self::Pfv(mesh) => mesh.to_iv(),
            Self::Iv(mesh) => mesh.rebuilt(),
        }
    }
}

impl From<PfvMesh> for Mesh {
    fn from(mesh: PfvMesh) -> Self {
        Self::Pfv(mesh)
    }
}

impl From<IvMesh> for Mesh {
    fn from(mesh: IvMesh) -> Self {
        Self::Iv(mesh)
    }
}

/// Restartable iterator over a mesh's facet views.
#[derive(Debug, Clone)]
pub struct FacetViews<'a> {
    mesh: &'a Mesh,
    index: usize,
}

impl<'a> Iterator for FacetViews<'a> {
    type Item = FacetView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let view = self.mesh.facet_view(self.index)?;
        self.index += 1;
        Some(view)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.mesh.facet_count().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FacetViews<'_> {}
