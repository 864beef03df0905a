//! Error types for in-memory mesh construction and mutation.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Validation errors raised by mesh and facet mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A facet index did not resolve within the mesh's facet list.
    #[error("facet index {index} out of bounds for mesh with {len} facets")]
    FacetIndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// Facet count at the time of the call.
        len: usize,
    },

    /// A local vertex index did not resolve within a facet.
    #[error("vertex index {index} out of bounds for facet with {len} vertices")]
    VertexIndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// Vertex count at the time of the call.
        len: usize,
    },

    /// A pool slot index did not resolve to a live vertex.
    #[error("vertex pool slot {slot} does not resolve to a vertex")]
    UnresolvedPoolSlot {
        /// The offending slot index.
        slot: usize,
    },

    /// An indexed facet was built from raw positions without an owning
    /// mesh; positions are meaningless without a pool to intern them in.
    #[error("indexed facet requires an owning mesh to resolve vertex positions")]
    DetachedIndexedFacet,

    /// A per-facet-vertex setter was handed a pool index instead of a
    /// position.
    #[error("per-facet vertex storage requires a position, not a pool index")]
    PositionRequired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_violation() {
        let err = ModelError::VertexIndexOutOfBounds { index: 5, len: 3 };
        assert!(format!("{err}").contains("vertex index 5"));

        let err = ModelError::DetachedIndexedFacet;
        assert!(format!("{err}").contains("owning mesh"));
    }
}
