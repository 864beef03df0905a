//! Core mesh types for meshmeter.
//!
//! This crate provides the in-memory representation shared by the format
//! decoders and the measurement engine:
//!
//! - [`Vector3`] - An immutable 3D coordinate/vector value
//! - [`PfvMesh`] / [`PfvFacet`] - Per-facet-vertex storage (STL-style)
//! - [`IvMesh`] / [`IvFacet`] - Indexed storage over a shared
//!   deduplicated [`VertexPool`] (OBJ-style)
//! - [`Mesh`] - A closed wrapper over both layouts
//! - [`Metadata`] / [`MetaValue`] - Open string-keyed data bags
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! # Coordinate System
//!
//! Right-handed, `f64` throughout, unit-agnostic. Facet normals follow
//! the right-hand rule over the vertex winding.
//!
//! # Example
//!
//! ```
//! use meshmeter_model::{Mesh, PfvFacet, PfvMesh, Vector3};
//!
//! let mut mesh = PfvMesh::new();
//! mesh.add_facet(
//!     PfvFacet::new(
//!         vec![
//!             Vector3::new(0.0, 0.0, 0.0),
//!             Vector3::new(1.0, 0.0, 0.0),
//!             Vector3::new(0.0, 1.0, 0.0),
//!         ],
//!         Vector3::new(0.0, 0.0, 1.0),
//!     ),
//!     None,
//! ).unwrap();
//!
//! let mesh = Mesh::Pfv(mesh);
//! assert_eq!(mesh.facet_count(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod error;
mod facet;
mod mesh;
mod meta;
mod pool;
mod vector;

// Re-export core types
pub use bounds::Aabb;
pub use error::{ModelError, ModelResult};
pub use facet::{FacetView, IvFacet, PfvFacet, VertexRef};
pub use mesh::{FacetViews, IvMesh, Mesh, MeshLayout, PfvMesh};
pub use meta::{MetaValue, Metadata};
pub use pool::{VertexPool, DEDUP_TOLERANCE};
pub use vector::Vector3;
