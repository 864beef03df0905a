//! Mesh measurement toolkit.
//!
//! This umbrella crate re-exports the meshmeter crate family behind one
//! API: decode an STL or OBJ file into the in-memory mesh model, then
//! measure its enclosed volume, surface area and axis extents.
//!
//! # Quick Start
//!
//! ```no_run
//! use meshmeter::prelude::*;
//! use std::path::Path;
//!
//! let mut mesh = meshmeter::load(Path::new("part.stl"))?;
//! let results = measure(&mut mesh, MeasureOptions::all());
//! println!("volume: {:?}", results.volume);
//! # Ok::<(), meshmeter::Error>(())
//! ```
//!
//! # Module Organization
//!
//! - [`model`] - Core data structures: [`Mesh`], facets, vertex pool,
//!   metadata
//! - [`io`] - STL and OBJ decoding
//! - [`measure`](mod@measure) - The measurement engine

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use meshmeter_io as io;
pub use meshmeter_measure as measure;
pub use meshmeter_model as model;

pub use meshmeter_io::{load_mesh, DecodeError, MeshFormat};
pub use meshmeter_measure::{measure, MeasureOptions, Measurements};
pub use meshmeter_model::{Mesh, MeshLayout, ModelError, Vector3};

use std::path::Path;
use thiserror::Error;

/// Any error the toolkit can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// A file failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// An in-memory mesh operation failed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Load a mesh file, dispatching on its extension.
///
/// # Errors
///
/// Returns [`Error::Decode`] for missing files, unknown extensions and
/// malformed content.
pub fn load(path: &Path) -> Result<Mesh, Error> {
    Ok(meshmeter_io::load_mesh(path)?)
}

/// Common imports for working with the toolkit.
pub mod prelude {
    pub use crate::measure::{measure, MeasureOptions, Measurements};
    pub use crate::model::{
        FacetView, IvMesh, Mesh, MeshLayout, MetaValue, Metadata, PfvFacet, PfvMesh, Vector3,
    };
    pub use crate::{load, load_mesh, DecodeError, Error, MeshFormat};
}
