//! Mesh file decoding for meshmeter.
//!
//! This crate turns STL and OBJ files into the in-memory model from
//! `meshmeter-model`. STL files (denormalized, one vertex list per
//! facet) decode to the per-facet-vertex layout; OBJ files (shared,
//! indexed vertex list) decode to the indexed-vertex layout.
//!
//! # Example
//!
//! ```no_run
//! use meshmeter_io::load_mesh;
//! use std::path::Path;
//!
//! let mesh = load_mesh(Path::new("part.stl"))?;
//! println!("{} facets", mesh.facet_count());
//! # Ok::<(), meshmeter_io::DecodeError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
pub mod obj;
pub mod stl;

pub use error::{DecodeError, DecodeResult};

use std::path::Path;

use meshmeter_model::Mesh;
use tracing::info;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// STL (text or binary, sniffed from content).
    Stl,
    /// Wavefront OBJ.
    Obj,
}

impl MeshFormat {
    /// Determine the format from a file path's extension
    /// (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownFormat`] for unrecognized or missing
    /// extensions.
    pub fn from_path(path: &Path) -> DecodeResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "stl" => Ok(Self::Stl),
            "obj" => Ok(Self::Obj),
            _ => Err(DecodeError::UnknownFormat { extension }),
        }
    }

    /// The canonical file extension for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::Obj => "obj",
        }
    }
}

/// Load a mesh file, dispatching on the path's extension.
///
/// # Errors
///
/// Returns [`DecodeError::UnknownFormat`] for unrecognized extensions,
/// plus whatever the format decoder reports.
///
/// # Example
///
/// ```no_run
/// use meshmeter_io::load_mesh;
/// use std::path::Path;
///
/// let mesh = load_mesh(Path::new("model.obj"))?;
/// # Ok::<(), meshmeter_io::DecodeError>(())
/// ```
pub fn load_mesh(path: &Path) -> DecodeResult<Mesh> {
    let format = MeshFormat::from_path(path)?;
    info!(path = %path.display(), ?format, "loading mesh");
    match format {
        MeshFormat::Stl => stl::load_stl(path),
        MeshFormat::Obj => obj::load_obj(path),
    }
}
