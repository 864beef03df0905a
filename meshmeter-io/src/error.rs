//! Error types for mesh decoding.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for mesh decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors that can occur while decoding a mesh file.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// File not found.
    #[error("file not found: {path}")]
    NotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Unknown file format (unrecognized extension).
    #[error("unknown file format: .{extension}")]
    UnknownFormat {
        /// The unrecognized extension.
        extension: String,
    },

    /// The file content did not match the format's grammar.
    #[error("malformed {format} file {path}: {message}")]
    Format {
        /// The format being decoded ("stl" or "obj").
        format: &'static str,
        /// Path of the offending file.
        path: PathBuf,
        /// Description of what was invalid.
        message: String,
    },

    /// The file ended before the declared content did.
    #[error("unexpected end of file in {path}: expected {expected} bytes, got {got}")]
    Truncated {
        /// Path of the offending file.
        path: PathBuf,
        /// Bytes the format required.
        expected: usize,
        /// Bytes actually available.
        got: usize,
    },

    /// An underlying I/O failure.
    #[error("i/o error reading {path}")]
    Io {
        /// Path being read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl DecodeError {
    /// Wrap an [`std::io::Error`], mapping `NotFound` to the dedicated
    /// variant.
    #[must_use]
    pub fn from_io(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_from_io_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = DecodeError::from_io(std::path::Path::new("cube.stl"), io);
        assert!(matches!(err, DecodeError::NotFound { .. }));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = DecodeError::from_io(std::path::Path::new("cube.stl"), io);
        assert!(matches!(err, DecodeError::Io { .. }));
    }

    #[test]
    fn display_names_the_problem() {
        let err = DecodeError::Truncated {
            path: PathBuf::from("part.stl"),
            expected: 50,
            got: 12,
        };
        assert!(format!("{err}").contains("expected 50 bytes"));
    }
}
