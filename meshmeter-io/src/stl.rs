//! STL file decoding (binary and text).
//!
//! # Format Detection
//!
//! A file whose first five bytes are exactly `solid` is decoded as text
//! STL, anything else as binary. This is the conventional sniff; a binary
//! file whose 80-byte header happens to begin with `solid` will be
//! misrouted, which the format itself gives no way to avoid.
//!
//! # Normals
//!
//! Declared facet normals are never trusted. Every facet's normal is
//! recomputed from its first three vertices by the right-hand rule
//! (`(v2 - v1) x (v3 - v1)`, normalized; zero if degenerate), and the
//! declared normal is preserved in the facet's data bag under
//! `given_normal`.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::LazyLock;

use meshmeter_model::{Mesh, MetaValue, Metadata, PfvFacet, PfvMesh, Vector3};
use regex::Regex;
use tracing::debug;

use crate::error::{DecodeError, DecodeResult};

/// Size of the opaque binary STL header in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one binary facet record: 12 little-endian `f32` (normal plus
/// three vertices) followed by a `u16` color word.
const FACET_RECORD_SIZE: usize = 50;

/// Number grammar for text STL: scientific notation is mandatory.
const NUM: &str = r"[+\-]?\d+(?:\.\d+)?e[+\-]?\d+";

static SOLID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*solid\s+(\S+)\s*$").unwrap_or_else(|_| unreachable!())
});
static FACET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*facet\s+normal\s+({NUM})\s+({NUM})\s+({NUM})\s*$"
    ))
    .unwrap_or_else(|_| unreachable!())
});
static VERTEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*vertex\s+({NUM})\s+({NUM})\s+({NUM})\s*$"))
        .unwrap_or_else(|_| unreachable!())
});
static ENDFACET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*endfacet\s*$").unwrap_or_else(|_| unreachable!()));
static NUM_PARTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+\-]?)(\d+(?:\.\d+)?)e([+\-]?)(\d+)$").unwrap_or_else(|_| unreachable!())
});

/// Parse a scientific-notation token into sign, mantissa and exponent
/// parts and recombine them.
fn parse_scientific(token: &str) -> Option<f64> {
    let caps = NUM_PARTS_RE.captures(token)?;
    let sign = if &caps[1] == "-" { -1.0 } else { 1.0 };
    let mantissa: f64 = caps[2].parse().ok()?;
    let exp_sign: i32 = if &caps[3] == "-" { -1 } else { 1 };
    let exponent: i32 = caps[4].parse().ok()?;
    Some(sign * mantissa * 10f64.powi(exp_sign * exponent))
}

/// Geometric facet normal from the first three vertices, zero when the
/// facet is degenerate.
fn computed_normal(vertices: &[Vector3]) -> Option<Vector3> {
    if vertices.len() < 3 {
        return None;
    }
    let normal = (vertices[1] - vertices[0]).cross(vertices[2] - vertices[0]);
    if normal.magnitude() > 0.0 {
        Some(normal.normalized())
    } else {
        Some(Vector3::zero())
    }
}

/// Load an STL file, sniffing text vs binary from the leading bytes.
///
/// # Errors
///
/// Returns [`DecodeError::NotFound`] for a missing file,
/// [`DecodeError::Truncated`] when binary content ends early, and
/// [`DecodeError::Format`] when text content violates the grammar.
pub fn load_stl(path: &Path) -> DecodeResult<Mesh> {
    let mut file = File::open(path).map_err(|e| DecodeError::from_io(path, e))?;
    let mut sniff = [0u8; 5];
    let mut got = 0;
    while got < sniff.len() {
        match file.read(&mut sniff[got..]) {
            Ok(0) => break,
            Ok(n) => got += n,
            Err(e) => return Err(DecodeError::from_io(path, e)),
        }
    }
    drop(file);

    if got == sniff.len() && &sniff == b"solid" {
        debug!(path = %path.display(), "decoding text stl");
        load_text_stl(path)
    } else {
        debug!(path = %path.display(), "decoding binary stl");
        load_binary_stl(path)
    }
}

fn format_err(path: &Path, message: impl Into<String>) -> DecodeError {
    DecodeError::Format {
        format: "stl",
        path: path.to_path_buf(),
        message: message.into(),
    }
}

/// Decode a text (`solid`) STL file.
///
/// The first line must be `solid NAME`; `facet normal` opens a facet,
/// `vertex` lines accumulate into it, `endfacet` finalizes it. Lines
/// matching none of the patterns (blank lines, `outer loop`, `endloop`,
/// `endsolid`) are ignored.
pub fn load_text_stl(path: &Path) -> DecodeResult<Mesh> {
    let file = File::open(path).map_err(|e| DecodeError::from_io(path, e))?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let first = lines
        .next()
        .transpose()
        .map_err(|e| DecodeError::from_io(path, e))?
        .ok_or_else(|| format_err(path, "empty file"))?;
    let name = SOLID_RE
        .captures(&first)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| format_err(path, "missing solid header line"))?;

    let mut mesh = PfvMesh::new();
    mesh.meta_mut().set("format", "stl");
    mesh.meta_mut().set("type", "text");
    mesh.meta_mut().set("name", name);

    let mut current: Option<(Vec<Vector3>, Vector3)> = None;

    for line in lines {
        let line = line.map_err(|e| DecodeError::from_io(path, e))?;
        if let Some(caps) = FACET_RE.captures(&line) {
            let given = read_triplet(&caps)
                .ok_or_else(|| format_err(path, "unparseable facet normal"))?;
            current = Some((Vec::new(), given));
        } else if let Some(caps) = VERTEX_RE.captures(&line) {
            let vertex =
                read_triplet(&caps).ok_or_else(|| format_err(path, "unparseable vertex"))?;
            match current.as_mut() {
                Some((vertices, _)) => vertices.push(vertex),
                None => return Err(format_err(path, "vertex outside facet block")),
            }
        } else if ENDFACET_RE.is_match(&line) {
            let (vertices, given) = current
                .take()
                .ok_or_else(|| format_err(path, "endfacet without facet block"))?;
            let normal = computed_normal(&vertices)
                .ok_or_else(|| format_err(path, "facet with fewer than three vertices"))?;
            let mut data = Metadata::new();
            data.set("given_normal", given);
            mesh.add_facet(PfvFacet::with_data(vertices, normal, data), None)
                .map_err(|e| format_err(path, e.to_string()))?;
        }
        // Anything else (outer loop, endloop, endsolid, blanks) is noise.
    }

    debug!(facets = mesh.facet_count(), "text stl decoded");
    Ok(Mesh::Pfv(mesh))
}

fn read_triplet(caps: &regex::Captures<'_>) -> Option<Vector3> {
    Some(Vector3::new(
        parse_scientific(&caps[1])?,
        parse_scientific(&caps[2])?,
        parse_scientific(&caps[3])?,
    ))
}

/// Decode a binary STL file.
///
/// Layout: an opaque 80-byte header (preserved in mesh metadata), a
/// little-endian `u32` facet count, then `count` 50-byte facet records.
/// A file shorter than its declared facet count is a hard error, never a
/// partial mesh.
pub fn load_binary_stl(path: &Path) -> DecodeResult<Mesh> {
    let file = File::open(path).map_err(|e| DecodeError::from_io(path, e))?;
    let mut bytes = Vec::new();
    BufReader::new(file)
        .read_to_end(&mut bytes)
        .map_err(|e| DecodeError::from_io(path, e))?;

    if bytes.len() < HEADER_SIZE + 4 {
        return Err(DecodeError::Truncated {
            path: path.to_path_buf(),
            expected: HEADER_SIZE + 4,
            got: bytes.len(),
        });
    }

    let count_bytes: [u8; 4] = bytes[HEADER_SIZE..HEADER_SIZE + 4]
        .try_into()
        .unwrap_or([0; 4]);
    let facet_count = u32::from_le_bytes(count_bytes) as usize;
    let expected = HEADER_SIZE + 4 + facet_count * FACET_RECORD_SIZE;
    if bytes.len() < expected {
        return Err(DecodeError::Truncated {
            path: path.to_path_buf(),
            expected,
            got: bytes.len(),
        });
    }

    let mut mesh = PfvMesh::new();
    mesh.meta_mut().set("format", "stl");
    mesh.meta_mut().set("type", "binary");
    mesh.meta_mut()
        .set("header", bytes[..HEADER_SIZE].to_vec());

    for i in 0..facet_count {
        let record = &bytes[HEADER_SIZE + 4 + i * FACET_RECORD_SIZE..];
        let given = Vector3::new(f32_at(record, 0), f32_at(record, 4), f32_at(record, 8));
        let vertices = vec![
            Vector3::new(f32_at(record, 12), f32_at(record, 16), f32_at(record, 20)),
            Vector3::new(f32_at(record, 24), f32_at(record, 28), f32_at(record, 32)),
            Vector3::new(f32_at(record, 36), f32_at(record, 40), f32_at(record, 44)),
        ];
        let color = u16::from_le_bytes([record[48], record[49]]);
        let normal = computed_normal(&vertices).unwrap_or_else(Vector3::zero);
        let mut data = Metadata::new();
        data.set("given_normal", given);
        data.set("color_data", MetaValue::Index(usize::from(color)));
        mesh.add_facet(PfvFacet::with_data(vertices, normal, data), None)
            .map_err(|e| format_err(path, e.to_string()))?;
    }

    debug!(facets = mesh.facet_count(), "binary stl decoded");
    Ok(Mesh::Pfv(mesh))
}

/// Read a little-endian `f32` at a byte offset, widened to `f64`.
fn f32_at(bytes: &[u8], offset: usize) -> f64 {
    let raw: [u8; 4] = bytes[offset..offset + 4].try_into().unwrap_or([0; 4]);
    f64::from(f32::from_le_bytes(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    /// One facet record: declared normal, three vertices, color word.
    fn push_record(out: &mut Vec<u8>, normal: [f32; 3], vs: [[f32; 3]; 3], color: u16) {
        for c in normal {
            out.extend_from_slice(&c.to_le_bytes());
        }
        for v in vs {
            for c in v {
                out.extend_from_slice(&c.to_le_bytes());
            }
        }
        out.extend_from_slice(&color.to_le_bytes());
    }

    fn binary_stl(records: &[([f32; 3], [[f32; 3]; 3], u16)]) -> Vec<u8> {
        let mut out = vec![0u8; 80];
        out.extend_from_slice(&u32::try_from(records.len()).unwrap().to_le_bytes());
        for &(normal, vs, color) in records {
            push_record(&mut out, normal, vs, color);
        }
        out
    }

    #[test]
    fn parse_scientific_recombines_parts() {
        assert_eq!(parse_scientific("1e0"), Some(1.0));
        assert_eq!(parse_scientific("-2.5e1"), Some(-25.0));
        assert_eq!(parse_scientific("+1.5e-2"), Some(0.015));
        assert_eq!(parse_scientific("1.5"), None);
        assert_eq!(parse_scientific("1.5e"), None);
        assert_eq!(parse_scientific("abc"), None);
    }

    #[test]
    fn binary_roundtrip_single_facet() {
        let data = binary_stl(&[(
            [9.0, 9.0, 9.0], // bogus declared normal, must be recomputed
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            7,
        )]);
        let file = write_temp(&data);
        let mesh = load_stl(file.path()).unwrap();

        assert_eq!(mesh.facet_count(), 1);
        assert_eq!(mesh.meta().text("format"), Some("stl"));
        assert_eq!(mesh.meta().text("type"), Some("binary"));
        assert_eq!(
            mesh.meta().get("header").and_then(MetaValue::as_bytes),
            Some(&[0u8; 80][..])
        );

        let view = mesh.facet_view(0).unwrap();
        assert_eq!(view.normal(), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(
            view.data().get("given_normal").and_then(MetaValue::as_vector),
            Some(Vector3::new(9.0, 9.0, 9.0))
        );
        assert_eq!(
            view.data().get("color_data").and_then(MetaValue::as_index),
            Some(7)
        );
    }

    #[test]
    fn binary_truncated_record_is_fatal() {
        let mut data = binary_stl(&[(
            [0.0, 0.0, 1.0],
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            0,
        )]);
        data.truncate(data.len() - 10);
        let file = write_temp(&data);
        let err = load_stl(file.path()).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Truncated {
                expected: 134,
                got: 124,
                ..
            }
        ));
    }

    #[test]
    fn binary_missing_count_is_fatal() {
        let file = write_temp(&[0u8; 60]);
        let err = load_stl(file.path()).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { expected: 84, got: 60, .. }));
    }

    #[test]
    fn degenerate_facet_gets_zero_normal() {
        let data = binary_stl(&[(
            [0.0, 0.0, 1.0],
            [[1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 1.0]],
            0,
        )]);
        let file = write_temp(&data);
        let mesh = load_stl(file.path()).unwrap();
        assert_eq!(mesh.facet_view(0).unwrap().normal(), Vector3::zero());
    }

    #[test]
    fn text_stl_parses_and_recomputes_normal() {
        let content = "\
solid cube
  facet normal 0.0e0 0.0e0 -1.0e0
    outer loop
      vertex 0.0e0 0.0e0 0.0e0
      vertex 1.0e0 0.0e0 0.0e0
      vertex 0.0e0 1.0e0 0.0e0
    endloop
  endfacet
endsolid cube
";
        let file = write_temp(content.as_bytes());
        let mesh = load_stl(file.path()).unwrap();

        assert_eq!(mesh.meta().text("type"), Some("text"));
        assert_eq!(mesh.meta().text("name"), Some("cube"));
        assert_eq!(mesh.facet_count(), 1);

        let view = mesh.facet_view(0).unwrap();
        // Winding says +Z even though the declaration says -Z.
        assert_eq!(view.normal(), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(
            view.data().get("given_normal").and_then(MetaValue::as_vector),
            Some(Vector3::new(0.0, 0.0, -1.0))
        );
    }

    #[test]
    fn text_stl_without_solid_name_is_malformed() {
        let file = write_temp(b"solid\nendsolid\n");
        let err = load_stl(file.path()).unwrap_err();
        assert!(matches!(err, DecodeError::Format { format: "stl", .. }));
    }

    #[test]
    fn text_stl_rejects_plain_decimal_numbers() {
        let content = "\
solid bad
  facet normal 0.0 0.0 1.0
  endfacet
endsolid bad
";
        let file = write_temp(content.as_bytes());
        // The facet line fails the grammar, so the stray endfacet has no
        // open block.
        let err = load_stl(file.path()).unwrap_err();
        assert!(matches!(err, DecodeError::Format { .. }));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_stl(Path::new("/nonexistent/part.stl")).unwrap_err();
        assert!(matches!(err, DecodeError::NotFound { .. }));
    }

    #[test]
    fn short_file_without_solid_prefix_is_binary() {
        let file = write_temp(b"sol");
        let err = load_stl(file.path()).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { .. }));
    }
}
