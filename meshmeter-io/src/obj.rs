//! OBJ file decoding.
//!
//! OBJ is a line-oriented text format: `v` records declare vertices into
//! a shared list and `f` records reference them by (1-based) index, so
//! the decoder produces an indexed-vertex mesh. Vertex records are
//! authoritative and bypass the pool's dedup scan.
//!
//! # Normals
//!
//! `f` records carry no normal. After the whole file is read, each
//! facet's normal is computed geometrically from its winding and, when
//! the facet references `vn` records, flipped to agree with the declared
//! facing. Declared normal indices stay in the facet data bag under
//! `given_normal`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use meshmeter_model::{IvMesh, Mesh, MetaValue, Metadata, Vector3};
use tracing::debug;

use crate::error::{DecodeError, DecodeResult};

fn format_err(path: &Path, message: impl Into<String>) -> DecodeError {
    DecodeError::Format {
        format: "obj",
        path: path.to_path_buf(),
        message: message.into(),
    }
}

/// A token parsed as a number when possible, kept as text otherwise.
fn lenient_number(token: &str) -> MetaValue {
    token
        .parse::<f64>()
        .map_or_else(|_| MetaValue::from(token), MetaValue::Number)
}

/// Resolve a 1-based (possibly negative, relative-to-end) index against
/// the current length of the referenced sequence.
fn resolve_index(token: &str, len: usize) -> Option<usize> {
    let n: i64 = token.parse().ok()?;
    let resolved = if n > 0 {
        n - 1
    } else if n < 0 {
        i64::try_from(len).ok()? + n
    } else {
        return None;
    };
    usize::try_from(resolved).ok()
}

/// Load an OBJ file into an indexed-vertex mesh.
///
/// # Errors
///
/// Returns [`DecodeError::NotFound`] for a missing file and
/// [`DecodeError::Format`] for malformed `v` records or face references
/// that do not resolve to a declared vertex.
pub fn load_obj(path: &Path) -> DecodeResult<Mesh> {
    let file = File::open(path).map_err(|e| DecodeError::from_io(path, e))?;
    let reader = BufReader::new(file);

    let mut mesh = IvMesh::new();
    mesh.meta_mut().set("format", "obj");

    for line in reader.lines() {
        let line = line.map_err(|e| DecodeError::from_io(path, e))?;
        let entry: Vec<&str> = line.split_whitespace().collect();
        let Some((&tag, args)) = entry.split_first() else {
            continue;
        };
        match tag {
            "v" => decode_vertex(path, &mut mesh, args)?,
            "vt" => {
                let coord: Vec<MetaValue> = args.iter().map(|a| lenient_number(a)).collect();
                mesh.meta_mut().push("texture_coordinates", coord);
            }
            "vn" => {
                let normal = decode_declared_normal(args);
                mesh.meta_mut().push("normals", normal);
            }
            "vp" => {
                let coord: Vec<MetaValue> = args.iter().map(|a| lenient_number(a)).collect();
                mesh.meta_mut().push("freeform_geometry", coord);
            }
            "f" => decode_face(path, &mut mesh, args)?,
            "l" => decode_line_element(&mut mesh, args),
            _ => {
                let raw: Vec<MetaValue> =
                    args.iter().map(|&a| MetaValue::from(a)).collect();
                push_other_tag(&mut mesh, tag, raw);
            }
        }
    }

    assign_normals(&mut mesh);
    debug!(
        facets = mesh.facet_count(),
        vertices = mesh.vertex_count(),
        "obj decoded"
    );
    Ok(Mesh::Iv(mesh))
}

/// Decode a `v` record: three coordinates, an optional `w` divisor, and
/// optional trailing per-vertex color values.
fn decode_vertex(path: &Path, mesh: &mut IvMesh, args: &[&str]) -> DecodeResult<()> {
    if args.len() < 3 {
        return Err(format_err(path, "too few vertex arguments"));
    }
    let coord = |s: &str| {
        s.parse::<f64>()
            .map_err(|_| format_err(path, format!("unparseable vertex coordinate {s:?}")))
    };
    let scale = if args.len() >= 4 { coord(args[3])? } else { 1.0 };
    if scale == 0.0 {
        return Err(format_err(path, "vertex weight of zero"));
    }
    let position = Vector3::new(
        coord(args[0])? / scale,
        coord(args[1])? / scale,
        coord(args[2])? / scale,
    );
    let slot = mesh.push_vertex_raw(position);
    if args.len() > 4 {
        let color: Vec<MetaValue> = args[4..].iter().map(|a| lenient_number(a)).collect();
        mesh.meta_mut()
            .map_insert("color_data", slot.to_string(), color);
    }
    Ok(())
}

/// Decode a `vn` record. Three numeric values become a vector; four
/// numeric values are `x/w, y/w, z/w`; anything else is kept raw.
fn decode_declared_normal(args: &[&str]) -> MetaValue {
    let numeric: Option<Vec<f64>> = args.iter().map(|a| a.parse::<f64>().ok()).collect();
    match numeric.as_deref() {
        Some([x, y, z]) => MetaValue::Vector(Vector3::new(*x, *y, *z)),
        Some([x, y, z, w]) => MetaValue::Vector(Vector3::new(*x, *y, *z) / *w),
        _ => MetaValue::List(args.iter().map(|a| lenient_number(a)).collect()),
    }
}

/// Decode an `f` record: whitespace-separated `v[/vt][/vn]` tokens.
///
/// Vertex indices must resolve against the vertices declared so far;
/// texture and normal sub-indices are optional and recorded as `Missing`
/// when absent or unparseable.
fn decode_face(path: &Path, mesh: &mut IvMesh, args: &[&str]) -> DecodeResult<()> {
    let mut indices = Vec::with_capacity(args.len());
    let mut texture = Vec::with_capacity(args.len());
    let mut given_normal = Vec::with_capacity(args.len());

    let texture_len = meta_list_len(mesh.meta().get("texture_coordinates"));
    let normal_len = meta_list_len(mesh.meta().get("normals"));

    for token in args {
        let mut parts = token.split('/');
        let vertex_part = parts.next().unwrap_or("");
        let slot = resolve_index(vertex_part, mesh.vertex_count())
            .filter(|&slot| slot < mesh.vertex_count())
            .ok_or_else(|| {
                format_err(
                    path,
                    format!("face references unresolvable vertex {vertex_part:?}"),
                )
            })?;
        indices.push(slot);

        texture.push(sub_index(parts.next(), texture_len));
        given_normal.push(sub_index(parts.next(), normal_len));
    }

    let mut data = Metadata::new();
    data.set("texture", MetaValue::List(texture));
    data.set("given_normal", MetaValue::List(given_normal));
    // Normals are assigned in a post-pass once every vertex is known.
    mesh.add_facet_from_indices(indices, Vector3::zero(), data)
        .map_err(|e| format_err(path, e.to_string()))?;
    Ok(())
}

/// Optional `vt`/`vn` sub-index of a face token.
fn sub_index(part: Option<&str>, len: usize) -> MetaValue {
    match part {
        Some(token) if !token.is_empty() => {
            resolve_index(token, len).map_or(MetaValue::Missing, MetaValue::Index)
        }
        _ => MetaValue::Missing,
    }
}

fn meta_list_len(value: Option<&MetaValue>) -> usize {
    value.and_then(MetaValue::as_list).map_or(0, <[_]>::len)
}

/// Decode an `l` record: vertex indices when they all parse, the raw
/// tokens otherwise.
fn decode_line_element(mesh: &mut IvMesh, args: &[&str]) {
    let parsed: Option<Vec<MetaValue>> = args
        .iter()
        .map(|token| resolve_index(token, mesh.vertex_count()).map(MetaValue::Index))
        .collect();
    let value = parsed.map_or_else(
        || MetaValue::List(args.iter().map(|&a| MetaValue::from(a)).collect()),
        MetaValue::List,
    );
    mesh.meta_mut().push("lines", value);
}

/// Record an unrecognized tag's arguments under `other_tags`, keyed by
/// the tag with one argument list per occurrence.
fn push_other_tag(mesh: &mut IvMesh, tag: &str, args: Vec<MetaValue>) {
    let meta = mesh.meta_mut();
    if let Some(MetaValue::Map(map)) = meta.get_mut("other_tags") {
        match map.get_mut(tag) {
            Some(MetaValue::List(items)) => items.push(MetaValue::List(args)),
            _ => {
                map.insert(tag.to_string(), MetaValue::List(vec![MetaValue::List(args)]));
            }
        }
    } else {
        meta.map_insert(
            "other_tags",
            tag,
            MetaValue::List(vec![MetaValue::List(args)]),
        );
    }
}

/// Post-pass: compute each facet's geometric normal and orient it by any
/// declared normals it references.
fn assign_normals(mesh: &mut IvMesh) {
    for i in 0..mesh.facet_count() {
        let Ok(positions) = mesh.facet_positions(i) else {
            continue;
        };

        let given = declared_normal_sum(mesh, i);
        let mut normal = geometric_normal(&positions).normalized();
        if let Some(given) = given {
            if given.dot(normal) < 0.0 {
                normal = -normal;
            }
        }
        // Facet index i is in range by construction.
        let _ = mesh.set_facet_normal(i, normal);
    }
}

/// Sum of normalized declared normals referenced by a facet, or `None`
/// when the facet references none that resolve.
fn declared_normal_sum(mesh: &IvMesh, facet: usize) -> Option<Vector3> {
    let normals = mesh.meta().get("normals").and_then(MetaValue::as_list)?;
    let refs = mesh
        .facet(facet)?
        .data()
        .get("given_normal")
        .and_then(MetaValue::as_list)?;

    let mut sum = Vector3::zero();
    let mut any = false;
    for value in refs {
        if let Some(index) = value.as_index() {
            if let Some(declared) = normals.get(index).and_then(MetaValue::as_vector) {
                sum += declared.normalized();
                any = true;
            }
        }
    }
    any.then_some(sum)
}

/// Geometric normal of a polygonal facet.
///
/// Triangles use the direct cross product of their edges. Larger facets
/// fan around the centroid, summing the normalized per-segment cross
/// products so a long sliver cannot dominate the direction.
fn geometric_normal(positions: &[Vector3]) -> Vector3 {
    match positions.len() {
        0..=2 => Vector3::zero(),
        3 => (positions[1] - positions[0]).cross(positions[2] - positions[0]),
        n => {
            let mut centroid = Vector3::zero();
            for &p in positions {
                centroid += p;
            }
            #[allow(clippy::cast_precision_loss)]
            let centroid = centroid / n as f64;

            let mut sum = Vector3::zero();
            for (i, &v1) in positions.iter().enumerate() {
                let v2 = positions[(i + 1) % n];
                sum += (v1 - centroid).cross(v2 - centroid).normalized();
            }
            sum
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_obj(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn load(content: &str) -> Mesh {
        load_obj(write_obj(content).path()).unwrap()
    }

    #[test]
    fn vertices_and_triangle_face() {
        let mesh = load(
            "v 0 0 0\n\
             v 1 0 0\n\
             v 0 1 0\n\
             f 1 2 3\n",
        );
        assert_eq!(mesh.facet_count(), 1);
        assert_eq!(mesh.meta().text("format"), Some("obj"));

        let view = mesh.facet_view(0).unwrap();
        assert_eq!(view.vertex_count(), 3);
        assert_eq!(view.vertex(1), Some(Vector3::new(1.0, 0.0, 0.0)));
        // CCW in the XY plane means +Z by winding.
        assert_eq!(view.normal(), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn vertex_records_skip_dedup() {
        // Identical positions must stay distinct pool entries.
        let mesh = load(
            "v 0 0 0\n\
             v 0 0 0\n\
             v 1 0 0\n\
             f 1 2 3\n",
        );
        let Mesh::Iv(iv) = mesh else {
            panic!("obj decodes to indexed layout");
        };
        assert_eq!(iv.vertex_count(), 3);
    }

    #[test]
    fn vertex_w_divisor_scales_coordinates() {
        let mesh = load(
            "v 2 4 6 2\n\
             v 1 0 0 1\n\
             v 0 1 0\n\
             f 1 2 3\n",
        );
        let view = mesh.facet_view(0).unwrap();
        assert_eq!(view.vertex(0), Some(Vector3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn trailing_vertex_color_lands_in_meta() {
        let mesh = load("v 0 0 0 1 0.5 0.25 red\n");
        let colors = mesh
            .meta()
            .get("color_data")
            .and_then(MetaValue::as_map)
            .unwrap();
        let entry = colors.get("0").and_then(MetaValue::as_list).unwrap();
        assert_eq!(entry[0].as_number(), Some(0.5));
        assert_eq!(entry[2].as_text(), Some("red"));
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        let mesh = load(
            "v 0 0 0\n\
             v 1 0 0\n\
             v 0 1 0\n\
             f -3 -2 -1\n",
        );
        let view = mesh.facet_view(0).unwrap();
        assert_eq!(view.vertex(0), Some(Vector3::new(0.0, 0.0, 0.0)));
        assert_eq!(view.vertex(2), Some(Vector3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn unresolvable_face_index_is_malformed() {
        let err = load_obj(write_obj("v 0 0 0\nf 1 2 3\n").path()).unwrap_err();
        assert!(matches!(err, DecodeError::Format { format: "obj", .. }));
    }

    #[test]
    fn face_sub_indices_and_missing_markers() {
        let mesh = load(
            "v 0 0 0\n\
             v 1 0 0\n\
             v 0 1 0\n\
             vt 0 0\n\
             vn 0 0 1\n\
             f 1/1/1 2//1 3\n",
        );
        let view = mesh.facet_view(0).unwrap();
        let texture = view.data().get("texture").and_then(MetaValue::as_list).unwrap();
        assert_eq!(texture[0].as_index(), Some(0));
        assert!(texture[1].is_missing());
        assert!(texture[2].is_missing());

        let normals = view
            .data()
            .get("given_normal")
            .and_then(MetaValue::as_list)
            .unwrap();
        assert_eq!(normals[0].as_index(), Some(0));
        assert_eq!(normals[1].as_index(), Some(0));
        assert!(normals[2].is_missing());
    }

    #[test]
    fn declared_normal_flips_geometric_normal() {
        // CCW winding gives +Z, but the referenced vn says -Z.
        let mesh = load(
            "v 0 0 0\n\
             v 1 0 0\n\
             v 0 1 0\n\
             vn 0 0 -1\n\
             f 1//1 2//1 3//1\n",
        );
        assert_eq!(
            mesh.facet_view(0).unwrap().normal(),
            Vector3::new(0.0, 0.0, -1.0)
        );
    }

    #[test]
    fn quad_normal_uses_centroid_fan() {
        let mesh = load(
            "v 0 0 0\n\
             v 1 0 0\n\
             v 1 1 0\n\
             v 0 1 0\n\
             f 1 2 3 4\n",
        );
        let normal = mesh.facet_view(0).unwrap().normal();
        assert!((normal.z - 1.0).abs() < 1e-12);
        assert!(normal.x.abs() < 1e-12);
    }

    #[test]
    fn vn_with_four_components_divides_by_w() {
        let mesh = load("vn 0 0 2 2\n");
        let normals = mesh.meta().get("normals").and_then(MetaValue::as_list).unwrap();
        assert_eq!(normals[0].as_vector(), Some(Vector3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn non_numeric_vn_kept_raw() {
        let mesh = load("vn up please\n");
        let normals = mesh.meta().get("normals").and_then(MetaValue::as_list).unwrap();
        let raw = normals[0].as_list().unwrap();
        assert_eq!(raw[0].as_text(), Some("up"));
    }

    #[test]
    fn lines_and_unknown_tags_are_preserved() {
        let mesh = load(
            "v 0 0 0\n\
             v 1 0 0\n\
             l 1 2\n\
             usemtl shiny\n\
             usemtl matte\n",
        );
        let lines = mesh.meta().get("lines").and_then(MetaValue::as_list).unwrap();
        let first = lines[0].as_list().unwrap();
        assert_eq!(first[0].as_index(), Some(0));
        assert_eq!(first[1].as_index(), Some(1));

        let tags = mesh.meta().get("other_tags").and_then(MetaValue::as_map).unwrap();
        let usemtl = tags.get("usemtl").and_then(MetaValue::as_list).unwrap();
        assert_eq!(usemtl.len(), 2);
        assert_eq!(
            usemtl[1].as_list().and_then(|l| l[0].as_text()),
            Some("matte")
        );
    }

    #[test]
    fn zero_vertex_weight_is_malformed() {
        let err = load_obj(write_obj("v 1 2 3 0\n").path()).unwrap_err();
        assert!(matches!(err, DecodeError::Format { format: "obj", .. }));
    }

    #[test]
    fn too_few_vertex_arguments_is_malformed() {
        let err = load_obj(write_obj("v 1 2\n").path()).unwrap_err();
        assert!(matches!(err, DecodeError::Format { format: "obj", .. }));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_obj(Path::new("/nonexistent/part.obj")).unwrap_err();
        assert!(matches!(err, DecodeError::NotFound { .. }));
    }
}
