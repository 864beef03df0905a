//! Signed volume contributions of individual facets.
//!
//! The engine decomposes the enclosed volume by the divergence theorem:
//! every facet contributes the volume of the pyramid formed with the
//! origin as apex, signed by whether the facet faces away from or toward
//! the origin. Summed over a closed surface the interior volume remains.

use meshmeter_model::Vector3;

/// Volume of the tetrahedron with vertices at the origin, `v1`, `v2` and
/// `v3`, signed by the facet normal.
///
/// A facet whose normal points back toward the origin encloses a concave
/// region and is subtracted. The sign test `v1 . n >= 0` breaks ties
/// toward convex.
pub fn tetrahedron_volume(normal: Vector3, v1: Vector3, v2: Vector3, v3: Vector3) -> f64 {
    let concavity_sign = if v1.dot(normal) >= 0.0 { 1.0 } else { -1.0 };
    v1.dot(v2.cross(v3)).abs() / 6.0 * concavity_sign
}

/// Signed volume of the pyramid whose base is the facet and whose apex
/// is the origin.
///
/// Facets with more than three vertices are fan-triangulated around
/// their centroid. Each cyclic segment carries a concavity sign from
/// `(v1 - centroid) x (v2 - centroid) . normal`; if the majority of
/// segments come out concave the winding was globally reversed, and the
/// whole facet's accumulated volume is inverted. A zero vote counts as
/// convex. Facets with fewer than three vertices contribute nothing.
pub fn facet_volume(positions: &[Vector3], normal: Vector3) -> f64 {
    let n = positions.len();
    if n < 3 {
        return 0.0;
    }
    if n == 3 {
        return tetrahedron_volume(normal, positions[0], positions[1], positions[2]);
    }

    let centroid = centroid(positions);
    let mut majority = 0i64;
    let mut volume = 0.0;
    for (i, &v1) in positions.iter().enumerate() {
        let v2 = positions[(i + 1) % n];
        let sign = segment_sign(centroid, v1, v2, normal);
        majority += i64::from(sign);
        volume += tetrahedron_volume(normal, centroid, v1, v2) * f64::from(sign);
    }
    if majority < 0 {
        volume = -volume;
    }
    volume
}

/// Concavity sign of one fan segment relative to the facet normal.
pub(crate) fn segment_sign(centroid: Vector3, v1: Vector3, v2: Vector3, normal: Vector3) -> i8 {
    if (v1 - centroid).cross(v2 - centroid).dot(normal) >= 0.0 {
        1
    } else {
        -1
    }
}

/// Arithmetic mean of a non-empty position list.
pub(crate) fn centroid(positions: &[Vector3]) -> Vector3 {
    let mut sum = Vector3::zero();
    for &p in positions {
        sum += p;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = positions.len() as f64;
    sum / count
}
