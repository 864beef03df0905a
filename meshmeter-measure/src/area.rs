//! Surface area contributions of individual facets.

use meshmeter_model::Vector3;

use crate::volume::{centroid, segment_sign};

/// Area of the triangle spanned by three points.
pub fn triangle_area(p1: Vector3, p2: Vector3, p3: Vector3) -> f64 {
    (p2 - p1).cross(p3 - p1).magnitude() / 2.0
}

/// Area of a polygonal facet.
///
/// Uses the same centroid fan and majority-vote winding correction as
/// the volume decomposition: each segment's triangle area is signed by
/// its concavity against the facet normal, and a majority-concave vote
/// inverts the facet total. Facets with fewer than three vertices have
/// zero area.
pub fn facet_area(positions: &[Vector3], normal: Vector3) -> f64 {
    let n = positions.len();
    if n < 3 {
        return 0.0;
    }
    if n == 3 {
        return triangle_area(positions[0], positions[1], positions[2]);
    }

    let centroid = centroid(positions);
    let mut majority = 0i64;
    let mut area = 0.0;
    for (i, &v1) in positions.iter().enumerate() {
        let v2 = positions[(i + 1) % n];
        let sign = segment_sign(centroid, v1, v2, normal);
        majority += i64::from(sign);
        area += triangle_area(centroid, v1, v2) * f64::from(sign);
    }
    if majority < 0 {
        area = -area;
    }
    area
}
