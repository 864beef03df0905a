//! Mesh measurement engine for meshmeter.
//!
//! Consumes any [`Mesh`] through the layout-polymorphic facet view and
//! computes enclosed volume, surface area and per-axis extents in a
//! single pass, writing results into the mesh's metadata.
//!
//! Volume assumes a closed surface; non-closed or self-intersecting
//! meshes may give unexpected values. Consistently inverted windings are
//! tolerated: the total volume is reported as an absolute value.
//!
//! # Example
//!
//! ```
//! use meshmeter_measure::{measure, MeasureOptions};
//! use meshmeter_model::{Mesh, PfvFacet, PfvMesh, Vector3};
//!
//! let mut pfv = PfvMesh::new();
//! pfv.add_facet(
//!     PfvFacet::new(
//!         vec![
//!             Vector3::new(1.0, 0.0, 0.0),
//!             Vector3::new(0.0, 1.0, 0.0),
//!             Vector3::new(0.0, 0.0, 1.0),
//!         ],
//!         Vector3::new(1.0, 1.0, 1.0).normalized(),
//!     ),
//!     None,
//! ).unwrap();
//! let mut mesh = Mesh::Pfv(pfv);
//!
//! let results = measure(&mut mesh, MeasureOptions::all());
//! assert!((results.volume.unwrap() - 1.0 / 6.0).abs() < 1e-12);
//! assert_eq!(mesh.meta().number("x_length"), Some(1.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod area;
mod volume;

pub use area::{facet_area, triangle_area};
pub use volume::{facet_volume, tetrahedron_volume};

use meshmeter_model::{Aabb, Mesh, Vector3};
use tracing::debug;

/// Which metrics a [`measure`] pass should compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasureOptions {
    /// Compute the enclosed volume.
    pub volume: bool,
    /// Compute the surface area.
    pub area: bool,
    /// Compute per-axis extents.
    pub extents: bool,
}

impl MeasureOptions {
    /// Enable every metric.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            volume: true,
            area: true,
            extents: true,
        }
    }
}

/// Results of a [`measure`] pass; `None` for metrics not requested.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurements {
    /// Enclosed volume (always non-negative).
    pub volume: Option<f64>,
    /// Surface area.
    pub area: Option<f64>,
    /// Axis-aligned extents (x, y, z lengths).
    pub extents: Option<Vector3>,
}

/// Measure a mesh in one pass over its facets.
///
/// Requested metrics are returned and also written into the mesh
/// metadata under the stable keys `volume`, `area`, `x_length`,
/// `y_length` and `z_length`. An empty mesh measures zero everywhere.
pub fn measure(mesh: &mut Mesh, options: MeasureOptions) -> Measurements {
    let mut volume_total = 0.0;
    let mut area_total = 0.0;
    let mut bounds = Aabb::empty();

    for facet in mesh.facet_views() {
        let positions = facet.positions();
        if options.volume {
            volume_total += volume::facet_volume(&positions, facet.normal());
        }
        if options.area {
            area_total += area::facet_area(&positions, facet.normal());
        }
        if options.extents {
            for position in positions {
                bounds.expand_to_include(position);
            }
        }
    }

    let mut results = Measurements::default();
    if options.volume {
        // A consistently inverted mesh sums negative but is otherwise
        // accurate.
        let volume = volume_total.abs();
        mesh.meta_mut().set("volume", volume);
        results.volume = Some(volume);
    }
    if options.area {
        mesh.meta_mut().set("area", area_total);
        results.area = Some(area_total);
    }
    if options.extents {
        let size = bounds.size();
        mesh.meta_mut().set("x_length", size.x);
        mesh.meta_mut().set("y_length", size.y);
        mesh.meta_mut().set("z_length", size.z);
        results.extents = Some(size);
    }

    debug!(
        facets = mesh.facet_count(),
        volume = ?results.volume,
        area = ?results.area,
        "mesh measured"
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use meshmeter_model::{PfvFacet, PfvMesh};

    /// Axis-aligned box triangulated with outward CCW winding.
    fn box_mesh(min: Vector3, max: Vector3) -> PfvMesh {
        let v = [
            Vector3::new(min.x, min.y, min.z),
            Vector3::new(max.x, min.y, min.z),
            Vector3::new(max.x, max.y, min.z),
            Vector3::new(min.x, max.y, min.z),
            Vector3::new(min.x, min.y, max.z),
            Vector3::new(max.x, min.y, max.z),
            Vector3::new(max.x, max.y, max.z),
            Vector3::new(min.x, max.y, max.z),
        ];
        let faces: [[usize; 3]; 12] = [
            [0, 3, 2],
            [0, 2, 1], // bottom, -z
            [4, 5, 6],
            [4, 6, 7], // top, +z
            [0, 1, 5],
            [0, 5, 4], // front, -y
            [2, 3, 7],
            [2, 7, 6], // back, +y
            [0, 4, 7],
            [0, 7, 3], // left, -x
            [1, 2, 6],
            [1, 6, 5], // right, +x
        ];
        let mut mesh = PfvMesh::new();
        for [a, b, c] in faces {
            let vertices = vec![v[a], v[b], v[c]];
            let normal = (vertices[1] - vertices[0])
                .cross(vertices[2] - vertices[0])
                .normalized();
            let facet = PfvFacet::new(vertices, normal);
            mesh.add_facet(facet, None).unwrap();
        }
        mesh
    }

    fn flipped(mesh: &PfvMesh) -> PfvMesh {
        let mut out = PfvMesh::new();
        for facet in mesh.facets() {
            let mut vertices: Vec<Vector3> = facet.vertices().collect();
            vertices.reverse();
            out.add_facet(PfvFacet::new(vertices, -facet.normal()), None)
                .unwrap();
        }
        out
    }

    fn assert_cube_metrics(mut mesh: Mesh, volume: f64, area: f64, lengths: Vector3) {
        let results = measure(&mut mesh, MeasureOptions::all());
        assert_relative_eq!(results.volume.unwrap(), volume, epsilon = 1e-4);
        assert_relative_eq!(results.area.unwrap(), area, epsilon = 1e-4);
        let extents = results.extents.unwrap();
        assert_relative_eq!(extents.x, lengths.x, epsilon = 1e-4);
        assert_relative_eq!(extents.y, lengths.y, epsilon = 1e-4);
        assert_relative_eq!(extents.z, lengths.z, epsilon = 1e-4);

        // Metadata carries the same numbers.
        assert_relative_eq!(mesh.meta().number("volume").unwrap(), volume, epsilon = 1e-4);
        assert_relative_eq!(mesh.meta().number("area").unwrap(), area, epsilon = 1e-4);
        assert_relative_eq!(
            mesh.meta().number("x_length").unwrap(),
            lengths.x,
            epsilon = 1e-4
        );
        assert_relative_eq!(
            mesh.meta().number("y_length").unwrap(),
            lengths.y,
            epsilon = 1e-4
        );
        assert_relative_eq!(
            mesh.meta().number("z_length").unwrap(),
            lengths.z,
            epsilon = 1e-4
        );
    }

    #[test]
    fn centered_cube_both_layouts() {
        let pfv = box_mesh(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));
        assert_cube_metrics(
            Mesh::Iv(pfv.to_iv()),
            8.0,
            24.0,
            Vector3::new(2.0, 2.0, 2.0),
        );
        assert_cube_metrics(Mesh::Pfv(pfv), 8.0, 24.0, Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn corner_unit_cube() {
        let pfv = box_mesh(Vector3::zero(), Vector3::new(1.0, 1.0, 1.0));
        assert_cube_metrics(Mesh::Pfv(pfv), 1.0, 6.0, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn translation_does_not_change_volume() {
        let pfv = box_mesh(Vector3::new(3.0, -1.0, -1.0), Vector3::new(5.0, 1.0, 1.0));
        assert_cube_metrics(Mesh::Pfv(pfv), 8.0, 24.0, Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn negative_octant_extents() {
        // Every coordinate negative: the maximum seed must not pin at
        // zero.
        let pfv = box_mesh(
            Vector3::new(-5.0, -5.0, -5.0),
            Vector3::new(-3.0, -3.0, -3.0),
        );
        assert_cube_metrics(Mesh::Pfv(pfv), 8.0, 24.0, Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn inverted_windings_yield_same_volume() {
        let pfv = box_mesh(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));
        let mut mesh = Mesh::Pfv(flipped(&pfv));
        let results = measure(&mut mesh, MeasureOptions::all());
        assert_relative_eq!(results.volume.unwrap(), 8.0, epsilon = 1e-4);
    }

    #[test]
    fn single_tetrahedron_facet() {
        let mut mesh = PfvMesh::new();
        mesh.add_facet(
            PfvFacet::new(
                vec![
                    Vector3::new(1.0, 0.0, 0.0),
                    Vector3::new(0.0, 1.0, 0.0),
                    Vector3::new(0.0, 0.0, 1.0),
                ],
                Vector3::new(1.0, 1.0, 1.0).normalized(),
            ),
            None,
        )
        .unwrap();
        let mut mesh = Mesh::Pfv(mesh);
        let results = measure(&mut mesh, MeasureOptions::all());
        assert_relative_eq!(results.volume.unwrap(), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn square_pyramid_base_facet() {
        let mut mesh = PfvMesh::new();
        mesh.add_facet(
            PfvFacet::new(
                vec![
                    Vector3::new(1.0, -1.0, -1.0),
                    Vector3::new(1.0, 1.0, -1.0),
                    Vector3::new(1.0, 1.0, 1.0),
                    Vector3::new(1.0, -1.0, 1.0),
                ],
                Vector3::new(1.0, 0.0, 0.0),
            ),
            None,
        )
        .unwrap();
        let mut mesh = Mesh::Pfv(mesh);
        let results = measure(&mut mesh, MeasureOptions::all());
        assert_relative_eq!(results.volume.unwrap(), 4.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(results.area.unwrap(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_mesh_measures_zero() {
        let mut mesh = Mesh::Pfv(PfvMesh::new());
        let results = measure(&mut mesh, MeasureOptions::all());
        assert_eq!(results.volume, Some(0.0));
        assert_eq!(results.area, Some(0.0));
        assert_eq!(results.extents, Some(Vector3::zero()));
    }

    #[test]
    fn empty_facet_contributes_nothing() {
        let mut pfv = box_mesh(Vector3::zero(), Vector3::new(1.0, 1.0, 1.0));
        pfv.add_facet(PfvFacet::new(Vec::new(), Vector3::zero()), None)
            .unwrap();
        let mut mesh = Mesh::Pfv(pfv);
        let results = measure(&mut mesh, MeasureOptions::all());
        assert_relative_eq!(results.volume.unwrap(), 1.0, epsilon = 1e-4);
        assert_relative_eq!(results.area.unwrap(), 6.0, epsilon = 1e-4);
    }

    #[test]
    fn only_requested_metrics_are_written() {
        let pfv = box_mesh(Vector3::zero(), Vector3::new(1.0, 1.0, 1.0));
        let mut mesh = Mesh::Pfv(pfv);
        let results = measure(
            &mut mesh,
            MeasureOptions {
                volume: true,
                area: false,
                extents: false,
            },
        );
        assert!(results.volume.is_some());
        assert_eq!(results.area, None);
        assert_eq!(results.extents, None);
        assert!(mesh.meta().contains("volume"));
        assert!(!mesh.meta().contains("area"));
        assert!(!mesh.meta().contains("x_length"));
    }
}
