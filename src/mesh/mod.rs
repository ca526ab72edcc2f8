//! Mesh data model: triangles with paired source/target vertices.

pub mod clip;
pub mod triangulator;

use crate::extent::{wrap_x, Extent};

/// A single mesh triangle.
///
/// `source` and `target` are the same three vertices expressed in the source
/// and target projections. `needs_shift` marks a triangle straddling the
/// source projection's wrap seam: its source x coordinates must be reduced
/// modulo the world width before any affine math.
#[derive(Clone, Debug)]
pub struct Triangle {
    pub source: [(f64, f64); 3],
    pub target: [(f64, f64); 3],
    pub needs_shift: bool,
}

/// Adaptive triangulation of a target extent.
///
/// Built once per render request by [`triangulator::build_mesh`], read-only
/// afterwards. Triangle order is stable for a given input.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
    /// True iff any triangle needs the wrap shift.
    pub wraps_x: bool,
    pub(crate) source_world_width: Option<f64>,
    pub(crate) source_domain: Option<Extent>,
}

impl Mesh {
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Union of all source vertices.
    ///
    /// When the mesh wraps, x coordinates are first reduced modulo the world
    /// width so a seam-straddling mesh yields one contiguous extent rather
    /// than a spurious world-wide one. If both x bounds then land past the
    /// domain's right edge, the extent is brought back into the canonical
    /// world by one world width.
    pub fn source_extent(&self) -> Extent {
        let mut extent = Extent::empty();
        match (self.wraps_x, self.source_world_width) {
            (true, Some(world_width)) => {
                for triangle in &self.triangles {
                    for &(x, y) in &triangle.source {
                        extent.extend((wrap_x(x, world_width), y));
                    }
                }
                if let Some(domain) = self.source_domain {
                    if extent.min_x > domain.max_x && extent.max_x > domain.max_x {
                        extent.min_x -= world_width;
                        extent.max_x -= world_width;
                    }
                }
            }
            _ => {
                for triangle in &self.triangles {
                    for &v in &triangle.source {
                        extent.extend(v);
                    }
                }
            }
        }
        extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle(source: [(f64, f64); 3], needs_shift: bool) -> Triangle {
        Triangle {
            source,
            target: source,
            needs_shift,
        }
    }

    #[test]
    fn test_source_extent_plain_union() {
        let mesh = Mesh {
            triangles: vec![
                triangle([(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)], false),
                triangle([(10.0, 0.0), (10.0, 10.0), (0.0, 10.0)], false),
            ],
            wraps_x: false,
            source_world_width: None,
            source_domain: None,
        };
        assert_eq!(mesh.source_extent(), Extent::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_source_extent_idempotent_and_contains_vertices() {
        let mesh = Mesh {
            triangles: vec![triangle([(-3.0, 1.0), (4.0, -2.0), (0.5, 7.0)], false)],
            wraps_x: false,
            source_world_width: None,
            source_domain: None,
        };
        let a = mesh.source_extent();
        let b = mesh.source_extent();
        assert_eq!(a, b);
        for t in &mesh.triangles {
            for &v in &t.source {
                assert!(a.contains(v));
            }
        }
    }

    #[test]
    fn test_source_extent_wrapping_mesh_is_contiguous() {
        // A mesh straddling the ±180 seam: a naive union would span the
        // whole world; the modulo union spans only [170, 190].
        let mesh = Mesh {
            triangles: vec![triangle([(170.0, 0.0), (-170.0, 0.0), (170.0, 10.0)], true)],
            wraps_x: true,
            source_world_width: Some(360.0),
            source_domain: Some(Extent::new(-180.0, -90.0, 180.0, 90.0)),
        };
        let extent = mesh.source_extent();
        assert_relative_eq!(extent.min_x, 170.0);
        assert_relative_eq!(extent.max_x, 190.0);
        assert_relative_eq!(extent.min_y, 0.0);
        assert_relative_eq!(extent.max_y, 10.0);
    }

    #[test]
    fn test_source_extent_canonicalizes_west_side_mesh() {
        // All vertices on the west side of the seam reduce to x > 180; the
        // whole extent is shifted back into the canonical world.
        let mesh = Mesh {
            triangles: vec![triangle(
                [(-170.0, 0.0), (-160.0, 0.0), (-165.0, 10.0)],
                true,
            )],
            wraps_x: true,
            source_world_width: Some(360.0),
            source_domain: Some(Extent::new(-180.0, -90.0, 180.0, 90.0)),
        };
        let extent = mesh.source_extent();
        assert_relative_eq!(extent.min_x, -170.0);
        assert_relative_eq!(extent.max_x, -160.0);
    }
}
