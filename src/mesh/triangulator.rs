//! Adaptive triangulation of a target extent for reprojection.
//!
//! Seeds one quad from the target corners, inverse-projects it, and
//! recursively refines four-way until the midpoint reprojection error drops
//! below the threshold (or the depth cap is hit). Quads straddling the source
//! projection's wrap seam are detected by their tell-tale bounding-box width
//! and flagged for the rasterizer's modulo shift; leaf quads poking outside
//! the valid source domain are clipped in source space.

use crate::extent::{wrap_x, Extent};
use crate::mesh::clip::{clip_ring, fan_triangles};
use crate::mesh::{Mesh, Triangle};
use crate::proj::SourceProjection;

/// Hard ceiling on quad refinement depth (leaf count ≤ 4^depth).
pub const MAX_SUBDIVISION_DEPTH: u32 = 10;

/// Forced-subdivision threshold, as a fraction of the source world width.
/// A non-wrapping quad of a global source wider than this is split even when
/// its midpoint error is small: a single affine patch across a large part of
/// a world approximates the projection poorly everywhere.
pub const MAX_TRIANGLE_WIDTH_FRAC: f64 = 0.25;

/// Default acceptable midpoint reprojection error, in source units.
pub const DEFAULT_ERROR_THRESHOLD: f64 = 0.5;

/// Triangulate `target_extent` for reprojection from the source projection.
///
/// `fwd` maps source → target coordinates, `inv` target → source; both may
/// return non-finite components outside their domain. `source_domain` bounds
/// the usable source area (leaf quads are clipped against it);
/// `error_threshold` is in source units and `max_depth` caps the recursion.
///
/// The result is best-effort: quads that project entirely outside the source
/// domain simply produce no triangles.
pub fn build_mesh<F, I>(
    target_extent: Extent,
    source_proj: &SourceProjection,
    source_domain: Option<Extent>,
    fwd: F,
    inv: I,
    error_threshold: f64,
    max_depth: u32,
) -> Mesh
where
    F: Fn(f64, f64) -> (f64, f64),
    I: Fn(f64, f64) -> (f64, f64),
{
    assert!(
        error_threshold.is_finite() && error_threshold >= 0.0,
        "error_threshold must be finite and non-negative"
    );
    assert!(!target_extent.is_empty(), "target extent must not be empty");

    let source_world_width = source_proj.world_width();
    let mut builder = Builder {
        fwd: &fwd,
        inv: &inv,
        source_domain,
        source_world_width,
        // the render-time shift distance is the domain width, so wrap
        // handling without a domain could never be drawn
        can_wrap_x: source_proj.can_wrap_x
            && source_world_width.is_some()
            && source_domain.is_some(),
        source_is_global: source_proj.is_global,
        error_threshold_sq: error_threshold * error_threshold,
        triangles: Vec::new(),
        wraps_x: false,
    };

    let [a, b, c, d] = target_extent.corners_cw();
    let a_src = builder.inv_pt(a);
    let b_src = builder.inv_pt(b);
    let c_src = builder.inv_pt(c);
    let d_src = builder.inv_pt(d);
    builder.add_quad(a, b, c, d, a_src, b_src, c_src, d_src, max_depth);

    tracing::debug!(
        triangles = builder.triangles.len(),
        wraps_x = builder.wraps_x,
        "triangulated target extent"
    );

    Mesh {
        triangles: builder.triangles,
        wraps_x: builder.wraps_x,
        source_world_width,
        source_domain,
    }
}

struct Builder<'a, F, I> {
    fwd: &'a F,
    inv: &'a I,
    source_domain: Option<Extent>,
    source_world_width: Option<f64>,
    can_wrap_x: bool,
    source_is_global: bool,
    error_threshold_sq: f64,
    triangles: Vec<Triangle>,
    wraps_x: bool,
}

impl<F, I> Builder<'_, F, I>
where
    F: Fn(f64, f64) -> (f64, f64),
    I: Fn(f64, f64) -> (f64, f64),
{
    fn fwd_pt(&self, p: (f64, f64)) -> (f64, f64) {
        (self.fwd)(p.0, p.1)
    }

    fn inv_pt(&self, p: (f64, f64)) -> (f64, f64) {
        (self.inv)(p.0, p.1)
    }

    /// Refine one quad. Corners run clockwise: `a` top-left, `b` top-right,
    /// `c` bottom-right, `d` bottom-left; `*_src` are their inverse images.
    #[allow(clippy::too_many_arguments)]
    fn add_quad(
        &mut self,
        a: (f64, f64),
        b: (f64, f64),
        c: (f64, f64),
        d: (f64, f64),
        a_src: (f64, f64),
        b_src: (f64, f64),
        c_src: (f64, f64),
        d_src: (f64, f64),
        depth: u32,
    ) {
        let src_corners = [a_src, b_src, c_src, d_src];
        let src_quad_extent = Extent::from_coords(src_corners);
        let src_coverage_x = self
            .source_world_width
            .map(|w| src_quad_extent.width() / w);

        // A seam-straddling quad shows up as one very wide bounding box: a
        // quad within one world copy never exceeds a world width, so the
        // (0.5, 1) coverage band is the wrapped case.
        let wraps_x = self.can_wrap_x
            && matches!(src_coverage_x, Some(cov) if cov > 0.5 && cov < 1.0);

        let mut needs_subdivision = false;
        if depth > 0 && self.source_is_global && !wraps_x {
            if let Some(cov) = src_coverage_x {
                needs_subdivision = cov > MAX_TRIANGLE_WIDTH_FRAC;
            }
        }

        let all_src_finite = src_corners
            .iter()
            .all(|p| p.0.is_finite() && p.1.is_finite());

        if !needs_subdivision {
            if let Some(domain) = self.source_domain {
                // Only a fully finite bounding box can prove the quad lies
                // outside; non-finite corners must reach the clamp-and-clip
                // path below.
                if all_src_finite && !src_quad_extent.intersects(&domain) {
                    return;
                }
            }
        }

        if depth > 0 {
            let center = midpoint(a, c);
            let mut center_src = None;
            if !needs_subdivision {
                let cs = self.inv_pt(center);
                let err_sq = match (wraps_x, self.source_world_width) {
                    (true, Some(w)) => {
                        // difference both in the same world copy
                        let estim_x = src_corners
                            .iter()
                            .map(|p| wrap_x(p.0, w))
                            .sum::<f64>()
                            / 4.0;
                        let estim_y =
                            src_corners.iter().map(|p| p.1).sum::<f64>() / 4.0;
                        let dx = estim_x - wrap_x(cs.0, w);
                        let dy = estim_y - cs.1;
                        dx * dx + dy * dy
                    }
                    _ => {
                        let estim_x =
                            src_corners.iter().map(|p| p.0).sum::<f64>() / 4.0;
                        let estim_y =
                            src_corners.iter().map(|p| p.1).sum::<f64>() / 4.0;
                        let dx = estim_x - cs.0;
                        let dy = estim_y - cs.1;
                        dx * dx + dy * dy
                    }
                };
                center_src = Some(cs);
                needs_subdivision = err_sq > self.error_threshold_sq;
            }

            if needs_subdivision {
                let center_src = center_src.unwrap_or_else(|| self.inv_pt(center));
                let ab = midpoint(a, b);
                let bc = midpoint(b, c);
                let cd = midpoint(c, d);
                let da = midpoint(d, a);
                let ab_src = self.inv_pt(ab);
                let bc_src = self.inv_pt(bc);
                let cd_src = self.inv_pt(cd);
                let da_src = self.inv_pt(da);

                let next = depth - 1;
                // NW, NE, SE, SW; each child keeps the clockwise corner order
                self.add_quad(a, ab, center, da, a_src, ab_src, center_src, da_src, next);
                self.add_quad(ab, b, bc, center, ab_src, b_src, bc_src, center_src, next);
                self.add_quad(center, bc, c, cd, center_src, bc_src, c_src, cd_src, next);
                self.add_quad(da, center, cd, d, da_src, center_src, cd_src, d_src, next);
                return;
            }
        }

        // Leaf. Clip against the source domain when the quad pokes outside it
        // (or has non-finite corners from projection singularities).
        if let Some(domain) = self.source_domain {
            let outside =
                !all_src_finite || !src_corners.iter().all(|&p| domain.contains(p));
            if outside {
                let ring: Vec<(f64, f64)> = src_corners
                    .iter()
                    .map(|&p| domain.clamp_non_finite(p))
                    .collect();
                for tri_src in fan_triangles(&clip_ring(&ring, &domain)) {
                    let tri_tgt = [
                        self.fwd_pt(tri_src[0]),
                        self.fwd_pt(tri_src[1]),
                        self.fwd_pt(tri_src[2]),
                    ];
                    // clipped triangles live inside the domain and never wrap
                    self.add_triangle(tri_tgt, tri_src, false);
                }
                return;
            }
        } else if !all_src_finite {
            // nothing to clamp against; the quad is unusable
            return;
        }

        // Emit along the a–c diagonal; both halves keep the clockwise winding.
        self.add_triangle([a, c, d], [a_src, c_src, d_src], wraps_x);
        self.add_triangle([a, b, c], [a_src, b_src, c_src], wraps_x);
    }

    fn add_triangle(
        &mut self,
        target: [(f64, f64); 3],
        source: [(f64, f64); 3],
        needs_shift: bool,
    ) {
        // a fully collapsed source triangle could only yield a singular affine
        if source[0] == source[1] && source[1] == source[2] {
            return;
        }
        self.wraps_x |= needs_shift;
        self.triangles.push(Triangle {
            source,
            target,
            needs_shift,
        });
    }
}

fn midpoint(p: (f64, f64), q: (f64, f64)) -> (f64, f64) {
    ((p.0 + q.0) / 2.0, (p.1 + q.1) / 2.0)
}
