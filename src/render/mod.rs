//! Per-triangle affine rasterization of a mesh.
//!
//! Each mesh triangle gets one affine transform from source coordinates to
//! destination pixels, solved from its three vertex pairs. The destination is
//! clipped to the (slightly enlarged) triangle and every source tile is
//! composited through the inverted transform chain. Planning the per-triangle
//! state is pure and runs in parallel; compositing into the single
//! destination buffer is sequential.

use ndarray::{Array2, ArrayView2};
use num_traits::NumCast;
use rayon::prelude::*;

use crate::affine::Affine;
use crate::error::RenderError;
use crate::extent::{wrap_x, Extent};
use crate::mesh::clip::cross;
use crate::mesh::{Mesh, Triangle};
use crate::resample::{self, ResamplingMethod};
use crate::solver;

/// A source tile: pixel data plus its footprint in source coordinates,
/// sampled at the render call's source resolution.
#[derive(Clone)]
pub struct SourceImage<'a, T> {
    pub extent: Extent,
    pub data: ArrayView2<'a, T>,
}

/// Rendering knobs.
pub struct RenderOptions<T> {
    pub method: ResamplingMethod,
    /// Source samples equal to this value leave the destination untouched.
    pub nodata: Option<T>,
    /// When set, triangle outlines are painted with this value after
    /// compositing (debug overlay).
    pub debug_edges: Option<T>,
}

impl<T> Default for RenderOptions<T> {
    fn default() -> Self {
        Self {
            method: ResamplingMethod::Bilinear,
            nodata: None,
            debug_edges: None,
        }
    }
}

/// Destination raster shape for a target extent and resolution:
/// `(rows, cols) = (ceil(h / res) + 1, ceil(w / res) + 1)`.
pub fn dest_shape(target_extent: &Extent, target_resolution: f64) -> (usize, usize) {
    let cols = (target_extent.width() / target_resolution).ceil() as usize + 1;
    let rows = (target_extent.height() / target_resolution).ceil() as usize + 1;
    (rows, cols)
}

/// Everything needed to composite one triangle, planned ahead of time.
struct TrianglePatch {
    /// Local (shifted) source units → destination pixels.
    affine: Affine,
    /// Numerical-stability shift: vertex 0's source coordinates, taken after
    /// the wrap modulo so triangle-local coordinates and tile translations
    /// live in the same world frame.
    src_shift: (f64, f64),
    needs_shift: bool,
    /// Triangle vertices in destination pixel space.
    verts: [(f64, f64); 3],
    /// Clip triangle: `verts` displaced away from the centroid.
    clip: [(f64, f64); 3],
    /// Destination row/col bounds (start inclusive, end exclusive).
    rows: (usize, usize),
    cols: (usize, usize),
}

/// Composite `sources` into `dst` through the mesh.
///
/// `dst` must have the shape [`dest_shape`] derives from `target_extent` and
/// `target_resolution`. `source_domain` drives the wrap shift for meshes that
/// straddle the source seam (`shift_distance` = domain width, tiles west of
/// the domain center get re-aligned by one width). Pixels covered by no
/// triangle or no source keep their prior value.
#[allow(clippy::too_many_arguments)]
pub fn render<T>(
    dst: &mut Array2<T>,
    mesh: &Mesh,
    source_resolution: f64,
    source_domain: Option<Extent>,
    target_extent: Extent,
    target_resolution: f64,
    sources: &[SourceImage<'_, T>],
    options: &RenderOptions<T>,
) -> Result<(), RenderError>
where
    T: Copy + NumCast + PartialEq + Send + Sync,
{
    let expected = dest_shape(&target_extent, target_resolution);
    if dst.dim() != expected {
        return Err(RenderError::Shape(format!(
            "destination is {:?}, target extent at resolution {target_resolution} needs {expected:?}",
            dst.dim()
        )));
    }

    let shift_distance = source_domain.map(|d| d.width());
    let shift_threshold = source_domain.map(|d| d.center_x());
    let target_tl = target_extent.top_left();

    let patches: Vec<Option<TrianglePatch>> = mesh
        .triangles
        .par_iter()
        .map(|t| {
            plan_triangle(
                t,
                shift_distance,
                target_tl,
                target_resolution,
                source_resolution,
                expected,
            )
        })
        .collect();

    for patch in patches.iter().flatten() {
        composite_patch(
            dst,
            patch,
            sources,
            source_resolution,
            shift_distance,
            shift_threshold,
            options,
        );
    }

    if let Some(edge) = options.debug_edges {
        for patch in patches.iter().flatten() {
            stroke_triangle(dst, &patch.verts, edge);
        }
    }

    Ok(())
}

/// Solve the per-triangle state: wrap shift, destination-pixel vertices,
/// affine coefficients, enlarged clip region, raster bounds.
fn plan_triangle(
    triangle: &Triangle,
    shift_distance: Option<f64>,
    target_tl: (f64, f64),
    target_resolution: f64,
    source_resolution: f64,
    (rows, cols): (usize, usize),
) -> Option<TrianglePatch> {
    let mut src = triangle.source;
    if triangle.needs_shift {
        if let Some(d) = shift_distance {
            // bring all three vertices into a single world copy
            for p in &mut src {
                p.0 = wrap_x(p.0, d);
            }
        }
    }

    // destination pixel coordinates, y flipped (row 0 is the top)
    let mut verts = [(0.0, 0.0); 3];
    for (uv, tgt) in verts.iter_mut().zip(triangle.target.iter()) {
        *uv = (
            (tgt.0 - target_tl.0) / target_resolution,
            -(tgt.1 - target_tl.1) / target_resolution,
        );
    }

    // shift source vertices against vertex 0 for numerical stability
    let src_shift = src[0];
    for p in &mut src {
        p.0 -= src_shift.0;
        p.1 -= src_shift.1;
    }

    // u = a00·x + a01·y + a02, v = a10·x + a11·y + a12 at the three vertices
    let mut aug = Array2::zeros((6, 7));
    for i in 0..3 {
        aug[(i, 0)] = src[i].0;
        aug[(i, 1)] = src[i].1;
        aug[(i, 2)] = 1.0;
        aug[(i, 6)] = verts[i].0;
        aug[(i + 3, 3)] = src[i].0;
        aug[(i + 3, 4)] = src[i].1;
        aug[(i + 3, 5)] = 1.0;
        aug[(i + 3, 6)] = verts[i].1;
    }
    let Some(k) = solver::solve(aug) else {
        tracing::trace!("skipping triangle with a singular affine system");
        return None;
    };
    let affine = Affine::new(k[0], k[1], k[2], k[3], k[4], k[5]);

    // Enlarge away from the centroid so neighbouring triangles overlap by
    // about one source pixel, hiding background cracks along shared edges.
    let grow = source_resolution / target_resolution;
    let cx = (verts[0].0 + verts[1].0 + verts[2].0) / 3.0;
    let cy = (verts[0].1 + verts[1].1 + verts[2].1) / 3.0;
    let mut clip = verts;
    for p in &mut clip {
        let dx = p.0 - cx;
        let dy = p.1 - cy;
        let len = (dx * dx + dy * dy).sqrt();
        if len > 0.0 {
            p.0 += grow * dx / len;
            p.1 += grow * dy / len;
        }
    }

    // raster bounds of the clip triangle
    let min_x = clip.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max_x = clip.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let min_y = clip.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max_y = clip.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

    let col0 = min_x.floor().max(0.0) as usize;
    let row0 = min_y.floor().max(0.0) as usize;
    let col1 = ((max_x.ceil() as isize) + 1).clamp(0, cols as isize) as usize;
    let row1 = ((max_y.ceil() as isize) + 1).clamp(0, rows as isize) as usize;
    if col1 <= col0 || row1 <= row0 {
        return None;
    }

    Some(TrianglePatch {
        affine,
        src_shift,
        needs_shift: triangle.needs_shift,
        verts,
        clip,
        rows: (row0, row1),
        cols: (col0, col1),
    })
}

/// Composite every source tile into the patch's clip region.
fn composite_patch<T>(
    dst: &mut Array2<T>,
    patch: &TrianglePatch,
    sources: &[SourceImage<'_, T>],
    source_resolution: f64,
    shift_distance: Option<f64>,
    shift_threshold: Option<f64>,
    options: &RenderOptions<T>,
) where
    T: Copy + NumCast + PartialEq,
{
    for source in sources {
        let mut tx = source.extent.min_x - patch.src_shift.0;
        if patch.needs_shift {
            // a tile from the far side of the seam must be re-aligned with
            // the modulo-reduced triangle
            if let (Some(d), Some(threshold)) = (shift_distance, shift_threshold) {
                if source.extent.min_x < threshold {
                    tx += d;
                }
            }
        }
        let ty = source.extent.max_y - patch.src_shift.1;

        // tile pixels → local source units → destination pixels, inverted
        // once and evaluated per destination pixel
        let chain = patch
            .affine
            .pre_translate(tx, ty)
            .pre_scale(source_resolution, -source_resolution);
        let Some(to_tile) = chain.inverse() else {
            continue;
        };

        let (h, w) = source.data.dim();
        let (wf, hf) = (w as f64, h as f64);

        for row in patch.rows.0..patch.rows.1 {
            for col in patch.cols.0..patch.cols.1 {
                let p = (col as f64, row as f64);
                if !covered(p, &patch.clip) {
                    continue;
                }
                let (qx, qy) = to_tile.forward(p.0, p.1);
                // half a pixel of tolerance on every side; the kernels clamp
                // onto the border texels, so tile seams close instead of
                // cracking
                if qx < -0.5 || qx > wf + 0.5 || qy < -0.5 || qy > hf + 0.5 {
                    continue;
                }
                if let Some(v) = match options.method {
                    ResamplingMethod::Nearest => {
                        resample::nearest::sample(&source.data, qx, qy, options.nodata)
                    }
                    ResamplingMethod::Bilinear => {
                        resample::bilinear::sample(&source.data, qx, qy, options.nodata)
                    }
                } {
                    dst[(row, col)] = v;
                }
            }
        }
    }
}

/// Point-in-triangle test that accepts boundary points and either winding.
fn covered(p: (f64, f64), tri: &[(f64, f64); 3]) -> bool {
    let d0 = cross(tri[0], tri[1], p);
    let d1 = cross(tri[1], tri[2], p);
    let d2 = cross(tri[2], tri[0], p);
    let has_neg = d0 < 0.0 || d1 < 0.0 || d2 < 0.0;
    let has_pos = d0 > 0.0 || d1 > 0.0 || d2 > 0.0;
    !(has_neg && has_pos)
}

/// Paint the triangle outline into the destination (debug overlay).
fn stroke_triangle<T: Copy>(dst: &mut Array2<T>, verts: &[(f64, f64); 3], value: T) {
    let (rows, cols) = dst.dim();
    for i in 0..3 {
        let (x0, y0) = verts[i];
        let (x1, y1) = verts[(i + 1) % 3];
        let steps = ((x1 - x0).abs().max((y1 - y0).abs()).ceil() as usize).max(1);
        for s in 0..=steps {
            let t = s as f64 / steps as f64;
            let col = (x0 + (x1 - x0) * t).round();
            let row = (y0 + (y1 - y0) * t).round();
            if col >= 0.0 && row >= 0.0 && (col as usize) < cols && (row as usize) < rows {
                dst[(row as usize, col as usize)] = value;
            }
        }
    }
}
