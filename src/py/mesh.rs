//! PyO3 binding for mesh construction (inspection, debug overlays).

use ndarray::{Array1, Array3};
use numpy::{PyArray1, PyArray3};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::extent::Extent;
use crate::mesh::triangulator::{self, DEFAULT_ERROR_THRESHOLD, MAX_SUBDIVISION_DEPTH};
use crate::proj::crs::CrsTransform;
use crate::proj::SourceProjection;

/// Triangulate a target extent for reprojection from `src_crs` to `dst_crs`.
///
/// Args:
///     target_extent: Target extent as (min_x, min_y, max_x, max_y).
///     src_crs: Source CRS string (e.g. "EPSG:4326" or a PROJ string).
///     dst_crs: Destination CRS string.
///     source_extent: Optional source clip extent (min_x, min_y, max_x, max_y);
///         defaults to the source projection's valid extent when recognized.
///     error_threshold: Acceptable midpoint reprojection error in source units.
///     max_depth: Subdivision depth ceiling.
///
/// Returns:
///     Tuple of (source, target, needs_shift, wraps_x) where source and
///     target are (n, 3, 2) f64 vertex arrays, needs_shift is an (n,) bool
///     array, and wraps_x flags a mesh straddling the source seam.
#[pyfunction]
#[pyo3(signature = (target_extent, src_crs, dst_crs, source_extent=None, error_threshold=DEFAULT_ERROR_THRESHOLD, max_depth=MAX_SUBDIVISION_DEPTH))]
#[allow(clippy::type_complexity)]
pub fn build_mesh<'py>(
    py: Python<'py>,
    target_extent: [f64; 4],
    src_crs: &str,
    dst_crs: &str,
    source_extent: Option<[f64; 4]>,
    error_threshold: f64,
    max_depth: u32,
) -> PyResult<(
    Bound<'py, PyArray3<f64>>,
    Bound<'py, PyArray3<f64>>,
    Bound<'py, PyArray1<bool>>,
    bool,
)> {
    // Copy strings to owned before releasing the GIL
    let src_crs = src_crs.to_string();
    let dst_crs = dst_crs.to_string();

    let mesh = py.allow_threads(move || -> PyResult<crate::mesh::Mesh> {
        let fwd = CrsTransform::new(&src_crs, &dst_crs)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        let inv = CrsTransform::new(&dst_crs, &src_crs)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;

        let source_proj = SourceProjection::from_crs(&src_crs);
        let source_domain = source_extent
            .map(|e| Extent::new(e[0], e[1], e[2], e[3]))
            .or(source_proj.extent);

        Ok(triangulator::build_mesh(
            Extent::new(
                target_extent[0],
                target_extent[1],
                target_extent[2],
                target_extent[3],
            ),
            &source_proj,
            source_domain,
            fwd.point_fn(),
            inv.point_fn(),
            error_threshold,
            max_depth,
        ))
    })?;

    let n = mesh.len();
    let mut source = Array3::zeros((n, 3, 2));
    let mut target = Array3::zeros((n, 3, 2));
    let mut needs_shift = Array1::from_elem(n, false);
    for (i, t) in mesh.triangles.iter().enumerate() {
        for v in 0..3 {
            source[(i, v, 0)] = t.source[v].0;
            source[(i, v, 1)] = t.source[v].1;
            target[(i, v, 0)] = t.target[v].0;
            target[(i, v, 1)] = t.target[v].1;
        }
        needs_shift[i] = t.needs_shift;
    }

    Ok((
        PyArray3::from_owned_array(py, source),
        PyArray3::from_owned_array(py, target),
        PyArray1::from_owned_array(py, needs_shift),
        mesh.wraps_x,
    ))
}
