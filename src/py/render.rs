//! PyO3 binding for mesh-based reprojection of a source tile.

use ndarray::Array2;
use numpy::{PyArray2, PyReadonlyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::extent::Extent;
use crate::mesh::triangulator::{self, DEFAULT_ERROR_THRESHOLD, MAX_SUBDIVISION_DEPTH};
use crate::proj::crs::CrsTransform;
use crate::proj::SourceProjection;
use crate::render::{self, RenderOptions, SourceImage};
use crate::resample::ResamplingMethod;

/// Reproject a 2D f64 array through an adaptive triangle mesh.
///
/// Args:
///     src: Input 2D array (f64). For f32 data, cast to f64 on the Python side.
///     src_crs: Source CRS string (e.g. "EPSG:4326" or a PROJ string).
///     src_extent: Source tile extent as (min_x, min_y, max_x, max_y).
///     src_resolution: Source units per pixel.
///     dst_crs: Destination CRS string.
///     dst_extent: Destination extent as (min_x, min_y, max_x, max_y).
///     dst_resolution: Destination units per pixel.
///     error_threshold: Acceptable midpoint reprojection error in source units.
///     max_depth: Subdivision depth ceiling.
///     resampling: Resampling method name ("nearest" or "bilinear").
///     nodata: Optional nodata value; unset pixels come back as NaN.
///
/// Returns:
///     Reprojected 2D array of shape
///     (ceil(dst_height / dst_resolution) + 1, ceil(dst_width / dst_resolution) + 1).
#[pyfunction]
#[pyo3(signature = (src, src_crs, src_extent, src_resolution, dst_crs, dst_extent, dst_resolution, error_threshold=DEFAULT_ERROR_THRESHOLD, max_depth=MAX_SUBDIVISION_DEPTH, resampling="bilinear", nodata=None))]
#[allow(clippy::too_many_arguments)]
pub fn reproject_mesh<'py>(
    py: Python<'py>,
    src: PyReadonlyArray2<'py, f64>,
    src_crs: &str,
    src_extent: [f64; 4],
    src_resolution: f64,
    dst_crs: &str,
    dst_extent: [f64; 4],
    dst_resolution: f64,
    error_threshold: f64,
    max_depth: u32,
    resampling: &str,
    nodata: Option<f64>,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let method = ResamplingMethod::from_name(resampling)
        .ok_or_else(|| PyValueError::new_err(format!("Unknown resampling method: {resampling}")))?;

    // Copy to owned before releasing the GIL
    let src_crs = src_crs.to_string();
    let dst_crs = dst_crs.to_string();
    let src_array: Array2<f64> = src.as_array().to_owned();

    let result: Array2<f64> = py.allow_threads(move || -> PyResult<Array2<f64>> {
        let fwd = CrsTransform::new(&src_crs, &dst_crs)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        let inv = CrsTransform::new(&dst_crs, &src_crs)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;

        let source_proj = SourceProjection::from_crs(&src_crs);
        let source_extent = Extent::new(src_extent[0], src_extent[1], src_extent[2], src_extent[3]);
        let target_extent = Extent::new(dst_extent[0], dst_extent[1], dst_extent[2], dst_extent[3]);
        let source_domain = source_proj.extent.or(Some(source_extent));

        let mesh = triangulator::build_mesh(
            target_extent,
            &source_proj,
            source_domain,
            fwd.point_fn(),
            inv.point_fn(),
            error_threshold,
            max_depth,
        );

        let fill = nodata.unwrap_or(f64::NAN);
        let mut dst = Array2::from_elem(render::dest_shape(&target_extent, dst_resolution), fill);

        let sources = [SourceImage {
            extent: source_extent,
            data: src_array.view(),
        }];
        let options = RenderOptions {
            method,
            nodata,
            debug_edges: None,
        };
        render::render(
            &mut dst,
            &mesh,
            src_resolution,
            source_domain,
            target_extent,
            dst_resolution,
            &sources,
            &options,
        )
        .map_err(|e| PyValueError::new_err(e.to_string()))?;

        Ok(dst)
    })?;

    Ok(PyArray2::from_owned_array(py, result))
}
