//! Mesh-based raster reprojection.
//!
//! Builds an adaptive triangular mesh over a target extent, each triangle
//! carrying paired source/target vertex coordinates, then resamples source
//! imagery into a destination raster with one affine transform per triangle.
//! Meshing handles source-domain clipping and the dateline seam of wrapping
//! projections; the projection math itself comes in as plain point-transform
//! closures (see [`proj::crs::CrsTransform`]).

use pyo3::prelude::*;

pub mod affine;
pub mod error;
pub mod extent;
pub mod mesh;
pub mod proj;
mod py;
pub mod render;
pub mod resample;
pub mod solver;

/// A Python module implemented in Rust.
#[pymodule]
fn _rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    py::register(m)?;
    Ok(())
}
