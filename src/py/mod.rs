use pyo3::prelude::*;

mod mesh;
mod render;

/// Register all Python-visible functions and types.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(mesh::build_mesh, m)?)?;
    m.add_function(wrap_pyfunction!(render::reproject_mesh, m)?)?;
    Ok(())
}

/// Crate version, to verify the extension loads.
#[pyfunction]
fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
