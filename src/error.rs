use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjError {
    #[error("Unknown CRS: {0}")]
    UnknownCrs(String),

    #[error("Transform failed: {0}")]
    TransformFailed(String),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Destination shape mismatch: {0}")]
    Shape(String),
}
