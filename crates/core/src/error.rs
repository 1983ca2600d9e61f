#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown job: {0}")]
    UnknownJob(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}
