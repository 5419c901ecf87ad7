use modaics_client::ApiError;
use thiserror::Error;

/// Failures raised by a single inference adapter.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdapterError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Model not initialized: {0}")]
    ModelNotInitialized(String),

    #[error("No results from {0}")]
    NoResults(String),

    /// Opaque failure inside the model capability
    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Failures surfaced by the classifiers.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Image encoding failed: {0}")]
    ImageEncodingFailed(String),

    #[error("Server error ({status})")]
    ServerError { status: u16 },

    #[error("Network error: {0}")]
    Network(ApiError),
}

impl From<ApiError> for PipelineError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::ServerError { status } => Self::ServerError { status },
            other => Self::Network(other),
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
