use thiserror::Error;

/// Network-level failures surfaced by [`crate::ApiClient`].
///
/// Retry exhaustion returns the last observed failure, so a caller always
/// sees the concrete cause (`ServerError` or `Transport`) rather than a
/// generic "gave up" error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("Client error ({status}): {message}")]
    ClientError { message: String, status: u16 },

    #[error("Server error ({status})")]
    ServerError { status: u16 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ApiError {
    /// 5xx and transport failures are eligible for backoff + retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServerError { .. } | Self::Transport(_))
    }

    /// HTTP status associated with the error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Forbidden => Some(403),
            Self::NotFound => Some(404),
            Self::ClientError { status, .. } | Self::ServerError { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::DecodingError(err.to_string())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
