/// Validation failures raised while shaping a request.
/// Everything here maps to a 400 at the HTTP layer.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("unknown group key: {0}")]
    UnknownGroupKey(String),
}
