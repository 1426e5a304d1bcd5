use thiserror::Error;

/// Error type for JWT operations.
///
/// Parse failures are split into `Invalid` (bad signature or malformed token)
/// and `Expired` so callers can react to each. Messages never carry key
/// material.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is invalid")]
    Invalid,

    #[error("Token is expired")]
    Expired,

    #[error("Token validation failed: {0}")]
    Validation(String),
}
