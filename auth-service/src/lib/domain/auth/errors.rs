use std::fmt;

use auth::JwtError;
use auth::PasswordError;
use thiserror::Error;

use crate::domain::auth::models::ProviderKind;

/// Optional guard operations a driver may or may not offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Login,
    Logout,
    RefreshToken,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Login => f.write_str("login"),
            Capability::Logout => f.write_str("logout"),
            Capability::RefreshToken => f.write_str("refresh token"),
        }
    }
}

/// Errors raised by credential verification, token issuance and rotation.
///
/// Each kind stays distinguishable internally; the login use case folds
/// `UserNotFound` and `PasswordIncorrect` into `InvalidCredentials` before
/// anything reaches a client.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Credential verification
    #[error("User not found")]
    UserNotFound,

    #[error("Password incorrect")]
    PasswordIncorrect,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid credential type: expected {expected}, got {actual}")]
    InvalidCredentialType {
        expected: ProviderKind,
        actual: ProviderKind,
    },

    #[error("Authentication provider not implemented: {0}")]
    ProviderNotImplemented(ProviderKind),

    // Access tokens
    #[error("Access token is invalid")]
    JwtInvalid,

    #[error("Access token is expired")]
    JwtExpired,

    #[error("Access token subject is not a user ID: {0}")]
    JwtSubject(String),

    // Refresh sessions
    #[error("Refresh session not found")]
    RefreshSessionNotFound,

    #[error("Refresh token is expired")]
    RefreshTokenExpired,

    #[error("Refresh token is already used")]
    RefreshTokenUsed,

    #[error("Refresh token is malformed")]
    RefreshTokenInvalid,

    // Guard registry
    #[error("Guard '{0}' not found")]
    GuardNotFound(String),

    #[error("Guard '{0}' requires both a driver and a credential provider")]
    InvalidGuardOption(String),

    #[error("Guard does not support {0}")]
    CapabilityNotSupported(Capability),

    // Infrastructure errors
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AuthError {
    /// Prefix infrastructure error messages with the failing step.
    ///
    /// Domain kinds pass through untouched so callers can still match them.
    pub fn context(self, context: &str) -> Self {
        match self {
            AuthError::Database(msg) => AuthError::Database(format!("{}: {}", context, msg)),
            AuthError::Jwt(msg) => AuthError::Jwt(format!("{}: {}", context, msg)),
            AuthError::Unknown(msg) => AuthError::Unknown(format!("{}: {}", context, msg)),
            other => other,
        }
    }

    /// True for the kinds a refresh request is rejected with as a client error.
    pub fn is_refresh_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::RefreshSessionNotFound
                | AuthError::RefreshTokenExpired
                | AuthError::RefreshTokenUsed
                | AuthError::RefreshTokenInvalid
        )
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Invalid => AuthError::JwtInvalid,
            JwtError::Expired => AuthError::JwtExpired,
            other => AuthError::Jwt(other.to_string()),
        }
    }
}
