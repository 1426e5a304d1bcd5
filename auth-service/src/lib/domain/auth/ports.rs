use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::auth::errors::AuthError;
use crate::domain::auth::models::AccessToken;
use crate::domain::auth::models::AuthenticatedUser;
use crate::domain::auth::models::Credentials;
use crate::domain::auth::models::RefreshSession;
use crate::domain::auth::models::RefreshSessionId;

/// Authentication use cases exposed to inbound adapters.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Verify credentials and issue a token pair.
    ///
    /// # Arguments
    /// * `credentials` - Submitted credentials (never persisted)
    ///
    /// # Returns
    /// Access token, refresh token and access token lifetime in seconds
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown user or wrong password
    /// * `InvalidCredentialType` - Credentials do not fit the default guard
    /// * `ProviderNotImplemented` - Credential provider cannot verify yet
    /// * `Database` - Database operation failed
    async fn login(&self, credentials: Credentials) -> Result<AccessToken, AuthError>;

    /// Exchange a refresh token for a new token pair.
    ///
    /// The presented refresh token is burned whether or not issuing the new
    /// pair succeeds.
    ///
    /// # Errors
    /// * `RefreshTokenInvalid` - Token is not a session identifier
    /// * `RefreshSessionNotFound` - No session with this identifier
    /// * `RefreshTokenExpired` - Session is past its expiry
    /// * `RefreshTokenUsed` - Session was already exchanged
    /// * `Database` - Database operation failed
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<AccessToken, AuthError>;

    /// Resolve the identity carried by a bearer access token.
    ///
    /// # Errors
    /// * `JwtInvalid` - Bad signature or malformed token
    /// * `JwtExpired` - Token is past its expiry
    async fn verify_access_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

/// Persistence operations for refresh sessions.
///
/// Only the token service writes through this port.
#[async_trait]
pub trait RefreshSessionStore: Send + Sync + 'static {
    /// Retrieve a session by identifier.
    ///
    /// # Errors
    /// * `RefreshSessionNotFound` - No session with this identifier
    /// * `Database` - Database operation failed
    async fn get(&self, id: &RefreshSessionId) -> Result<RefreshSession, AuthError>;

    /// Persist a new session.
    ///
    /// # Returns
    /// The stored record (the store may normalise timestamps)
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn insert(&self, session: RefreshSession) -> Result<RefreshSession, AuthError>;

    /// Persist changes to an existing session.
    ///
    /// Implementations never overwrite a row that is already used, so the
    /// used flag cannot be reverted and a concurrent second exchange loses.
    ///
    /// # Errors
    /// * `RefreshTokenUsed` - Stored session is already used
    /// * `RefreshSessionNotFound` - No session with this identifier
    /// * `Database` - Database operation failed
    async fn update(&self, session: RefreshSession) -> Result<(), AuthError>;
}

/// Source of the current instant.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
