use std::sync::Arc;

use auth::AccessClaims;
use auth::JwtSigner;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::auth::errors::AuthError;
use crate::auth::ports::Clock;
use crate::auth::ports::RefreshSessionStore;
use crate::auth::ports::SystemClock;
use crate::domain::auth::models::RefreshSession;
use crate::domain::auth::models::RefreshSessionId;
use crate::domain::user::models::UserId;

/// Issues access tokens and owns the refresh-session lifecycle.
///
/// Refresh sessions are only ever created and flipped to used here.
pub struct TokenService<RS>
where
    RS: RefreshSessionStore,
{
    signer: JwtSigner,
    store: Arc<RS>,
    clock: Arc<dyn Clock>,
    refresh_ttl: Duration,
}

impl<RS> TokenService<RS>
where
    RS: RefreshSessionStore,
{
    /// Default lifetime of a refresh session.
    pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

    /// Create a token service backed by the wall clock.
    ///
    /// # Arguments
    /// * `signer` - Access token signer
    /// * `store` - Refresh session persistence
    /// * `refresh_ttl` - Lifetime of newly created refresh sessions
    pub fn new(signer: JwtSigner, store: Arc<RS>, refresh_ttl: Duration) -> Self {
        Self {
            signer,
            store,
            clock: Arc::new(SystemClock),
            refresh_ttl,
        }
    }

    /// Replace the clock used for issuance and expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Sign an access token for `user_id`.
    ///
    /// # Returns
    /// Signed token and its expiration instant
    ///
    /// # Errors
    /// * `Jwt` - Token encoding failed
    pub fn sign_jwt(&self, user_id: &UserId) -> Result<(String, DateTime<Utc>), AuthError> {
        self.signer
            .sign_at(user_id, self.clock.now())
            .map_err(|e| AuthError::from(e).context("sign jwt"))
    }

    /// Verify and decode an access token.
    ///
    /// # Errors
    /// * `JwtInvalid` - Bad signature or malformed token
    /// * `JwtExpired` - Token is past its expiry
    /// * `Jwt` - Any other validation failure
    pub fn parse_jwt(&self, token: &str) -> Result<AccessClaims, AuthError> {
        self.signer.parse(token).map_err(AuthError::from)
    }

    /// Create and persist a new, unused refresh session for `user_id`.
    ///
    /// # Errors
    /// * `Database` - Insert failed
    pub async fn create_refresh(&self, user_id: UserId) -> Result<RefreshSession, AuthError> {
        let session = RefreshSession::issue(user_id, self.clock.now(), self.refresh_ttl);

        let stored = self
            .store
            .insert(session)
            .await
            .map_err(|e| e.context("create refresh session"))?;

        tracing::debug!(
            session_id = %stored.id,
            user_id = %stored.user_id,
            expires_at = %stored.expires_at,
            "Refresh session created"
        );

        Ok(stored)
    }

    /// Fetch a refresh session.
    ///
    /// # Errors
    /// * `RefreshSessionNotFound` - Unknown identifier
    /// * `Database` - Query failed
    pub async fn get_refresh(&self, id: &RefreshSessionId) -> Result<RefreshSession, AuthError> {
        self.store
            .get(id)
            .await
            .map_err(|e| e.context("get refresh session"))
    }

    /// Rotate a refresh session: burn `current` and mint its successor.
    ///
    /// The used flag is persisted before the successor is inserted. If the
    /// insert fails the old session stays burned and the error is returned.
    ///
    /// # Errors
    /// * `RefreshTokenExpired` - `current` is past its expiry
    /// * `RefreshTokenUsed` - `current` was already exchanged
    /// * `Database` - Update or insert failed
    pub async fn exchange_refresh(
        &self,
        mut current: RefreshSession,
    ) -> Result<RefreshSession, AuthError> {
        if current.is_expired(self.clock.now()) {
            tracing::info!(
                session_id = %current.id,
                user_id = %current.user_id,
                "Rejected expired refresh session"
            );
            return Err(AuthError::RefreshTokenExpired);
        }

        if current.used {
            tracing::warn!(
                session_id = %current.id,
                user_id = %current.user_id,
                "Refresh session reused, possible token replay"
            );
            return Err(AuthError::RefreshTokenUsed);
        }

        current.used = true;
        let user_id = current.user_id;
        let session_id = current.id;

        self.store.update(current).await.map_err(|e| {
            if matches!(e, AuthError::RefreshTokenUsed) {
                tracing::warn!(
                    session_id = %session_id,
                    user_id = %user_id,
                    "Refresh session exchanged concurrently, possible token replay"
                );
            }
            e.context("update refresh session")
        })?;

        let next = self.create_refresh(user_id).await.map_err(|e| {
            tracing::error!(
                session_id = %session_id,
                user_id = %user_id,
                error = %e,
                "Refresh session burned but successor could not be created"
            );
            e.context("create refresh token")
        })?;

        tracing::info!(
            previous_session_id = %session_id,
            session_id = %next.id,
            user_id = %user_id,
            "Refresh session rotated"
        );

        Ok(next)
    }
}
