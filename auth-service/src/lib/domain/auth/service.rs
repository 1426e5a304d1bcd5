use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::errors::AuthError;
use crate::auth::guard::AuthRegistry;
use crate::auth::ports::AuthServicePort;
use crate::domain::auth::models::AccessToken;
use crate::domain::auth::models::AuthenticatedUser;
use crate::domain::auth::models::Credentials;

/// Login, refresh and bearer verification over the default guard.
pub struct AuthService {
    registry: Arc<AuthRegistry>,
}

impl AuthService {
    /// Create a new auth service.
    ///
    /// # Arguments
    /// * `registry` - Guard registry with a default guard already selected
    pub fn new(registry: Arc<AuthRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl AuthServicePort for AuthService {
    async fn login(&self, credentials: Credentials) -> Result<AccessToken, AuthError> {
        let kind = credentials.kind();

        let user = self
            .registry
            .authenticate(&credentials)
            .await
            .map_err(|e| match e {
                AuthError::UserNotFound | AuthError::PasswordIncorrect => {
                    tracing::info!(provider = %kind, reason = %e, "Login rejected");
                    AuthError::InvalidCredentials
                }
                other => other,
            })?;

        self.registry.login(&user).await.map_err(|e| {
            tracing::error!(user_id = %user.id, error = %e, "Failed to issue tokens");
            e
        })
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<AccessToken, AuthError> {
        self.registry
            .refresh_token(refresh_token)
            .await
            .map_err(|e| {
                if e.is_refresh_rejection() {
                    tracing::info!(reason = %e, "Refresh rejected");
                } else {
                    tracing::error!(error = %e, "Failed to refresh access token");
                }
                e
            })
    }

    async fn verify_access_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let verified = self.registry.check(token).await?;

        Ok(verified.user)
    }
}
