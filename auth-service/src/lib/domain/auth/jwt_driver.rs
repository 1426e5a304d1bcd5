use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::errors::AuthError;
use crate::auth::guard::GuardDriver;
use crate::auth::guard::LoginHandler;
use crate::auth::guard::TokenRefresher;
use crate::auth::ports::RefreshSessionStore;
use crate::auth::token_service::TokenService;
use crate::domain::auth::models::AccessToken;
use crate::domain::auth::models::AuthenticatedUser;
use crate::domain::auth::models::RefreshSession;
use crate::domain::auth::models::RefreshSessionId;
use crate::domain::auth::models::Verified;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Bearer JWT access tokens with rotating refresh sessions.
///
/// Offers login and refresh. There is no logout: access tokens stay valid
/// until they expire.
pub struct JwtDriver<RS>
where
    RS: RefreshSessionStore,
{
    tokens: Arc<TokenService<RS>>,
}

impl<RS> JwtDriver<RS>
where
    RS: RefreshSessionStore,
{
    pub fn new(tokens: Arc<TokenService<RS>>) -> Self {
        Self { tokens }
    }

    fn issue(&self, user_id: &UserId, refresh: &RefreshSession) -> Result<AccessToken, AuthError> {
        let now = self.tokens.now();
        let (jwt, expires_at) = self.tokens.sign_jwt(user_id)?;

        Ok(AccessToken::new(jwt, refresh, expires_at, now))
    }
}

#[async_trait]
impl<RS> GuardDriver for JwtDriver<RS>
where
    RS: RefreshSessionStore,
{
    async fn verify(&self, payload: &str) -> Result<Verified, AuthError> {
        let claims = self.tokens.parse_jwt(payload)?;

        let user_id = UserId::from_string(&claims.user_id)
            .map_err(|_| AuthError::JwtSubject(claims.user_id.clone()))?;

        Ok(Verified::new(AuthenticatedUser { user_id }))
    }

    fn as_login(&self) -> Option<&dyn LoginHandler> {
        Some(self)
    }

    fn as_refresher(&self) -> Option<&dyn TokenRefresher> {
        Some(self)
    }
}

#[async_trait]
impl<RS> LoginHandler for JwtDriver<RS>
where
    RS: RefreshSessionStore,
{
    async fn login(&self, user: &User) -> Result<AccessToken, AuthError> {
        let refresh = self.tokens.create_refresh(user.id).await?;

        let token = self.issue(&user.id, &refresh)?;

        tracing::info!(user_id = %user.id, session_id = %refresh.id, "Tokens issued");

        Ok(token)
    }
}

#[async_trait]
impl<RS> TokenRefresher for JwtDriver<RS>
where
    RS: RefreshSessionStore,
{
    async fn refresh_token(&self, refresh_token: &str) -> Result<AccessToken, AuthError> {
        let id = RefreshSessionId::parse(refresh_token).ok_or(AuthError::RefreshTokenInvalid)?;

        let current = self.tokens.get_refresh(&id).await?;
        let next = self.tokens.exchange_refresh(current).await?;

        self.issue(&next.user_id, &next)
    }
}
