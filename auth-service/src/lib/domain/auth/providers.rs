use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;

use crate::auth::errors::AuthError;
use crate::domain::auth::models::Credentials;
use crate::domain::auth::models::GoogleCredentials;
use crate::domain::auth::models::PasswordCredentials;
use crate::domain::auth::models::ProviderKind;
use crate::domain::user::models::User;
use crate::user::errors::UserError;
use crate::user::ports::UserLookup;

/// Resolves submitted credentials to a user identity.
#[async_trait]
pub trait CredentialProvider: Send + Sync + 'static {
    /// Credential shape this provider accepts.
    fn kind(&self) -> ProviderKind;

    /// Verify credentials and return the matching user.
    ///
    /// # Errors
    /// * `UserNotFound` - No user matches the credentials
    /// * `PasswordIncorrect` - Secret does not match
    /// * `InvalidCredentialType` - Credentials belong to another provider
    /// * `ProviderNotImplemented` - Provider cannot verify anything yet
    async fn authenticate(&self, credentials: &Credentials) -> Result<User, AuthError>;
}

/// Email and password authentication against stored Argon2 hashes.
pub struct PasswordProvider<UL>
where
    UL: UserLookup,
{
    users: Arc<UL>,
    hasher: PasswordHasher,
}

impl<UL> PasswordProvider<UL>
where
    UL: UserLookup,
{
    pub fn new(users: Arc<UL>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    async fn verify(&self, credentials: &PasswordCredentials) -> Result<User, AuthError> {
        let user = self
            .users
            .find_by_email(&credentials.email)
            .await
            .map_err(|e| match e {
                UserError::NotFoundByEmail(_) | UserError::NotFound(_) => AuthError::UserNotFound,
                UserError::DatabaseError(msg) => {
                    AuthError::Database(msg).context("get user by email")
                }
                other => AuthError::Unknown(other.to_string()).context("get user by email"),
            })?;

        let hasher = self.hasher.clone();
        let password = credentials.password.clone();
        let hash = user.password_hash.clone();

        let matches = tokio::task::spawn_blocking(move || hasher.check(&password, &hash))
            .await
            .map_err(|e| AuthError::Unknown(e.to_string()).context("check password"))??;

        if !matches {
            return Err(AuthError::PasswordIncorrect);
        }

        Ok(user)
    }
}

#[async_trait]
impl<UL> CredentialProvider for PasswordProvider<UL>
where
    UL: UserLookup,
{
    fn kind(&self) -> ProviderKind {
        ProviderKind::Password
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<User, AuthError> {
        match credentials {
            Credentials::Password(password) => self.verify(password).await,
            other => Err(AuthError::InvalidCredentialType {
                expected: ProviderKind::Password,
                actual: other.kind(),
            }),
        }
    }
}

/// Google sign-in. Recognises Google credentials but cannot verify them yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleProvider;

impl GoogleProvider {
    pub fn new() -> Self {
        Self
    }

    fn verify(&self, _credentials: &GoogleCredentials) -> Result<User, AuthError> {
        Err(AuthError::ProviderNotImplemented(ProviderKind::Google))
    }
}

#[async_trait]
impl CredentialProvider for GoogleProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<User, AuthError> {
        match credentials {
            Credentials::Google(google) => self.verify(google),
            other => Err(AuthError::InvalidCredentialType {
                expected: ProviderKind::Google,
                actual: other.kind(),
            }),
        }
    }
}
