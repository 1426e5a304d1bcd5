use std::collections::HashMap;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::auth::errors::AuthError;
use crate::auth::errors::Capability;
use crate::auth::providers::CredentialProvider;
use crate::domain::auth::models::AccessToken;
use crate::domain::auth::models::Credentials;
use crate::domain::auth::models::Verified;
use crate::domain::user::models::User;

/// Token mechanism behind a guard.
///
/// Every driver verifies bearer payloads. Login, logout and refresh are
/// optional: a driver offers one by returning `Some` from the matching
/// accessor.
#[async_trait]
pub trait GuardDriver: Send + Sync + 'static {
    /// Verify a bearer payload and resolve the identity it carries.
    ///
    /// # Errors
    /// * `JwtInvalid` - Payload is malformed or not signed by us
    /// * `JwtExpired` - Payload is past its expiry
    async fn verify(&self, payload: &str) -> Result<Verified, AuthError>;

    fn as_login(&self) -> Option<&dyn LoginHandler> {
        None
    }

    fn as_logout(&self) -> Option<&dyn LogoutHandler> {
        None
    }

    fn as_refresher(&self) -> Option<&dyn TokenRefresher> {
        None
    }
}

/// Issues tokens for an authenticated user.
#[async_trait]
pub trait LoginHandler: Send + Sync {
    async fn login(&self, user: &User) -> Result<AccessToken, AuthError>;
}

/// Ends the session identified by a bearer payload.
#[async_trait]
pub trait LogoutHandler: Send + Sync {
    async fn logout(&self, payload: &str) -> Result<(), AuthError>;
}

/// Exchanges a refresh token for a new token pair.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh_token(&self, refresh_token: &str) -> Result<AccessToken, AuthError>;
}

/// Components of a guard registration. Both must be present.
#[derive(Clone, Default)]
pub struct GuardOption {
    pub driver: Option<Arc<dyn GuardDriver>>,
    pub user_provider: Option<Arc<dyn CredentialProvider>>,
}

impl GuardOption {
    pub fn new(driver: Arc<dyn GuardDriver>, user_provider: Arc<dyn CredentialProvider>) -> Self {
        Self {
            driver: Some(driver),
            user_provider: Some(user_provider),
        }
    }
}

/// A credential provider paired with a token driver.
pub struct Guard {
    name: String,
    driver: Arc<dyn GuardDriver>,
    user_provider: Arc<dyn CredentialProvider>,
}

impl Guard {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve credentials to a user through the guard's provider.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<User, AuthError> {
        self.user_provider.authenticate(credentials).await
    }

    /// Issue tokens for `user`.
    ///
    /// # Errors
    /// * `CapabilityNotSupported` - Driver has no login capability
    pub async fn login(&self, user: &User) -> Result<AccessToken, AuthError> {
        let handler = self
            .driver
            .as_login()
            .ok_or(AuthError::CapabilityNotSupported(Capability::Login))?;

        handler.login(user).await
    }

    /// # Errors
    /// * `CapabilityNotSupported` - Driver has no logout capability
    pub async fn logout(&self, payload: &str) -> Result<(), AuthError> {
        let handler = self
            .driver
            .as_logout()
            .ok_or(AuthError::CapabilityNotSupported(Capability::Logout))?;

        handler.logout(payload).await
    }

    /// Verify a bearer payload.
    pub async fn check(&self, payload: &str) -> Result<Verified, AuthError> {
        self.driver.verify(payload).await
    }

    /// # Errors
    /// * `CapabilityNotSupported` - Driver cannot refresh tokens
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<AccessToken, AuthError> {
        let handler = self
            .driver
            .as_refresher()
            .ok_or(AuthError::CapabilityNotSupported(Capability::RefreshToken))?;

        handler.refresh_token(refresh_token).await
    }
}

#[derive(Default)]
struct RegistryState {
    guards: HashMap<String, Arc<Guard>>,
    default_guard: Option<String>,
}

/// Named guard registry.
///
/// Guards are registered at startup and looked up per request. Lookups clone
/// the guard's `Arc` and release the lock before any await point.
#[derive(Default)]
pub struct AuthRegistry {
    state: RwLock<RegistryState>,
}

impl AuthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a guard under `name`, replacing any guard already there.
    ///
    /// # Errors
    /// * `InvalidGuardOption` - Driver or credential provider is missing
    pub fn extend(&self, name: impl Into<String>, option: GuardOption) -> Result<(), AuthError> {
        let name = name.into();

        let (driver, user_provider) = match (option.driver, option.user_provider) {
            (Some(driver), Some(user_provider)) => (driver, user_provider),
            _ => return Err(AuthError::InvalidGuardOption(name)),
        };

        let guard = Arc::new(Guard {
            name: name.clone(),
            driver,
            user_provider,
        });

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.guards.insert(name.clone(), guard).is_some() {
            tracing::debug!(guard = %name, "Guard replaced");
        } else {
            tracing::debug!(guard = %name, "Guard registered");
        }

        Ok(())
    }

    /// Route the registry-level operations to `name`.
    ///
    /// # Errors
    /// * `GuardNotFound` - No guard registered under `name`
    pub fn set_default_guard(&self, name: &str) -> Result<(), AuthError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if !state.guards.contains_key(name) {
            return Err(AuthError::GuardNotFound(name.to_string()));
        }

        state.default_guard = Some(name.to_string());
        Ok(())
    }

    /// # Errors
    /// * `GuardNotFound` - No guard registered under `name`
    pub fn guard(&self, name: &str) -> Result<Arc<Guard>, AuthError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);

        state
            .guards
            .get(name)
            .cloned()
            .ok_or_else(|| AuthError::GuardNotFound(name.to_string()))
    }

    /// Look up a guard that startup wiring guarantees exists.
    ///
    /// # Panics
    /// Panics if no guard is registered under `name`.
    pub fn must_guard(&self, name: &str) -> Arc<Guard> {
        match self.guard(name) {
            Ok(guard) => guard,
            Err(e) => panic!("{}", e),
        }
    }

    /// The guard selected by `set_default_guard`.
    ///
    /// # Errors
    /// * `GuardNotFound` - No default guard was set
    pub fn default_guard(&self) -> Result<Arc<Guard>, AuthError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);

        let name = state
            .default_guard
            .as_deref()
            .ok_or_else(|| AuthError::GuardNotFound("default".to_string()))?;

        state
            .guards
            .get(name)
            .cloned()
            .ok_or_else(|| AuthError::GuardNotFound(name.to_string()))
    }

    pub async fn authenticate(&self, credentials: &Credentials) -> Result<User, AuthError> {
        self.default_guard()?.authenticate(credentials).await
    }

    pub async fn login(&self, user: &User) -> Result<AccessToken, AuthError> {
        self.default_guard()?.login(user).await
    }

    pub async fn logout(&self, payload: &str) -> Result<(), AuthError> {
        self.default_guard()?.logout(payload).await
    }

    pub async fn check(&self, payload: &str) -> Result<Verified, AuthError> {
        self.default_guard()?.check(payload).await
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> Result<AccessToken, AuthError> {
        self.default_guard()?.refresh_token(refresh_token).await
    }
}
