use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UserId;

/// Refresh session identifier; its string form is the refresh token handed
/// to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefreshSessionId(pub Uuid);

impl RefreshSessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a refresh token string.
    ///
    /// Returns `None` when the string is not a UUID.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(RefreshSessionId)
    }
}

impl Default for RefreshSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RefreshSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Server-tracked, single-use refresh credential.
///
/// `used` only ever goes from false to true. Expiry is logical: rows are
/// never deleted when they lapse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSession {
    pub id: RefreshSessionId,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshSession {
    /// Build a fresh, unused session for `user_id` valid for `ttl` from `now`.
    pub fn issue(user_id: UserId, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: RefreshSessionId::new(),
            user_id,
            expires_at: now + ttl,
            used: false,
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Token pair returned by login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

impl AccessToken {
    /// Assemble the response for a freshly signed JWT and refresh session.
    ///
    /// `expires_in` counts whole seconds from `now` until the JWT expires.
    pub fn new(
        jwt: String,
        refresh: &RefreshSession,
        jwt_expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: jwt,
            refresh_token: refresh.id.to_string(),
            expires_in: (jwt_expires_at - now).num_seconds().max(0),
        }
    }
}

/// Discriminator of the credential providers this service knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Password,
    Google,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Password => f.write_str("password"),
            ProviderKind::Google => f.write_str("google"),
        }
    }
}

/// Email and plaintext password submitted at login.
#[derive(Clone)]
pub struct PasswordCredentials {
    pub email: EmailAddress,
    pub password: String,
}

impl fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity token issued by Google sign-in.
#[derive(Clone)]
pub struct GoogleCredentials {
    pub id_token: String,
}

impl fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleCredentials")
            .field("id_token", &"<redacted>")
            .finish()
    }
}

/// Credentials submitted to a provider. Never persisted.
#[derive(Debug, Clone)]
pub enum Credentials {
    Password(PasswordCredentials),
    Google(GoogleCredentials),
}

impl Credentials {
    pub fn password(email: EmailAddress, password: impl Into<String>) -> Self {
        Credentials::Password(PasswordCredentials {
            email,
            password: password.into(),
        })
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Credentials::Password(_) => ProviderKind::Password,
            Credentials::Google(_) => ProviderKind::Google,
        }
    }
}

/// Identity resolved from a verified bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Result of a successful guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified {
    pub user: AuthenticatedUser,
    pub scopes: Vec<String>,
}

impl Verified {
    pub fn new(user: AuthenticatedUser) -> Self {
        Self {
            user,
            scopes: Vec::new(),
        }
    }
}
