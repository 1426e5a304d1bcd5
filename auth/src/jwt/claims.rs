use chrono::DateTime;
use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Claims carried by a signed access token.
///
/// Standard RFC 7519 claims plus the bound user identifier. Timestamps are
/// Unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Issuer
    pub iss: String,

    /// Subject (same value as `user_id`)
    pub sub: String,

    /// Audience
    pub aud: String,

    /// Issued at
    pub iat: i64,

    /// Expiration time
    pub exp: i64,

    /// JWT ID (unique per issued token)
    pub jti: String,

    /// Identifier of the user the token is bound to
    pub user_id: String,
}

impl AccessClaims {
    /// Build claims for a user, issued at `issued_at` and valid for `ttl`.
    ///
    /// A fresh `jti` is generated on every call.
    pub fn for_user(
        user_id: impl ToString,
        issuer: &str,
        audience: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let user_id = user_id.to_string();
        let expires_at = issued_at + ttl;

        Self {
            iss: issuer.to_string(),
            sub: user_id.clone(),
            aud: audience.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            user_id,
        }
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.iat, 0).single().unwrap_or_default()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_default()
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_user() {
        let now = Utc::now();
        let claims =
            AccessClaims::for_user("user123", "dash", "dash-web", now, Duration::minutes(15));

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.user_id, "user123");
        assert_eq!(claims.iss, "dash");
        assert_eq!(claims.aud, "dash-web");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert_eq!(claims.issued_at().timestamp(), now.timestamp());
    }

    #[test]
    fn test_jti_is_unique() {
        let now = Utc::now();
        let first = AccessClaims::for_user("u", "i", "a", now, Duration::minutes(1));
        let second = AccessClaims::for_user("u", "i", "a", now, Duration::minutes(1));

        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_is_expired() {
        let mut claims =
            AccessClaims::for_user("u", "i", "a", Utc::now(), Duration::minutes(1));
        claims.exp = 1000;

        assert!(!claims.is_expired(999));
        assert!(!claims.is_expired(1000));
        assert!(claims.is_expired(1001));
    }
}
