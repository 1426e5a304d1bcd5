use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::AccessClaims;
use super::errors::JwtError;

/// Signs and parses short-lived access tokens bound to a user identity.
///
/// Uses HS256 (HMAC with SHA-256). The key is only held as jsonwebtoken
/// encoding/decoding keys and is never formatted.
pub struct JwtSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwtSigner {
    /// Default lifetime of an access token.
    pub const DEFAULT_TTL_MINUTES: i64 = 15;

    /// Create a new signer.
    ///
    /// # Arguments
    /// * `secret` - HMAC key (at least 32 bytes recommended)
    /// * `issuer` - Value of the `iss` claim, also enforced on parse
    /// * `audience` - Value of the `aud` claim, also enforced on parse
    /// * `ttl` - Lifetime of issued tokens
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        audience: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            issuer: issuer.into(),
            audience: audience.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `user_id`, issued now.
    ///
    /// # Returns
    /// Signed token and its expiration instant
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn sign(&self, user_id: impl ToString) -> Result<(String, DateTime<Utc>), JwtError> {
        self.sign_at(user_id, Utc::now())
    }

    /// Sign a token for `user_id`, issued at `issued_at`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn sign_at(
        &self,
        user_id: impl ToString,
        issued_at: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), JwtError> {
        let claims =
            AccessClaims::for_user(user_id, &self.issuer, &self.audience, issued_at, self.ttl);
        let header = Header::new(self.algorithm);

        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))?;

        Ok((token, claims.expires_at()))
    }

    /// Verify and decode a token.
    ///
    /// Checks the signature, issuer, audience and expiration.
    ///
    /// # Errors
    /// * `Invalid` - Signature does not verify or the token is malformed
    /// * `Expired` - Token is well formed and signed but past `exp`
    /// * `Validation` - Any other claim check failed
    pub fn parse(&self, token: &str) -> Result<AccessClaims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidToken
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => JwtError::Invalid,
                _ => JwtError::Validation(e.to_string()),
            })
    }
}

impl fmt::Debug for JwtSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSigner")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    fn signer() -> JwtSigner {
        JwtSigner::new(SECRET, "dash", "dash-web", Duration::minutes(15))
    }

    #[test]
    fn test_sign_and_parse() {
        let signer = signer();

        let (token, expires_at) = signer.sign("user123").expect("Failed to sign token");
        assert!(!token.is_empty());

        let claims = signer.parse(&token).expect("Failed to parse token");
        assert_eq!(claims.user_id, "user123");
        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.exp, expires_at.timestamp());
        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_parse_garbage_is_invalid() {
        let result = signer().parse("invalid.token.here");
        assert_eq!(result, Err(JwtError::Invalid));
    }

    #[test]
    fn test_parse_with_wrong_secret_is_invalid() {
        let other = JwtSigner::new(
            b"secret2_at_least_32_bytes_long_key!",
            "dash",
            "dash-web",
            Duration::minutes(15),
        );

        let (token, _) = other.sign("user123").unwrap();

        assert_eq!(signer().parse(&token), Err(JwtError::Invalid));
    }

    #[test]
    fn test_parse_expired() {
        let signer = signer();
        let (token, _) = signer
            .sign_at("user123", Utc::now() - Duration::hours(1))
            .unwrap();

        assert_eq!(signer.parse(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_expired_with_wrong_secret_is_invalid() {
        let other = JwtSigner::new(
            b"secret2_at_least_32_bytes_long_key!",
            "dash",
            "dash-web",
            Duration::minutes(15),
        );
        let (token, _) = other
            .sign_at("user123", Utc::now() - Duration::hours(1))
            .unwrap();

        assert_eq!(signer().parse(&token), Err(JwtError::Invalid));
    }

    #[test]
    fn test_parse_wrong_audience() {
        let other = JwtSigner::new(SECRET, "dash", "someone-else", Duration::minutes(15));
        let (token, _) = other.sign("user123").unwrap();

        assert!(matches!(
            signer().parse(&token),
            Err(JwtError::Validation(_))
        ));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let output = format!("{:?}", signer());
        assert!(!output.contains("my_secret_key"));
        assert!(output.contains("dash-web"));
    }
}
