//! Authentication primitives library
//!
//! Provides the stateless building blocks of the auth service:
//! - Password hashing (Argon2id)
//! - Access token (JWT) signing and parsing
//!
//! Neither type touches storage; sessions, users and guards live in the service.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.check("my_password", &hash).unwrap());
//! assert!(!hasher.check("not_my_password", &hash).unwrap());
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::{JwtError, JwtSigner};
//! use chrono::Duration;
//!
//! let signer = JwtSigner::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     "dashboard",
//!     "dashboard-web",
//!     Duration::minutes(15),
//! );
//! let (token, _expires_at) = signer.sign("user123").unwrap();
//! let claims = signer.parse(&token).unwrap();
//! assert_eq!(claims.user_id, "user123");
//!
//! assert_eq!(signer.parse("not-a-token"), Err(JwtError::Invalid));
//! ```

pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use jwt::AccessClaims;
pub use jwt::JwtError;
pub use jwt::JwtSigner;
pub use password::PasswordError;
pub use password::PasswordHasher;
