pub mod claims;
pub mod errors;
pub mod signer;

pub use claims::AccessClaims;
pub use errors::JwtError;
pub use signer::JwtSigner;
