//! Authentication: JWKS fetching, token verification, and request identity.

pub mod claims;
pub mod jwks;
pub mod verifier;

pub use claims::{AuthIdentity, Claims};
pub use jwks::JwksClient;
pub use verifier::TokenVerifier;
