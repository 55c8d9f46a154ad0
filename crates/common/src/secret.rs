//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports from the [`secrecy`] crate. Use `SecretString` for upstream API
//! keys and any other credential held in configuration: `Debug` output is
//! redacted, and the value is zeroized on drop. Access requires an explicit
//! `expose_secret()` call.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SecretString;
//! use secrecy::ExposeSecret;
//!
//! #[derive(Debug)]
//! struct UpstreamConfig {
//!     base_url: String,
//!     api_key: SecretString, // Debug shows "[REDACTED]"
//! }
//!
//! let cfg = UpstreamConfig {
//!     base_url: "https://api.example.com".to_string(),
//!     api_key: SecretString::from("sk-hunter2"),
//! };
//!
//! // Safe: api_key is redacted
//! println!("{:?}", cfg);
//!
//! // Explicit access only
//! let key: &str = cfg.api_key.expose_secret();
//! ```

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
