//! # Relay Test Utilities
//!
//! Shared test utilities for the Nova Relay service.
//!
//! This crate provides:
//! - Deterministic RSA key fixtures (`TestKeypair` for minting RS256 tokens)
//! - Server test harness (`TestRelayServer` for E2E tests)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relay_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestRelayServer::spawn().await?;
//!     let client = reqwest::Client::new();
//!
//!     let response = client
//!         .get(format!("{}/me", server.url()))
//!         .bearer_auth(server.token_for("user_123"))
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod keys;
pub mod server_harness;

// Re-export commonly used items
pub use keys::*;
pub use server_harness::*;
