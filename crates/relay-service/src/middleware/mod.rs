//! Middleware for the relay service.
//!
//! # Components
//!
//! - `auth` - Fail-open request authentication
//! - `http_metrics` - Request/response metrics recording

pub mod auth;
pub mod http_metrics;

pub use auth::{authenticate, identity_from_verification, AuthMiddlewareState};
pub use http_metrics::http_metrics_middleware;
