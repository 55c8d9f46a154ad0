//! Nova Relay Service Library
//!
//! This library provides the core functionality for the Nova Relay - a
//! stateless HTTP backend that fronts a browser assistant:
//!
//! - Token verification against the identity provider's JWKS endpoint
//! - Fail-open request authentication
//! - Thin relays to upstream chat, news, weather, and search services
//! - PDF text extraction and image OCR for uploads
//!
//! # Architecture
//!
//! The service follows the Handler -> Service pattern:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs
//! ```
//!
//! # Modules
//!
//! - `auth` - JWKS client, token verifier, request identity
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Authentication and metrics middleware
//! - `models` - Shared response models
//! - `observability` - Metrics definitions and recorder setup
//! - `routes` - Axum router setup
//! - `services` - Upstream clients and content extraction

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
