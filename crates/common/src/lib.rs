//! Common utilities shared across Nova Relay components.

#![warn(clippy::pedantic)]

/// Module for JWT utilities (kid extraction, size limits)
pub mod jwt;

/// Module for secret types that prevent accidental logging
pub mod secret;
