//! Common utilities and types shared across the Townsquare services.

#![warn(clippy::pedantic)]

/// Environment configuration helpers and the shared database settings
pub mod config;

/// Postgres connection pool construction
pub mod db;

/// Identity and service-to-service header handling
pub mod identity;

/// Session token issuance and verification
pub mod jwt;

/// Tracing and Prometheus metrics setup shared by every service
pub mod observability;

/// Password hashing and verification
pub mod password;

/// Outbound HTTP client construction and call policies for peer services
pub mod peer;

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Process shutdown signal handling
pub mod shutdown;

/// Store error taxonomy shared by every repository
pub mod store;
