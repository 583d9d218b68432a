//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence, caching and credentials.
//!
//! # Modules
//!
//! - [`cache`] - Caching abstractions (Redis and no-op implementations)
//! - [`memory`] - In-process repository implementations
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`security`] - Password hashing and access tokens

pub mod cache;
pub mod memory;
pub mod persistence;
pub mod security;
