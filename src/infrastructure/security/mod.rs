//! Credential primitives used by the authentication service.
//!
//! - [`password`] - Argon2id password hashing
//! - [`jwt`] - HS256 access tokens

pub mod jwt;
pub mod password;

pub use jwt::{AccessClaims, JwtService};
pub use password::{hash_password, verify_password};
