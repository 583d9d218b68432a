//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures. The rules that govern them (slug
//! uniqueness, expiry, access tracking) live in the application services.
//!
//! # Entity Types
//!
//! - [`Mapping`] - A slug bound to an original URL
//! - [`AccessEvent`] - A successful slug lookup
//! - [`User`] - An account that owns mappings
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with separate structs for creation:
//! `NewMapping`, `NewAccessEvent`, `NewUser`.

pub mod access_event;
pub mod mapping;
pub mod user;

pub use access_event::{AccessEvent, AccessSummary, NewAccessEvent};
pub use mapping::{Mapping, NewMapping};
pub use user::{NewUser, User};
