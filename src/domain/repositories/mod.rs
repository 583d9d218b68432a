//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access following the Repository pattern and are
//! implemented by the infrastructure layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - PostgreSQL implementations live in `crate::infrastructure::persistence`
//! - In-memory implementations live in `crate::infrastructure::memory`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`MappingRepository`] - Slug reservation and lookup
//! - [`AccessRepository`] - Append-only access log
//! - [`UserRepository`] - Account storage
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod access_repository;
pub mod mapping_repository;
pub mod user_repository;

pub use access_repository::AccessRepository;
pub use mapping_repository::{InsertOutcome, MappingRepository};
pub use user_repository::UserRepository;

#[cfg(test)]
pub use access_repository::MockAccessRepository;
#[cfg(test)]
pub use mapping_repository::MockMappingRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
