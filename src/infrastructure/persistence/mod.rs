//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries mapped through `FromRow` row types.
//!
//! # Repositories
//!
//! - [`PgMappingRepository`] - Slug reservation and lookup
//! - [`PgAccessRepository`] - Access log writes and summaries
//! - [`PgUserRepository`] - Account storage

pub mod pg_access_repository;
pub mod pg_mapping_repository;
pub mod pg_user_repository;

pub use pg_access_repository::PgAccessRepository;
pub use pg_mapping_repository::PgMappingRepository;
pub use pg_user_repository::PgUserRepository;
