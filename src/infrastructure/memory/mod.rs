//! In-process repository implementations.
//!
//! Selected with `STORAGE_BACKEND=memory` and used by the integration tests.
//! Nothing survives a restart.
//!
//! # Repositories
//!
//! - [`MemoryMappingRepository`] - Slug reservation through the `DashMap` entry API
//! - [`MemoryAccessRepository`] - Access log keyed by mapping
//! - [`MemoryUserRepository`] - Accounts behind a single lock

pub mod memory_access_repository;
pub mod memory_mapping_repository;
pub mod memory_user_repository;

pub use memory_access_repository::MemoryAccessRepository;
pub use memory_mapping_repository::MemoryMappingRepository;
pub use memory_user_repository::MemoryUserRepository;
