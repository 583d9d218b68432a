//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::allocation_service::AllocationService`] - Slug reservation for URLs
//! - [`services::resolution_service::ResolutionService`] - Slug lookup with expiry and tracking
//! - [`services::stats_service::StatsService`] - Access counters per mapping
//! - [`services::auth_service::AuthService`] - Signup, login and bearer tokens

pub mod services;
