//! Business logic services for the application layer.

pub mod allocation_service;
pub mod auth_service;
pub mod resolution_service;
pub mod stats_service;

pub use allocation_service::{Allocation, AllocationService};
pub use auth_service::{AuthService, CurrentUser};
pub use resolution_service::ResolutionService;
pub use stats_service::{MappingStats, StatsService};
