//! Domain layer containing business entities and contracts.
//!
//! Defines entities, repository interfaces, the injectable clock and the
//! access-tracking path, independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`clock`] - Time source for expiry decisions
//! - [`access_tracker`] - Best-effort access recording used by resolution
//! - [`access_worker`] - Background persistence of access events
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Business logic is encapsulated in services (see [`crate::application::services`])
//!
//! # Access Tracking Flow
//!
//! 1. [`crate::application::services::ResolutionService`] finds a mapping
//! 2. [`access_tracker::QueuedAccessTracker`] pushes the event to a bounded channel
//! 3. [`access_worker::run_access_worker`] persists it with retry logic
//! 4. Events land in the store via [`repositories::AccessRepository`]

pub mod access_tracker;
pub mod access_worker;
pub mod clock;
pub mod entities;
pub mod repositories;
