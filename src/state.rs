//! Shared application state injected into every handler.

use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::{
    AllocationService, AuthService, ResolutionService, StatsService,
};
use crate::config::EngineConfig;
use crate::domain::access_tracker::QueuedAccessTracker;
use crate::domain::clock::Clock;
use crate::domain::repositories::{AccessRepository, MappingRepository, UserRepository};
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::memory::{
    MemoryAccessRepository, MemoryMappingRepository, MemoryUserRepository,
};
use crate::infrastructure::persistence::{
    PgAccessRepository, PgMappingRepository, PgUserRepository,
};
use crate::infrastructure::security::JwtService;
use crate::utils::slug_generator::SlugGenerator;

/// The three stores behind the services, as trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub mappings: Arc<dyn MappingRepository>,
    pub accesses: Arc<dyn AccessRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool.
    pub fn postgres(pool: Arc<PgPool>) -> Self {
        Self {
            mappings: Arc::new(PgMappingRepository::new(pool.clone())),
            accesses: Arc::new(PgAccessRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool)),
        }
    }

    /// Fresh, empty in-process repositories.
    pub fn in_memory() -> Self {
        let mappings = Arc::new(MemoryMappingRepository::new());
        Self {
            accesses: Arc::new(MemoryAccessRepository::new(mappings.clone())),
            mappings,
            users: Arc::new(MemoryUserRepository::new()),
        }
    }
}

/// Settings the HTTP layer needs besides the services.
#[derive(Debug, Clone)]
pub struct StateSettings {
    pub engine: EngineConfig,
    /// Prefix of returned short URLs, e.g. `https://s.example.com`.
    pub public_base_url: String,
    /// Accept `POST /api/shorten` without a bearer token.
    pub allow_anonymous: bool,
}

/// Application state shared across handlers.
///
/// Cloned per request; every field is an `Arc` or a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub allocation_service: Arc<AllocationService<dyn MappingRepository>>,
    pub resolution_service: Arc<ResolutionService<dyn MappingRepository>>,
    pub stats_service: Arc<StatsService<dyn MappingRepository, dyn AccessRepository>>,
    pub auth_service: Arc<AuthService<dyn UserRepository>>,
    pub cache: Arc<dyn CacheService>,
    pub access_tracker: QueuedAccessTracker,
    pub clock: Arc<dyn Clock>,
    pub public_base_url: String,
    pub allow_anonymous: bool,
}

impl AppState {
    /// Wires the services over the given repositories.
    ///
    /// The state holds the only senders of the access queue: once every
    /// clone is dropped the access worker drains and stops.
    pub fn new(
        repositories: Repositories,
        cache: Arc<dyn CacheService>,
        access_tracker: QueuedAccessTracker,
        jwt: JwtService,
        clock: Arc<dyn Clock>,
        generator: Arc<dyn SlugGenerator>,
        settings: StateSettings,
    ) -> Self {
        let allocation_service = Arc::new(AllocationService::new(
            repositories.mappings.clone(),
            generator,
            clock.clone(),
            settings.engine,
        ));
        let resolution_service = Arc::new(ResolutionService::new(
            repositories.mappings.clone(),
            cache.clone(),
            Arc::new(access_tracker.clone()),
            clock.clone(),
        ));
        let stats_service = Arc::new(StatsService::new(
            repositories.mappings,
            repositories.accesses,
        ));
        let auth_service = Arc::new(AuthService::new(repositories.users, jwt));

        Self {
            allocation_service,
            resolution_service,
            stats_service,
            auth_service,
            cache,
            access_tracker,
            clock,
            public_base_url: settings.public_base_url.trim_end_matches('/').to_string(),
            allow_anonymous: settings.allow_anonymous,
        }
    }

    /// Public URL that redirects to the mapping behind `slug`.
    pub fn short_url(&self, slug: &str) -> String {
        format!("{}/r/{}", self.public_base_url, slug)
    }
}
