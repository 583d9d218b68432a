//! HTTP server initialization and runtime setup.
//!
//! Handles storage setup, cache setup, worker spawning, and Axum server lifecycle.

use crate::config::{Config, StorageBackend};
use crate::domain::access_tracker::QueuedAccessTracker;
use crate::domain::access_worker::run_access_worker;
use crate::domain::clock::SystemClock;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::security::JwtService;
use crate::routes::app_router;
use crate::state::{AppState, Repositories, StateSettings};
use crate::utils::slug_generator::RandomSlugGenerator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Upper bound on waiting for queued access events after the server stops.
const ACCESS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage (PostgreSQL pool + migrations, or in-memory)
/// - Redis cache (or NullCache fallback)
/// - Background access worker
/// - Axum HTTP server with graceful shutdown
///
/// On Ctrl-C or SIGTERM the server stops accepting connections, finishes
/// in-flight requests, then waits for the access queue to drain.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (repositories, pool) = match config.storage_backend {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres storage backend")?;
            let pool = connect_pool(&config, database_url).await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            (Repositories::postgres(Arc::new(pool.clone())), Some(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            (Repositories::in_memory(), None)
        }
    };

    let cache: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let (access_tx, access_rx) = mpsc::channel(config.access_queue_capacity);
    let worker = tokio::spawn(run_access_worker(
        access_rx,
        repositories.accesses.clone(),
        config.access_worker_concurrency,
    ));
    tracing::info!(
        "Access worker started (concurrency {})",
        config.access_worker_concurrency
    );

    let state = AppState::new(
        repositories,
        cache,
        QueuedAccessTracker::new(access_tx),
        JwtService::from_secret(config.jwt_secret.as_deref(), config.access_token_minutes),
        Arc::new(SystemClock),
        Arc::new(RandomSlugGenerator),
        StateSettings {
            engine: config.engine()?,
            public_base_url: config.public_base_url.clone(),
            allow_anonymous: config.allow_anonymous,
        },
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router, and with it every queue sender, is gone now.
    tracing::info!("Server stopped, draining access queue");
    match tokio::time::timeout(ACCESS_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("Access worker panicked: {}", e),
        Err(_) => tracing::warn!(
            "Access queue not drained within {}s",
            ACCESS_DRAIN_TIMEOUT.as_secs()
        ),
    }

    if let Some(pool) = pool {
        pool.close().await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn connect_pool(config: &Config, database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
