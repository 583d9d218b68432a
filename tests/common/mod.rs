#![allow(dead_code)]

use axum::{Router, routing::get};
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use serde_json::json;
use slug_shortener::api::handlers::{health_handler, redirect_handler};
use slug_shortener::api::routes::api_routes;
use slug_shortener::config::EngineConfig;
use slug_shortener::domain::access_tracker::QueuedAccessTracker;
use slug_shortener::domain::clock::{Clock, ManualClock};
use slug_shortener::domain::entities::NewAccessEvent;
use slug_shortener::infrastructure::cache::NullCache;
use slug_shortener::infrastructure::security::JwtService;
use slug_shortener::state::{AppState, Repositories, StateSettings};
use slug_shortener::utils::slug_generator::RandomSlugGenerator;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const BASE_URL: &str = "http://sho.rt";

pub fn start_time() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
}

/// In-memory application with a controllable clock.
///
/// The receiver end of the access queue is handed back so tests can assert on
/// what resolution enqueued without running the worker.
pub struct TestApp {
    pub state: AppState,
    pub repositories: Repositories,
    pub clock: Arc<ManualClock>,
    pub access_rx: mpsc::Receiver<NewAccessEvent>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_options(EngineConfig::default(), true)
    }

    pub fn with_options(engine: EngineConfig, allow_anonymous: bool) -> Self {
        let repositories = Repositories::in_memory();
        let clock = Arc::new(ManualClock::new(start_time()));
        let (tx, access_rx) = mpsc::channel(1_000);

        let state = AppState::new(
            repositories.clone(),
            Arc::new(NullCache::new()),
            QueuedAccessTracker::new(tx),
            JwtService::new("test-signing-secret", 60),
            clock.clone() as Arc<dyn Clock>,
            Arc::new(RandomSlugGenerator),
            StateSettings {
                engine,
                public_base_url: BASE_URL.to_string(),
                allow_anonymous,
            },
        );

        Self {
            state,
            repositories,
            clock,
            access_rx,
        }
    }

    /// Router without rate limiting, which needs a peer address.
    pub fn router(&self) -> Router {
        Router::new()
            .nest("/api", api_routes(&self.state))
            .route("/r/{slug}", get(redirect_handler))
            .route("/health", get(health_handler))
            .with_state(self.state.clone())
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).unwrap()
    }

    /// Every event currently waiting in the access queue.
    pub fn drain_access_queue(&mut self) -> Vec<NewAccessEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.access_rx.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Registers `username` and returns a bearer token for it.
pub async fn signup_and_login(server: &TestServer, username: &str) -> String {
    server
        .post("/api/auth/signup")
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "correct horse battery staple"
        }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "username": username,
            "password": "correct horse battery staple"
        }))
        .await;
    response.assert_status_ok();

    response.json::<serde_json::Value>()["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
