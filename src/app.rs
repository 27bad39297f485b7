use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::broker::SessionBroker;
use crate::config::ServerConfig;
use crate::store::PollStore;
use crate::{api, ws};

/// Shared application state handed to every route
pub struct AppState {
    pub broker: Arc<SessionBroker>,
    pub config: ServerConfig,
}

impl AppState {
    /// Build a fresh store and broker; one per process
    pub fn new(config: ServerConfig) -> Self {
        Self {
            broker: Arc::new(SessionBroker::new(PollStore::new())),
            config,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/api/health", get(api::health))
        .route("/api/polls/{poll_id}", get(api::get_poll))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
