//! tohong-ai library interface
//!
//! Exposes the compatibility service and its HTTP surface for the binary and
//! for integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult, ServiceError};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::services::CompatibilityService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CompatibilityService>,
    /// Cancelled on shutdown; each request works on a child token
    pub shutdown: CancellationToken,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(service: Arc<CompatibilityService>) -> Self {
        Self {
            service,
            shutdown: CancellationToken::new(),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn record_error(&self, error: &ServiceError) {
        *self.last_error.write().await = Some(format!("{}: {}", error.kind(), error));
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::compatibility_routes())
        .merge(api::facts_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
