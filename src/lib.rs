//! Pricing service for sports-ground bookings.
//!
//! The [`pricing`] module holds the discount engine; the rest is the HTTP
//! surface the booking flow calls to quote a slot.

pub mod cache;
pub mod config;
pub mod error;
pub mod pricing;

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cache::{AppCache, CacheStats};
use crate::config::Config;
use crate::error::AppError;
use crate::pricing::models::MatchPolicy;
use crate::pricing::RuleSource;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub rules: RuleSource,
    pub cache: AppCache,
    pub config: Arc<Config>,
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/pricing", pricing::router())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    weekday_match: MatchPolicy,
    off_peak_match: MatchPolicy,
    cache: CacheStats,
}

/// Liveness plus cache statistics
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        weekday_match: state.config.policy.weekday,
        off_peak_match: state.config.policy.off_peak,
        cache: state.cache.stats(),
    })
}

async fn not_found() -> AppError {
    AppError::NotFound
}
