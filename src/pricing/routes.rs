//! HTTP handlers for the pricing API.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};

use crate::error::Result;
use crate::AppState;

use super::requests::QuoteRequest;
use super::responses::{QuoteResponse, RuleResponse};
use super::services;

/// Pricing routes, mounted under `/api/pricing`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quote", post(quote))
        .route("/rules", get(list_rules))
        .route("/rules/refresh", post(refresh_rules))
}

/// Quote a booking
async fn quote(
    State(state): State<AppState>,
    body: std::result::Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<QuoteResponse>> {
    let Json(request) = body?;
    Ok(Json(services::quote(&state, request).await?))
}

/// List the rules quotes are currently priced with
async fn list_rules(State(state): State<AppState>) -> Result<Json<Vec<RuleResponse>>> {
    let rules = services::current_rules(&state.cache, &state.rules).await?;
    Ok(Json(rules.iter().map(RuleResponse::from).collect()))
}

/// Reload rules after an admin edit
async fn refresh_rules(State(state): State<AppState>) -> Result<Json<Vec<RuleResponse>>> {
    let rules = services::refresh_rules(&state.cache, &state.rules).await?;
    Ok(Json(rules.iter().map(RuleResponse::from).collect()))
}
