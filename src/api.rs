// src/api.rs
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::BOT_NAME;
use crate::state::BotState;

#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<BotState>,
}

#[derive(Debug, Serialize)]
struct StatusResp {
    status: &'static str,
    bot: &'static str,
    total_posts: u64,
    uptime: u64,
}

#[derive(Debug, Serialize)]
struct HealthResp {
    status: &'static str,
}

/// Liveness surface for uptime monitors: `/` and `/health`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/health", get(health))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn status(State(state): State<AppState>) -> Json<StatusResp> {
    Json(StatusResp {
        status: "running",
        bot: BOT_NAME,
        total_posts: state.bot.total_posted(),
        uptime: state.bot.uptime_secs(),
    })
}

async fn health() -> Json<HealthResp> {
    Json(HealthResp { status: "healthy" })
}
