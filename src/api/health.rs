use crate::models::{AppState, HealthResponse};
use axum::{response::IntoResponse, routing, Json, Router};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", routing::get(check_health))
}

async fn check_health() -> impl IntoResponse {
    Json(HealthResponse::ok())
}
