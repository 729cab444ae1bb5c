mod auth;
mod current_user;
mod health;
mod user;

#[cfg(test)]
mod test_api;

use std::sync::Arc;

use axum::{http::Uri, Router};

use crate::models::{AppError, AppState};

pub use auth::router as auth_router;
pub use health::router as health_router;
pub use user::router as user_router;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health_router())
        .merge(auth_router())
        .merge(user_router())
        .fallback(fallback_404)
        .with_state(state)
}

pub async fn fallback_404(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
