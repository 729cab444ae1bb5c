use std::sync::Arc;

use axum::{routing, Json, Router};

use super::current_user::CurrentUser;
use crate::models::{AppState, User};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/me", routing::get(read_me))
}

/// Profile of the caller identified by the bearer token.
pub async fn read_me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
