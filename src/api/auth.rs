use std::sync::Arc;

use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        State,
    },
    http::StatusCode,
    routing, Form, Json, Router,
};
use tracing::{debug, error};

use crate::core::{authenticate_user, register_user};
use crate::models::{AppError, AppState, LoginForm, NewUser, TokenResponse, User};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", routing::post(register))
        .route("/login", routing::post(login))
}

pub async fn register(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let Json(new_user) = payload?;
    debug!("Register request: {:?}", new_user);
    let user = register_user(
        &app_state.store,
        &app_state.hasher,
        &new_user.email,
        &new_user.password,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Form<LoginForm>, FormRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Form(form) = payload?;
    debug!("Login request for {}", form.username);
    let user = authenticate_user(
        &app_state.store,
        &app_state.hasher,
        &form.username,
        &form.password,
    )
    .await?;

    let token = app_state.tokens.issue(&user.email).map_err(|e| {
        error!("Could not issue token for {}: {}", user.email, e);
        AppError::from(e)
    })?;
    Ok(Json(TokenResponse::bearer(token)))
}
