use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tracing::debug;

use crate::models::{AppError, AppState, User};

/// Extractor resolving `Authorization: Bearer <token>` to a registered user.
///
/// Rejects with 401 when the header is missing, the token does not verify,
/// or its subject is no longer in the store.
#[derive(Debug)]
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    debug!("Missing or malformed authorization header: {}", e);
                    AppError::NotAuthenticated
                })?;

        let claims = state.tokens.verify(bearer.token())?;

        let user = state
            .store
            .lookup(&claims.sub)
            .ok_or(AppError::UserNotFound)?;
        Ok(CurrentUser(user))
    }
}
