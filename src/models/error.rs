use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

use crate::core::{AuthError, PasswordError, StoreError, TokenError};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status: u16,
}

#[derive(Debug)]
pub enum AppError {
    // Registration
    DuplicateEmail,
    ValidationError(String),

    // Body the extractor could not read, with the status it chose
    InvalidBody(StatusCode, String),

    // Authentication
    InvalidCredentials,
    NotAuthenticated,
    InvalidToken,
    UserNotFound,

    // Routing
    NotFound(String),

    // Anything that is our fault
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DuplicateEmail => write!(f, "User with this email already exists."),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::InvalidCredentials => write!(f, "Incorrect email or password"),
            AppError::NotAuthenticated => write!(f, "Not authenticated"),
            AppError::InvalidToken => write!(f, "Could not validate credentials"),
            AppError::UserNotFound => write!(f, "User not found"),
            AppError::NotFound(path) => write!(f, "Not found: {}", path),
            AppError::InvalidBody(_, msg) => write!(f, "Invalid request body: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DuplicateEmail => StatusCode::BAD_REQUEST,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidBody(status, _) => *status,
            AppError::InvalidCredentials
            | AppError::NotAuthenticated
            | AppError::InvalidToken
            | AppError::UserNotFound => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::DuplicateEmail => "duplicate_email",
            AppError::ValidationError(_) => "validation_error",
            AppError::InvalidBody(..) => "invalid_body",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::NotAuthenticated => "not_authenticated",
            AppError::InvalidToken => "invalid_token",
            AppError::UserNotFound => "user_not_found",
            AppError::NotFound(_) => "not_found",
            AppError::InternalServerError(_) => "internal_server_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Details stay in the logs.
            AppError::InternalServerError(_) => {
                error!("Request failed: {}", self);
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let error_response = ErrorResponse {
            error: self.kind().to_string(),
            message,
            status: status.as_u16(),
        };

        if status == StatusCode::UNAUTHORIZED {
            (
                status,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                Json(error_response),
            )
                .into_response()
        } else {
            (status, Json(error_response)).into_response()
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.status(), rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::InvalidBody(rejection.status(), rejection.body_text())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(_) => AppError::DuplicateEmail,
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooLong | PasswordError::ContainsNul => {
                AppError::ValidationError(format!("password: {}", err))
            }
            PasswordError::Hashing(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidToken => AppError::InvalidToken,
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::DuplicateEmail(_) => AppError::DuplicateEmail,
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::Validation(_) => AppError::ValidationError(message),
            AuthError::Password(err) => err.into(),
            AuthError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}
