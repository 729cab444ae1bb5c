mod error;
mod response;
mod token_claims;
mod user;

pub use error::AppError;
pub use response::{HealthResponse, TokenResponse};
pub use token_claims::TokenClaims;
pub use user::{LoginForm, NewUser, User, ADMIN_ROLE, DEFAULT_ROLE};

use crate::core::{CredentialStore, PasswordHasher, TokenService};

/// Shared by every handler through `State<Arc<AppState>>`.
#[derive(Clone)]
pub struct AppState {
    pub store: CredentialStore,
    pub hasher: PasswordHasher,
    pub tokens: TokenService,
}
