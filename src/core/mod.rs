mod auth;
mod password;
mod store;
mod token;
mod validator;

pub use auth::{authenticate_user, register_user, register_user_with_role, AuthError};
pub use password::{PasswordError, PasswordHasher};
pub use store::{CredentialStore, StoreError};
pub use token::{TokenError, TokenService, DEFAULT_TOKEN_TTL_MINUTES};
