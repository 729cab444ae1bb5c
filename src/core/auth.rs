use std::fmt;

use tokio::task;
use tracing::{info, warn};

use super::password::{PasswordError, PasswordHasher};
use super::store::{CredentialStore, StoreError};
use super::validator::{RegistrationValidator, ValidationError};
use crate::models::User;

#[derive(Debug)]
pub enum AuthError {
    DuplicateEmail(String),
    /// Unknown email or wrong password; the two are never told apart.
    InvalidCredentials,
    Validation(Vec<ValidationError>),
    Password(PasswordError),
    Internal(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::DuplicateEmail(_) => write!(f, "User with this email already exists."),
            AuthError::InvalidCredentials => write!(f, "Incorrect email or password"),
            AuthError::Validation(errors) => {
                let joined = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "{}", joined)
            }
            AuthError::Password(err) => write!(f, "{}", err),
            AuthError::Internal(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => AuthError::DuplicateEmail(email),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Password(err)
    }
}

impl From<task::JoinError> for AuthError {
    fn from(err: task::JoinError) -> Self {
        AuthError::Internal(format!("Password task failed: {}", err))
    }
}

/// Validates, hashes and stores a new account with the default role.
pub async fn register_user(
    store: &CredentialStore,
    hasher: &PasswordHasher,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    register_user_with_role(store, hasher, email, password, crate::models::DEFAULT_ROLE).await
}

pub async fn register_user_with_role(
    store: &CredentialStore,
    hasher: &PasswordHasher,
    email: &str,
    password: &str,
    role: &str,
) -> Result<User, AuthError> {
    let errors = RegistrationValidator::validate(email, password);
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    // Cheap early exit; the store repeats the check atomically on insert.
    if store.contains(email) {
        return Err(AuthError::DuplicateEmail(email.to_string()));
    }

    let password_hash = {
        let hasher = hasher.clone();
        let password = password.to_string();
        task::spawn_blocking(move || hasher.hash(&password)).await??
    };

    Ok(store.register_with_role(email, password_hash, role)?)
}

/// Checks an email/password pair and returns the matching user.
pub async fn authenticate_user(
    store: &CredentialStore,
    hasher: &PasswordHasher,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    let stored_hash = store.lookup_credential(email);
    let valid = {
        let hasher = hasher.clone();
        let password = password.to_string();
        task::spawn_blocking(move || match stored_hash {
            Some(hash) => hasher.verify(&password, &hash),
            None => hasher.verify_dummy(&password),
        })
        .await?
    };

    if !valid {
        warn!("Failed login attempt for {}", email);
        return Err(AuthError::InvalidCredentials);
    }

    let user = store.lookup(email).ok_or(AuthError::InvalidCredentials)?;
    info!("Login successful: {} ({})", user.email, user.role);
    Ok(user)
}
