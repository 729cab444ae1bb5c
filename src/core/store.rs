use std::{collections::HashMap, fmt, sync::Arc};

use parking_lot::RwLock;
use tracing::info;

use crate::models::{User, DEFAULT_ROLE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    DuplicateEmail(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DuplicateEmail(email) => {
                write!(f, "User with email {} already exists", email)
            }
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Default)]
struct Inner {
    users: HashMap<String, User>,
    credentials: HashMap<String, String>,
    last_id: i64,
}

/// In-memory user and credential registry keyed by email.
///
/// Clones share the same maps. Registration runs the duplicate check, id
/// assignment and both inserts under one write lock, so ids stay 1-based,
/// sequential and gap-free whatever the concurrency.
#[derive(Clone, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<Inner>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, email: &str, password_hash: String) -> Result<User, StoreError> {
        self.register_with_role(email, password_hash, DEFAULT_ROLE)
    }

    pub fn register_with_role(
        &self,
        email: &str,
        password_hash: String,
        role: &str,
    ) -> Result<User, StoreError> {
        let mut inner = self.inner.write();
        if inner.users.contains_key(email) {
            return Err(StoreError::DuplicateEmail(email.to_string()));
        }

        inner.last_id += 1;
        let user = User::new(inner.last_id, email, role);
        inner.users.insert(email.to_string(), user.clone());
        inner.credentials.insert(email.to_string(), password_hash);
        drop(inner);

        info!("Registered user {} ({}) with id {}", user.email, user.role, user.id);
        Ok(user)
    }

    pub fn lookup(&self, email: &str) -> Option<User> {
        self.inner.read().users.get(email).cloned()
    }

    pub fn lookup_credential(&self, email: &str) -> Option<String> {
        self.inner.read().credentials.get(email).cloned()
    }

    pub fn contains(&self, email: &str) -> bool {
        self.inner.read().users.contains_key(email)
    }

    pub fn len(&self) -> usize {
        self.inner.read().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
