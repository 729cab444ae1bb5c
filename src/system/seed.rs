use anyhow::{Context, Result};
use tracing::info;

use crate::config::AdminSeed;
use crate::core::{register_user_with_role, CredentialStore, PasswordHasher};
use crate::models::ADMIN_ROLE;

/// Creates the initial admin account when the store is still empty.
/// Returns whether an account was created.
pub async fn seed_admin(
    store: &CredentialStore,
    hasher: &PasswordHasher,
    admin: Option<&AdminSeed>,
) -> Result<bool> {
    let Some(admin) = admin else {
        return Ok(false);
    };
    if !store.is_empty() {
        return Ok(false);
    }

    let user = register_user_with_role(store, hasher, &admin.email, &admin.password, ADMIN_ROLE)
        .await
        .context("Failed to create initial admin user")?;
    info!("Initial admin user created: {} (admin: {})", user.email, user.is_admin());
    Ok(true)
}
