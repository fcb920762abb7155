//! Startup data initialization: make sure the configured admin account
//! exists before the server starts taking requests.

use tracing::info;

use crate::auth::PasswordHasher;
use crate::config::AuthConfig;
use crate::db::DbHandle;
use crate::db::models::UserRole;
use crate::db::patch::UserCreate;
use crate::error::CmsError;

/// Create the bootstrap admin user when it does not exist yet. Idempotent.
pub async fn ensure_admin(
    db: &DbHandle,
    passwords: &PasswordHasher,
    cfg: &AuthConfig,
) -> Result<(), CmsError> {
    if db.username_exists(&cfg.admin_username).await? {
        return Ok(());
    }

    let password_hash = passwords.hash(cfg.admin_password.clone()).await?;
    db.create_user(UserCreate {
        username: cfg.admin_username.clone(),
        email: cfg.admin_email.clone(),
        password_hash,
        role: UserRole::Admin,
    })
    .await?;

    info!(username = %cfg.admin_username, "admin user created");
    Ok(())
}
