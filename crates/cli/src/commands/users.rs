//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! boutique-cli users promote --email admin@example.com
//! boutique-cli users demote --email former-admin@example.com
//! ```

use boutique_storefront::db::{self, UserRepository};
use boutique_storefront::models::Role;

use super::{CommandError, database_url};

/// Set the role of the account registered under `email`.
///
/// # Errors
///
/// Returns `CommandError::UserNotFound` if no account uses the email.
pub async fn set_role(email: &str, role: Role) -> Result<(), CommandError> {
    let database_url = database_url()?;
    let pool = db::create_pool(&database_url).await?;
    let users = UserRepository::new(&pool);

    let email = email.trim();
    let user = users
        .get_by_email(email)
        .await?
        .ok_or_else(|| CommandError::UserNotFound(email.to_owned()))?;

    if user.role == role {
        tracing::info!(email = %user.email, %role, "User already has this role");
        return Ok(());
    }

    let updated = users.update(user.id, &user.name, &user.email, role).await?;
    tracing::info!(user_id = %updated.id, email = %updated.email, role = %updated.role, "Role updated");
    Ok(())
}
