//! First-run setup.

use tracing::info;

use meridian_core::{NewContact, User, ROLE_ADMIN};
use meridian_db::{Database, UserRecord};

use crate::auth::hash_password;
use crate::config::ApiConfig;
use crate::error::ApiResult;

/// Creates the configured superuser, with a messaging contact of the same
/// name, unless an account with that username already exists.
///
/// Returns the account either way.
pub async fn ensure_superuser(db: &Database, config: &ApiConfig) -> ApiResult<User> {
    let username = config.first_superuser.as_str();

    if let Some(existing) = db.users().find_by_username(username).await? {
        info!(user_id = existing.user_id, username, "Superuser present");
        return Ok(existing);
    }

    let password_hash = hash_password(&config.first_superuser_password)?;
    let record = UserRecord {
        username,
        password_hash: &password_hash,
        full_name: Some("Administrator"),
        role: Some(ROLE_ADMIN),
        contact_id: None,
    };
    let contact = NewContact {
        name: username.to_string(),
        role: ROLE_ADMIN.to_string(),
        contact_info: username.to_string(),
        avatar_url: None,
        status: "online".to_string(),
        remark: Some("System administrator".to_string()),
        is_active: true,
    };

    let user = db.users().create_with_contact(&record, &contact).await?;
    info!(user_id = user.user_id, username, "Superuser created");
    Ok(user)
}
