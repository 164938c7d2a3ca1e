//! Back-office accounts.

use axum::extract::State;

use meridian_core::validation::validate_new_user;
use meridian_core::{NewUser, User};
use meridian_db::UserRecord;

use crate::auth::{hash_password, AdminUser, CurrentUser};
use crate::error::{ApiError, ApiResult};
use crate::extract::{Json, Path, Query};
use crate::routes::Pagination;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<User>>> {
    let users = state.db.users().list(pagination.page()?).await?;
    Ok(Json(users))
}

pub async fn create(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Json(new): Json<NewUser>,
) -> ApiResult<Json<User>> {
    validate_new_user(&new)?;

    let password_hash = hash_password(&new.password)?;
    let record = UserRecord {
        username: &new.username,
        password_hash: &password_hash,
        full_name: new.full_name.as_deref(),
        role: new.role.as_deref(),
        contact_id: new.contact_id,
    };

    Ok(Json(state.db.users().create(&record).await?))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

/// Own account for everyone; any account for admins.
pub async fn get(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<User>> {
    if current.user_id == user_id {
        return Ok(Json(current));
    }
    if !current.is_superuser() {
        return Err(ApiError::Forbidden(
            "The user doesn't have enough privileges".to_string(),
        ));
    }
    Ok(Json(state.db.users().get(user_id).await?))
}
