//! Password login.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use meridian_core::User;

use crate::auth::{verify_password, CurrentUser};
use crate::error::{ApiError, ApiResult};
use crate::extract::{Form, Json};
use crate::state::AppState;

/// OAuth2 password-grant style form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

/// `POST /login/access-token`
pub async fn access_token(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<Token>> {
    let user = state.db.users().find_by_username(&form.username).await?;

    let user = match user {
        Some(u) if verify_password(&form.password, &u.password_hash) => u,
        _ => {
            warn!(username = %form.username, "Failed login");
            return Err(ApiError::Unauthorized(
                "Incorrect username or password".to_string(),
            ));
        }
    };

    let access_token = state.jwt.generate_access_token(&user)?;
    info!(user_id = user.user_id, "Token issued");

    Ok(Json(Token {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// `POST /login/test-token`: echoes the token's account.
pub async fn test_token(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
