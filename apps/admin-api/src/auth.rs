//! JWT authentication module.
//!
//! Handles access-token issuance and validation, password hashing and the
//! extractors that put the caller's account into a handler.
//!
//! ## Extractors
//! ```text
//! CurrentUser   any valid bearer token            401 otherwise
//! AdminUser     token of an account with role     403 otherwise
//!               "admin"
//! ContactUser   token of an account linked to a   403 otherwise
//!               messaging contact
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use meridian_core::User;
use meridian_db::DbError;

use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    pub username: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    access_lifetime_minutes: i64,
}

impl JwtManager {
    pub fn new(secret: String, access_lifetime_minutes: i64) -> Self {
        JwtManager {
            secret,
            access_lifetime_minutes,
        }
    }

    /// Issues an access token for `user`.
    pub fn generate_access_token(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.access_lifetime_minutes);

        let claims = Claims {
            sub: user.user_id.to_string(),
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validates signature and expiry and decodes the claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            debug!(error = %e, "Token rejected");
            ApiError::Unauthorized("Could not validate credentials".to_string())
        })?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// Passwords
// =============================================================================

/// Hash a password for storage (Argon2id, random salt, PHC string).
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify a password against its stored hash. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Extractors
// =============================================================================

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let unauthorized = || ApiError::Unauthorized("Not authenticated".to_string());

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(unauthorized)?;
        let token = extract_bearer_token(header).ok_or_else(unauthorized)?;

        let claims = state.jwt.validate_token(token)?;
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| ApiError::Unauthorized("Could not validate credentials".to_string()))?;

        match state.db.users().get(user_id).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(DbError::NotFound { .. }) => {
                warn!(user_id, "Token for a missing user");
                Err(ApiError::Unauthorized("Could not validate credentials".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// An authenticated caller with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_superuser() {
            warn!(user_id = user.user_id, "Admin route refused");
            return Err(ApiError::Forbidden(
                "The user doesn't have enough privileges".to_string(),
            ));
        }
        Ok(AdminUser(user))
    }
}

/// An authenticated caller that can send and read messages.
#[derive(Debug, Clone)]
pub struct ContactUser {
    pub user: User,
    /// The contact messages are sent as.
    pub contact_id: i64,
}

impl FromRequestParts<AppState> for ContactUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        match user.contact_id {
            Some(contact_id) => Ok(ContactUser { user, contact_id }),
            None => Err(ApiError::Forbidden(
                "This account has no messaging contact".to_string(),
            )),
        }
    }
}
