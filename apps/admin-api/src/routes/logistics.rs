//! Inbound shipments from suppliers.

use axum::extract::State;

use meridian_core::validation::validate_new_logistics;
use meridian_core::{Logistics, LogisticsUpdate, NewLogistics};

use crate::auth::{AdminUser, CurrentUser};
use crate::error::ApiResult;
use crate::extract::{Json, Path, Query};
use crate::routes::{MessageResponse, Pagination};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<Logistics>>> {
    Ok(Json(state.db.logistics().list(pagination.page()?).await?))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(logistics_id): Path<String>,
) -> ApiResult<Json<Logistics>> {
    Ok(Json(state.db.logistics().get(&logistics_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Json(new): Json<NewLogistics>,
) -> ApiResult<Json<Logistics>> {
    validate_new_logistics(&new)?;
    Ok(Json(state.db.logistics().create(&new).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(logistics_id): Path<String>,
    Json(changes): Json<LogisticsUpdate>,
) -> ApiResult<Json<Logistics>> {
    Ok(Json(state.db.logistics().update(&logistics_id, &changes).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(logistics_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.db.logistics().delete(&logistics_id).await?;
    Ok(Json(MessageResponse::new(format!("Logistics record {logistics_id} deleted"))))
}
