//! Sales channels.

use axum::extract::State;

use meridian_core::validation::{validate_channel_update, validate_new_channel};
use meridian_core::{NewSalesChannel, SalesChannel, SalesChannelRow, SalesChannelUpdate};

use crate::auth::{AdminUser, CurrentUser};
use crate::error::ApiResult;
use crate::extract::{Json, Path, Query};
use crate::routes::{MessageResponse, Pagination};
use crate::state::AppState;

/// Listing rows carry formatted `createTime`/`updateTime` strings.
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<SalesChannelRow>>> {
    let channels = state.db.channels().list(pagination.page()?).await?;
    Ok(Json(channels.into_iter().map(SalesChannelRow::from).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(channel_id): Path<i64>,
) -> ApiResult<Json<SalesChannel>> {
    Ok(Json(state.db.channels().get(channel_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Json(new): Json<NewSalesChannel>,
) -> ApiResult<Json<SalesChannel>> {
    validate_new_channel(&new)?;
    Ok(Json(state.db.channels().create(&new).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(channel_id): Path<i64>,
    Json(changes): Json<SalesChannelUpdate>,
) -> ApiResult<Json<SalesChannel>> {
    validate_channel_update(&changes)?;
    Ok(Json(state.db.channels().update(channel_id, &changes).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(channel_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.db.channels().delete(channel_id).await?;
    Ok(Json(MessageResponse::new(format!("Sales channel {channel_id} deleted"))))
}
