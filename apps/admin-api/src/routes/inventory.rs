//! Stock records and low-stock alerts.
//!
//! Creating or updating a stock record may raise an `unsent` alert in the
//! same transaction; the response is always the stored record.

use axum::extract::State;
use tracing::info;

use meridian_core::validation::{validate_new_inventory, validate_stock_levels};
use meridian_core::{
    AlertUpdate, Inventory, InventoryAlert, InventoryUpdate, ListResponse, NewInventory,
    NewInventoryAlert,
};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::extract::{Json, Path, Query};
use crate::routes::Pagination;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<ListResponse<Inventory>>> {
    let (rows, total) = state.db.inventory().list(pagination.page()?).await?;
    Ok(Json(ListResponse::new(rows, total, "Inventory retrieved")))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(inventory_id): Path<i64>,
) -> ApiResult<Json<Inventory>> {
    Ok(Json(state.db.inventory().get(inventory_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Json(new): Json<NewInventory>,
) -> ApiResult<Json<Inventory>> {
    validate_new_inventory(&new)?;
    let write = state.db.inventory().create(&new).await?;
    Ok(Json(write.inventory))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(inventory_id): Path<i64>,
    Json(changes): Json<InventoryUpdate>,
) -> ApiResult<Json<Inventory>> {
    validate_stock_levels(changes.current_stock_quantity, changes.alert_threshold)?;
    let write = state.db.inventory().update(inventory_id, &changes).await?;
    Ok(Json(write.inventory))
}

pub async fn list_alerts(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<InventoryAlert>>> {
    Ok(Json(state.db.inventory().list_alerts(pagination.page()?).await?))
}

pub async fn create_alert(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Json(new): Json<NewInventoryAlert>,
) -> ApiResult<Json<InventoryAlert>> {
    Ok(Json(state.db.inventory().create_alert(&new).await?))
}

/// `PUT /inventory/alerts/{id}?alert_status=&handler_name=&notes=`
pub async fn update_alert(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(alert_id): Path<i64>,
    Query(update): Query<AlertUpdate>,
) -> ApiResult<Json<InventoryAlert>> {
    let alert = state.db.inventory().update_alert(alert_id, &update).await?;
    info!(
        alert_id,
        status = %alert.alert_status,
        by = %user.username,
        "Alert status changed"
    );
    Ok(Json(alert))
}
