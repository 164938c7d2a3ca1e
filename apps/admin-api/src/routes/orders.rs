//! Sales orders and their line items.

use axum::extract::State;
use tracing::warn;

use meridian_core::validation::{validate_new_order, validate_text};
use meridian_core::{
    NewSalesOrder, SalesOrder, SalesOrderDetail, SalesOrderItem, SalesOrderSummary,
    SalesOrderUpdate, SalesOrderWithItems,
};

use crate::auth::{AdminUser, CurrentUser};
use crate::error::ApiResult;
use crate::extract::{Json, Path, Query};
use crate::routes::{MessageResponse, Pagination};
use crate::state::AppState;

/// Newest first, with the channel name.
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<SalesOrderSummary>>> {
    Ok(Json(state.db.sales_orders().list(pagination.page()?).await?))
}

/// Order and items are written in one transaction.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Json(new): Json<NewSalesOrder>,
) -> ApiResult<Json<SalesOrderWithItems>> {
    validate_new_order(&new)?;

    // Stored as sent; channels apply discounts and shipping we don't model.
    if let Some(items_total) = new.items_total() {
        if !new.order_items.is_empty() && items_total != new.order_amount_cents {
            warn!(
                order_id = new.order_id,
                order_amount = %new.order_amount_cents,
                items_total = %items_total,
                "Order amount differs from the sum of its items"
            );
        }
    }

    Ok(Json(state.db.sales_orders().create(&new).await?))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<SalesOrderDetail>> {
    Ok(Json(state.db.sales_orders().get_detail(order_id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(order_id): Path<i64>,
    Json(changes): Json<SalesOrderUpdate>,
) -> ApiResult<Json<SalesOrder>> {
    if let Some(status) = &changes.order_status {
        validate_text("order_status", status, 50)?;
    }
    Ok(Json(state.db.sales_orders().update(order_id, &changes).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.db.sales_orders().delete(order_id).await?;
    Ok(Json(MessageResponse::new(format!("Sales order {order_id} deleted"))))
}

pub async fn items(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<Vec<SalesOrderItem>>> {
    Ok(Json(state.db.sales_orders().items(order_id).await?))
}
