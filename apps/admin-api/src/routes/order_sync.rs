//! Orders imported from external channels.
//!
//! Rows are written by the channel importer; the API only reads them. The
//! trigger acknowledges a request and does not fetch anything itself.

use axum::extract::State;
use tracing::info;

use meridian_core::{OrderSyncLog, SyncTriggered, SyncedOrderSummary};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::extract::{Json, Path, Query};
use crate::routes::Pagination;
use crate::state::AppState;

pub async fn orders(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<SyncedOrderSummary>>> {
    Ok(Json(state.db.order_sync().list_orders(pagination.page()?).await?))
}

/// Newest first.
pub async fn logs(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<OrderSyncLog>>> {
    Ok(Json(state.db.order_sync().list_logs(pagination.page()?).await?))
}

/// `POST /order-sync/sync/{channel_code}`: 404 for an unknown channel code.
pub async fn trigger(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(channel_code): Path<String>,
) -> ApiResult<Json<SyncTriggered>> {
    let channel = state.db.channels().get_by_code(&channel_code).await?;

    info!(
        channel_id = channel.channel_id,
        channel_code = %channel_code,
        by = %user.username,
        "Order sync requested"
    );

    Ok(Json(SyncTriggered {
        message: format!("Started syncing orders from channel {channel_code}"),
        status: "processing".to_string(),
    }))
}
