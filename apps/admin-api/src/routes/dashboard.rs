//! Dashboard aggregates and chart data.

use axum::extract::State;
use serde::Deserialize;

use meridian_core::validation::validate_page;
use meridian_core::{
    ChannelDistribution, DashboardStatistics, LowStockChart, Page, RecentOrder, SalesTrend,
};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::extract::{Json, Query};
use crate::state::AppState;

pub async fn statistics(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
) -> ApiResult<Json<DashboardStatistics>> {
    Ok(Json(state.db.dashboard().statistics().await?))
}

pub async fn sales_trend(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
) -> ApiResult<Json<SalesTrend>> {
    Ok(Json(state.db.dashboard().sales_trend().await?))
}

pub async fn channel_distribution(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
) -> ApiResult<Json<ChannelDistribution>> {
    Ok(Json(state.db.dashboard().channel_distribution().await?))
}

/// Products below their alert threshold.
pub async fn low_stock(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
) -> ApiResult<Json<LowStockChart>> {
    Ok(Json(state.db.dashboard().low_stock().await?))
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    #[serde(default = "default_recent")]
    pub limit: i64,
}

fn default_recent() -> i64 {
    10
}

pub async fn recent_orders(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Json<Vec<RecentOrder>>> {
    validate_page(Page::new(0, query.limit))?;
    Ok(Json(state.db.dashboard().recent_orders(query.limit).await?))
}
