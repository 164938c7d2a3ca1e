//! # Domain Types
//!
//! Row types, request bodies and response shapes for everything except
//! messaging (see [`crate::communication`]).
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────┐   1:1   ┌──────────────┐   1:n   ┌────────────────┐  │
//! │  │   Product    │────────►│  Inventory   │────────►│ InventoryAlert │  │
//! │  │  sku unique  │         │ product_id   │         │ ≤1 open        │  │
//! │  └──────┬───────┘         │   unique     │         └────────────────┘  │
//! │         │ n:1             └──────────────┘                              │
//! │  ┌──────▼───────┐   1:n   ┌──────────────┐                              │
//! │  │   Supplier   │────────►│  Logistics   │                              │
//! │  └──────────────┘         └──────────────┘                              │
//! │                                                                         │
//! │  ┌──────────────┐   1:n   ┌──────────────┐   1:n   ┌────────────────┐  │
//! │  │ SalesChannel │────────►│  SalesOrder  │────────►│ SalesOrderItem │  │
//! │  └──────┬───────┘         └──────────────┘         └────────────────┘  │
//! │         │ channel_code                                                  │
//! │  ┌──────▼─────────────┐   ┌──────────────┐                              │
//! │  │ SyncedChannelOrder │   │ OrderSyncLog │   written by channel import │
//! │  └────────────────────┘   └──────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Catalog rows (products, inventory, channels, orders, suppliers, logistics)
//! carry caller-supplied ids; the database rejects collisions. Alerts, order
//! items, users and messaging rows get store-generated ids.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::alert::AlertStatus;
use crate::error::CoreError;
use crate::money::{Money, Rate};
use crate::{DEFAULT_PAGE_SIZE, ROLE_ADMIN};

// =============================================================================
// Listing Envelope
// =============================================================================

/// Paginated listing envelope used by products and inventory.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    /// Total rows matching the filter, ignoring skip/limit.
    pub total: i64,
    pub message: String,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>, total: i64, message: impl Into<String>) -> Self {
        ListResponse {
            data,
            total,
            message: message.into(),
        }
    }
}

/// Offset pagination shared by every list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Page {
    pub const fn new(skip: i64, limit: i64) -> Self {
        Page { skip, limit }
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(0, 100)
    }
}

// =============================================================================
// Product
// =============================================================================

/// Whether a product is on sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Active,
    /// New products start inactive until someone lists them.
    #[default]
    Inactive,
}

impl ProductStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(ProductStatus::Active),
            "inactive" => Ok(ProductStatus::Inactive),
            other => Err(CoreError::UnknownStatus {
                kind: "product",
                value: other.to_string(),
            }),
        }
    }
}

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub product_id: i64,
    pub product_name: String,
    /// Stock Keeping Unit, unique across the catalog.
    pub sku: String,
    pub description: Option<String>,
    /// Standard selling price in cents.
    pub unit_price_cents: Option<Money>,
    pub category_id: i64,
    pub status: ProductStatus,
    pub supplier_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

fn default_category() -> i64 {
    1
}

/// Body of `POST /products/`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub product_id: i64,
    pub product_name: String,
    pub sku: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unit_price_cents: Option<Money>,
    #[serde(default = "default_category")]
    pub category_id: i64,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub supplier_id: Option<String>,
}

/// Body of `PUT /products/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpdate {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unit_price_cents: Option<Money>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub supplier_id: Option<String>,
}

/// Filters for the product listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring of the product name.
    pub name: Option<String>,
    pub category: Option<i64>,
    pub status: Option<ProductStatus>,
    pub page: Page,
}

impl Default for ProductFilter {
    fn default() -> Self {
        ProductFilter {
            name: None,
            category: None,
            status: None,
            page: Page::new(0, DEFAULT_PAGE_SIZE),
        }
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Stock record for one product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Inventory {
    pub inventory_id: i64,
    pub product_id: i64,
    pub current_stock_quantity: i64,
    pub alert_threshold: i64,
    #[ts(as = "String")]
    pub last_updated_at: DateTime<Utc>,
}

/// Body of `POST /inventory/`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewInventory {
    pub inventory_id: i64,
    pub product_id: i64,
    pub current_stock_quantity: i64,
    pub alert_threshold: i64,
}

/// Body of `PUT /inventory/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryUpdate {
    #[serde(default)]
    pub current_stock_quantity: Option<i64>,
    #[serde(default)]
    pub alert_threshold: Option<i64>,
}

/// A low-stock alert raised against an inventory row.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryAlert {
    pub alert_id: i64,
    pub inventory_id: i64,
    #[ts(as = "String")]
    pub alert_time: DateTime<Utc>,
    pub alert_status: AlertStatus,
    pub handler_name: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "Option<String>")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /inventory/alerts/`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewInventoryAlert {
    pub inventory_id: i64,
    /// Defaults to now.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub alert_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub alert_status: AlertStatus,
    #[serde(default)]
    pub handler_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Query string of `PUT /inventory/alerts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AlertUpdate {
    pub alert_status: AlertStatus,
    #[serde(default)]
    pub handler_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Sales Channel
// =============================================================================

fn default_channel_status() -> String {
    "active".to_string()
}

/// A place we sell through (web shop, marketplace, social store).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesChannel {
    pub channel_id: i64,
    pub channel_name: String,
    pub channel_code: Option<String>,
    /// ecommerce / marketplace / social / direct
    pub platform_type: String,
    pub api_address: Option<String>,
    pub commission_rate_bps: Rate,
    pub channel_status: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /sales-channels/`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSalesChannel {
    pub channel_id: i64,
    pub channel_name: String,
    #[serde(default)]
    pub channel_code: Option<String>,
    pub platform_type: String,
    #[serde(default)]
    pub api_address: Option<String>,
    #[serde(default)]
    pub commission_rate_bps: Rate,
    #[serde(default = "default_channel_status")]
    pub channel_status: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `PUT /sales-channels/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesChannelUpdate {
    #[serde(default)]
    pub channel_name: Option<String>,
    #[serde(default)]
    pub channel_code: Option<String>,
    #[serde(default)]
    pub platform_type: Option<String>,
    #[serde(default)]
    pub api_address: Option<String>,
    #[serde(default)]
    pub commission_rate_bps: Option<Rate>,
    #[serde(default)]
    pub channel_status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Row of the channel listing, shaped for the admin table.
///
/// Empty strings stand in for missing optional text, timestamps are
/// pre-formatted.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesChannelRow {
    pub channel_id: i64,
    pub channel_name: String,
    pub channel_code: Option<String>,
    pub platform_type: String,
    pub api_address: String,
    pub commission_rate_bps: Rate,
    pub channel_status: String,
    pub description: String,
    #[serde(rename = "createTime")]
    pub create_time: String,
    #[serde(rename = "updateTime")]
    pub update_time: String,
}

/// Timestamp format of the channel listing.
pub const LISTING_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl From<SalesChannel> for SalesChannelRow {
    fn from(c: SalesChannel) -> Self {
        SalesChannelRow {
            channel_id: c.channel_id,
            channel_name: c.channel_name,
            channel_code: c.channel_code,
            platform_type: c.platform_type,
            api_address: c.api_address.unwrap_or_default(),
            commission_rate_bps: c.commission_rate_bps,
            channel_status: c.channel_status,
            description: c.description.unwrap_or_default(),
            create_time: c.created_at.format(LISTING_TIME_FORMAT).to_string(),
            update_time: c
                .updated_at
                .map(|t| t.format(LISTING_TIME_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub supplier_id: String,
    pub supplier_name: String,
    pub contact_info: Option<String>,
    /// Free text; `active` counts towards the dashboard.
    pub cooperation_status: String,
    pub address: Option<String>,
    pub email: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSupplier {
    pub supplier_id: String,
    pub supplier_name: String,
    #[serde(default)]
    pub contact_info: Option<String>,
    pub cooperation_status: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierUpdate {
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub cooperation_status: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

// =============================================================================
// Logistics
// =============================================================================

/// A shipment from a supplier.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Logistics {
    pub logistics_id: String,
    pub supplier_id: String,
    pub order_reference_id: Option<String>,
    pub logistics_status: String,
    pub logistics_details: Option<String>,
    pub tracking_number: Option<String>,
    pub carrier_name: Option<String>,
    #[ts(as = "Option<String>")]
    pub estimated_delivery_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub actual_delivery_date: Option<NaiveDate>,
    #[ts(as = "String")]
    pub last_updated_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewLogistics {
    pub logistics_id: String,
    pub supplier_id: String,
    #[serde(default)]
    pub order_reference_id: Option<String>,
    pub logistics_status: String,
    #[serde(default)]
    pub logistics_details: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub carrier_name: Option<String>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub estimated_delivery_date: Option<NaiveDate>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub actual_delivery_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LogisticsUpdate {
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub order_reference_id: Option<String>,
    #[serde(default)]
    pub logistics_status: Option<String>,
    #[serde(default)]
    pub logistics_details: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub carrier_name: Option<String>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub estimated_delivery_date: Option<NaiveDate>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub actual_delivery_date: Option<NaiveDate>,
}

// =============================================================================
// Sales Order
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesOrder {
    pub order_id: i64,
    pub customer_user_id: String,
    pub channel_id: i64,
    pub order_amount_cents: Money,
    pub order_status: String,
    #[ts(as = "String")]
    pub order_date: DateTime<Utc>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesOrderItem {
    pub order_item_id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: Money,
    pub total_price_cents: Money,
}

/// An order as created, with its items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesOrderWithItems {
    #[serde(flatten)]
    pub order: SalesOrder,
    pub order_items: Vec<SalesOrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSalesOrderItem {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: Money,
    pub total_price_cents: Money,
}

/// Body of `POST /sales-orders/`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSalesOrder {
    pub order_id: i64,
    pub customer_user_id: String,
    pub channel_id: i64,
    pub order_amount_cents: Money,
    pub order_status: String,
    /// Defaults to now.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order_items: Vec<NewSalesOrderItem>,
}

impl NewSalesOrder {
    /// Sum of the item totals as submitted, `None` if it overflows.
    pub fn items_total(&self) -> Option<Money> {
        self.order_items
            .iter()
            .try_fold(Money::zero(), |acc, i| acc.checked_add(i.total_price_cents))
    }
}

/// Body of `PUT /sales-orders/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesOrderUpdate {
    #[serde(default)]
    pub order_status: Option<String>,
}

/// Listing row: the order plus its channel's name.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesOrderSummary {
    pub order_id: i64,
    pub customer_user_id: String,
    pub channel_id: i64,
    pub channel_name: String,
    pub order_amount_cents: Money,
    pub order_status: String,
    #[ts(as = "String")]
    pub order_date: DateTime<Utc>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Item line of the order detail view.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesOrderItemDetail {
    pub order_item_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: Money,
    pub total_price_cents: Money,
}

/// `GET /sales-orders/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesOrderDetail {
    #[serde(flatten)]
    pub order: SalesOrderSummary,
    pub order_items: Vec<SalesOrderItemDetail>,
}

// =============================================================================
// Order Sync
// =============================================================================

/// An order pulled from a channel's own API.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SyncedChannelOrder {
    pub synced_order_id: String,
    pub external_customer_user_id: Option<String>,
    pub external_channel_code: String,
    pub order_status_external: String,
    pub order_amount_external_cents: Option<Money>,
    #[ts(as = "String")]
    pub order_created_at_external: DateTime<Utc>,
    /// Channel payload as received, JSON text.
    pub raw_order_data: Option<String>,
    pub internal_sales_order_id: Option<i64>,
    #[ts(as = "String")]
    pub sync_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SyncedChannelOrderItem {
    pub synced_order_item_id: i64,
    pub synced_order_id: String,
    pub external_product_id: Option<String>,
    pub product_sku: Option<String>,
    pub product_name_external: Option<String>,
    pub quantity: i64,
    pub unit_price_external_cents: Money,
    pub total_price_external_cents: Money,
    pub raw_item_data: Option<String>,
}

/// Listing row of `GET /order-sync/orders`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SyncedOrderSummary {
    pub synced_order_id: String,
    pub external_channel_code: String,
    pub order_status_external: String,
    #[ts(as = "String")]
    pub sync_timestamp: DateTime<Utc>,
}

/// Listing row of `GET /order-sync/logs`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderSyncLog {
    pub log_id: String,
    pub synced_order_id: String,
    pub external_channel_code: String,
    pub sync_status: String,
    #[ts(as = "String")]
    pub sync_time: DateTime<Utc>,
    pub message: Option<String>,
}

/// An order as received from a channel, before it is stored.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSyncedOrder {
    pub synced_order_id: String,
    #[serde(default)]
    pub external_customer_user_id: Option<String>,
    pub external_channel_code: String,
    pub order_status_external: String,
    #[serde(default)]
    pub order_amount_external_cents: Option<Money>,
    #[ts(as = "String")]
    pub order_created_at_external: DateTime<Utc>,
    #[serde(default)]
    #[ts(type = "unknown")]
    pub raw_order_data: Option<serde_json::Value>,
    #[serde(default)]
    pub internal_sales_order_id: Option<i64>,
    #[serde(default)]
    pub items: Vec<NewSyncedOrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSyncedOrderItem {
    #[serde(default)]
    pub external_product_id: Option<String>,
    #[serde(default)]
    pub product_sku: Option<String>,
    #[serde(default)]
    pub product_name_external: Option<String>,
    pub quantity: i64,
    pub unit_price_external_cents: Money,
    pub total_price_external_cents: Money,
    #[serde(default)]
    #[ts(type = "unknown")]
    pub raw_item_data: Option<serde_json::Value>,
}

/// Answer of the sync trigger.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SyncTriggered {
    pub message: String,
    pub status: String,
}

// =============================================================================
// User
// =============================================================================

/// A back-office account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip)]
    #[ts(skip)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: Option<String>,
    /// Messaging identity of this account.
    pub contact_id: Option<i64>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_superuser(&self) -> bool {
        self.role.as_deref() == Some(ROLE_ADMIN)
    }
}

/// Body of `POST /users/`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub contact_id: Option<i64>,
}

// =============================================================================
// Dashboard
// =============================================================================

/// `GET /dashboard/statistics`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStatistics {
    pub total_orders: i64,
    pub total_revenue_cents: Money,
    pub total_products: i64,
    pub total_users: i64,
    /// Σ stock × unit price over products that have a price.
    pub total_inventory_value_cents: Money,
    /// Alerts in unsent/sent/processing/pending.
    pub active_alerts: i64,
    pub active_suppliers: i64,
    pub order_status_distribution: BTreeMap<String, i64>,
}

/// `GET /dashboard/charts/sales-trend`: revenue per calendar day.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesTrend {
    pub dates: Vec<String>,
    pub amounts_cents: Vec<Money>,
}

/// `GET /dashboard/charts/channel-distribution`: revenue per channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChannelDistribution {
    pub channels: Vec<String>,
    pub amounts_cents: Vec<Money>,
}

/// `GET /dashboard/inventory/alerts`: products below threshold, as parallel
/// series for a bar chart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LowStockChart {
    pub product_names: Vec<String>,
    pub current_stocks: Vec<i64>,
    pub alert_thresholds: Vec<i64>,
}

/// Row of `GET /dashboard/recent-orders`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RecentOrder {
    pub order_id: i64,
    pub customer_id: String,
    pub channel: String,
    pub amount_cents: Money,
    pub status: String,
    #[ts(as = "String")]
    pub order_date: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
