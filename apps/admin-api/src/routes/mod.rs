//! Route handlers, one module per resource.

pub mod channels;
pub mod communication;
pub mod dashboard;
pub mod health;
pub mod inventory;
pub mod login;
pub mod logistics;
pub mod order_sync;
pub mod orders;
pub mod products;
pub mod suppliers;
pub mod users;

use axum::routing::{get, post, put};
use axum::Router;
use serde::{Deserialize, Serialize};

use meridian_core::validation::validate_page;
use meridian_core::Page;

use crate::error::ApiResult;
use crate::state::AppState;

/// Every resource route, relative to the API prefix.
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/login/access-token", post(login::access_token))
        .route("/login/test-token", post(login::test_token))
        // Users
        .route("/users/", get(users::list).post(users::create))
        .route("/users/me", get(users::me))
        .route("/users/{id}", get(users::get))
        // Sales channels
        .route("/sales-channels/", get(channels::list).post(channels::create))
        .route(
            "/sales-channels/{id}",
            get(channels::get).put(channels::update).delete(channels::delete),
        )
        // Sales orders
        .route("/sales-orders/", get(orders::list).post(orders::create))
        .route(
            "/sales-orders/{id}",
            get(orders::get).put(orders::update).delete(orders::delete),
        )
        .route("/sales-orders/{id}/items", get(orders::items))
        // Products
        .route("/products/", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::get).put(products::update).delete(products::delete),
        )
        // Inventory and alerts
        .route("/inventory/", get(inventory::list).post(inventory::create))
        .route("/inventory/alerts/", get(inventory::list_alerts).post(inventory::create_alert))
        .route("/inventory/alerts/{id}", put(inventory::update_alert))
        .route("/inventory/{id}", get(inventory::get).put(inventory::update))
        // Suppliers and inbound logistics
        .route("/suppliers/", get(suppliers::list).post(suppliers::create))
        .route(
            "/suppliers/{id}",
            get(suppliers::get).put(suppliers::update).delete(suppliers::delete),
        )
        .route("/logistics/", get(logistics::list).post(logistics::create))
        .route(
            "/logistics/{id}",
            get(logistics::get).put(logistics::update).delete(logistics::delete),
        )
        // Channel order import
        .route("/order-sync/orders", get(order_sync::orders))
        .route("/order-sync/logs", get(order_sync::logs))
        .route("/order-sync/sync/{channel_code}", post(order_sync::trigger))
        // Messaging
        .route(
            "/communication/contacts",
            get(communication::list_contacts).post(communication::create_contact),
        )
        .route(
            "/communication/contacts/{id}",
            put(communication::update_contact).delete(communication::delete_contact),
        )
        .route("/communication/messages", post(communication::send_message))
        .route("/communication/messages/{id}", get(communication::conversation))
        .route("/communication/messages/{id}/read", put(communication::mark_read))
        .route(
            "/communication/templates",
            get(communication::list_templates).post(communication::create_template),
        )
        .route(
            "/communication/quick-replies",
            get(communication::list_quick_replies).post(communication::create_quick_reply),
        )
        // Dashboard
        .route("/dashboard/statistics", get(dashboard::statistics))
        .route("/dashboard/charts/sales-trend", get(dashboard::sales_trend))
        .route("/dashboard/charts/channel-distribution", get(dashboard::channel_distribution))
        .route("/dashboard/inventory/alerts", get(dashboard::low_stock))
        .route("/dashboard/recent-orders", get(dashboard::recent_orders))
}

/// `{"message": ...}` acknowledgement for deletes and triggers.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

/// `?skip=&limit=` for the plain listings (default limit 100).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl Pagination {
    /// Checked page: `skip >= 0`, `1 <= limit <= 100`.
    pub fn page(&self) -> ApiResult<Page> {
        let page = Page::new(self.skip, self.limit);
        validate_page(page)?;
        Ok(page)
    }
}
