//! # Order Sync Repository
//!
//! Orders imported from channel APIs and the log of each import attempt.
//!
//! ```text
//! channel API ──► record_order() ──► synced_channel_orders (+ items)
//!                      │
//!                      └──────────► append_log() ──► order_sync_logs
//! ```
//!
//! The API only reads these tables; imports are written by the channel
//! connectors and the seed tool.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use meridian_core::{
    NewSyncedOrder, OrderSyncLog, Page, SyncedChannelOrder, SyncedChannelOrderItem,
    SyncedOrderSummary,
};

const ORDER_COLUMNS: &str = "synced_order_id, external_customer_user_id, external_channel_code, \
                             order_status_external, order_amount_external_cents, \
                             order_created_at_external, raw_order_data, internal_sales_order_id, \
                             sync_timestamp";

const ITEM_COLUMNS: &str = "synced_order_item_id, synced_order_id, external_product_id, product_sku, \
                            product_name_external, quantity, unit_price_external_cents, \
                            total_price_external_cents, raw_item_data";

#[derive(Debug, Clone)]
pub struct OrderSyncRepository {
    pool: SqlitePool,
}

impl OrderSyncRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderSyncRepository { pool }
    }

    /// Most recently synced first.
    pub async fn list_orders(&self, page: Page) -> DbResult<Vec<SyncedOrderSummary>> {
        let orders = sqlx::query_as::<_, SyncedOrderSummary>(
            r#"
            SELECT synced_order_id, external_channel_code, order_status_external, sync_timestamp
            FROM synced_channel_orders
            ORDER BY sync_timestamp DESC, synced_order_id
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    pub async fn get_order(&self, synced_order_id: &str) -> DbResult<SyncedChannelOrder> {
        sqlx::query_as::<_, SyncedChannelOrder>(&format!(
            "SELECT {ORDER_COLUMNS} FROM synced_channel_orders WHERE synced_order_id = ?1"
        ))
        .bind(synced_order_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("SyncedChannelOrder", synced_order_id))
    }

    pub async fn order_items(&self, synced_order_id: &str) -> DbResult<Vec<SyncedChannelOrderItem>> {
        let items = sqlx::query_as::<_, SyncedChannelOrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM synced_channel_order_items \
             WHERE synced_order_id = ?1 ORDER BY synced_order_item_id"
        ))
        .bind(synced_order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Latest log entries first.
    pub async fn list_logs(&self, page: Page) -> DbResult<Vec<OrderSyncLog>> {
        let logs = sqlx::query_as::<_, OrderSyncLog>(
            r#"
            SELECT log_id, synced_order_id, external_channel_code, sync_status, sync_time, message
            FROM order_sync_logs
            ORDER BY sync_time DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    /// Stores an imported order with its items in one transaction.
    ///
    /// ## Errors
    /// * `UniqueViolation` - already imported, or the linked internal order
    ///   is linked to another import
    /// * `NotFound` - unknown channel code
    pub async fn record_order(&self, new: &NewSyncedOrder) -> DbResult<SyncedChannelOrder> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, SyncedChannelOrder>(&format!(
            r#"
            INSERT INTO synced_channel_orders (
                synced_order_id, external_customer_user_id, external_channel_code,
                order_status_external, order_amount_external_cents, order_created_at_external,
                raw_order_data, internal_sales_order_id, sync_timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(&new.synced_order_id)
        .bind(&new.external_customer_user_id)
        .bind(&new.external_channel_code)
        .bind(&new.order_status_external)
        .bind(new.order_amount_external_cents)
        .bind(new.order_created_at_external)
        .bind(new.raw_order_data.as_ref().map(|v| v.to_string()))
        .bind(new.internal_sales_order_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let err = DbError::from(e);
            if err.is_unique_on("synced_channel_orders.synced_order_id") {
                DbError::duplicate("synced_order_id", &new.synced_order_id)
            } else if err.is_unique_on("synced_channel_orders.internal_sales_order_id") {
                DbError::duplicate(
                    "internal_sales_order_id",
                    new.internal_sales_order_id.unwrap_or_default(),
                )
            } else if err.is_foreign_key() {
                DbError::not_found("SalesChannel", &new.external_channel_code)
            } else {
                err
            }
        })?;

        for item in &new.items {
            sqlx::query(
                r#"
                INSERT INTO synced_channel_order_items (
                    synced_order_id, external_product_id, product_sku, product_name_external,
                    quantity, unit_price_external_cents, total_price_external_cents, raw_item_data
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&order.synced_order_id)
            .bind(&item.external_product_id)
            .bind(&item.product_sku)
            .bind(&item.product_name_external)
            .bind(item.quantity)
            .bind(item.unit_price_external_cents)
            .bind(item.total_price_external_cents)
            .bind(item.raw_item_data.as_ref().map(|v| v.to_string()))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            synced_order_id = %order.synced_order_id,
            channel = %order.external_channel_code,
            items = new.items.len(),
            "Channel order recorded"
        );

        Ok(order)
    }

    /// Appends an import log entry.
    pub async fn append_log(
        &self,
        synced_order_id: &str,
        channel_code: &str,
        sync_status: &str,
        message: Option<&str>,
    ) -> DbResult<OrderSyncLog> {
        debug!(synced_order_id, sync_status, "Appending sync log");

        let log = sqlx::query_as::<_, OrderSyncLog>(
            r#"
            INSERT INTO order_sync_logs (
                log_id, synced_order_id, external_channel_code, sync_status, sync_time, message
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING log_id, synced_order_id, external_channel_code, sync_status, sync_time, message
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(synced_order_id)
        .bind(channel_code)
        .bind(sync_status)
        .bind(Utc::now())
        .bind(message)
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use meridian_core::{Money, NewSalesChannel, NewSyncedOrderItem, Rate};
    use serde_json::json;

    fn import(channel_code: &str) -> NewSyncedOrder {
        NewSyncedOrder {
            synced_order_id: "TM-20240301-0001".to_string(),
            external_customer_user_id: Some("buyer_88".to_string()),
            external_channel_code: channel_code.to_string(),
            order_status_external: "WAIT_SELLER_SEND".to_string(),
            order_amount_external_cents: Some(Money::from_cents(4_500)),
            order_created_at_external: Utc::now(),
            raw_order_data: Some(json!({"tid": "0001"})),
            internal_sales_order_id: None,
            items: vec![NewSyncedOrderItem {
                external_product_id: Some("X1".to_string()),
                product_sku: Some("CASE-01".to_string()),
                product_name_external: Some("Phone Case".to_string()),
                quantity: 3,
                unit_price_external_cents: Money::from_cents(1_500),
                total_price_external_cents: Money::from_cents(4_500),
                raw_item_data: None,
            }],
        }
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let db = test_support::db().await;
        db.channels()
            .create(&NewSalesChannel {
                channel_id: 7,
                channel_name: "Marketplace".to_string(),
                channel_code: Some("TMALL".to_string()),
                platform_type: "marketplace".to_string(),
                api_address: None,
                commission_rate_bps: Rate::from_bps(500),
                channel_status: "active".to_string(),
                description: None,
            })
            .await
            .unwrap();
        let repo = db.order_sync();

        let order = repo.record_order(&import("TMALL")).await.unwrap();
        assert_eq!(order.raw_order_data.as_deref(), Some(r#"{"tid":"0001"}"#));
        assert_eq!(repo.order_items(&order.synced_order_id).await.unwrap().len(), 1);

        repo.append_log(&order.synced_order_id, "TMALL", "success", Some("imported"))
            .await
            .unwrap();

        let orders = repo.list_orders(Page::default()).await.unwrap();
        assert_eq!(orders[0].external_channel_code, "TMALL");
        let logs = repo.list_logs(Page::default()).await.unwrap();
        assert_eq!(logs[0].sync_status, "success");
    }

    #[tokio::test]
    async fn test_unknown_channel_code() {
        let db = test_support::db().await;

        let err = db.order_sync().record_order(&import("NOPE")).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "SalesChannel"));
    }
}
