//! # Sales Order Repository
//!
//! Orders and their line items.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                 │
//! │    INSERT sales_orders          ← channel must exist, id must be free  │
//! │    INSERT sales_order_items × n ← every product must exist             │
//! │  COMMIT                         ← nothing is stored if any step fails  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Items are stored as submitted; stock is not touched by orders.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use meridian_core::{
    NewSalesOrder, Page, SalesOrder, SalesOrderDetail, SalesOrderItem, SalesOrderItemDetail,
    SalesOrderSummary, SalesOrderUpdate, SalesOrderWithItems,
};

const ORDER_COLUMNS: &str = "order_id, customer_user_id, channel_id, order_amount_cents, \
                             order_status, order_date, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "order_item_id, order_id, product_id, quantity, unit_price_cents, total_price_cents";

const SELECT_SUMMARY: &str = r#"
    SELECT o.order_id, o.customer_user_id, o.channel_id, c.channel_name,
           o.order_amount_cents, o.order_status, o.order_date, o.created_at, o.updated_at
    FROM sales_orders o
    JOIN sales_channels c ON c.channel_id = o.channel_id
"#;

#[derive(Debug, Clone)]
pub struct SalesOrderRepository {
    pool: SqlitePool,
}

impl SalesOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SalesOrderRepository { pool }
    }

    /// Lists orders with their channel names, newest order date first.
    pub async fn list(&self, page: Page) -> DbResult<Vec<SalesOrderSummary>> {
        let orders = sqlx::query_as::<_, SalesOrderSummary>(&format!(
            "{SELECT_SUMMARY} ORDER BY o.order_date DESC, o.order_id DESC LIMIT ?1 OFFSET ?2"
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Order with channel name and items with product names.
    pub async fn get_detail(&self, order_id: i64) -> DbResult<SalesOrderDetail> {
        let order = sqlx::query_as::<_, SalesOrderSummary>(&format!(
            "{SELECT_SUMMARY} WHERE o.order_id = ?1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("SalesOrder", order_id))?;

        let order_items = sqlx::query_as::<_, SalesOrderItemDetail>(
            r#"
            SELECT i.order_item_id, i.product_id, p.product_name,
                   i.quantity, i.unit_price_cents, i.total_price_cents
            FROM sales_order_items i
            JOIN products p ON p.product_id = i.product_id
            WHERE i.order_id = ?1
            ORDER BY i.order_item_id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(SalesOrderDetail { order, order_items })
    }

    /// Raw item rows of an order; empty for unknown orders.
    pub async fn items(&self, order_id: i64) -> DbResult<Vec<SalesOrderItem>> {
        let items = sqlx::query_as::<_, SalesOrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM sales_order_items WHERE order_id = ?1 ORDER BY order_item_id"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Stores an order and its items atomically.
    ///
    /// ## Errors
    /// * `UniqueViolation` - order id taken
    /// * `NotFound` - channel or one of the products does not exist
    pub async fn create(&self, new: &NewSalesOrder) -> DbResult<SalesOrderWithItems> {
        let now = Utc::now();
        let order_date = new.order_date.unwrap_or(now);

        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, SalesOrder>(&format!(
            r#"
            INSERT INTO sales_orders (
                order_id, customer_user_id, channel_id, order_amount_cents,
                order_status, order_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(new.order_id)
        .bind(&new.customer_user_id)
        .bind(new.channel_id)
        .bind(new.order_amount_cents)
        .bind(&new.order_status)
        .bind(order_date)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let err = DbError::from(e);
            if err.is_unique_on("sales_orders.order_id") {
                DbError::duplicate("order_id", new.order_id)
            } else if err.is_foreign_key() {
                DbError::not_found("SalesChannel", new.channel_id)
            } else {
                err
            }
        })?;

        let mut order_items = Vec::with_capacity(new.order_items.len());
        for item in &new.order_items {
            let stored = sqlx::query_as::<_, SalesOrderItem>(&format!(
                r#"
                INSERT INTO sales_order_items (
                    order_id, product_id, quantity, unit_price_cents, total_price_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                RETURNING {ITEM_COLUMNS}
                "#
            ))
            .bind(order.order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.total_price_cents)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => DbError::not_found("Product", item.product_id),
                other => other,
            })?;
            order_items.push(stored);
        }

        tx.commit().await?;

        info!(
            order_id = order.order_id,
            items = order_items.len(),
            amount = %order.order_amount_cents,
            "Sales order created"
        );

        Ok(SalesOrderWithItems { order, order_items })
    }

    /// Changes the order status; nothing else about an order is editable.
    pub async fn update(&self, order_id: i64, changes: &SalesOrderUpdate) -> DbResult<SalesOrder> {
        debug!(order_id, status = ?changes.order_status, "Updating sales order");

        sqlx::query_as::<_, SalesOrder>(&format!(
            r#"
            UPDATE sales_orders SET
                order_status = COALESCE(?2, order_status),
                updated_at   = ?3
            WHERE order_id = ?1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order_id)
        .bind(&changes.order_status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("SalesOrder", order_id))
    }

    /// Deletes an order and its items. Imported orders linked to it are
    /// unlinked.
    pub async fn delete(&self, order_id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM sales_orders WHERE order_id = ?1")
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SalesOrder", order_id));
        }

        info!(order_id, "Sales order deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use crate::Database;
    use meridian_core::{Money, NewProduct, NewSalesChannel, NewSalesOrderItem, ProductStatus, Rate};

    async fn seeded() -> Database {
        let db = test_support::db().await;
        db.channels()
            .create(&NewSalesChannel {
                channel_id: 1,
                channel_name: "Web Shop".to_string(),
                channel_code: Some("WEB".to_string()),
                platform_type: "ecommerce".to_string(),
                api_address: None,
                commission_rate_bps: Rate::from_bps(0),
                channel_status: "active".to_string(),
                description: None,
            })
            .await
            .unwrap();
        db.products()
            .create(&NewProduct {
                product_id: 1001,
                product_name: "iPhone 15 Pro".to_string(),
                sku: "IP15P-128".to_string(),
                description: None,
                unit_price_cents: Some(Money::from_cents(99_900)),
                category_id: 1,
                status: ProductStatus::Active,
                supplier_id: None,
            })
            .await
            .unwrap();
        db
    }

    fn order(order_id: i64, product_id: i64) -> NewSalesOrder {
        NewSalesOrder {
            order_id,
            customer_user_id: "C-42".to_string(),
            channel_id: 1,
            order_amount_cents: Money::from_cents(199_800),
            order_status: "pending".to_string(),
            order_date: None,
            order_items: vec![NewSalesOrderItem {
                product_id,
                quantity: 2,
                unit_price_cents: Money::from_cents(99_900),
                total_price_cents: Money::from_cents(199_800),
            }],
        }
    }

    #[tokio::test]
    async fn test_create_and_detail() {
        let db = seeded().await;
        let repo = db.sales_orders();

        let created = repo.create(&order(5001, 1001)).await.unwrap();
        assert_eq!(created.order_items.len(), 1);

        let detail = repo.get_detail(5001).await.unwrap();
        assert_eq!(detail.order.channel_name, "Web Shop");
        assert_eq!(detail.order_items[0].product_name, "iPhone 15 Pro");

        let listed = repo.list(Page::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_product_rolls_back_order() {
        let db = seeded().await;
        let repo = db.sales_orders();

        let err = repo.create(&order(5001, 9999)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Product"));

        assert!(matches!(repo.get_detail(5001).await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_cascades_items() {
        let db = seeded().await;
        let repo = db.sales_orders();
        repo.create(&order(5001, 1001)).await.unwrap();

        let updated = repo
            .update(
                5001,
                &SalesOrderUpdate {
                    order_status: Some("shipped".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.order_status, "shipped");

        repo.delete(5001).await.unwrap();
        assert!(repo.items(5001).await.unwrap().is_empty());

        // Ordered products stay deletable once the order is gone.
        db.products().delete(1001).await.unwrap();
    }
}
