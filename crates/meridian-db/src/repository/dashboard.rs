//! # Dashboard Repository
//!
//! Aggregates for the admin dashboard. Read-only; every query is a single
//! statement so no transaction is needed.
//!
//! Money sums use `TOTAL()`, which accumulates in floating point and never
//! raises on overflow, so rows written before input bounds existed (or by
//! hand) can't take the dashboard down. [`cents`] saturates back to `i64`.

use std::collections::BTreeMap;

use sqlx::SqlitePool;

use crate::error::DbResult;
use meridian_core::{
    AlertStatus, ChannelDistribution, DashboardStatistics, LowStockChart, Money, RecentOrder,
    SalesTrend, SUPPLIER_ACTIVE_STATUS,
};

#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    pub async fn statistics(&self) -> DbResult<DashboardStatistics> {
        let (total_orders, total_revenue_cents): (i64, f64) = sqlx::query_as(
            "SELECT COUNT(*), TOTAL(order_amount_cents) FROM sales_orders",
        )
        .fetch_one(&self.pool)
        .await?;

        let total_products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let total_inventory_value_cents: f64 = sqlx::query_scalar(
            r#"
            SELECT TOTAL(CAST(i.current_stock_quantity AS REAL) * p.unit_price_cents)
            FROM inventory i
            JOIN products p ON p.product_id = i.product_id
            WHERE p.unit_price_cents IS NOT NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let active = AlertStatus::ALL
            .iter()
            .filter(|s| s.is_active())
            .map(|s| format!("'{}'", s.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        let active_alerts: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM inventory_alerts WHERE alert_status IN ({active})"
        ))
        .fetch_one(&self.pool)
        .await?;

        let active_suppliers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM suppliers WHERE cooperation_status = ?1")
                .bind(SUPPLIER_ACTIVE_STATUS)
                .fetch_one(&self.pool)
                .await?;

        let distribution: Vec<(String, i64)> = sqlx::query_as(
            "SELECT order_status, COUNT(*) FROM sales_orders GROUP BY order_status",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(DashboardStatistics {
            total_orders,
            total_revenue_cents: cents(total_revenue_cents),
            total_products,
            total_users,
            total_inventory_value_cents: cents(total_inventory_value_cents),
            active_alerts,
            active_suppliers,
            order_status_distribution: distribution.into_iter().collect::<BTreeMap<_, _>>(),
        })
    }

    /// Revenue per calendar day (UTC), oldest first.
    pub async fn sales_trend(&self) -> DbResult<SalesTrend> {
        let rows: Vec<(String, f64)> = sqlx::query_as(
            r#"
            SELECT substr(order_date, 1, 10) AS day, TOTAL(order_amount_cents)
            FROM sales_orders
            GROUP BY day
            ORDER BY day
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let (dates, amounts): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        Ok(SalesTrend {
            dates,
            amounts_cents: amounts.into_iter().map(cents).collect(),
        })
    }

    /// Revenue per channel, largest first.
    pub async fn channel_distribution(&self) -> DbResult<ChannelDistribution> {
        let rows: Vec<(String, f64)> = sqlx::query_as(
            r#"
            SELECT c.channel_name, TOTAL(o.order_amount_cents) AS amount
            FROM sales_orders o
            JOIN sales_channels c ON c.channel_id = o.channel_id
            GROUP BY c.channel_id, c.channel_name
            ORDER BY amount DESC, c.channel_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let (channels, amounts): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        Ok(ChannelDistribution {
            channels,
            amounts_cents: amounts.into_iter().map(cents).collect(),
        })
    }

    /// Products whose stock is below their threshold.
    pub async fn low_stock(&self) -> DbResult<LowStockChart> {
        let rows: Vec<(String, i64, i64)> = sqlx::query_as(
            r#"
            SELECT p.product_name, i.current_stock_quantity, i.alert_threshold
            FROM inventory i
            JOIN products p ON p.product_id = i.product_id
            WHERE i.current_stock_quantity < i.alert_threshold
            ORDER BY i.current_stock_quantity, p.product_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut chart = LowStockChart::default();
        for (name, stock, threshold) in rows {
            chart.product_names.push(name);
            chart.current_stocks.push(stock);
            chart.alert_thresholds.push(threshold);
        }
        Ok(chart)
    }

    pub async fn recent_orders(&self, limit: i64) -> DbResult<Vec<RecentOrder>> {
        let orders = sqlx::query_as::<_, RecentOrder>(
            r#"
            SELECT o.order_id, o.customer_user_id AS customer_id, c.channel_name AS channel,
                   o.order_amount_cents AS amount_cents, o.order_status AS status, o.order_date
            FROM sales_orders o
            JOIN sales_channels c ON c.channel_id = o.channel_id
            ORDER BY o.order_date DESC, o.order_id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }
}

/// `TOTAL()` result back to cents; `as` saturates at the `i64` bounds.
fn cents(total: f64) -> Money {
    Money::from_cents(total.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use chrono::{TimeZone, Utc};
    use meridian_core::{
        NewInventory, NewProduct, NewSalesChannel, NewSalesOrder, NewSupplier, ProductStatus, Rate,
    };

    #[tokio::test]
    async fn test_empty_database() {
        let db = test_support::db().await;
        let dashboard = db.dashboard();

        let stats = dashboard.statistics().await.unwrap();
        assert_eq!(stats.total_orders, 0);
        assert!(stats.total_revenue_cents.is_zero());
        assert!(stats.order_status_distribution.is_empty());

        assert!(dashboard.sales_trend().await.unwrap().dates.is_empty());
        assert!(dashboard.recent_orders(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_aggregates() {
        let db = test_support::db().await;

        db.suppliers()
            .create(&NewSupplier {
                supplier_id: "SUP-001".to_string(),
                supplier_name: "Acme".to_string(),
                contact_info: None,
                cooperation_status: SUPPLIER_ACTIVE_STATUS.to_string(),
                address: None,
                email: None,
            })
            .await
            .unwrap();
        db.channels()
            .create(&NewSalesChannel {
                channel_id: 1,
                channel_name: "Web Shop".to_string(),
                channel_code: None,
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
                unit_price_cents: Some(Money::from_cents(1_000)),
                category_id: 1,
                status: ProductStatus::Active,
                supplier_id: Some("SUP-001".to_string()),
            })
            .await
            .unwrap();
        db.inventory()
            .create(&NewInventory {
                inventory_id: 1,
                product_id: 1001,
                current_stock_quantity: 15,
                alert_threshold: 20,
            })
            .await
            .unwrap();

        for (order_id, day, amount, status) in [
            (1, 1, 500, "pending"),
            (2, 1, 700, "shipped"),
            (3, 2, 300, "pending"),
        ] {
            db.sales_orders()
                .create(&NewSalesOrder {
                    order_id,
                    customer_user_id: "C-1".to_string(),
                    channel_id: 1,
                    order_amount_cents: Money::from_cents(amount),
                    order_status: status.to_string(),
                    order_date: Some(Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()),
                    order_items: vec![],
                })
                .await
                .unwrap();
        }

        let dashboard = db.dashboard();
        let stats = dashboard.statistics().await.unwrap();
        assert_eq!(stats.total_orders, 3);
        assert_eq!(stats.total_revenue_cents.cents(), 1_500);
        assert_eq!(stats.total_inventory_value_cents.cents(), 15_000);
        assert_eq!(stats.active_alerts, 1);
        assert_eq!(stats.active_suppliers, 1);
        assert_eq!(stats.order_status_distribution["pending"], 2);

        let trend = dashboard.sales_trend().await.unwrap();
        assert_eq!(trend.dates, ["2024-03-01", "2024-03-02"]);
        assert_eq!(trend.amounts_cents, [Money::from_cents(1_200), Money::from_cents(300)]);

        let channels = dashboard.channel_distribution().await.unwrap();
        assert_eq!(channels.channels, ["Web Shop"]);

        let low = dashboard.low_stock().await.unwrap();
        assert_eq!(low.product_names, ["iPhone 15 Pro"]);
        assert_eq!(low.current_stocks, [15]);

        let recent = dashboard.recent_orders(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].order_id, 3);
        assert_eq!(recent[0].channel, "Web Shop");
    }

    #[tokio::test]
    async fn test_oversized_rows_saturate_instead_of_failing() {
        let db = test_support::db().await;

        // Repositories don't validate, so these bypass the input bounds
        db.products()
            .create(&NewProduct {
                product_id: 1001,
                product_name: "Gold Bar".to_string(),
                sku: "GOLD-1".to_string(),
                description: None,
                unit_price_cents: Some(Money::from_cents(i64::MAX / 2)),
                category_id: 1,
                status: ProductStatus::Active,
                supplier_id: None,
            })
            .await
            .unwrap();
        db.inventory()
            .create(&NewInventory {
                inventory_id: 1,
                product_id: 1001,
                current_stock_quantity: 10,
                alert_threshold: 0,
            })
            .await
            .unwrap();
        db.channels()
            .create(&NewSalesChannel {
                channel_id: 1,
                channel_name: "Web Shop".to_string(),
                channel_code: None,
                platform_type: "ecommerce".to_string(),
                api_address: None,
                commission_rate_bps: Rate::from_bps(0),
                channel_status: "active".to_string(),
                description: None,
            })
            .await
            .unwrap();
        for order_id in [1, 2] {
            db.sales_orders()
                .create(&NewSalesOrder {
                    order_id,
                    customer_user_id: "C-1".to_string(),
                    channel_id: 1,
                    order_amount_cents: Money::from_cents(i64::MAX / 2 + 1),
                    order_status: "pending".to_string(),
                    order_date: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
                    order_items: vec![],
                })
                .await
                .unwrap();
        }

        let dashboard = db.dashboard();
        let stats = dashboard.statistics().await.unwrap();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.total_revenue_cents.cents(), i64::MAX);
        assert_eq!(stats.total_inventory_value_cents.cents(), i64::MAX);

        let trend = dashboard.sales_trend().await.unwrap();
        assert_eq!(trend.amounts_cents, [Money::from_cents(i64::MAX)]);

        let channels = dashboard.channel_distribution().await.unwrap();
        assert_eq!(channels.amounts_cents, [Money::from_cents(i64::MAX)]);
    }
}
