//! # Inventory Repository
//!
//! Stock records and the low-stock alerts raised against them.
//!
//! ## Alert Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Low-Stock Alerting                                   │
//! │                                                                         │
//! │  create / update inventory (one transaction)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  write the row                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  stock < threshold? ──no──► commit                                     │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  INSERT alert 'unsent' ... ON CONFLICT DO NOTHING                      │
//! │       │     (partial unique index: one unsent/sent/processing per row) │
//! │       ▼                                                                 │
//! │  commit                                                                │
//! │                                                                         │
//! │  unsent ──► sent ──► processing ──► processed / resolved (resolved_at) │
//! │                                 └─► pending (still counts as active)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Restocking never closes an alert; people do.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use meridian_core::alert::{needs_alert, resolution_time};
use meridian_core::{
    AlertStatus, AlertUpdate, Inventory, InventoryAlert, InventoryUpdate, NewInventory,
    NewInventoryAlert, Page,
};

const INVENTORY_COLUMNS: &str =
    "inventory_id, product_id, current_stock_quantity, alert_threshold, last_updated_at";

const ALERT_COLUMNS: &str = "alert_id, inventory_id, alert_time, alert_status, handler_name, \
                             notes, resolved_at, created_at, updated_at";

/// Result of an inventory write.
#[derive(Debug, Clone)]
pub struct InventoryWrite {
    pub inventory: Inventory,
    /// The alert this write raised, if it raised one.
    pub raised_alert: Option<InventoryAlert>,
}

/// Repository for inventory and alert operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// Lists inventory rows by id with the total row count.
    pub async fn list(&self, page: Page) -> DbResult<(Vec<Inventory>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, Inventory>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory ORDER BY inventory_id LIMIT ?1 OFFSET ?2"
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    pub async fn get(&self, inventory_id: i64) -> DbResult<Inventory> {
        sqlx::query_as::<_, Inventory>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory WHERE inventory_id = ?1"
        ))
        .bind(inventory_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Inventory", inventory_id))
    }

    /// Creates the stock record of a product, raising an alert when it
    /// starts below its threshold.
    ///
    /// ## Errors
    /// * `UniqueViolation` - inventory id taken, or the product already has
    ///   a stock record
    /// * `NotFound` - product does not exist
    pub async fn create(&self, new: &NewInventory) -> DbResult<InventoryWrite> {
        debug!(inventory_id = new.inventory_id, product_id = new.product_id, "Creating inventory");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let inventory = sqlx::query_as::<_, Inventory>(&format!(
            r#"
            INSERT INTO inventory (
                inventory_id, product_id, current_stock_quantity, alert_threshold, last_updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING {INVENTORY_COLUMNS}
            "#
        ))
        .bind(new.inventory_id)
        .bind(new.product_id)
        .bind(new.current_stock_quantity)
        .bind(new.alert_threshold)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let err = DbError::from(e);
            if err.is_unique_on("inventory.product_id") {
                DbError::duplicate("inventory for product", new.product_id)
            } else if err.is_unique_on("inventory.inventory_id") {
                DbError::duplicate("inventory_id", new.inventory_id)
            } else if err.is_foreign_key() {
                DbError::not_found("Product", new.product_id)
            } else {
                err
            }
        })?;

        let raised_alert = check_stock(&mut *tx, &inventory, now).await?;

        tx.commit().await?;

        Ok(InventoryWrite {
            inventory,
            raised_alert,
        })
    }

    /// Changes stock and/or threshold, raising an alert when the result is
    /// below threshold and no open alert exists yet.
    pub async fn update(&self, inventory_id: i64, changes: &InventoryUpdate) -> DbResult<InventoryWrite> {
        debug!(inventory_id, ?changes, "Updating inventory");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Write first so the transaction holds the write lock before reading.
        let inventory = sqlx::query_as::<_, Inventory>(&format!(
            r#"
            UPDATE inventory SET
                current_stock_quantity = COALESCE(?2, current_stock_quantity),
                alert_threshold        = COALESCE(?3, alert_threshold),
                last_updated_at        = ?4
            WHERE inventory_id = ?1
            RETURNING {INVENTORY_COLUMNS}
            "#
        ))
        .bind(inventory_id)
        .bind(changes.current_stock_quantity)
        .bind(changes.alert_threshold)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Inventory", inventory_id))?;

        let raised_alert = check_stock(&mut *tx, &inventory, now).await?;

        tx.commit().await?;

        Ok(InventoryWrite {
            inventory,
            raised_alert,
        })
    }

    // =========================================================================
    // Alerts
    // =========================================================================

    pub async fn list_alerts(&self, page: Page) -> DbResult<Vec<InventoryAlert>> {
        let alerts = sqlx::query_as::<_, InventoryAlert>(&format!(
            "SELECT {ALERT_COLUMNS} FROM inventory_alerts ORDER BY alert_id LIMIT ?1 OFFSET ?2"
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(alerts)
    }

    /// Alerts of one inventory row, newest first.
    pub async fn alerts_for(&self, inventory_id: i64) -> DbResult<Vec<InventoryAlert>> {
        let alerts = sqlx::query_as::<_, InventoryAlert>(&format!(
            "SELECT {ALERT_COLUMNS} FROM inventory_alerts WHERE inventory_id = ?1 ORDER BY alert_id DESC"
        ))
        .bind(inventory_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(alerts)
    }

    /// Records an alert by hand.
    ///
    /// ## Errors
    /// * `UniqueViolation` - the status is open and the row already has an
    ///   open alert
    /// * `NotFound` - inventory row does not exist
    pub async fn create_alert(&self, new: &NewInventoryAlert) -> DbResult<InventoryAlert> {
        let now = Utc::now();

        sqlx::query_as::<_, InventoryAlert>(&format!(
            r#"
            INSERT INTO inventory_alerts (
                inventory_id, alert_time, alert_status, handler_name, notes,
                resolved_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            RETURNING {ALERT_COLUMNS}
            "#
        ))
        .bind(new.inventory_id)
        .bind(new.alert_time.unwrap_or(now))
        .bind(new.alert_status)
        .bind(&new.handler_name)
        .bind(&new.notes)
        .bind(resolution_time(new.alert_status, now))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| alert_error(e.into(), new.inventory_id))
    }

    /// Moves an alert to a new status.
    ///
    /// Handler and notes change only when given. Moving to `processed` or
    /// `resolved` stamps `resolved_at`.
    pub async fn update_alert(&self, alert_id: i64, update: &AlertUpdate) -> DbResult<InventoryAlert> {
        let now = Utc::now();

        info!(alert_id, status = %update.alert_status, "Updating inventory alert");

        let handler = update.handler_name.as_deref().filter(|s| !s.is_empty());
        let notes = update.notes.as_deref().filter(|s| !s.is_empty());

        let alert = sqlx::query_as::<_, InventoryAlert>(&format!(
            r#"
            UPDATE inventory_alerts SET
                alert_status = ?2,
                handler_name = COALESCE(?3, handler_name),
                notes        = COALESCE(?4, notes),
                resolved_at  = COALESCE(?5, resolved_at),
                updated_at   = ?6
            WHERE alert_id = ?1
            RETURNING {ALERT_COLUMNS}
            "#
        ))
        .bind(alert_id)
        .bind(update.alert_status)
        .bind(handler)
        .bind(notes)
        .bind(resolution_time(update.alert_status, now))
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            // Reopening while another alert of the same row is open.
            DbError::UniqueViolation { .. } => {
                DbError::duplicate("open alert on the inventory of alert", alert_id)
            }
            other => other,
        })?;

        alert.ok_or_else(|| DbError::not_found("InventoryAlert", alert_id))
    }
}

/// Raises an `unsent` alert when stock is below threshold.
///
/// Returns `None` when stock is fine or an open alert already exists.
async fn check_stock(
    conn: &mut SqliteConnection,
    inventory: &Inventory,
    now: DateTime<Utc>,
) -> DbResult<Option<InventoryAlert>> {
    if !needs_alert(inventory.current_stock_quantity, inventory.alert_threshold) {
        return Ok(None);
    }

    let alert = sqlx::query_as::<_, InventoryAlert>(&format!(
        r#"
        INSERT INTO inventory_alerts (
            inventory_id, alert_time, alert_status, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?2, ?2)
        ON CONFLICT DO NOTHING
        RETURNING {ALERT_COLUMNS}
        "#
    ))
    .bind(inventory.inventory_id)
    .bind(now)
    .bind(AlertStatus::Unsent)
    .fetch_optional(conn)
    .await?;

    match &alert {
        Some(a) => info!(
            inventory_id = inventory.inventory_id,
            alert_id = a.alert_id,
            stock = inventory.current_stock_quantity,
            threshold = inventory.alert_threshold,
            "Low stock alert raised"
        ),
        None => debug!(
            inventory_id = inventory.inventory_id,
            "Stock below threshold, open alert already exists"
        ),
    }

    Ok(alert)
}

fn alert_error(err: DbError, inventory_id: i64) -> DbError {
    if err.is_unique_on("inventory_alerts.inventory_id") {
        DbError::duplicate("open alert for inventory", inventory_id)
    } else if err.is_foreign_key() {
        DbError::not_found("Inventory", inventory_id)
    } else {
        err
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use crate::Database;
    use meridian_core::{Money, NewProduct, ProductStatus};

    async fn seeded() -> Database {
        let db = test_support::db().await;
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

    fn stock(quantity: i64, threshold: i64) -> NewInventory {
        NewInventory {
            inventory_id: 1,
            product_id: 1001,
            current_stock_quantity: quantity,
            alert_threshold: threshold,
        }
    }

    #[tokio::test]
    async fn test_create_below_threshold_raises_unsent_alert() {
        let db = seeded().await;

        let write = db.inventory().create(&stock(15, 20)).await.unwrap();

        let alert = write.raised_alert.expect("alert raised");
        assert_eq!(alert.inventory_id, 1);
        assert_eq!(alert.alert_status, AlertStatus::Unsent);
        assert!(alert.resolved_at.is_none());
    }

    #[tokio::test]
    async fn test_create_at_threshold_raises_nothing() {
        let db = seeded().await;

        let write = db.inventory().create(&stock(20, 20)).await.unwrap();

        assert!(write.raised_alert.is_none());
        assert!(db.inventory().alerts_for(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restock_leaves_alert_open() {
        let db = seeded().await;
        let repo = db.inventory();
        repo.create(&stock(15, 20)).await.unwrap();

        let write = repo
            .update(
                1,
                &InventoryUpdate {
                    current_stock_quantity: Some(25),
                    alert_threshold: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(write.inventory.current_stock_quantity, 25);
        assert!(write.raised_alert.is_none());

        let alerts = repo.alerts_for(1).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_status, AlertStatus::Unsent);
    }

    #[tokio::test]
    async fn test_repeated_low_stock_keeps_single_open_alert() {
        let db = seeded().await;
        let repo = db.inventory();
        repo.create(&stock(15, 20)).await.unwrap();

        let write = repo
            .update(
                1,
                &InventoryUpdate {
                    current_stock_quantity: Some(5),
                    alert_threshold: None,
                },
            )
            .await
            .unwrap();

        assert!(write.raised_alert.is_none());
        assert_eq!(repo.alerts_for(1).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_low_stock_single_alert() {
        let (_dir, db) = test_support::file_db(8).await;
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
        db.inventory().create(&stock(50, 20)).await.unwrap();

        let updates: Vec<_> = (0..16)
            .map(|i| {
                let repo = db.inventory();
                tokio::spawn(async move {
                    repo.update(
                        1,
                        &InventoryUpdate {
                            current_stock_quantity: Some(i % 10),
                            alert_threshold: None,
                        },
                    )
                    .await
                })
            })
            .collect();

        let mut raised = 0;
        for update in updates {
            let write = update.await.unwrap().unwrap();
            raised += usize::from(write.raised_alert.is_some());
        }

        assert_eq!(raised, 1);
        let alerts = db.inventory().alerts_for(1).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_status, AlertStatus::Unsent);
    }

    #[tokio::test]
    async fn test_closed_alert_allows_new_one() {
        let db = seeded().await;
        let repo = db.inventory();
        let first = repo.create(&stock(15, 20)).await.unwrap().raised_alert.unwrap();

        let closed = repo
            .update_alert(
                first.alert_id,
                &AlertUpdate {
                    alert_status: AlertStatus::Resolved,
                    handler_name: Some("Dana".to_string()),
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert!(closed.resolved_at.is_some());
        assert_eq!(closed.handler_name.as_deref(), Some("Dana"));

        let write = repo
            .update(
                1,
                &InventoryUpdate {
                    current_stock_quantity: Some(3),
                    alert_threshold: None,
                },
            )
            .await
            .unwrap();
        assert!(write.raised_alert.is_some());
        assert_eq!(repo.alerts_for(1).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_pending_does_not_block_new_alert() {
        let db = seeded().await;
        let repo = db.inventory();
        let first = repo.create(&stock(15, 20)).await.unwrap().raised_alert.unwrap();

        let pending = repo
            .update_alert(
                first.alert_id,
                &AlertUpdate {
                    alert_status: AlertStatus::Pending,
                    handler_name: None,
                    notes: Some("waiting on supplier".to_string()),
                },
            )
            .await
            .unwrap();
        assert!(pending.resolved_at.is_none());

        let write = repo
            .update(
                1,
                &InventoryUpdate {
                    current_stock_quantity: Some(10),
                    alert_threshold: None,
                },
            )
            .await
            .unwrap();
        assert!(write.raised_alert.is_some());
    }

    #[tokio::test]
    async fn test_manual_open_alert_conflicts() {
        let db = seeded().await;
        let repo = db.inventory();
        repo.create(&stock(15, 20)).await.unwrap();

        let err = repo
            .create_alert(&NewInventoryAlert {
                inventory_id: 1,
                alert_time: None,
                alert_status: AlertStatus::Sent,
                handler_name: None,
                notes: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_product_inventory() {
        let db = seeded().await;
        let repo = db.inventory();
        repo.create(&stock(50, 10)).await.unwrap();

        let mut second = stock(50, 10);
        second.inventory_id = 2;
        let err = repo.create(&second).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "inventory for product"));

        let mut orphan = stock(50, 10);
        orphan.inventory_id = 3;
        orphan.product_id = 9999;
        assert!(matches!(repo.create(&orphan).await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_deleting_product_removes_inventory() {
        let db = seeded().await;
        db.inventory().create(&stock(15, 20)).await.unwrap();

        db.products().delete(1001).await.unwrap();

        assert!(matches!(db.inventory().get(1).await, Err(DbError::NotFound { .. })));
        assert!(db.inventory().alerts_for(1).await.unwrap().is_empty());
    }
}
