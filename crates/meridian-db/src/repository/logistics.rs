//! # Logistics Repository
//!
//! Inbound shipments from suppliers.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use meridian_core::{Logistics, LogisticsUpdate, NewLogistics, Page};

const LOGISTICS_COLUMNS: &str = "logistics_id, supplier_id, order_reference_id, logistics_status, \
                                 logistics_details, tracking_number, carrier_name, \
                                 estimated_delivery_date, actual_delivery_date, last_updated_at, created_at";

#[derive(Debug, Clone)]
pub struct LogisticsRepository {
    pool: SqlitePool,
}

impl LogisticsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LogisticsRepository { pool }
    }

    pub async fn list(&self, page: Page) -> DbResult<Vec<Logistics>> {
        let rows = sqlx::query_as::<_, Logistics>(&format!(
            "SELECT {LOGISTICS_COLUMNS} FROM logistics ORDER BY created_at DESC, logistics_id LIMIT ?1 OFFSET ?2"
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get(&self, logistics_id: &str) -> DbResult<Logistics> {
        sqlx::query_as::<_, Logistics>(&format!(
            "SELECT {LOGISTICS_COLUMNS} FROM logistics WHERE logistics_id = ?1"
        ))
        .bind(logistics_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Logistics", logistics_id))
    }

    /// ## Errors
    /// * `UniqueViolation` - id taken
    /// * `NotFound` - supplier does not exist
    pub async fn create(&self, new: &NewLogistics) -> DbResult<Logistics> {
        debug!(logistics_id = %new.logistics_id, supplier_id = %new.supplier_id, "Creating shipment");

        sqlx::query_as::<_, Logistics>(&format!(
            r#"
            INSERT INTO logistics (
                logistics_id, supplier_id, order_reference_id, logistics_status,
                logistics_details, tracking_number, carrier_name,
                estimated_delivery_date, actual_delivery_date, last_updated_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            RETURNING {LOGISTICS_COLUMNS}
            "#
        ))
        .bind(&new.logistics_id)
        .bind(&new.supplier_id)
        .bind(&new.order_reference_id)
        .bind(&new.logistics_status)
        .bind(&new.logistics_details)
        .bind(&new.tracking_number)
        .bind(&new.carrier_name)
        .bind(new.estimated_delivery_date)
        .bind(new.actual_delivery_date)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| rename_error(e.into(), &new.logistics_id, &new.supplier_id))
    }

    pub async fn update(&self, logistics_id: &str, changes: &LogisticsUpdate) -> DbResult<Logistics> {
        sqlx::query_as::<_, Logistics>(&format!(
            r#"
            UPDATE logistics SET
                supplier_id             = COALESCE(?2, supplier_id),
                order_reference_id      = COALESCE(?3, order_reference_id),
                logistics_status        = COALESCE(?4, logistics_status),
                logistics_details       = COALESCE(?5, logistics_details),
                tracking_number         = COALESCE(?6, tracking_number),
                carrier_name            = COALESCE(?7, carrier_name),
                estimated_delivery_date = COALESCE(?8, estimated_delivery_date),
                actual_delivery_date    = COALESCE(?9, actual_delivery_date),
                last_updated_at         = ?10
            WHERE logistics_id = ?1
            RETURNING {LOGISTICS_COLUMNS}
            "#
        ))
        .bind(logistics_id)
        .bind(&changes.supplier_id)
        .bind(&changes.order_reference_id)
        .bind(&changes.logistics_status)
        .bind(&changes.logistics_details)
        .bind(&changes.tracking_number)
        .bind(&changes.carrier_name)
        .bind(changes.estimated_delivery_date)
        .bind(changes.actual_delivery_date)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            rename_error(
                e.into(),
                logistics_id,
                changes.supplier_id.as_deref().unwrap_or_default(),
            )
        })?
        .ok_or_else(|| DbError::not_found("Logistics", logistics_id))
    }

    pub async fn delete(&self, logistics_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM logistics WHERE logistics_id = ?1")
            .bind(logistics_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Logistics", logistics_id));
        }

        Ok(())
    }
}

fn rename_error(err: DbError, logistics_id: &str, supplier_id: &str) -> DbError {
    if err.is_unique_on("logistics.logistics_id") {
        DbError::duplicate("logistics_id", logistics_id)
    } else if err.is_foreign_key() {
        DbError::not_found("Supplier", supplier_id)
    } else {
        err
    }
}
