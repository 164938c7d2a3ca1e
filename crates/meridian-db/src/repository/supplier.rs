//! # Supplier Repository

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use meridian_core::{NewSupplier, Page, Supplier, SupplierUpdate};

const SUPPLIER_COLUMNS: &str = "supplier_id, supplier_name, contact_info, cooperation_status, \
                                address, email, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    pub async fn list(&self, page: Page) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers ORDER BY supplier_id LIMIT ?1 OFFSET ?2"
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    pub async fn get(&self, supplier_id: &str) -> DbResult<Supplier> {
        sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE supplier_id = ?1"
        ))
        .bind(supplier_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Supplier", supplier_id))
    }

    pub async fn create(&self, supplier: &NewSupplier) -> DbResult<Supplier> {
        debug!(supplier_id = %supplier.supplier_id, "Creating supplier");

        sqlx::query_as::<_, Supplier>(&format!(
            r#"
            INSERT INTO suppliers (
                supplier_id, supplier_name, contact_info, cooperation_status,
                address, email, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            RETURNING {SUPPLIER_COLUMNS}
            "#
        ))
        .bind(&supplier.supplier_id)
        .bind(&supplier.supplier_name)
        .bind(&supplier.contact_info)
        .bind(&supplier.cooperation_status)
        .bind(&supplier.address)
        .bind(&supplier.email)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| rename_error(e.into(), &supplier.supplier_id, supplier.email.as_deref()))
    }

    pub async fn update(&self, supplier_id: &str, changes: &SupplierUpdate) -> DbResult<Supplier> {
        sqlx::query_as::<_, Supplier>(&format!(
            r#"
            UPDATE suppliers SET
                supplier_name      = COALESCE(?2, supplier_name),
                contact_info       = COALESCE(?3, contact_info),
                cooperation_status = COALESCE(?4, cooperation_status),
                address            = COALESCE(?5, address),
                email              = COALESCE(?6, email),
                updated_at         = ?7
            WHERE supplier_id = ?1
            RETURNING {SUPPLIER_COLUMNS}
            "#
        ))
        .bind(supplier_id)
        .bind(&changes.supplier_name)
        .bind(&changes.contact_info)
        .bind(&changes.cooperation_status)
        .bind(&changes.address)
        .bind(&changes.email)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| rename_error(e.into(), supplier_id, changes.email.as_deref()))?
        .ok_or_else(|| DbError::not_found("Supplier", supplier_id))
    }

    /// Deletes a supplier nothing references any more.
    pub async fn delete(&self, supplier_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE supplier_id = ?1")
            .bind(supplier_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => DbError::ForeignKeyViolation {
                    message: format!("Supplier {supplier_id} still has products or shipments"),
                },
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", supplier_id));
        }

        Ok(())
    }
}

fn rename_error(err: DbError, supplier_id: &str, email: Option<&str>) -> DbError {
    if err.is_unique_on("suppliers.supplier_id") {
        DbError::duplicate("supplier_id", supplier_id)
    } else if err.is_unique_on("suppliers.email") {
        DbError::duplicate("email", email.unwrap_or_default())
    } else {
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;

    fn acme() -> NewSupplier {
        NewSupplier {
            supplier_id: "SUP-001".to_string(),
            supplier_name: "Acme Components".to_string(),
            contact_info: Some("+1 555 0100".to_string()),
            cooperation_status: "active".to_string(),
            address: None,
            email: Some("sales@acme.example".to_string()),
        }
    }

    #[tokio::test]
    async fn test_crud() {
        let db = test_support::db().await;
        let repo = db.suppliers();

        repo.create(&acme()).await.unwrap();
        let mut same_id = acme();
        same_id.email = None;
        assert!(matches!(
            repo.create(&same_id).await,
            Err(DbError::UniqueViolation { ref field, .. }) if field == "supplier_id"
        ));

        let updated = repo
            .update(
                "SUP-001",
                &SupplierUpdate {
                    cooperation_status: Some("suspended".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.cooperation_status, "suspended");
        assert_eq!(updated.email.as_deref(), Some("sales@acme.example"));

        repo.delete("SUP-001").await.unwrap();
        assert!(matches!(repo.get("SUP-001").await, Err(DbError::NotFound { .. })));
    }
}
