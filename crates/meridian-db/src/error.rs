//! Database errors.
//!
//! SQLite only says *which* constraint failed (`UNIQUE constraint failed:
//! products.sku`), so [`DbError`] keeps that `table.column` and repositories
//! rename it into something the caller recognises:
//!
//! ```text
//!  sqlx::Error ──► DbError { field: "inventory.product_id" }
//!                     │  repository: is_unique_on(..) → duplicate("product_id", 1001)
//!                     ▼
//!                  ApiError ──► 404 / 409 / 500
//! ```

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the write. `field` is `table.column` until a
    /// repository renames it.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A referenced row is missing, or a delete would orphan rows that still
    /// point at it.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Every connection stayed checked out past the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl ToString) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// UNIQUE violation on exactly `table.column`.
    pub fn is_unique_on(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field, .. } if field == column)
    }

    pub fn is_foreign_key(&self) -> bool {
        matches!(self, DbError::ForeignKeyViolation { .. })
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                match msg.strip_prefix("UNIQUE constraint failed: ") {
                    // Composite indexes list every column; the first names the table
                    Some(columns) => DbError::duplicate(columns, "unknown"),
                    None if msg.starts_with("FOREIGN KEY constraint failed") => {
                        DbError::ForeignKeyViolation {
                            message: msg.to_string(),
                        }
                    }
                    None => DbError::QueryFailed(msg.to_string()),
                }
            }
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            DbError::not_found("Product", 1001).to_string(),
            "Product not found: 1001"
        );
        assert_eq!(
            DbError::duplicate("sku", "IP15P-128").to_string(),
            "Duplicate sku: 'IP15P-128' already exists"
        );
    }

    #[test]
    fn test_is_unique_on() {
        let err = DbError::duplicate("products.sku", "unknown");
        assert!(err.is_unique_on("products.sku"));
        assert!(!err.is_unique_on("products.product_id"));
        assert!(!err.is_foreign_key());
    }
}
