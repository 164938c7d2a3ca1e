//! # Product Repository
//!
//! Database operations for catalog products.
//!
//! ## Key Operations
//! - Filtered, paginated listing with a total count
//! - CRUD with SKU uniqueness enforced by the schema
//!
//! Deleting a product cascades to its inventory row and that row's alerts.
//! Products that appear on an order cannot be deleted.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::like_pattern;
use meridian_core::{NewProduct, Product, ProductFilter, ProductUpdate};

const SELECT_PRODUCT: &str = r#"
    SELECT product_id, product_name, sku, description, unit_price_cents,
           category_id, status, supplier_id, created_at, updated_at
    FROM products
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let (page, total) = repo.list(&ProductFilter::default()).await?;
/// let product = repo.get(1001).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products matching the filter, ordered by id.
    ///
    /// ## Returns
    /// The requested page and the number of products matching the filter
    /// across all pages.
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<(Vec<Product>, i64)> {
        let name = filter.name.as_deref().map(like_pattern);

        debug!(?filter, "Listing products");

        const WHERE: &str = r#"
            WHERE (?1 IS NULL OR product_name LIKE ?1 ESCAPE '\')
              AND (?2 IS NULL OR category_id = ?2)
              AND (?3 IS NULL OR status = ?3)
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM products {WHERE}"))
            .bind(&name)
            .bind(filter.category)
            .bind(filter.status)
            .fetch_one(&self.pool)
            .await?;

        let products = sqlx::query_as::<_, Product>(&format!(
            "{SELECT_PRODUCT} {WHERE} ORDER BY product_id LIMIT ?4 OFFSET ?5"
        ))
        .bind(&name)
        .bind(filter.category)
        .bind(filter.status)
        .bind(filter.page.limit)
        .bind(filter.page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok((products, total))
    }

    /// Gets a product by its ID.
    pub async fn get(&self, product_id: i64) -> DbResult<Product> {
        sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE product_id = ?1"))
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))
    }

    /// Inserts a new product.
    ///
    /// ## Errors
    /// * `UniqueViolation` - product id or SKU taken
    /// * `NotFound` - supplier does not exist
    pub async fn create(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(sku = %product.sku, "Inserting product");

        let now = Utc::now();

        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                product_id, product_name, sku, description, unit_price_cents,
                category_id, status, supplier_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            RETURNING product_id, product_name, sku, description, unit_price_cents,
                      category_id, status, supplier_id, created_at, updated_at
            "#,
        )
        .bind(product.product_id)
        .bind(&product.product_name)
        .bind(&product.sku)
        .bind(&product.description)
        .bind(product.unit_price_cents)
        .bind(product.category_id)
        .bind(product.status)
        .bind(&product.supplier_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| rename_error(e.into(), product.product_id, &product.sku, product.supplier_id.as_deref()))
    }

    /// Applies the present fields of `changes`.
    ///
    /// Keeping the same SKU is never a conflict; moving to a SKU another
    /// product holds is.
    pub async fn update(&self, product_id: i64, changes: &ProductUpdate) -> DbResult<Product> {
        debug!(product_id, "Updating product");

        let now = Utc::now();

        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                product_name     = COALESCE(?2, product_name),
                sku              = COALESCE(?3, sku),
                description      = COALESCE(?4, description),
                unit_price_cents = COALESCE(?5, unit_price_cents),
                category_id      = COALESCE(?6, category_id),
                status           = COALESCE(?7, status),
                supplier_id      = COALESCE(?8, supplier_id),
                updated_at       = ?9
            WHERE product_id = ?1
            RETURNING product_id, product_name, sku, description, unit_price_cents,
                      category_id, status, supplier_id, created_at, updated_at
            "#,
        )
        .bind(product_id)
        .bind(&changes.product_name)
        .bind(&changes.sku)
        .bind(&changes.description)
        .bind(changes.unit_price_cents)
        .bind(changes.category_id)
        .bind(changes.status)
        .bind(&changes.supplier_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            rename_error(
                e.into(),
                product_id,
                changes.sku.as_deref().unwrap_or_default(),
                changes.supplier_id.as_deref(),
            )
        })?
        .ok_or_else(|| DbError::not_found("Product", product_id))
    }

    /// Deletes a product together with its inventory row.
    pub async fn delete(&self, product_id: i64) -> DbResult<()> {
        debug!(product_id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE product_id = ?1")
            .bind(product_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => DbError::ForeignKeyViolation {
                    message: format!("Product {product_id} is referenced by sales orders"),
                },
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }

        Ok(())
    }
}

fn rename_error(err: DbError, product_id: i64, sku: &str, supplier_id: Option<&str>) -> DbError {
    if err.is_unique_on("products.sku") {
        DbError::duplicate("sku", sku)
    } else if err.is_unique_on("products.product_id") {
        DbError::duplicate("product_id", product_id)
    } else if err.is_foreign_key() {
        DbError::not_found("Supplier", supplier_id.unwrap_or_default())
    } else {
        err
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
