//! Catalog products.

use axum::extract::State;
use serde::Deserialize;
use tracing::warn;

use meridian_core::validation::{validate_new_product, validate_page, validate_product_update};
use meridian_core::{
    ListResponse, NewProduct, Page, Product, ProductFilter, ProductStatus, ProductUpdate,
    DEFAULT_PAGE_SIZE,
};

use crate::auth::{AdminUser, CurrentUser};
use crate::error::ApiResult;
use crate::extract::{Json, Path, Query};
use crate::routes::MessageResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub name: Option<String>,
    pub category: Option<i64>,
    /// Unknown values are ignored, not rejected.
    pub status: Option<String>,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl ProductQuery {
    fn into_filter(self) -> ApiResult<ProductFilter> {
        let page = Page::new(self.skip, self.limit);
        validate_page(page)?;

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<ProductStatus>() {
                Ok(status) => Some(status),
                Err(e) => {
                    warn!(error = %e, "Ignoring product status filter");
                    None
                }
            },
        };

        Ok(ProductFilter {
            name: self.name.filter(|n| !n.trim().is_empty()),
            category: self.category,
            status,
            page,
        })
    }
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Json<ListResponse<Product>>> {
    let filter = query.into_filter()?;
    let (products, total) = state.db.products().list(&filter).await?;
    Ok(Json(ListResponse::new(products, total, "Products retrieved")))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(product_id): Path<i64>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.db.products().get(product_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Json(new): Json<NewProduct>,
) -> ApiResult<Json<Product>> {
    validate_new_product(&new)?;
    Ok(Json(state.db.products().create(&new).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(product_id): Path<i64>,
    Json(changes): Json<ProductUpdate>,
) -> ApiResult<Json<Product>> {
    validate_product_update(&changes)?;
    Ok(Json(state.db.products().update(product_id, &changes).await?))
}

/// Removes the product together with its inventory row and alerts.
pub async fn delete(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(product_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.db.products().delete(product_id).await?;
    Ok(Json(MessageResponse::new(format!("Product {product_id} deleted"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(status: Option<&str>, limit: i64) -> ProductQuery {
        ProductQuery {
            skip: 0,
            limit,
            name: Some("  ".to_string()),
            category: None,
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn test_unknown_status_is_ignored() {
        let filter = query(Some("archived"), 10).into_filter().unwrap();
        assert_eq!(filter.status, None);
        assert_eq!(filter.name, None);

        let filter = query(Some("active"), 10).into_filter().unwrap();
        assert_eq!(filter.status, Some(ProductStatus::Active));
    }

    #[test]
    fn test_limit_bounds() {
        assert!(query(None, 0).into_filter().is_err());
        assert!(query(None, 101).into_filter().is_err());
        assert_eq!(query(None, 100).into_filter().unwrap().page.limit, 100);
    }
}
