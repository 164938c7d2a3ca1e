//! Suppliers.

use axum::extract::State;

use meridian_core::validation::{validate_email, validate_new_supplier};
use meridian_core::{NewSupplier, Supplier, SupplierUpdate};

use crate::auth::{AdminUser, CurrentUser};
use crate::error::ApiResult;
use crate::extract::{Json, Path, Query};
use crate::routes::{MessageResponse, Pagination};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<Supplier>>> {
    Ok(Json(state.db.suppliers().list(pagination.page()?).await?))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(supplier_id): Path<String>,
) -> ApiResult<Json<Supplier>> {
    Ok(Json(state.db.suppliers().get(&supplier_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Json(new): Json<NewSupplier>,
) -> ApiResult<Json<Supplier>> {
    validate_new_supplier(&new)?;
    Ok(Json(state.db.suppliers().create(&new).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(supplier_id): Path<String>,
    Json(changes): Json<SupplierUpdate>,
) -> ApiResult<Json<Supplier>> {
    if let Some(email) = &changes.email {
        validate_email(email)?;
    }
    Ok(Json(state.db.suppliers().update(&supplier_id, &changes).await?))
}

/// Refused with 409 while shipments still reference the supplier.
pub async fn delete(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(supplier_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.db.suppliers().delete(&supplier_id).await?;
    Ok(Json(MessageResponse::new(format!("Supplier {supplier_id} deleted"))))
}
