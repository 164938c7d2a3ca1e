//! # Validation Module
//!
//! Field rules checked before a request body reaches the database.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: axum extractors                                              │
//! │  └── JSON shape and types (serde) → 422 on malformed bodies            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required text, lengths, SKU charset                               │
//! │  └── Non-negative stock, prices and rates                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── UNIQUE (sku, channel name/code, product_id on inventory, ...)     │
//! │  ├── Partial UNIQUE on open alerts                                     │
//! │  └── FOREIGN KEY constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use meridian_core::validation::{validate_sku, validate_stock_levels};
//!
//! assert!(validate_sku("IP15P-128").is_ok());
//! assert!(validate_stock_levels(Some(15), Some(20)).is_ok());
//! assert!(validate_stock_levels(Some(-1), None).is_err());
//! ```

use crate::communication::{NewContact, NewMessage};
use crate::error::ValidationError;
use crate::money::{Money, Rate};
use crate::types::{
    NewInventory, NewLogistics, NewProduct, NewSalesChannel, NewSalesOrder, NewSupplier, NewUser,
    Page, ProductUpdate, SalesChannelUpdate,
};
use crate::{MAX_PAGE_SIZE, MAX_STOCK_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
/// - Only alphanumeric characters, hyphens, underscores
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 100,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a required free-text field (names, titles, statuses).
///
/// ## Example
/// ```rust
/// use meridian_core::validation::validate_text;
///
/// assert!(validate_text("product_name", "iPhone 15 Pro", 255).is_ok());
/// assert!(validate_text("product_name", "   ", 255).is_err());
/// ```
pub fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a free-text field that may be absent.
fn validate_optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) => validate_text(field, v, max),
        None => Ok(()),
    }
}

/// Loose email shape check: one `@`, something on both sides, a dot in the
/// domain.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@domain.tld".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || !domain.contains('.') || domain.ends_with('.') {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a password for a new account (at least 6 characters).
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < 6 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// Zero is allowed (free items), negatives are not, and nothing above
/// [`Money::MAX_CENTS`].
pub fn validate_price(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    if amount.cents() > Money::MAX_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: Money::MAX_CENTS,
        });
    }

    Ok(())
}

/// Validates stock quantity and threshold, whichever are supplied.
///
/// Both must lie in `0..=MAX_STOCK_QUANTITY`. A threshold of zero disables
/// alerts for the row.
pub fn validate_stock_levels(stock: Option<i64>, threshold: Option<i64>) -> ValidationResult<()> {
    for (field, value) in [("current_stock_quantity", stock), ("alert_threshold", threshold)] {
        match value {
            Some(v) if v < 0 => {
                return Err(ValidationError::Negative {
                    field: field.to_string(),
                })
            }
            Some(v) if v > MAX_STOCK_QUANTITY => {
                return Err(ValidationError::OutOfRange {
                    field: field.to_string(),
                    min: 0,
                    max: MAX_STOCK_QUANTITY,
                })
            }
            _ => {}
        }
    }

    Ok(())
}

/// Validates a commission rate (0% to 100%).
pub fn validate_commission_rate(rate: Rate) -> ValidationResult<()> {
    if rate.bps() > Rate::MAX_BPS {
        return Err(ValidationError::OutOfRange {
            field: "commission_rate_bps".to_string(),
            min: 0,
            max: Rate::MAX_BPS as i64,
        });
    }

    Ok(())
}

/// Validates an order line quantity.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_STOCK_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_STOCK_QUANTITY,
        });
    }

    Ok(())
}

/// Validates paginated-listing parameters: `skip >= 0`, `1 <= limit <= 100`.
pub fn validate_page(page: Page) -> ValidationResult<()> {
    if page.skip < 0 {
        return Err(ValidationError::Negative {
            field: "skip".to_string(),
        });
    }

    if !(1..=MAX_PAGE_SIZE).contains(&page.limit) {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: MAX_PAGE_SIZE,
        });
    }

    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

pub fn validate_new_product(p: &NewProduct) -> ValidationResult<()> {
    validate_text("product_name", &p.product_name, 255)?;
    validate_sku(&p.sku)?;
    if let Some(price) = p.unit_price_cents {
        validate_price("unit_price_cents", price)?;
    }
    Ok(())
}

pub fn validate_product_update(p: &ProductUpdate) -> ValidationResult<()> {
    validate_optional_text("product_name", p.product_name.as_deref(), 255)?;
    if let Some(sku) = &p.sku {
        validate_sku(sku)?;
    }
    if let Some(price) = p.unit_price_cents {
        validate_price("unit_price_cents", price)?;
    }
    Ok(())
}

pub fn validate_new_inventory(i: &NewInventory) -> ValidationResult<()> {
    validate_stock_levels(Some(i.current_stock_quantity), Some(i.alert_threshold))
}

pub fn validate_new_channel(c: &NewSalesChannel) -> ValidationResult<()> {
    validate_text("channel_name", &c.channel_name, 255)?;
    validate_optional_text("channel_code", c.channel_code.as_deref(), 50)?;
    validate_text("platform_type", &c.platform_type, 50)?;
    validate_commission_rate(c.commission_rate_bps)
}

pub fn validate_channel_update(c: &SalesChannelUpdate) -> ValidationResult<()> {
    validate_optional_text("channel_name", c.channel_name.as_deref(), 255)?;
    validate_optional_text("channel_code", c.channel_code.as_deref(), 50)?;
    validate_optional_text("platform_type", c.platform_type.as_deref(), 50)?;
    if let Some(rate) = c.commission_rate_bps {
        validate_commission_rate(rate)?;
    }
    Ok(())
}

pub fn validate_new_supplier(s: &NewSupplier) -> ValidationResult<()> {
    validate_text("supplier_id", &s.supplier_id, 50)?;
    validate_text("supplier_name", &s.supplier_name, 255)?;
    validate_text("cooperation_status", &s.cooperation_status, 50)?;
    if let Some(email) = &s.email {
        validate_email(email)?;
    }
    Ok(())
}

pub fn validate_new_logistics(l: &NewLogistics) -> ValidationResult<()> {
    validate_text("logistics_id", &l.logistics_id, 50)?;
    validate_text("supplier_id", &l.supplier_id, 50)?;
    validate_text("logistics_status", &l.logistics_status, 50)
}

pub fn validate_new_order(o: &NewSalesOrder) -> ValidationResult<()> {
    validate_text("customer_user_id", &o.customer_user_id, 255)?;
    validate_text("order_status", &o.order_status, 50)?;
    validate_price("order_amount_cents", o.order_amount_cents)?;
    for item in &o.order_items {
        validate_quantity(item.quantity)?;
        validate_price("unit_price_cents", item.unit_price_cents)?;
        validate_price("total_price_cents", item.total_price_cents)?;
    }
    if o.items_total().is_none() {
        return Err(ValidationError::OutOfRange {
            field: "order_items".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

pub fn validate_new_user(u: &NewUser) -> ValidationResult<()> {
    validate_text("username", &u.username, 255)?;
    validate_password(&u.password)
}

pub fn validate_new_contact(c: &NewContact) -> ValidationResult<()> {
    validate_text("name", &c.name, 100)?;
    validate_text("role", &c.role, 50)?;
    validate_text("contact_info", &c.contact_info, 255)
}

pub fn validate_new_message(m: &NewMessage) -> ValidationResult<()> {
    validate_text("message_content", &m.message_content, 10_000)?;
    if !matches!(m.message_type.as_str(), "text" | "file" | "image") {
        return Err(ValidationError::NotAllowed {
            field: "message_type".to_string(),
            allowed: vec!["text".to_string(), "file".to_string(), "image".to_string()],
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
