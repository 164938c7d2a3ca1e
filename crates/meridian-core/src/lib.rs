//! # meridian-core: Pure Domain Logic for the Meridian Back-Office
//!
//! This crate holds every type the back-office talks in (products, stock,
//! alerts, channels, suppliers, logistics, orders, messaging) plus the few
//! rules that are worth keeping out of SQL. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Meridian Back-Office                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Admin frontend (browser)                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over /api/v1                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 admin-api (axum handlers)                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ meridian-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   alert   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ needs_    │  │   rules   │  │   │
//! │  │   │ Inventory │  │   Rate    │  │  alert    │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 meridian-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog, stock, channel, supplier, order and user types
//! - [`communication`] - Contacts, messages, templates, quick replies
//! - [`alert`] - Alert statuses and the low-stock rule
//! - [`money`] - Integer money and basis-point rates
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use meridian_core::alert::{needs_alert, AlertStatus};
//!
//! // 15 units on hand against a threshold of 20 raises an alert
//! assert!(needs_alert(15, 20));
//! assert!(AlertStatus::Unsent.is_open());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod alert;
pub mod communication;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use alert::AlertStatus;
pub use communication::*;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Rate};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Role name that grants superuser rights (user management, hard deletes).
pub const ROLE_ADMIN: &str = "admin";

/// Cooperation status counted as an active supplier on the dashboard.
pub const SUPPLIER_ACTIVE_STATUS: &str = "active";

/// Default page size for paginated product listings.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Upper bound for `limit` on paginated product listings.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Upper bound for stock quantities, thresholds and order line quantities.
pub const MAX_STOCK_QUANTITY: i64 = 1_000_000_000;
