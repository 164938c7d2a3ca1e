//! # meridian-db: Database Layer for the Meridian Back-Office
//!
//! SQLite storage for catalog, stock, channels, orders, suppliers and
//! messaging, accessed asynchronously through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Meridian Data Flow                               │
//! │                                                                         │
//! │  axum handler (PUT /api/v1/inventory/{id})                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   meridian-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ Product        │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Inventory      │    │ 0001_initial │  │   │
//! │  │   │ Connection    │    │ SalesOrder     │    │ _schema.sql  │  │   │
//! │  │   │ Management    │    │ Communication  │    │              │  │   │
//! │  │   └───────────────┘    │ Dashboard ...  │    └──────────────┘  │   │
//! │  │                        └────────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                     (DATABASE_URL)                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per resource
//!
//! ## Usage
//!
//! ```rust,ignore
//! use meridian_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_url("sqlite://meridian.db?mode=rwc")).await?;
//!
//! let write = db.inventory().update(1, &changes).await?;
//! if let Some(alert) = write.raised_alert { /* ... */ }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::channel::ChannelRepository;
pub use repository::communication::CommunicationRepository;
pub use repository::dashboard::DashboardRepository;
pub use repository::inventory::{InventoryRepository, InventoryWrite};
pub use repository::logistics::LogisticsRepository;
pub use repository::order::SalesOrderRepository;
pub use repository::order_sync::OrderSyncRepository;
pub use repository::product::ProductRepository;
pub use repository::supplier::SupplierRepository;
pub use repository::user::{UserRecord, UserRepository};
