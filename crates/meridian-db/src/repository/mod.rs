//! # Repository Module
//!
//! Database repository implementations for Meridian.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  axum handler                                                          │
//! │       │                                                                 │
//! │       │  state.db.inventory().update(1, &changes)                      │
//! │       ▼                                                                 │
//! │  InventoryRepository                                                   │
//! │  ├── list / get / create / update / delete                             │
//! │  └── list_alerts / create_alert / update_alert                         │
//! │       │                                                                 │
//! │       │  SQL (one transaction per write that touches two tables)       │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conventions
//! - Every repository owns a clone of the pool.
//! - Lookups by id return `DbError::NotFound` instead of `Option`.
//! - Constraint failures are renamed to the field the caller sent.

pub mod channel;
pub mod communication;
pub mod dashboard;
pub mod inventory;
pub mod logistics;
pub mod order;
pub mod order_sync;
pub mod product;
pub mod supplier;
pub mod user;

/// Turns user input into a `LIKE ... ESCAPE '\'` substring pattern.
///
/// `%` and `_` typed by the user match literally.
pub(crate) fn like_pattern(input: &str) -> String {
    let mut pattern = String::with_capacity(input.len() + 2);
    pattern.push('%');
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{Database, DbConfig};
    use tempfile::TempDir;

    /// Fresh migrated in-memory database.
    pub async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// File database with a real multi-connection pool. Keep the `TempDir`
    /// alive for as long as the database is used.
    pub async fn file_db(connections: u32) -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let config = DbConfig::new(dir.path().join("meridian.db")).max_connections(connections);
        let db = Database::new(config).await.unwrap();
        (dir, db)
    }
}
