//! # Connection Pool
//!
//! [`Database`] owns the SQLite pool and hands out one repository per
//! resource. Every connection runs with foreign keys on; file databases also
//! run in WAL mode so dashboard reads don't queue behind a writer.
//!
//! ```text
//!  DATABASE_URL ──► DbConfig ──► Database::new ──► SqlitePool (+ migrations)
//!                                      │
//!                                      ├── products() / inventory() / channels()
//!                                      ├── sales_orders() / order_sync()
//!                                      ├── suppliers() / logistics()
//!                                      └── communication() / users() / dashboard()
//! ```

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::channel::ChannelRepository;
use crate::repository::communication::CommunicationRepository;
use crate::repository::dashboard::DashboardRepository;
use crate::repository::inventory::InventoryRepository;
use crate::repository::logistics::LogisticsRepository;
use crate::repository::order::SalesOrderRepository;
use crate::repository::order_sync::OrderSyncRepository;
use crate::repository::product::ProductRepository;
use crate::repository::supplier::SupplierRepository;
use crate::repository::user::UserRepository;

const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Pool settings.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// sqlx SQLite URL, e.g. `sqlite://meridian.db?mode=rwc`.
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// `None` keeps idle connections open.
    pub idle_timeout: Option<Duration>,
}

impl DbConfig {
    /// A database file, created on first use.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::from_url(format!("sqlite://{}?mode=rwc", path.as_ref().display()))
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        DbConfig {
            database_url: url.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
        }
    }

    /// A private, migrated database that disappears with the pool.
    ///
    /// Pinned to a single connection that never idles out: each SQLite
    /// connection to `:memory:` sees its own empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_url: IN_MEMORY_URL.to_string(),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: None,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

/// Shared database handle. Clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and applies pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(url = %config.database_url, "Opening database");

        let mut options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .foreign_keys(true)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        // Memory databases can't use a write-ahead log
        if !config.is_in_memory() {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.idle_timeout.map(|_| Duration::from_secs(1800)))
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Pool open");

        migrations::run_migrations(&pool).await?;

        Ok(Database { pool })
    }

    /// Raw pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Stock levels and their low-stock alerts.
    pub fn inventory(&self) -> InventoryRepository {
        InventoryRepository::new(self.pool.clone())
    }

    pub fn channels(&self) -> ChannelRepository {
        ChannelRepository::new(self.pool.clone())
    }

    pub fn suppliers(&self) -> SupplierRepository {
        SupplierRepository::new(self.pool.clone())
    }

    pub fn logistics(&self) -> LogisticsRepository {
        LogisticsRepository::new(self.pool.clone())
    }

    pub fn sales_orders(&self) -> SalesOrderRepository {
        SalesOrderRepository::new(self.pool.clone())
    }

    /// Imported channel orders and the import log.
    pub fn order_sync(&self) -> OrderSyncRepository {
        OrderSyncRepository::new(self.pool.clone())
    }

    pub fn communication(&self) -> CommunicationRepository {
        CommunicationRepository::new(self.pool.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn dashboard(&self) -> DashboardRepository {
        DashboardRepository::new(self.pool.clone())
    }

    /// True when a trivial query round-trips.
    pub async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }

    /// Waits for checked-out connections, then closes the pool.
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        let (embedded, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(embedded, applied);

        db.close().await;
        assert!(!db.health_check().await);
    }

    #[test]
    fn test_file_url() {
        let config = DbConfig::new("/tmp/meridian.db").max_connections(10);
        assert_eq!(config.database_url, "sqlite:///tmp/meridian.db?mode=rwc");
        assert_eq!(config.max_connections, 10);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }
}
