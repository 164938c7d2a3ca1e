//! # Sales Channel Repository
//!
//! Channels are referenced by orders (by id) and by imported channel orders
//! (by code); either reference blocks deletion.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use meridian_core::{NewSalesChannel, Page, SalesChannel, SalesChannelUpdate};

const CHANNEL_COLUMNS: &str = "channel_id, channel_name, channel_code, platform_type, api_address, \
                               commission_rate_bps, channel_status, description, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ChannelRepository {
    pool: SqlitePool,
}

impl ChannelRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ChannelRepository { pool }
    }

    pub async fn list(&self, page: Page) -> DbResult<Vec<SalesChannel>> {
        let channels = sqlx::query_as::<_, SalesChannel>(&format!(
            "SELECT {CHANNEL_COLUMNS} FROM sales_channels ORDER BY channel_id LIMIT ?1 OFFSET ?2"
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(channels)
    }

    pub async fn get(&self, channel_id: i64) -> DbResult<SalesChannel> {
        sqlx::query_as::<_, SalesChannel>(&format!(
            "SELECT {CHANNEL_COLUMNS} FROM sales_channels WHERE channel_id = ?1"
        ))
        .bind(channel_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("SalesChannel", channel_id))
    }

    /// Looks a channel up by its external code.
    pub async fn get_by_code(&self, channel_code: &str) -> DbResult<SalesChannel> {
        sqlx::query_as::<_, SalesChannel>(&format!(
            "SELECT {CHANNEL_COLUMNS} FROM sales_channels WHERE channel_code = ?1"
        ))
        .bind(channel_code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("SalesChannel", channel_code))
    }

    /// Inserts a channel.
    ///
    /// ## Errors
    /// * `UniqueViolation` - id, name or code already used
    pub async fn create(&self, channel: &NewSalesChannel) -> DbResult<SalesChannel> {
        debug!(channel_id = channel.channel_id, name = %channel.channel_name, "Creating sales channel");

        sqlx::query_as::<_, SalesChannel>(&format!(
            r#"
            INSERT INTO sales_channels (
                channel_id, channel_name, channel_code, platform_type, api_address,
                commission_rate_bps, channel_status, description, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            RETURNING {CHANNEL_COLUMNS}
            "#
        ))
        .bind(channel.channel_id)
        .bind(&channel.channel_name)
        .bind(&channel.channel_code)
        .bind(&channel.platform_type)
        .bind(&channel.api_address)
        .bind(channel.commission_rate_bps)
        .bind(&channel.channel_status)
        .bind(&channel.description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            rename_error(
                e.into(),
                channel.channel_id,
                Some(&channel.channel_name),
                channel.channel_code.as_deref(),
            )
        })
    }

    pub async fn update(&self, channel_id: i64, changes: &SalesChannelUpdate) -> DbResult<SalesChannel> {
        debug!(channel_id, "Updating sales channel");

        sqlx::query_as::<_, SalesChannel>(&format!(
            r#"
            UPDATE sales_channels SET
                channel_name        = COALESCE(?2, channel_name),
                channel_code        = COALESCE(?3, channel_code),
                platform_type       = COALESCE(?4, platform_type),
                api_address         = COALESCE(?5, api_address),
                commission_rate_bps = COALESCE(?6, commission_rate_bps),
                channel_status      = COALESCE(?7, channel_status),
                description         = COALESCE(?8, description),
                updated_at          = ?9
            WHERE channel_id = ?1
            RETURNING {CHANNEL_COLUMNS}
            "#
        ))
        .bind(channel_id)
        .bind(&changes.channel_name)
        .bind(&changes.channel_code)
        .bind(&changes.platform_type)
        .bind(&changes.api_address)
        .bind(changes.commission_rate_bps)
        .bind(&changes.channel_status)
        .bind(&changes.description)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            rename_error(
                e.into(),
                channel_id,
                changes.channel_name.as_deref(),
                changes.channel_code.as_deref(),
            )
        })?
        .ok_or_else(|| DbError::not_found("SalesChannel", channel_id))
    }

    pub async fn delete(&self, channel_id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM sales_channels WHERE channel_id = ?1")
            .bind(channel_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => DbError::ForeignKeyViolation {
                    message: format!("Sales channel {channel_id} still has orders"),
                },
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SalesChannel", channel_id));
        }

        Ok(())
    }
}

fn rename_error(err: DbError, channel_id: i64, name: Option<&str>, code: Option<&str>) -> DbError {
    if err.is_unique_on("sales_channels.channel_id") {
        DbError::duplicate("channel_id", channel_id)
    } else if err.is_unique_on("sales_channels.channel_name") {
        DbError::duplicate("channel_name", name.unwrap_or_default())
    } else if err.is_unique_on("sales_channels.channel_code") {
        DbError::duplicate("channel_code", code.unwrap_or_default())
    } else if err.is_foreign_key() {
        // Renaming a code imported orders still use.
        DbError::ForeignKeyViolation {
            message: format!("Sales channel {channel_id} code is used by imported orders"),
        }
    } else {
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use meridian_core::Rate;

    fn web_shop() -> NewSalesChannel {
        NewSalesChannel {
            channel_id: 1,
            channel_name: "Web Shop".to_string(),
            channel_code: Some("WEB".to_string()),
            platform_type: "ecommerce".to_string(),
            api_address: None,
            commission_rate_bps: Rate::from_bps(250),
            channel_status: "active".to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_conflicts_on_id_and_name() {
        let db = test_support::db().await;
        let repo = db.channels();
        repo.create(&web_shop()).await.unwrap();

        let mut same_id = web_shop();
        same_id.channel_name = "Other".to_string();
        same_id.channel_code = None;
        let err = repo.create(&same_id).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "channel_id"));

        let mut same_name = web_shop();
        same_name.channel_id = 2;
        same_name.channel_code = None;
        let err = repo.create(&same_name).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "channel_name"));
    }

    #[tokio::test]
    async fn test_update_sets_updated_at() {
        let db = test_support::db().await;
        let repo = db.channels();
        let created = repo.create(&web_shop()).await.unwrap();
        assert!(created.updated_at.is_none());

        let updated = repo
            .update(
                1,
                &SalesChannelUpdate {
                    commission_rate_bps: Some(Rate::from_bps(300)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.commission_rate_bps.bps(), 300);
        assert_eq!(updated.channel_name, "Web Shop");
        assert!(updated.updated_at.is_some());
        assert_eq!(repo.get_by_code("WEB").await.unwrap().channel_id, 1);
    }
}
