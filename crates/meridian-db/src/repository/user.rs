//! # User Repository
//!
//! Back-office accounts. Passwords arrive here already hashed.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use meridian_core::{NewContact, Page, User};

const USER_COLUMNS: &str = "user_id, username, password_hash, full_name, role, contact_id, created_at";

/// Account fields with the password already hashed.
#[derive(Debug, Clone)]
pub struct UserRecord<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub full_name: Option<&'a str>,
    pub role: Option<&'a str>,
    pub contact_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn list(&self, page: Page) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY user_id LIMIT ?1 OFFSET ?2"
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn get(&self, user_id: i64) -> DbResult<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("User", user_id))
    }

    /// `None` when no account has that name.
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// ## Errors
    /// * `UniqueViolation` - username taken
    /// * `NotFound` - linked contact does not exist
    pub async fn create(&self, record: &UserRecord<'_>) -> DbResult<User> {
        let user = insert_user(&self.pool, record).await?;
        info!(user_id = user.user_id, username = %user.username, "User created");
        Ok(user)
    }

    /// Creates a user together with the contact it acts through, in one
    /// transaction.
    pub async fn create_with_contact(&self, record: &UserRecord<'_>, contact: &NewContact) -> DbResult<User> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let contact_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO contacts (
                name, role, contact_info, avatar_url, status, remark, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            RETURNING contact_id
            "#,
        )
        .bind(&contact.name)
        .bind(&contact.role)
        .bind(&contact.contact_info)
        .bind(&contact.avatar_url)
        .bind(&contact.status)
        .bind(&contact.remark)
        .bind(contact.is_active)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let linked = UserRecord {
            contact_id: Some(contact_id),
            ..record.clone()
        };
        let user = insert_user(&mut *tx, &linked).await?;

        tx.commit().await?;

        info!(
            user_id = user.user_id,
            contact_id,
            username = %user.username,
            "User created with contact"
        );
        Ok(user)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn insert_user<'e, E>(executor: E, record: &UserRecord<'_>) -> DbResult<User>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (username, password_hash, full_name, role, contact_id, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(record.username)
    .bind(record.password_hash)
    .bind(record.full_name)
    .bind(record.role)
    .bind(record.contact_id)
    .bind(Utc::now())
    .fetch_one(executor)
    .await
    .map_err(|e| {
        let err = DbError::from(e);
        if err.is_unique_on("users.username") {
            DbError::duplicate("username", record.username)
        } else if err.is_foreign_key() {
            DbError::not_found("Contact", record.contact_id.unwrap_or_default())
        } else {
            err
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use meridian_core::ROLE_ADMIN;

    fn record(username: &str) -> UserRecord<'_> {
        UserRecord {
            username,
            password_hash: "$argon2id$v=19$stub",
            full_name: None,
            role: None,
            contact_id: None,
        }
    }

    #[tokio::test]
    async fn test_username_unique() {
        let db = test_support::db().await;
        let repo = db.users();

        repo.create(&record("dana")).await.unwrap();
        let err = repo.create(&record("dana")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "username"));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_with_contact_links_both() {
        let db = test_support::db().await;
        let repo = db.users();

        let admin = UserRecord {
            role: Some(ROLE_ADMIN),
            ..record("admin")
        };
        let contact = NewContact {
            name: "admin".to_string(),
            role: ROLE_ADMIN.to_string(),
            contact_info: "admin".to_string(),
            avatar_url: None,
            status: "online".to_string(),
            remark: None,
            is_active: true,
        };

        let user = repo.create_with_contact(&admin, &contact).await.unwrap();
        assert!(user.is_superuser());
        let contact_id = user.contact_id.expect("linked");

        let linked = db.communication().get_contact(None, contact_id).await.unwrap();
        assert_eq!(linked.name, "admin");
        assert_eq!(
            repo.find_by_username("admin").await.unwrap().map(|u| u.user_id),
            Some(user.user_id)
        );
    }
}
