//! # Communication Repository
//!
//! Contacts, messages between contacts, message templates and quick replies.
//!
//! Methods that depend on who is asking take the caller's `contact_id`
//! (`me` / `viewer`). Unread counts are computed per viewer: messages the
//! listed contact sent to the viewer that the viewer has not read.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::like_pattern;
use meridian_core::{
    Contact, ContactFilter, ContactList, ContactUpdate, Message, MessageTemplate, NewContact,
    NewMessage, NewMessageTemplate, NewQuickReply, Page, QuickReply,
};

/// Contact columns plus the unread count of the viewer bound at `viewer`
/// (a placeholder such as `?4`).
fn select_contact(viewer: &str) -> String {
    format!(
        r#"
        SELECT c.contact_id, c.name, c.role, c.contact_info, c.avatar_url, c.status,
               c.remark, c.is_active, c.created_at, c.updated_at,
               (SELECT COUNT(*) FROM communication_messages m
                 WHERE m.sender_id = c.contact_id
                   AND m.receiver_id = {viewer}
                   AND m.is_read = 0) AS unread_count
        FROM contacts c
        "#
    )
}

const SELECT_MESSAGE: &str = r#"
    SELECT m.message_id, m.sender_id, m.receiver_id, m.message_content, m.message_type,
           m.file_url, m.file_name, m.is_read, m.sent_at, m.read_at, m.status, m.created_at,
           s.name AS sender_name, s.avatar_url AS sender_avatar, r.name AS receiver_name
    FROM communication_messages m
    LEFT JOIN contacts s ON s.contact_id = m.sender_id
    LEFT JOIN contacts r ON r.contact_id = m.receiver_id
"#;

const TEMPLATE_COLUMNS: &str = "template_id, title, content, category, usage_count, is_active, \
                                created_by, created_at, updated_at";

const REPLY_COLUMNS: &str =
    "reply_id, text, sort_order, usage_count, is_active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CommunicationRepository {
    pool: SqlitePool,
}

impl CommunicationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CommunicationRepository { pool }
    }

    // =========================================================================
    // Contacts
    // =========================================================================

    /// Active contacts matching the filter, newest first.
    pub async fn list_contacts(&self, viewer: Option<i64>, filter: &ContactFilter) -> DbResult<ContactList> {
        let search = filter.search.as_deref().map(like_pattern);

        const WHERE: &str = r#"
            WHERE c.is_active = 1
              AND (?1 IS NULL OR c.name LIKE ?1 ESCAPE '\' OR c.contact_info LIKE ?1 ESCAPE '\')
              AND (?2 IS NULL OR c.role = ?2)
              AND (?3 IS NULL OR c.status = ?3)
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM contacts c {WHERE}"))
            .bind(&search)
            .bind(&filter.role)
            .bind(&filter.status)
            .fetch_one(&self.pool)
            .await?;

        let contacts = sqlx::query_as::<_, Contact>(&format!(
            "{} {WHERE} ORDER BY c.created_at DESC, c.contact_id DESC LIMIT ?5 OFFSET ?6",
            select_contact("?4")
        ))
        .bind(&search)
        .bind(&filter.role)
        .bind(&filter.status)
        .bind(viewer)
        .bind(filter.page.limit)
        .bind(filter.page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(ContactList { contacts, total })
    }

    /// Any contact by id, active or not.
    pub async fn get_contact(&self, viewer: Option<i64>, contact_id: i64) -> DbResult<Contact> {
        sqlx::query_as::<_, Contact>(&format!("{} WHERE c.contact_id = ?1", select_contact("?2")))
            .bind(contact_id)
            .bind(viewer)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Contact", contact_id))
    }

    /// Creates a contact unless one with the same name or the same contact
    /// info exists (active or not).
    ///
    /// The existence check and the insert are one statement, so two racing
    /// creates can't both succeed.
    pub async fn create_contact(&self, new: &NewContact) -> DbResult<Contact> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (
                name, role, contact_info, avatar_url, status, remark, is_active,
                created_at, updated_at
            )
            SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8
            WHERE NOT EXISTS (SELECT 1 FROM contacts WHERE name = ?1 OR contact_info = ?3)
            RETURNING contact_id, name, role, contact_info, avatar_url, status, remark,
                      is_active, created_at, updated_at, 0 AS unread_count
            "#,
        )
        .bind(&new.name)
        .bind(&new.role)
        .bind(&new.contact_info)
        .bind(&new.avatar_url)
        .bind(&new.status)
        .bind(&new.remark)
        .bind(new.is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::duplicate("contact", &new.name))?;

        info!(contact_id = contact.contact_id, name = %contact.name, "Contact created");
        Ok(contact)
    }

    pub async fn update_contact(
        &self,
        viewer: Option<i64>,
        contact_id: i64,
        changes: &ContactUpdate,
    ) -> DbResult<Contact> {
        let result = sqlx::query(
            r#"
            UPDATE contacts SET
                name         = COALESCE(?2, name),
                role         = COALESCE(?3, role),
                contact_info = COALESCE(?4, contact_info),
                avatar_url   = COALESCE(?5, avatar_url),
                status       = COALESCE(?6, status),
                remark       = COALESCE(?7, remark),
                is_active    = COALESCE(?8, is_active),
                updated_at   = ?9
            WHERE contact_id = ?1
            "#,
        )
        .bind(contact_id)
        .bind(&changes.name)
        .bind(&changes.role)
        .bind(&changes.contact_info)
        .bind(&changes.avatar_url)
        .bind(&changes.status)
        .bind(&changes.remark)
        .bind(changes.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Contact", contact_id));
        }

        self.get_contact(viewer, contact_id).await
    }

    /// Soft delete: the contact leaves the listing, its messages stay.
    pub async fn deactivate_contact(&self, contact_id: i64) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE contacts SET is_active = 0, updated_at = ?2 WHERE contact_id = ?1",
        )
        .bind(contact_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Contact", contact_id));
        }

        info!(contact_id, "Contact deactivated");
        Ok(())
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Messages between `me` and `other`, oldest first. Afterwards everything
    /// `other` sent to `me` is marked read.
    ///
    /// The returned page shows read flags as they were before this call.
    pub async fn conversation(&self, me: i64, other: i64, page: Page) -> DbResult<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(&format!(
            r#"
            {SELECT_MESSAGE}
            WHERE (m.sender_id = ?1 AND m.receiver_id = ?2)
               OR (m.sender_id = ?2 AND m.receiver_id = ?1)
            ORDER BY m.sent_at ASC, m.message_id ASC
            LIMIT ?3 OFFSET ?4
            "#
        ))
        .bind(me)
        .bind(other)
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        let marked = sqlx::query(
            r#"
            UPDATE communication_messages
            SET is_read = 1, read_at = ?3, status = 'read'
            WHERE sender_id = ?2 AND receiver_id = ?1 AND is_read = 0
            "#,
        )
        .bind(me)
        .bind(other)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(me, other, marked = marked.rows_affected(), "Conversation read");
        Ok(messages)
    }

    /// Sends a message from `me`.
    ///
    /// ## Errors
    /// * `NotFound` - receiver missing or deactivated
    pub async fn send_message(&self, me: i64, new: &NewMessage) -> DbResult<Message> {
        let receiver_active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM contacts WHERE contact_id = ?1")
                .bind(new.receiver_id)
                .fetch_optional(&self.pool)
                .await?;

        if receiver_active != Some(true) {
            return Err(DbError::not_found("Contact", new.receiver_id));
        }

        let now = Utc::now();

        let message_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO communication_messages (
                sender_id, receiver_id, message_content, message_type,
                file_url, file_name, is_read, sent_at, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, 'sent', ?7)
            RETURNING message_id
            "#,
        )
        .bind(me)
        .bind(new.receiver_id)
        .bind(&new.message_content)
        .bind(&new.message_type)
        .bind(&new.file_url)
        .bind(&new.file_name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::ForeignKeyViolation { .. } => DbError::not_found("Contact", me),
            other => other,
        })?;

        debug!(message_id, from = me, to = new.receiver_id, "Message sent");
        self.get_message(message_id).await
    }

    pub async fn get_message(&self, message_id: i64) -> DbResult<Message> {
        sqlx::query_as::<_, Message>(&format!("{SELECT_MESSAGE} WHERE m.message_id = ?1"))
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Message", message_id))
    }

    pub async fn mark_read(&self, message_id: i64) -> DbResult<Message> {
        let result = sqlx::query(
            r#"
            UPDATE communication_messages
            SET is_read = 1, read_at = COALESCE(read_at, ?2), status = 'read'
            WHERE message_id = ?1
            "#,
        )
        .bind(message_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Message", message_id));
        }

        self.get_message(message_id).await
    }

    // =========================================================================
    // Templates & Quick Replies
    // =========================================================================

    /// Active templates, most used first.
    pub async fn list_templates(&self, category: Option<&str>, page: Page) -> DbResult<Vec<MessageTemplate>> {
        let templates = sqlx::query_as::<_, MessageTemplate>(&format!(
            r#"
            SELECT {TEMPLATE_COLUMNS} FROM message_templates
            WHERE is_active = 1 AND (?1 IS NULL OR category = ?1)
            ORDER BY usage_count DESC, template_id
            LIMIT ?2 OFFSET ?3
            "#
        ))
        .bind(category)
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    pub async fn create_template(&self, new: &NewMessageTemplate) -> DbResult<MessageTemplate> {
        sqlx::query_as::<_, MessageTemplate>(&format!(
            r#"
            INSERT INTO message_templates (
                title, content, category, usage_count, is_active, created_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6, ?6)
            RETURNING {TEMPLATE_COLUMNS}
            "#
        ))
        .bind(&new.title)
        .bind(&new.content)
        .bind(&new.category)
        .bind(new.is_active)
        .bind(new.created_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::ForeignKeyViolation { .. } => {
                DbError::not_found("Contact", new.created_by.unwrap_or_default())
            }
            other => other,
        })
    }

    /// Active quick replies in display order.
    pub async fn list_quick_replies(&self, page: Page) -> DbResult<Vec<QuickReply>> {
        let replies = sqlx::query_as::<_, QuickReply>(&format!(
            r#"
            SELECT {REPLY_COLUMNS} FROM quick_replies
            WHERE is_active = 1
            ORDER BY sort_order ASC, usage_count DESC, reply_id
            LIMIT ?1 OFFSET ?2
            "#
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(replies)
    }

    pub async fn create_quick_reply(&self, new: &NewQuickReply) -> DbResult<QuickReply> {
        let reply = sqlx::query_as::<_, QuickReply>(&format!(
            r#"
            INSERT INTO quick_replies (text, sort_order, usage_count, is_active, created_at, updated_at)
            VALUES (?1, ?2, 0, ?3, ?4, ?4)
            RETURNING {REPLY_COLUMNS}
            "#
        ))
        .bind(&new.text)
        .bind(new.sort_order)
        .bind(new.is_active)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;

    fn contact(name: &str, info: &str) -> NewContact {
        NewContact {
            name: name.to_string(),
            role: "supplier".to_string(),
            contact_info: info.to_string(),
            avatar_url: None,
            status: "offline".to_string(),
            remark: None,
            is_active: true,
        }
    }

    fn text(receiver_id: i64, body: &str) -> NewMessage {
        NewMessage {
            receiver_id,
            message_content: body.to_string(),
            message_type: "text".to_string(),
            file_url: None,
            file_name: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_contact_by_name_or_info() {
        let db = test_support::db().await;
        let repo = db.communication();
        repo.create_contact(&contact("Acme", "acme@example.com")).await.unwrap();

        assert!(matches!(
            repo.create_contact(&contact("Acme", "other@example.com")).await,
            Err(DbError::UniqueViolation { .. })
        ));
        assert!(matches!(
            repo.create_contact(&contact("Other", "acme@example.com")).await,
            Err(DbError::UniqueViolation { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_keep_one_contact() {
        let (_dir, db) = test_support::file_db(8).await;

        let creates: Vec<_> = (0..8)
            .map(|_| {
                let repo = db.communication();
                tokio::spawn(async move {
                    repo.create_contact(&contact("Acme", "acme@example.com"))
                        .await
                })
            })
            .collect();

        let mut created = 0;
        for create in creates {
            match create.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert!(matches!(err, DbError::UniqueViolation { .. }), "{err}"),
            }
        }

        assert_eq!(created, 1);
        let list = db.communication().list_contacts(None, &ContactFilter::default()).await.unwrap();
        assert_eq!(list.total, 1);
    }

    #[tokio::test]
    async fn test_unread_counts_and_conversation_marks_read() {
        let db = test_support::db().await;
        let repo = db.communication();
        let me = repo.create_contact(&contact("Admin", "admin@meridian")).await.unwrap();
        let acme = repo.create_contact(&contact("Acme", "acme@example.com")).await.unwrap();

        repo.send_message(acme.contact_id, &text(me.contact_id, "Restock shipped"))
            .await
            .unwrap();
        repo.send_message(acme.contact_id, &text(me.contact_id, "Tracking 1Z999"))
            .await
            .unwrap();
        repo.send_message(me.contact_id, &text(acme.contact_id, "Thanks"))
            .await
            .unwrap();

        let listed = repo
            .list_contacts(Some(me.contact_id), &ContactFilter::default())
            .await
            .unwrap();
        let acme_row = listed.contacts.iter().find(|c| c.contact_id == acme.contact_id).unwrap();
        assert_eq!(acme_row.unread_count, 2);

        let history = repo
            .conversation(me.contact_id, acme.contact_id, Page::new(0, 50))
            .await
            .unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].message_content, "Restock shipped");
        assert_eq!(history[0].sender_name.as_deref(), Some("Acme"));

        let acme_row = repo.get_contact(Some(me.contact_id), acme.contact_id).await.unwrap();
        assert_eq!(acme_row.unread_count, 0);
    }

    #[tokio::test]
    async fn test_deactivated_contact_hidden_but_history_kept() {
        let db = test_support::db().await;
        let repo = db.communication();
        let me = repo.create_contact(&contact("Admin", "admin@meridian")).await.unwrap();
        let acme = repo.create_contact(&contact("Acme", "acme@example.com")).await.unwrap();
        repo.send_message(me.contact_id, &text(acme.contact_id, "Hello"))
            .await
            .unwrap();

        repo.deactivate_contact(acme.contact_id).await.unwrap();

        let listed = repo.list_contacts(None, &ContactFilter::default()).await.unwrap();
        assert_eq!(listed.total, 1);
        assert!(listed.contacts.iter().all(|c| c.contact_id != acme.contact_id));

        let row = repo.get_contact(None, acme.contact_id).await.unwrap();
        assert!(!row.is_active);

        let history = repo
            .conversation(me.contact_id, acme.contact_id, Page::new(0, 50))
            .await
            .unwrap();
        assert_eq!(history.len(), 1);

        // Inactive receivers cannot get new messages.
        assert!(matches!(
            repo.send_message(me.contact_id, &text(acme.contact_id, "Still there?")).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_templates_and_quick_replies_ordering() {
        let db = test_support::db().await;
        let repo = db.communication();

        for (text, sort_order) in [("Second", 2), ("First", 1)] {
            repo.create_quick_reply(&NewQuickReply {
                text: text.to_string(),
                sort_order,
                is_active: true,
            })
            .await
            .unwrap();
        }
        repo.create_quick_reply(&NewQuickReply {
            text: "Hidden".to_string(),
            sort_order: 0,
            is_active: false,
        })
        .await
        .unwrap();

        let replies = repo.list_quick_replies(Page::new(0, 20)).await.unwrap();
        let texts: Vec<_> = replies.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["First", "Second"]);

        repo.create_template(&NewMessageTemplate {
            title: "Restock".to_string(),
            content: "We are restocking {product}".to_string(),
            category: Some("inventory".to_string()),
            is_active: true,
            created_by: None,
        })
        .await
        .unwrap();

        assert_eq!(repo.list_templates(Some("inventory"), Page::new(0, 50)).await.unwrap().len(), 1);
        assert!(repo.list_templates(Some("billing"), Page::new(0, 50)).await.unwrap().is_empty());
    }
}
