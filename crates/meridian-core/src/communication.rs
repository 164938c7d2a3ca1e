//! # Communication Types
//!
//! Internal messaging between back-office staff and their counterparts at
//! channels, suppliers and customers.
//!
//! Every account acts through a [`Contact`]: the signed-in user's
//! `contact_id` is the sender of everything they send and the reader whose
//! unread counts the contact list shows. Contacts are never deleted, only
//! deactivated, so old conversations keep both ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Page;

// =============================================================================
// Contact
// =============================================================================

/// Someone messages can be exchanged with.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Contact {
    pub contact_id: i64,
    pub name: String,
    /// admin / channel / supplier / customer
    pub role: String,
    /// Phone number, email, handle...
    pub contact_info: String,
    pub avatar_url: Option<String>,
    /// online / offline / busy
    pub status: String,
    pub remark: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Messages from this contact the caller has not read yet.
    pub unread_count: i64,
}

fn default_presence() -> String {
    "offline".to_string()
}

fn default_true() -> bool {
    true
}

fn default_message_type() -> String {
    "text".to_string()
}

/// Body of `POST /communication/contacts`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewContact {
    pub name: String,
    pub role: String,
    pub contact_info: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default = "default_presence")]
    pub status: String,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Body of `PUT /communication/contacts/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContactUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Filters of the contact listing. Inactive contacts are always excluded.
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    /// Substring of name or contact info.
    pub search: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub page: Page,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContactList {
    pub contacts: Vec<Contact>,
    pub total: i64,
}

// =============================================================================
// Message
// =============================================================================

/// A message with both ends' display names resolved.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Message {
    pub message_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub message_content: String,
    /// text / file / image
    pub message_type: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub is_read: bool,
    #[ts(as = "String")]
    pub sent_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub read_at: Option<DateTime<Utc>>,
    /// sent / delivered / read
    pub status: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub sender_name: Option<String>,
    pub sender_avatar: Option<String>,
    pub receiver_name: Option<String>,
}

/// Body of `POST /communication/messages`. The sender is the caller.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewMessage {
    pub receiver_id: i64,
    pub message_content: String,
    #[serde(default = "default_message_type")]
    pub message_type: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

// =============================================================================
// Templates & Quick Replies
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct MessageTemplate {
    pub template_id: i64,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub usage_count: i64,
    pub is_active: bool,
    pub created_by: Option<i64>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewMessageTemplate {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Defaults to the caller's contact.
    #[serde(default)]
    pub created_by: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct QuickReply {
    pub reply_id: i64,
    pub text: String,
    pub sort_order: i64,
    pub usage_count: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewQuickReply {
    pub text: String,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}
