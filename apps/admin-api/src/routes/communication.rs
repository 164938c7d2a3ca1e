//! Internal messaging: contacts, conversations, templates, quick replies.
//!
//! Messages are sent and read as the contact linked to the caller's account
//! ([`ContactUser`]); accounts without one get 403 on those routes.

use axum::extract::State;
use serde::Deserialize;

use meridian_core::validation::{validate_new_contact, validate_new_message, validate_page, validate_text};
use meridian_core::{
    Contact, ContactFilter, ContactList, ContactUpdate, Message, MessageTemplate, NewContact,
    NewMessage, NewMessageTemplate, NewQuickReply, Page, QuickReply,
};

use crate::auth::{ContactUser, CurrentUser};
use crate::error::ApiResult;
use crate::extract::{Json, Path, Query};
use crate::routes::MessageResponse;
use crate::state::AppState;

// =============================================================================
// Contacts
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ContactQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_contact_limit")]
    pub limit: i64,
    pub search: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

fn default_contact_limit() -> i64 {
    100
}

/// Active contacts; unread counts are relative to the caller's contact.
pub async fn list_contacts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ContactQuery>,
) -> ApiResult<Json<ContactList>> {
    let page = Page::new(query.skip, query.limit);
    validate_page(page)?;

    let filter = ContactFilter {
        search: query.search.filter(|s| !s.trim().is_empty()),
        role: query.role.filter(|s| !s.is_empty()),
        status: query.status.filter(|s| !s.is_empty()),
        page,
    };

    Ok(Json(state.db.communication().list_contacts(user.contact_id, &filter).await?))
}

/// 409 when a contact with the same name or contact info exists.
pub async fn create_contact(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Json(new): Json<NewContact>,
) -> ApiResult<Json<Contact>> {
    validate_new_contact(&new)?;
    Ok(Json(state.db.communication().create_contact(&new).await?))
}

pub async fn update_contact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(contact_id): Path<i64>,
    Json(changes): Json<ContactUpdate>,
) -> ApiResult<Json<Contact>> {
    if let Some(name) = &changes.name {
        validate_text("name", name, 100)?;
    }
    let contact = state
        .db
        .communication()
        .update_contact(user.contact_id, contact_id, &changes)
        .await?;
    Ok(Json(contact))
}

/// Soft delete. Messages to and from the contact stay readable.
pub async fn delete_contact(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(contact_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.db.communication().deactivate_contact(contact_id).await?;
    Ok(Json(MessageResponse::new("Contact deleted")))
}

// =============================================================================
// Messages
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_message_limit")]
    pub limit: i64,
}

fn default_message_limit() -> i64 {
    50
}

/// `GET /communication/messages/{contact_id}`: oldest first. Marks what the
/// other side sent as read.
pub async fn conversation(
    State(state): State<AppState>,
    me: ContactUser,
    Path(other): Path<i64>,
    Query(query): Query<ConversationQuery>,
) -> ApiResult<Json<Vec<Message>>> {
    let page = Page::new(query.skip, query.limit);
    validate_page(page)?;

    let messages = state
        .db
        .communication()
        .conversation(me.contact_id, other, page)
        .await?;
    Ok(Json(messages))
}

/// 404 when the receiver is unknown or inactive.
pub async fn send_message(
    State(state): State<AppState>,
    me: ContactUser,
    Json(new): Json<NewMessage>,
) -> ApiResult<Json<Message>> {
    validate_new_message(&new)?;
    Ok(Json(state.db.communication().send_message(me.contact_id, &new).await?))
}

pub async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(message_id): Path<i64>,
) -> ApiResult<Json<Message>> {
    Ok(Json(state.db.communication().mark_read(message_id).await?))
}

// =============================================================================
// Templates & Quick Replies
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_template_limit")]
    pub limit: i64,
    pub category: Option<String>,
}

fn default_template_limit() -> i64 {
    50
}

pub async fn list_templates(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Query(query): Query<TemplateQuery>,
) -> ApiResult<Json<Vec<MessageTemplate>>> {
    let page = Page::new(query.skip, query.limit);
    validate_page(page)?;

    let category = query.category.as_deref().filter(|c| !c.is_empty());
    Ok(Json(state.db.communication().list_templates(category, page).await?))
}

/// `created_by` defaults to the caller's contact.
pub async fn create_template(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(mut new): Json<NewMessageTemplate>,
) -> ApiResult<Json<MessageTemplate>> {
    validate_text("title", &new.title, 100)?;
    validate_text("content", &new.content, 10_000)?;
    if new.created_by.is_none() {
        new.created_by = user.contact_id;
    }

    Ok(Json(state.db.communication().create_template(&new).await?))
}

#[derive(Debug, Deserialize)]
pub struct QuickReplyQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_reply_limit")]
    pub limit: i64,
}

fn default_reply_limit() -> i64 {
    20
}

pub async fn list_quick_replies(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Query(query): Query<QuickReplyQuery>,
) -> ApiResult<Json<Vec<QuickReply>>> {
    let page = Page::new(query.skip, query.limit);
    validate_page(page)?;
    Ok(Json(state.db.communication().list_quick_replies(page).await?))
}

pub async fn create_quick_reply(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Json(new): Json<NewQuickReply>,
) -> ApiResult<Json<QuickReply>> {
    validate_text("text", &new.text, 200)?;
    Ok(Json(state.db.communication().create_quick_reply(&new).await?))
}
