//! Contact form: public submission (with optional attachment), admin-only
//! message management.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{check_email, check_len, extract::json_with_file, require};
use crate::db::models::DbContactMessage;
use crate::db::patch::ContactMessageCreate;
use crate::error::CmsError;
use crate::server::guards::auth::RequireAdmin;
use crate::server::router::AppState;
use crate::storage::ATTACHMENTS_DIR;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessageResponse {
    pub id: Uuid,
    pub name: String,
    pub company: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub attachment_url: Option<String>,
    pub attachment_filename: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DbContactMessage> for ContactMessageResponse {
    fn from(row: DbContactMessage) -> Self {
        Self {
            id: row.id,
            name: row.name,
            company: row.company,
            email: row.email,
            phone: row.phone,
            message: row.message,
            attachment_url: row.attachment_url,
            attachment_filename: row.attachment_filename,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}

/// What an anonymous submitter gets back; the stored record itself is
/// admin-only.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub reference_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactCreateRequest {
    pub name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

impl ContactCreateRequest {
    fn validate(&self) -> Result<(), CmsError> {
        require("Name", self.name.as_deref())?;
        check_len("Name", self.name.as_deref(), 255)?;
        check_len("Company", self.company.as_deref(), 255)?;

        require("Email", self.email.as_deref())?;
        check_len("Email", self.email.as_deref(), 255)?;
        check_email(self.email.as_deref().unwrap_or_default())?;

        check_len("Phone", self.phone.as_deref(), 50)?;

        require("Message", self.message.as_deref())?;
        let message_len = self.message.as_deref().unwrap_or_default().chars().count();
        if !(10..=2000).contains(&message_len) {
            return Err(CmsError::Validation(
                "Message must be between 10 and 2000 characters".to_string(),
            ));
        }

        Ok(())
    }
}

async fn submit_contact_message(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SubmitResponse>), CmsError> {
    let (request, attachment) =
        json_with_file::<ContactCreateRequest>(multipart, "attachment").await?;
    request.validate()?;

    let mut attachment_url = None;
    let mut attachment_filename = None;
    if let Some(file) = attachment {
        let relative = state.store.store(&file, ATTACHMENTS_DIR).await?;
        attachment_url = Some(state.store.public_url(&relative));
        attachment_filename = Some(file.filename);
    }

    let row = state
        .db
        .create_contact_message(ContactMessageCreate {
            name: request.name.unwrap_or_default(),
            company: request.company,
            email: request.email.unwrap_or_default(),
            phone: request.phone,
            message: request.message.unwrap_or_default(),
            attachment_url,
            attachment_filename,
        })
        .await?;

    info!(name = %row.name, email = %row.email, id = %row.id, "received contact message");

    let attachment_path = row
        .attachment_url
        .as_deref()
        .and_then(|url| state.store.resolve(url).ok());
    state
        .mailer
        .spawn_contact_notification(row.clone(), attachment_path);

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            success: true,
            message: "Thank you for your message. We will get back to you within 24 hours."
                .to_string(),
            reference_id: row.id,
        }),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesParams {
    pub unread_only: Option<bool>,
}

async fn list_messages(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Query(params): Query<MessagesParams>,
) -> Result<Json<Vec<ContactMessageResponse>>, CmsError> {
    let rows = state
        .db
        .list_contact_messages(params.unread_only.unwrap_or(false))
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

async fn unread_count(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<UnreadCountResponse>, CmsError> {
    let unread_count = state.db.count_unread_messages().await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

async fn get_message(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ContactMessageResponse>, CmsError> {
    let row = state.db.get_contact_message(id).await?;
    Ok(Json(row.into()))
}

async fn mark_message_read(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CmsError> {
    state.db.mark_message_read(id).await?;
    info!(%id, "marked message as read");
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_message(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CmsError> {
    let existing = state.db.get_contact_message(id).await?;

    if let Some(attachment_url) = existing.attachment_url.as_deref() {
        state.store.delete(attachment_url).await;
    }

    state.db.delete_contact_message(id).await?;
    info!(%id, "deleted message");

    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/contact", post(submit_contact_message))
        .route("/api/contact/messages", get(list_messages))
        .route("/api/contact/messages/unread-count", get(unread_count))
        .route(
            "/api/contact/messages/{id}",
            get(get_message).delete(delete_message),
        )
        .route("/api/contact/messages/{id}/read", patch(mark_message_read))
}
