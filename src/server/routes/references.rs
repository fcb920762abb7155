//! Client references: public reads, admin writes.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{check_len, extract::json_with_file, require};
use crate::db::models::DbReference;
use crate::db::patch::{RecordPatch, ReferenceCreate, ReferencePatch};
use crate::error::CmsError;
use crate::server::guards::auth::RequireAdmin;
use crate::server::router::AppState;
use crate::storage::LOGOS_DIR;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceResponse {
    pub id: Uuid,
    pub name: String,
    pub website_url: Option<String>,
    pub logo_url: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
}

impl From<DbReference> for ReferenceResponse {
    fn from(row: DbReference) -> Self {
        Self {
            id: row.id,
            name: row.name,
            website_url: row.website_url,
            logo_url: row.logo_url,
            industry: row.industry,
            description: row.description,
            display_order: row.display_order,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceCreateRequest {
    pub name: Option<String>,
    pub website_url: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i64>,
}

impl ReferenceCreateRequest {
    fn validate(&self) -> Result<(), CmsError> {
        require("Name", self.name.as_deref())?;
        check_len("Name", self.name.as_deref(), 255)?;
        check_len("Website URL", self.website_url.as_deref(), 500)?;
        check_len("Industry", self.industry.as_deref(), 100)?;
        check_len("Description", self.description.as_deref(), 500)?;
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceUpdateRequest {
    pub name: Option<String>,
    pub website_url: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i64>,
}

impl ReferenceUpdateRequest {
    fn validate(&self) -> Result<(), CmsError> {
        check_len("Name", self.name.as_deref(), 255)?;
        check_len("Website URL", self.website_url.as_deref(), 500)?;
        check_len("Industry", self.industry.as_deref(), 100)?;
        check_len("Description", self.description.as_deref(), 500)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub industry: Option<String>,
}

async fn list_references(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ReferenceResponse>>, CmsError> {
    let industry = params.industry.filter(|tag| !tag.trim().is_empty());
    let rows = state.db.list_references(industry).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

async fn get_reference(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReferenceResponse>, CmsError> {
    let row = state.db.get_reference(id).await?;
    Ok(Json(row.into()))
}

async fn create_reference(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ReferenceResponse>), CmsError> {
    let (request, logo) = json_with_file::<ReferenceCreateRequest>(multipart, "logo").await?;
    request.validate()?;

    let logo_url = match logo {
        Some(file) => {
            let relative = state.store.store(&file, LOGOS_DIR).await?;
            Some(state.store.public_url(&relative))
        }
        None => None,
    };

    let row = state
        .db
        .create_reference(ReferenceCreate {
            name: request.name.unwrap_or_default(),
            website_url: request.website_url,
            logo_url,
            industry: request.industry,
            description: request.description,
            display_order: request.display_order,
        })
        .await?;

    info!(name = %row.name, id = %row.id, "created reference");

    Ok((StatusCode::CREATED, Json(row.into())))
}

async fn update_reference(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ReferenceResponse>, CmsError> {
    let (request, logo) = json_with_file::<ReferenceUpdateRequest>(multipart, "logo").await?;
    request.validate()?;

    let existing = state.db.get_reference(id).await?;

    let mut patch = ReferencePatch {
        name: request.name,
        website_url: request.website_url,
        logo_url: None,
        industry: request.industry,
        description: request.description,
        display_order: request.display_order,
    };

    if let Some(file) = logo {
        if let Some(old_logo) = existing.logo_url.as_deref() {
            state.store.delete(old_logo).await;
        }
        let relative = state.store.store(&file, LOGOS_DIR).await?;
        patch.logo_url = Some(state.store.public_url(&relative));
    }

    state.db.patch(RecordPatch::Reference { id, patch }).await?;

    let updated = state.db.get_reference(id).await?;
    info!(name = %updated.name, id = %updated.id, "updated reference");

    Ok(Json(updated.into()))
}

async fn delete_reference(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CmsError> {
    let existing = state.db.get_reference(id).await?;

    if let Some(logo_url) = existing.logo_url.as_deref() {
        state.store.delete(logo_url).await;
    }

    state.db.delete_reference(id).await?;
    info!(name = %existing.name, id = %existing.id, "deleted reference");

    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/references",
            get(list_references).post(create_reference),
        )
        .route(
            "/api/references/{id}",
            get(get_reference)
                .put(update_reference)
                .delete(delete_reference),
        )
}
