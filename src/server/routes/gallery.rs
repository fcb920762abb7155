//! Production gallery: public reads, admin writes. An image is mandatory on
//! create; the thumbnail reference always mirrors the image reference.

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
use crate::db::models::DbGalleryItem;
use crate::db::patch::{GalleryItemCreate, GalleryItemPatch, RecordPatch};
use crate::error::CmsError;
use crate::server::guards::auth::RequireAdmin;
use crate::server::router::AppState;
use crate::storage::GALLERY_DIR;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItemResponse {
    pub id: Uuid,
    pub title: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
}

impl From<DbGalleryItem> for GalleryItemResponse {
    fn from(row: DbGalleryItem) -> Self {
        Self {
            id: row.id,
            title: row.title,
            image_url: row.image_url,
            thumbnail_url: row.thumbnail_url,
            category: row.category,
            description: row.description,
            display_order: row.display_order,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryCreateRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i64>,
}

impl GalleryCreateRequest {
    fn validate(&self) -> Result<(), CmsError> {
        require("Title", self.title.as_deref())?;
        check_len("Title", self.title.as_deref(), 255)?;
        check_len("Category", self.category.as_deref(), 50)?;
        check_len("Description", self.description.as_deref(), 500)?;
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryUpdateRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i64>,
}

impl GalleryUpdateRequest {
    fn validate(&self) -> Result<(), CmsError> {
        check_len("Title", self.title.as_deref(), 255)?;
        check_len("Category", self.category.as_deref(), 50)?;
        check_len("Description", self.description.as_deref(), 500)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
}

async fn list_gallery_items(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<GalleryItemResponse>>, CmsError> {
    let category = params.category.filter(|tag| !tag.trim().is_empty());
    let rows = state.db.list_gallery_items(category).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

async fn get_gallery_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GalleryItemResponse>, CmsError> {
    let row = state.db.get_gallery_item(id).await?;
    Ok(Json(row.into()))
}

async fn create_gallery_item(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    multipart: Multipart,
) -> Result<(StatusCode, Json<GalleryItemResponse>), CmsError> {
    let (request, image) = json_with_file::<GalleryCreateRequest>(multipart, "image").await?;
    request.validate()?;

    let Some(image) = image else {
        return Err(CmsError::Validation(
            "Image is required for gallery item".to_string(),
        ));
    };

    let relative = state.store.store(&image, GALLERY_DIR).await?;
    let image_url = state.store.public_url(&relative);

    let row = state
        .db
        .create_gallery_item(GalleryItemCreate {
            title: request.title.unwrap_or_default(),
            // No thumbnail pipeline: the full image doubles as its thumbnail.
            thumbnail_url: image_url.clone(),
            image_url,
            category: request.category,
            description: request.description,
            display_order: request.display_order,
        })
        .await?;

    info!(title = %row.title, id = %row.id, "created gallery item");

    Ok((StatusCode::CREATED, Json(row.into())))
}

async fn update_gallery_item(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<GalleryItemResponse>, CmsError> {
    let (request, image) = json_with_file::<GalleryUpdateRequest>(multipart, "image").await?;
    request.validate()?;

    let existing = state.db.get_gallery_item(id).await?;

    let mut patch = GalleryItemPatch {
        title: request.title,
        image_url: None,
        thumbnail_url: None,
        category: request.category,
        description: request.description,
        display_order: request.display_order,
    };

    if let Some(file) = image {
        state.store.delete(&existing.image_url).await;
        let relative = state.store.store(&file, GALLERY_DIR).await?;
        let image_url = state.store.public_url(&relative);
        patch.thumbnail_url = Some(image_url.clone());
        patch.image_url = Some(image_url);
    }

    state
        .db
        .patch(RecordPatch::GalleryItem { id, patch })
        .await?;

    let updated = state.db.get_gallery_item(id).await?;
    info!(title = %updated.title, id = %updated.id, "updated gallery item");

    Ok(Json(updated.into()))
}

async fn delete_gallery_item(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CmsError> {
    let existing = state.db.get_gallery_item(id).await?;

    state.store.delete(&existing.image_url).await;
    // The thumbnail usually aliases the image; only a distinct reference
    // owns a second file.
    if existing.thumbnail_url != existing.image_url {
        state.store.delete(&existing.thumbnail_url).await;
    }

    state.db.delete_gallery_item(id).await?;
    info!(title = %existing.title, id = %existing.id, "deleted gallery item");

    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/gallery",
            get(list_gallery_items).post(create_gallery_item),
        )
        .route(
            "/api/gallery/{id}",
            get(get_gallery_item)
                .put(update_gallery_item)
                .delete(delete_gallery_item),
        )
}
