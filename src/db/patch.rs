use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceCreate {
    pub name: String,
    pub website_url: Option<String>,
    pub logo_url: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryItemCreate {
    pub title: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessageCreate {
    pub name: String,
    pub company: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub attachment_url: Option<String>,
    pub attachment_filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferencePatch {
    /// `None` => do not change; `Some(v)` => update
    pub name: Option<String>,
    pub website_url: Option<String>,
    /// `None` => do not change; `Some(v)` => update
    pub logo_url: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GalleryItemPatch {
    /// `None` => do not change; `Some(v)` => update
    pub title: Option<String>,
    pub image_url: Option<String>,
    /// `None` => do not change; `Some(v)` => update
    pub thumbnail_url: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum RecordPatch {
    Reference { id: Uuid, patch: ReferencePatch },
    GalleryItem { id: Uuid, patch: GalleryItemPatch },
}

impl RecordPatch {
    pub fn id(&self) -> Uuid {
        match self {
            RecordPatch::Reference { id, .. } | RecordPatch::GalleryItem { id, .. } => *id,
        }
    }
}
