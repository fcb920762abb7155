//! RecordPatch -> DbPatchable implementation.
//!
//! This sits in the `db` module because it contains SQL/table knowledge.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use crate::db::patch::{GalleryItemPatch, RecordPatch, ReferencePatch};
use crate::db::traits::DbPatchable;
use crate::error::CmsError;

#[async_trait]
impl DbPatchable for RecordPatch {
    async fn apply_patch(&self, pool: &SqlitePool) -> Result<(), CmsError> {
        match self {
            RecordPatch::Reference { id, patch } => {
                let ReferencePatch {
                    name,
                    website_url,
                    logo_url,
                    industry,
                    description,
                    display_order,
                } = patch.clone();

                let name_set = name.is_some();
                let website_url_set = website_url.is_some();
                let logo_url_set = logo_url.is_some();
                let industry_set = industry.is_some();
                let description_set = description.is_some();
                let display_order_set = display_order.is_some();

                // Use the bind query API so we don't have to keep SQLx's
                // offline cache in sync.
                let res = sqlx::query(
                    r#"
                    UPDATE client_references
                    SET
                        name = COALESCE(?, name),
                        website_url = COALESCE(?, website_url),
                        logo_url = COALESCE(?, logo_url),
                        industry = COALESCE(?, industry),
                        description = COALESCE(?, description),
                        display_order = COALESCE(?, display_order)
                    WHERE id = ?
                    "#,
                )
                .bind(name)
                .bind(website_url)
                .bind(logo_url)
                .bind(industry)
                .bind(description)
                .bind(display_order)
                .bind(id)
                .execute(pool)
                .await?;

                let affected = res.rows_affected();
                debug!(
                    entity = "client_reference",
                    %id,
                    affected,
                    name_set,
                    website_url_set,
                    logo_url_set,
                    industry_set,
                    description_set,
                    display_order_set,
                    "db patch applied"
                );

                if affected == 0 {
                    return Err(CmsError::NotFound(format!(
                        "Reference not found with id: {id}"
                    )));
                }

                Ok(())
            }

            RecordPatch::GalleryItem { id, patch } => {
                let GalleryItemPatch {
                    title,
                    image_url,
                    thumbnail_url,
                    category,
                    description,
                    display_order,
                } = patch.clone();

                let title_set = title.is_some();
                let image_url_set = image_url.is_some();
                let thumbnail_url_set = thumbnail_url.is_some();
                let category_set = category.is_some();
                let description_set = description.is_some();
                let display_order_set = display_order.is_some();

                let res = sqlx::query(
                    r#"
                    UPDATE gallery_items
                    SET
                        title = COALESCE(?, title),
                        image_url = COALESCE(?, image_url),
                        thumbnail_url = COALESCE(?, thumbnail_url),
                        category = COALESCE(?, category),
                        description = COALESCE(?, description),
                        display_order = COALESCE(?, display_order)
                    WHERE id = ?
                    "#,
                )
                .bind(title)
                .bind(image_url)
                .bind(thumbnail_url)
                .bind(category)
                .bind(description)
                .bind(display_order)
                .bind(id)
                .execute(pool)
                .await?;

                let affected = res.rows_affected();
                debug!(
                    entity = "gallery_item",
                    %id,
                    affected,
                    title_set,
                    image_url_set,
                    thumbnail_url_set,
                    category_set,
                    description_set,
                    display_order_set,
                    "db patch applied"
                );

                if affected == 0 {
                    return Err(CmsError::NotFound(format!(
                        "Gallery item not found with id: {id}"
                    )));
                }

                Ok(())
            }
        }
    }
}
