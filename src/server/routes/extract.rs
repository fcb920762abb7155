//! Shared multipart extraction for the create/update/submit endpoints.
//!
//! Every upload-carrying endpoint takes a `data` part (JSON payload) plus at
//! most one named file part; unknown parts are skipped.

use axum::extract::Multipart;
use serde::de::DeserializeOwned;

use crate::error::CmsError;
use crate::storage::UploadFile;

/// Read the `data` JSON part and the file part named `file_field`.
///
/// A file part with no bytes (an empty form selection) is reported as
/// absent, so optional-file endpoints treat it as "no file supplied".
pub async fn json_with_file<T: DeserializeOwned>(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<(T, Option<UploadFile>), CmsError> {
    let mut data: Option<T> = None;
    let mut file: Option<UploadFile> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("data") => {
                let text = field.text().await?;
                data = Some(serde_json::from_str(&text)?);
            }
            Some(name) if name == file_field => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(ToString::to_string);
                let bytes = field.bytes().await?.to_vec();
                if !bytes.is_empty() {
                    file = Some(UploadFile {
                        filename,
                        content_type,
                        bytes,
                    });
                }
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| CmsError::Validation("Missing 'data' part".to_string()))?;
    Ok((data, file))
}
