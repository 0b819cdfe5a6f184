//! Admin file uploads.
//!
//! Images are written under `UPLOAD_DIR/{thumbnails,avatars}/` and served
//! back from `/uploads/...`. Game uploads are not stored: the HTML is
//! returned so the admin can save it as the game's inline content.

use std::path::Path;
use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use serde::Serialize;
use uuid::Uuid;

use super::ApiMultipart;
use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Largest accepted upload (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10_485_760;

/// Multipart field carrying the file.
const FILE_FIELD: &str = "file";

/// Extension used when the original name has none worth keeping.
const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// Where an uploaded image goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Game card image.
    Thumbnail,
    /// Store avatar image.
    Avatar,
}

impl ImageKind {
    /// Sub-directory of the upload root.
    pub const fn folder(self) -> &'static str {
        match self {
            Self::Thumbnail => "thumbnails",
            Self::Avatar => "avatars",
        }
    }

    const fn prefix(self) -> &'static str {
        match self {
            Self::Thumbnail => "thumb",
            Self::Avatar => "avatar",
        }
    }
}

/// Body returned for image uploads.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Public URL of the stored image.
    pub url: String,
}

/// Body returned for game uploads.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameUploadResponse {
    /// The uploaded document, decoded as UTF-8.
    pub html_content: String,
}

struct UploadedFile {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

fn too_large() -> ApiError {
    ApiError::PayloadTooLarge(String::from("File too large"))
}

/// Pull the `file` field out of the form.
async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await?;
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(too_large());
        }
        return Ok(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }
    Err(ApiError::Validation(String::from("No file uploaded")))
}

/// Lowercase alphanumeric extension of `file_name`, or the default.
pub fn image_extension(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_owned())
}

async fn write_image(
    upload_dir: &Path,
    kind: ImageKind,
    file: &UploadedFile,
) -> Result<String, ApiError> {
    let is_image = file
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("image/"));
    if !is_image {
        return Err(ApiError::Validation(String::from(
            "Only image files are allowed",
        )));
    }

    let file_name = format!(
        "{}-{}-{}.{}",
        kind.prefix(),
        chrono::Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        image_extension(file.file_name.as_deref()),
    );
    let dir = upload_dir.join(kind.folder());
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ApiError::Internal(format!("create {}: {e}", dir.display())))?;
    let path = dir.join(&file_name);
    tokio::fs::write(&path, &file.bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("write {}: {e}", path.display())))?;

    tracing::info!(
        path = %path.display(),
        bytes = file.bytes.len(),
        "Image uploaded"
    );
    Ok(format!("/uploads/{}/{file_name}", kind.folder()))
}

async fn upload_image(
    state: &AppState,
    mut multipart: Multipart,
    kind: ImageKind,
) -> Result<Json<UploadResponse>, ApiError> {
    let file = read_file_field(&mut multipart).await?;
    let url = write_image(&state.config.upload_dir, kind, &file).await?;
    Ok(Json(UploadResponse { url }))
}

/// `POST /api/admin/upload/thumbnail`
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<impl IntoResponse, ApiError> {
    upload_image(&state, multipart, ImageKind::Thumbnail).await
}

/// `POST /api/admin/upload/avatar`
pub async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<impl IntoResponse, ApiError> {
    upload_image(&state, multipart, ImageKind::Avatar).await
}

/// `POST /api/admin/upload/game` -- return the uploaded HTML document.
pub async fn upload_game(
    _admin: AdminUser,
    ApiMultipart(mut multipart): ApiMultipart,
) -> Result<impl IntoResponse, ApiError> {
    let file = read_file_field(&mut multipart).await?;
    if file.bytes.is_empty() {
        return Err(ApiError::Validation(String::from("Uploaded file is empty")));
    }
    Ok(Json(GameUploadResponse {
        html_content: String::from_utf8_lossy(&file.bytes).into_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_sanitised() {
        assert_eq!(image_extension(Some("cat.PNG")), "png");
        assert_eq!(image_extension(Some("archive.tar.gz")), "gz");
        assert_eq!(image_extension(Some("no-extension")), "png");
        assert_eq!(image_extension(Some("evil.p/h")), "png");
        assert_eq!(image_extension(Some("trailing.")), "png");
        assert_eq!(image_extension(None), "png");
    }

    #[test]
    fn folders() {
        assert_eq!(ImageKind::Thumbnail.folder(), "thumbnails");
        assert_eq!(ImageKind::Avatar.folder(), "avatars");
    }
}
