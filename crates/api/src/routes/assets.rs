//! Raw asset routes for content that is not bound to a record field.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Multipart, Query, State},
    http::StatusCode,
    routing::post,
};
use serde::Deserialize;
use tracing::info;

use super::resources::DeleteResponse;
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};
use campus_core::asset::{AssetFile, AssetFolder, StoredAsset};

/// Creates asset routes. Every route here mutates storage.
pub fn routes() -> Router<AppState> {
    Router::new().route("/assets", post(upload).delete(remove))
}

/// Parts of a multipart upload form.
#[derive(Debug, Default)]
pub struct UploadForm {
    /// The `file` part.
    pub file: Option<AssetFile>,
    /// The `folder` part.
    pub folder: Option<String>,
}

/// Reads the `file` and `folder` parts; other parts are skipped.
pub async fn read_file(mut multipart: Multipart) -> ApiResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let payload = field.bytes().await?;
                form.file = Some(AssetFile {
                    payload,
                    file_name,
                    content_type,
                });
            }
            Some("folder") => form.folder = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(form)
}

/// `POST /assets`: multipart `file` + `folder`.
async fn upload(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<StoredAsset>)> {
    let form = read_file(multipart).await?;
    let folder = form
        .folder
        .ok_or_else(|| ApiError::validation("multipart field 'folder' is required"))?;
    let folder = AssetFolder::from_str(&folder)?;
    let file = form
        .file
        .ok_or_else(|| ApiError::validation("multipart field 'file' is required"))?;

    let stored = state
        .resources
        .assets()
        .upload(file.into_upload(folder))
        .await?;

    info!(key = %stored.key, subject = user.subject(), "Asset uploaded");
    Ok((StatusCode::CREATED, Json(stored)))
}

#[derive(Debug, Deserialize)]
struct KeyQuery {
    key: Option<String>,
}

/// `DELETE /assets?key=`: accepts a storage key or a public URL.
async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<KeyQuery>,
) -> ApiResult<Json<DeleteResponse>> {
    let reference = query
        .key
        .ok_or_else(|| ApiError::validation("'key' query parameter is required"))?;
    let assets = state.resources.assets();
    let key = assets
        .resolve_key(&reference)
        .ok_or_else(|| ApiError::validation(format!("'{reference}' is not a managed asset")))?;

    assets.delete(&key).await?;

    info!(key = %key, subject = user.subject(), "Asset deleted");
    Ok(Json(DeleteResponse { success: true }))
}
