//! File API handlers: uploads, existence checks and confirmed deletions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use super::error::ApiError;
use crate::metrics::{DELETIONS_TOTAL, UPLOAD_BYTES_TOTAL};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// One chunk of an upload
#[derive(Debug, Deserialize)]
pub struct UploadBody {
    pub filename: String,
    /// Base64 payload, optionally as a data URL.
    pub data: String,
    /// Byte offset of this chunk; 0 starts the file over.
    #[serde(default)]
    pub offset: u64,
}

#[derive(Debug, Serialize)]
pub struct PathResponse {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct ExistsParams {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeletionBody {
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct DeletionResponse {
    pub token: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Append one upload chunk to the imports directory.
pub async fn upload_chunk(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UploadBody>,
) -> Result<Json<PathResponse>, ApiError> {
    let bytes = decode_payload(&body.data)?;
    let path = state
        .uploads()
        .append(&body.filename, &bytes, body.offset)
        .await?;

    UPLOAD_BYTES_TOTAL.inc_by(bytes.len() as u64);
    Ok(Json(PathResponse { path }))
}

/// Check whether a path exists.
pub async fn file_exists(Query(params): Query<ExistsParams>) -> Json<ExistsResponse> {
    let exists = !params.path.is_empty()
        && tokio::fs::try_exists(&params.path).await.unwrap_or(false);
    Json(ExistsResponse { exists })
}

/// Register a path for deletion and return the confirmation token.
pub async fn request_deletion(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DeletionBody>,
) -> Result<Json<DeletionResponse>, ApiError> {
    let token = state.deletions().request(&body.path).await?;
    DELETIONS_TOTAL.with_label_values(&["requested"]).inc();
    Ok(Json(DeletionResponse { token }))
}

/// Move the file behind `token` to the trash.
pub async fn confirm_deletion(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.deletions().confirm(&token).await {
        Ok(_) => {
            DELETIONS_TOTAL.with_label_values(&["confirmed"]).inc();
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => {
            DELETIONS_TOTAL.with_label_values(&["failed"]).inc();
            Err(e.into())
        }
    }
}

/// Drop the pending deletion behind `token`.
pub async fn cancel_deletion(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.deletions().cancel(&token).await?;
    DELETIONS_TOTAL.with_label_values(&["cancelled"]).inc();
    Ok(StatusCode::NO_CONTENT)
}

/// Decodes base64, dropping a `data:<mime>;base64,` prefix if present.
fn decode_payload(data: &str) -> Result<Vec<u8>, ApiError> {
    let encoded = match data.split_once(',') {
        Some((prefix, rest)) => {
            debug!(prefix, "Stripping data URL prefix");
            rest
        }
        None => data,
    };
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| ApiError::bad_request("invalid_data", format!("invalid base64: {}", e)))
}
