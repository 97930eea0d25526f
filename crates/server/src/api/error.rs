//! Error responses shared by the API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use optimux_core::{EngineError, FilesError};
use serde::Serialize;

/// Error body: a message plus a stable kind.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
    /// Trailing encoder output, for runtime failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// An error with its HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &str, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                kind: kind.to_string(),
                detail: None,
            },
        }
    }

    pub fn bad_request(kind: &str, error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, kind, error)
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        let status = match &e {
            _ if e.is_client_error() => StatusCode::BAD_REQUEST,
            EngineError::Spawn { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let detail = match &e {
            EngineError::Runtime { stderr_tail, .. } => stderr_tail.clone(),
            _ => None,
        };

        let mut err = Self::new(status, e.kind(), e.to_string());
        err.body.detail = detail;
        err
    }
}

impl From<FilesError> for ApiError {
    fn from(e: FilesError) -> Self {
        let (status, kind) = match &e {
            FilesError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            FilesError::EmptyPath => (StatusCode::BAD_REQUEST, "empty_path"),
            FilesError::InvalidToken => (StatusCode::NOT_FOUND, "invalid_token"),
            FilesError::RegistryFull { .. } => (StatusCode::TOO_MANY_REQUESTS, "registry_full"),
            FilesError::Trash { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "trash"),
            FilesError::Unsupported => (StatusCode::NOT_IMPLEMENTED, "unsupported"),
            FilesError::InvalidName { .. } => (StatusCode::BAD_REQUEST, "invalid_name"),
            FilesError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io"),
        };
        Self::new(status, kind, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_engine_error_status() {
        let cases = [
            (EngineError::input("no outputs"), StatusCode::BAD_REQUEST),
            (
                EngineError::path_resolution("main", "no input"),
                StatusCode::BAD_REQUEST,
            ),
            (
                EngineError::spawn("ffmpeg", "not found"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                EngineError::runtime("exit status 1", Some("tail".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            let kind = error.kind();
            let api = ApiError::from(error);
            assert_eq!(api.status, status);
            assert_eq!(api.body.kind, kind);
        }
    }

    #[test]
    fn test_runtime_detail_carries_stderr_tail() {
        let api = ApiError::from(EngineError::runtime("exit", Some("Unknown encoder".into())));
        assert_eq!(api.body.detail.as_deref(), Some("Unknown encoder"));
    }

    #[test]
    fn test_files_error_status() {
        let api = ApiError::from(FilesError::NotFound {
            path: PathBuf::from("/x"),
        });
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(FilesError::InvalidToken).body.kind, "invalid_token");
        assert_eq!(
            ApiError::from(FilesError::RegistryFull { limit: 1 }).status,
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
