//! HTTP error mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lexisync_storage::StorageError;
use lexisync_sync::SyncError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Record(#[from] lexisync_types::Error),

    #[error("{}", .0.body_text())]
    Body(#[from] JsonRejection),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Sync(SyncError::InvalidRecord { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Sync(SyncError::BatchTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Sync(SyncError::Storage(e)) | Self::Storage(e) => storage_status(e),
            Self::Record(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Body(rejection) => rejection.status(),
            Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn storage_status(e: &StorageError) -> StatusCode {
    match e {
        StorageError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
