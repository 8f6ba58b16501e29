use std::io;

use axum::Json;
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StoreError;

/// JSON body of every failed request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    // Upload validation
    #[error("Content-Type header is required")]
    ContentTypeMissing,

    #[error("unsupported content type: {0}")]
    UnsupportedMediaType(String), // Contains the declared type

    #[error("payload exceeds the upload limit of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("read file: {0}")]
    Read(#[source] io::Error),

    // Retrieval validation
    #[error("hash must be provided")]
    HashMissing,

    #[error("invalid hash: {0}")]
    HashInvalid(String), // Contains the rejected value

    #[error("no file exists with hash {0}")]
    FileUnknown(String),

    #[error("{0}")]
    Unauthorized(String),

    // Internal
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ContentTypeMissing | Self::Read(_) | Self::HashMissing | Self::HashInvalid(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::FileUnknown(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::ContentTypeMissing => "CONTENT_TYPE_MISSING",
            Self::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::Read(_) => "READ_ERROR",
            Self::HashMissing => "HASH_MISSING",
            Self::HashInvalid(_) => "HASH_INVALID",
            Self::FileUnknown(_) => "FILE_UNKNOWN",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    fn message(&self) -> String {
        match self {
            // Keep driver internals out of the response; the log has them.
            Self::Storage(StoreError::Sqlx(_)) => "storage error: database unavailable".to_string(),
            Self::Storage(StoreError::Migration(_)) => "storage error: schema not ready".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            tracing::error!("Generating response for AppError: {:?}", self);
        } else {
            tracing::debug!("Rejecting request: {}", self);
        }

        let body = ErrorBody {
            code: self.code().to_string(),
            message: self.message(),
        };

        let mut response = (status_code, Json(body)).into_response();
        if let Self::Unauthorized(_) = self {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static(r#"Bearer realm="blobstore""#),
            );
        }
        response
    }
}
