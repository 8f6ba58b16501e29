use crate::domain::file::{File, FileMeta, NewFile};
use crate::error::AppError;
use crate::service::digest::content_address;
use crate::utils::jwt::Claims;
use crate::utils::state::AppState;
use crate::utils::validation::is_valid_hash;
use axum::body::{Body, Bytes};
use axum::extract::{Path, Request, State};
use axum::http::header::{self, HeaderMap, LOCATION};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UploadResponse {
    pub hash: String,
}

/// Outcome of a successful upload.
#[derive(Debug, Clone)]
pub enum Ingested {
    Created(File),
    Existing(File),
}

impl Ingested {
    pub fn file(&self) -> &File {
        match self {
            Ingested::Created(file) | Ingested::Existing(file) => file,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Ingested::Created(_) => StatusCode::CREATED,
            Ingested::Existing(_) => StatusCode::OK,
        }
    }
}

/// Validate, address and store one upload. Nothing reaches the store until
/// the content type and size checks have passed.
pub async fn ingest<S, E>(
    state: &AppState,
    created_by: &str,
    content_type: Option<&str>,
    content_length: Option<u64>,
    body: S,
) -> Result<Ingested, AppError>
where
    S: Stream<Item = Result<Bytes, E>> + Send,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mimetype = state.reader.check_content_type(content_type)?;
    state.reader.check_declared_length(content_length)?;
    let data = state.reader.read(body, content_length).await?;

    let hash = content_address(&data);
    let size = data.len();
    let upload = NewFile::new(hash, mimetype, created_by, data);
    let (file, created) = state.bounded(state.store.insert_if_absent(upload)).await?;

    if created {
        tracing::info!(hash = %file.hash, size, created_by, "stored new file");
        Ok(Ingested::Created(file))
    } else {
        tracing::debug!(hash = %file.hash, "file already present");
        Ok(Ingested::Existing(file))
    }
}

fn checked_hash(hash: &str) -> Result<&str, AppError> {
    if hash.is_empty() {
        return Err(AppError::HashMissing);
    }
    if !is_valid_hash(hash) {
        return Err(AppError::HashInvalid(hash.to_string()));
    }
    Ok(hash)
}

pub async fn retrieve(state: &AppState, hash: &str) -> Result<File, AppError> {
    let hash = checked_hash(hash)?;
    state
        .bounded(state.store.lookup(hash))
        .await?
        .ok_or_else(|| AppError::FileUnknown(hash.to_string()))
}

pub async fn stat(state: &AppState, hash: &str) -> Result<FileMeta, AppError> {
    let hash = checked_hash(hash)?;
    state
        .bounded(state.store.stat(hash))
        .await?
        .ok_or_else(|| AppError::FileUnknown(hash.to_string()))
}

fn file_location(hash: &str) -> String {
    format!("/api/v1/files/{hash}")
}

/// POST /api/v1/files
pub async fn post_file_handler(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    request: Request,
) -> Result<impl IntoResponse, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let content_length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let ingested = ingest(
        &state,
        &claims.sub,
        content_type,
        content_length,
        request.into_body().into_data_stream(),
    )
    .await?;

    let hash = ingested.file().hash.clone();
    Ok((
        ingested.status_code(),
        [(LOCATION, file_location(&hash))],
        Json(UploadResponse { hash }),
    ))
}

/// GET /api/v1/files/<hash>
pub async fn get_file_handler(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let file = retrieve(&state, &hash).await?;
    let content_length = file.size();

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.mimetype),
            (header::CONTENT_LENGTH, content_length.to_string()),
        ],
        Body::from(file.data),
    ))
}

/// HEAD /api/v1/files/<hash>
pub async fn head_file_handler(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let meta = stat(&state, &hash).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, meta.mimetype),
            (header::CONTENT_LENGTH, meta.size.to_string()),
        ],
        Body::empty(),
    ))
}

/// GET /api/v1/files/
pub async fn missing_hash_handler() -> AppError {
    AppError::HashMissing
}
