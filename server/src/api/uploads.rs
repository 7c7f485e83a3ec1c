use crate::api::{ApiError, ApiResult, ErrorResponse};
use crate::files::{FileStore, FileStoreError};
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/uploads/{filename}",
    tag = "images",
    params(
        ("filename" = String, Path, description = "Stored image filename")
    ),
    responses(
        (status = 200, description = "Raw image bytes", content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
pub async fn get_upload(
    State(files): State<Arc<FileStore>>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let data = match files.read(&filename).await {
        Ok(Some(data)) => data,
        Ok(None) | Err(FileStoreError::InvalidName(_)) => {
            return Err(ApiError::NotFound("File not found"))
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        [(header::CONTENT_TYPE, FileStore::content_type(&filename))],
        data,
    )
        .into_response())
}
