use crate::aggregate;
use crate::api::extract::RecipeId;
use crate::api::{ApiError, ApiResult, ErrorResponse};
use crate::config::Config;
use crate::db::DbPool;
use crate::files::FileStore;
use crate::models::NewRecipeImage;
use crate::schema::recipe_images;
use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Multipart field carrying the uploaded file
pub const IMAGE_FIELD: &str = "image";

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadImageRequest {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadImageResponse {
    /// Generated filename, servable under /uploads
    pub path: String,
}

struct UploadedFile {
    original_name: String,
    data: Bytes,
}

fn multipart_error(e: MultipartError, limit: usize) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(limit)
    } else {
        tracing::warn!("Multipart read error: {}", e);
        ApiError::bad_request(format!("Failed to read multipart data: {}", e.body_text()))
    }
}

/// Find the `image` field, skipping any others.
async fn read_image_field(multipart: &mut Multipart, limit: usize) -> ApiResult<UploadedFile> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ApiError::bad_request("No image uploaded")),
            Err(e) => return Err(multipart_error(e, limit)),
        };

        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        if original_name.is_empty() {
            return Err(ApiError::bad_request("No selected file"));
        }

        let data = field.bytes().await.map_err(|e| multipart_error(e, limit))?;

        return Ok(UploadedFile {
            original_name,
            data,
        });
    }
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/images",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body(content_type = "multipart/form-data", content = UploadImageRequest),
    responses(
        (status = 201, description = "Image stored", body = UploadImageResponse),
        (status = 400, description = "No image uploaded or empty filename", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 413, description = "Upload exceeds the size limit", body = ErrorResponse)
    )
)]
pub async fn upload_image(
    RecipeId(id): RecipeId,
    State(pool): State<Arc<DbPool>>,
    State(files): State<Arc<FileStore>>,
    State(config): State<Arc<Config>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    // Connection goes back to the pool before the body is read
    {
        let mut conn = pool.get()?;
        if !aggregate::recipe_exists(&mut conn, id)? {
            return Err(ApiError::NotFound("Recipe not found"));
        }
    }

    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Not a multipart request: {}", e);
        ApiError::bad_request("No image uploaded")
    })?;

    let upload = read_image_field(&mut multipart, config.max_upload_bytes).await?;

    // Client filenames only contribute their extension
    let filename = FileStore::generate_name(&upload.original_name);
    files.save(&filename, &upload.data).await?;

    let inserted = pool.get().map_err(ApiError::from).and_then(|mut conn| {
        diesel::insert_into(recipe_images::table)
            .values(NewRecipeImage {
                recipe_id: id,
                filename: &filename,
            })
            .execute(&mut conn)
            .map_err(ApiError::from)
    });

    if let Err(e) = inserted {
        if let Err(cleanup) = files.remove(&filename).await {
            tracing::warn!(filename = %filename, "Failed to remove orphaned blob: {}", cleanup);
        }
        return Err(e);
    }

    tracing::info!(
        recipe_id = id,
        filename = %filename,
        bytes = upload.data.len(),
        "Stored recipe image"
    );

    Ok((StatusCode::CREATED, Json(UploadImageResponse { path: filename })))
}
