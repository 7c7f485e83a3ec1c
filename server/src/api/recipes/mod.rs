pub mod create;
pub mod delete;
pub mod get;
pub mod images;
pub mod list;
pub mod rating;
pub mod update;

use crate::api::ApiError;
use crate::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

pub const MAX_TITLE_LEN: usize = 100;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route(
            "/{id}",
            get(get::get_recipe)
                .put(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route("/{id}/rating", post(rating::rate_recipe))
        .route(
            "/{id}/images",
            post(images::upload_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

/// Titles must be non-blank and fit the column.
pub(crate) fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::bad_request("Title cannot be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::bad_request(format!(
            "Title exceeds {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_recipes,
        get::get_recipe,
        create::create_recipe,
        update::update_recipe,
        delete::delete_recipe,
        rating::rate_recipe,
        images::upload_image,
    ),
    components(schemas(
        crate::aggregate::RecipeResponse,
        create::CreateRecipeRequest,
        update::UpdateRecipeRequest,
        rating::RateRecipeRequest,
        rating::RatingResponse,
        images::UploadImageRequest,
        images::UploadImageResponse,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Salad").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"a".repeat(100)).is_ok());
        assert!(validate_title(&"a".repeat(101)).is_err());
    }
}
