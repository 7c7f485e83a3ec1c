use crate::api::extract::RecipeId;
use crate::api::{ApiError, ApiResult, ErrorResponse};
use crate::db::DbPool;
use crate::files::FileStore;
use crate::schema::{ratings, recipe_images, recipe_ingredients, recipes};
use axum::{extract::State, http::StatusCode};
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Recipe deleted with its ratings and images"),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn delete_recipe(
    RecipeId(id): RecipeId,
    State(pool): State<Arc<DbPool>>,
    State(files): State<Arc<FileStore>>,
) -> ApiResult<StatusCode> {
    // Owned rows go with the recipe; shared ingredients only lose the association.
    // The connection is released before any blob I/O.
    let (deleted, filenames) = {
        let mut conn = pool.get()?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let filenames: Vec<String> = recipe_images::table
                .filter(recipe_images::recipe_id.eq(id))
                .select(recipe_images::filename)
                .load(conn)?;

            diesel::delete(ratings::table.filter(ratings::recipe_id.eq(id))).execute(conn)?;
            diesel::delete(recipe_images::table.filter(recipe_images::recipe_id.eq(id)))
                .execute(conn)?;
            diesel::delete(
                recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(id)),
            )
            .execute(conn)?;
            let deleted = diesel::delete(recipes::table.find(id)).execute(conn)?;

            Ok((deleted, filenames))
        })?
    };

    if deleted == 0 {
        return Err(ApiError::NotFound("Recipe not found"));
    }

    for filename in &filenames {
        if let Err(e) = files.remove(filename).await {
            tracing::warn!(recipe_id = id, filename = %filename, "Failed to remove image blob: {}", e);
        }
    }

    tracing::info!(recipe_id = id, images = filenames.len(), "Deleted recipe");

    Ok(StatusCode::NO_CONTENT)
}
