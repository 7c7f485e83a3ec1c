use crate::aggregate::{self, RecipeResponse};
use crate::api::extract::{JsonBody, RecipeId};
use crate::api::recipes::validate_title;
use crate::api::{ApiError, ApiResult, ErrorResponse};
use crate::db::DbPool;
use crate::ingredients;
use crate::models::RecipeChanges;
use crate::schema::recipes;
use axum::{extract::State, Json};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// When present, replaces the whole ingredient set (an empty list clears it)
    pub ingredients: Option<Vec<String>>,
}

#[utoipa::path(
    put,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated successfully", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn update_recipe(
    RecipeId(id): RecipeId,
    State(pool): State<Arc<DbPool>>,
    body: Result<JsonBody<UpdateRecipeRequest>, ApiError>,
) -> ApiResult<Json<RecipeResponse>> {
    let mut conn = pool.get()?;

    // A missing recipe wins over a bad body
    if !aggregate::recipe_exists(&mut conn, id)? {
        return Err(ApiError::NotFound("Recipe not found"));
    }

    let JsonBody(request) = body?;

    if let Some(ref title) = request.title {
        validate_title(title)?;
    }
    if let Some(ref names) = request.ingredients {
        ingredients::validate_names(names).map_err(ApiError::BadRequest)?;
    }

    let changes = RecipeChanges {
        title: request.title.as_deref(),
        description: request.description.as_deref(),
    };

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        if !changes.is_empty() {
            diesel::update(recipes::table.find(id))
                .set(&changes)
                .execute(conn)?;
        }

        if let Some(ref names) = request.ingredients {
            ingredients::replace_for_recipe(conn, id, names)?;
        }

        Ok(())
    })?;

    let recipe = aggregate::load_one(&mut conn, id)?.ok_or(ApiError::NotFound("Recipe not found"))?;

    tracing::info!(recipe_id = id, "Updated recipe");

    Ok(Json(recipe))
}
