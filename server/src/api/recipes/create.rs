use crate::aggregate::{self, RecipeResponse};
use crate::api::extract::JsonBody;
use crate::api::recipes::validate_title;
use crate::api::{ApiError, ApiResult, ErrorResponse};
use crate::db::DbPool;
use crate::ingredients;
use crate::models::NewRecipe;
use crate::schema::recipes;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    /// Required; a missing or blank title is rejected
    pub title: Option<String>,
    /// Defaults to an empty string
    pub description: Option<String>,
    /// Ingredient names, reused by exact name when they already exist
    pub ingredients: Option<Vec<String>>,
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn create_recipe(
    State(pool): State<Arc<DbPool>>,
    JsonBody(request): JsonBody<CreateRecipeRequest>,
) -> ApiResult<impl IntoResponse> {
    let title = match request.title.as_deref() {
        Some(title) if !title.trim().is_empty() => title,
        _ => return Err(ApiError::bad_request("Missing title")),
    };
    validate_title(title)?;

    let names = request.ingredients.unwrap_or_default();
    ingredients::validate_names(&names).map_err(ApiError::BadRequest)?;

    let description = request.description.as_deref().unwrap_or_default();

    let mut conn = pool.get()?;

    let recipe_id = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let recipe_id: i32 = diesel::insert_into(recipes::table)
            .values(NewRecipe { title, description })
            .returning(recipes::id)
            .get_result(conn)?;

        ingredients::replace_for_recipe(conn, recipe_id, &names)?;

        Ok(recipe_id)
    })?;

    let recipe = aggregate::load_one(&mut conn, recipe_id)?
        .ok_or_else(|| ApiError::internal("Failed to load created recipe", recipe_id))?;

    tracing::info!(recipe_id, ingredients = names.len(), "Created recipe");

    Ok((StatusCode::CREATED, Json(recipe)))
}
