use crate::aggregate::{self, RecipeResponse};
use crate::api::extract::RecipeId;
use crate::api::{ApiError, ApiResult, ErrorResponse};
use crate::db::DbPool;
use axum::{extract::State, Json};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    RecipeId(id): RecipeId,
    State(pool): State<Arc<DbPool>>,
) -> ApiResult<Json<RecipeResponse>> {
    let mut conn = pool.get()?;

    aggregate::load_one(&mut conn, id)?
        .map(Json)
        .ok_or(ApiError::NotFound("Recipe not found"))
}
