use crate::aggregate::{self, RecipeResponse};
use crate::api::ApiResult;
use crate::db::DbPool;
use axum::{extract::State, Json};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    responses(
        (status = 200, description = "All recipes in creation order", body = Vec<RecipeResponse>)
    )
)]
pub async fn list_recipes(State(pool): State<Arc<DbPool>>) -> ApiResult<Json<Vec<RecipeResponse>>> {
    let mut conn = pool.get()?;
    let recipes = aggregate::load_all(&mut conn)?;
    Ok(Json(recipes))
}
