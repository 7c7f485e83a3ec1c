use crate::aggregate;
use crate::api::extract::{JsonBody, RecipeId};
use crate::api::{ApiError, ApiResult, ErrorResponse};
use crate::db::DbPool;
use crate::models::NewRating;
use crate::schema::ratings;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 5;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RateRecipeRequest {
    /// Integer from 1 to 5. A string holding an integer is accepted too.
    #[schema(value_type = i32, minimum = 1, maximum = 5)]
    pub score: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RatingResponse {
    pub score: i32,
}

fn parse_score(value: Option<&JsonValue>) -> Result<i32, ApiError> {
    let score = match value {
        None | Some(JsonValue::Null) => return Err(ApiError::bad_request("Missing score")),
        Some(JsonValue::Number(n)) => n.as_i64(),
        Some(JsonValue::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    }
    .ok_or_else(|| ApiError::bad_request("Invalid score"))?;

    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(ApiError::bad_request(format!(
            "Score must be between {} and {}",
            MIN_SCORE, MAX_SCORE
        )));
    }

    Ok(score as i32)
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/rating",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body = RateRecipeRequest,
    responses(
        (status = 201, description = "Rating recorded", body = RatingResponse),
        (status = 400, description = "Missing or invalid score", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn rate_recipe(
    RecipeId(id): RecipeId,
    State(pool): State<Arc<DbPool>>,
    body: Result<JsonBody<RateRecipeRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let mut conn = pool.get()?;

    if !aggregate::recipe_exists(&mut conn, id)? {
        return Err(ApiError::NotFound("Recipe not found"));
    }

    let JsonBody(request) = body?;
    let score = parse_score(request.score.as_ref())?;

    diesel::insert_into(ratings::table)
        .values(NewRating {
            recipe_id: id,
            score,
        })
        .execute(&mut conn)?;

    tracing::info!(recipe_id = id, score, "Recorded rating");

    Ok((StatusCode::CREATED, Json(RatingResponse { score })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: JsonValue) -> Result<i32, String> {
        parse_score(Some(&value)).map_err(|e| e.to_string())
    }

    #[test]
    fn test_accepts_integers_in_range() {
        for score in 1..=5 {
            assert_eq!(parse(json!(score)), Ok(score));
        }
    }

    #[test]
    fn test_accepts_integer_strings() {
        assert_eq!(parse(json!("4")), Ok(4));
        assert_eq!(parse(json!(" 2 ")), Ok(2));
    }

    #[test]
    fn test_missing_score() {
        assert_eq!(parse_score(None).unwrap_err().to_string(), "Missing score");
        assert_eq!(parse(JsonValue::Null), Err("Missing score".to_string()));
    }

    #[test]
    fn test_rejects_non_integers() {
        for value in [json!(4.5), json!("five"), json!(true), json!([5]), json!({"v": 5})] {
            assert_eq!(parse(value), Err("Invalid score".to_string()));
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        for value in [json!(0), json!(6), json!(9), json!(-1), json!("10")] {
            assert_eq!(
                parse(value),
                Err("Score must be between 1 and 5".to_string())
            );
        }
    }
}
