use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IndexResponse {
    pub message: String,
    pub usage: String,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "meta",
    responses(
        (status = 200, description = "API banner", body = IndexResponse)
    )
)]
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "iRecipe API".to_string(),
        usage: "Run the React frontend separately to use the web app.".to_string(),
    })
}
