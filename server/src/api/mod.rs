pub mod error;
pub mod extract;
pub mod index;
pub mod recipes;
pub mod uploads;

pub use error::{ApiError, ApiResult};

use axum::routing::get;
use axum::Router;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::AppState;

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Every route the server answers, still waiting for its state.
pub fn router(config: &Config) -> Router<AppState> {
    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi());

    Router::new()
        .route("/", get(index::index))
        .route("/uploads/{filename}", get(uploads::get_upload))
        .nest("/api/recipes", recipes::router(config.max_upload_bytes))
        .merge(swagger_ui)
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "iRecipe API"),
        paths(index::index, uploads::get_upload),
        components(schemas(ErrorResponse, index::IndexResponse))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    let modules: Vec<utoipa::openapi::OpenApi> = vec![recipes::ApiDoc::openapi()];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_endpoint() {
        let spec = openapi();
        for path in [
            "/",
            "/uploads/{filename}",
            "/api/recipes",
            "/api/recipes/{id}",
            "/api/recipes/{id}/rating",
            "/api/recipes/{id}/images",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
