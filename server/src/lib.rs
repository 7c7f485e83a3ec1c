pub mod aggregate;
pub mod api;
pub mod config;
pub mod db;
pub mod files;
pub mod ingredients;
pub mod models;
pub mod schema;

use axum::extract::{FromRef, MatchedPath};
use axum::http::Request;
use axum::Router;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::Span;

use config::Config;
use db::DbPool;
use files::{FileStore, FileStoreError};

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Failed to create database pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("Failed to run database migrations: {0}")]
    Migrations(Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to open upload directory: {0}")]
    Files(#[from] FileStoreError),
}

/// Application state shared across all handlers.
/// Handlers pull out only the piece they need through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<DbPool>,
    pub files: Arc<FileStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Open the database (applying migrations) and the upload directory.
    pub fn new(config: Config) -> Result<Self, SetupError> {
        let pool = db::create_pool(&config.database_url, config.db_pool_size)?;
        let files = FileStore::open(&config.upload_dir)?;

        Ok(AppState {
            pool: Arc::new(pool),
            files: Arc::new(files),
            config: Arc::new(config),
        })
    }
}

impl FromRef<AppState> for Arc<DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<FileStore> {
    fn from_ref(state: &AppState) -> Self {
        state.files.clone()
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

/// Build the full application router with request tracing.
pub fn app(state: AppState) -> Router {
    api::router(&state.config)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %matched_path,
                    )
                })
                .on_request(|_request: &Request<_>, _span: &Span| {})
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &Span| {
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                )
                .on_failure(
                    |error: tower_http::classify::ServerErrorsFailureClass,
                     latency: std::time::Duration,
                     _span: &Span| {
                        tracing::error!(
                            error = %error,
                            latency_ms = %latency.as_millis(),
                            "request failed"
                        );
                    },
                ),
        )
}
