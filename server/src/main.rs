use anyhow::Context;
use irecipe_server::config::Config;
use irecipe_server::{api, app, AppState};
use std::env;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Console logging, filtered by RUST_LOG (info when unset).
fn init_telemetry() {
    let fmt_layer = tracing_subscriber::fmt::layer();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        let spec = api::openapi()
            .to_pretty_json()
            .context("Failed to serialize OpenAPI spec")?;
        println!("{}", spec);
        return Ok(());
    }

    init_telemetry();

    let config = Config::from_env().context("Invalid configuration")?;
    let bind_addr = config.bind_addr;

    tracing::info!(
        database = %config.database_url,
        uploads = %config.upload_dir.display(),
        max_upload_bytes = config.max_upload_bytes,
        db_pool_size = config.db_pool_size,
        "Starting iRecipe server"
    );

    let state = AppState::new(config).context("Failed to initialize application state")?;

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    tracing::info!("Server listening on {}", listener.local_addr()?);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", bind_addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
