use anyhow::Result;
use consulta::config::Config;
use consulta::core::auth::HttpTokenVerifier;
use consulta::core::resource::KINDS;
use consulta::server::{AppState, build_router, shutdown_signal};
use consulta::storage::mongodb::{MongoRecordStore, connect};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    // A store that cannot be reached at startup is fatal.
    let (_client, database) = connect(&config.mongodb).await?;
    let store = MongoRecordStore::new(database);
    store.ensure_indexes(&KINDS).await?;

    let verifier = HttpTokenVerifier::new(config.auth_verify_url.clone());
    let state = AppState::new(store, verifier);
    let app = build_router(state, &config.cors_origin)?;

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("Server listening on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
