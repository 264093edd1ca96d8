//! HTTP server assembly: application state, router, and lifecycle
//!
//! All state lives in [`AppState`], constructed once at startup and handed
//! to the router. There is no module-level mutable state, which keeps the
//! whole surface constructible in isolation for tests.

pub mod extract;
pub mod handlers;

use crate::core::auth::TokenVerifier;
use crate::core::error::ApiError;
use crate::core::store::RecordStore;
use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(
        store: impl RecordStore + 'static,
        verifier: impl TokenVerifier + 'static,
    ) -> Self {
        Self {
            store: Arc::new(store),
            verifier: Arc::new(verifier),
        }
    }
}

/// Build the full application router.
///
/// Route surface, identical for every record kind:
/// - `POST   /api/{kind}`        create (auth)
/// - `GET    /api/{kind}`        list own records (auth)
/// - `GET    /api/{kind}/{id}`   fetch one (auth)
/// - `PUT    /api/{kind}/{id}`   update (auth)
/// - `DELETE /api/{kind}/{id}`   delete (auth)
/// - `GET    /{kind}/{id}`       public single-record view
///
/// CORS is restricted to the single configured origin with methods
/// GET/POST/PUT/DELETE and the content-type/authorization headers.
pub fn build_router(state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("invalid CORS origin '{cors_origin}'"))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let app = Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/{kind}/{id}", get(handlers::get_record_public))
        .route(
            "/api/{kind}",
            post(handlers::create_record).get(handlers::list_records),
        )
        .route(
            "/api/{kind}/{id}",
            get(handlers::get_record)
                .put(handlers::update_record)
                .delete(handlers::delete_record),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(app)
}

async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to the consulta server!" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "consulta" }))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("route not found".to_string())
}

/// Wait for Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
