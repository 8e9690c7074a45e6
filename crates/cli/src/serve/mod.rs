//! `contractly serve` -- HTTP JSON API over the lifecycle engine.
//!
//! Security features:
//! - CORS headers on all responses (permissive for local dev)
//! - Per-IP rate limiting (default: 60 req/min, configurable)
//! - Optional API key authentication
//!
//! Endpoints:
//! - GET    /health                          - Server status (exempt from auth)
//! - POST   /api/blueprints                  - Create a blueprint
//! - GET    /api/blueprints                  - List blueprints
//! - GET    /api/blueprints/{id}             - Fetch one blueprint
//! - DELETE /api/blueprints/{id}             - Delete a blueprint
//! - POST   /api/contracts                   - Instantiate a contract
//! - GET    /api/contracts                   - List contracts (`?status=`, `?expand=blueprint`)
//! - GET    /api/contracts/{id}              - Fetch one contract
//! - PATCH  /api/contracts/{id}              - Rename a contract
//! - GET    /api/contracts/{id}/transitions  - Moves currently open to a contract
//! - PATCH  /api/contracts/{id}/status       - Request a status transition
//!
//! All responses use Content-Type: application/json.

mod handlers;
mod middleware;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, patch};
use axum::{middleware as axum_middleware, Json, Router};
use contractly_lifecycle::{EngineConfig, LifecycleEngine};
use contractly_storage::MemoryStorage;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use self::handlers::{
    handle_available_transitions, handle_create_blueprint, handle_create_contract,
    handle_delete_blueprint, handle_get_blueprint, handle_get_contract, handle_health,
    handle_list_blueprints, handle_list_contracts, handle_not_found, handle_rename_contract,
    handle_request_transition,
};
use self::middleware::{auth_middleware, rate_limit_middleware};
use self::state::{AppState, RateLimiter};
use crate::config::ServerConfig;

/// Maximum request body size: 1 MB.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Rate limit window duration in seconds (1 minute).
const RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/api/blueprints",
            get(handle_list_blueprints).post(handle_create_blueprint),
        )
        .route(
            "/api/blueprints/{id}",
            get(handle_get_blueprint).delete(handle_delete_blueprint),
        )
        .route(
            "/api/contracts",
            get(handle_list_contracts).post(handle_create_contract),
        )
        .route(
            "/api/contracts/{id}",
            get(handle_get_contract).patch(handle_rename_contract),
        )
        .route(
            "/api/contracts/{id}/transitions",
            get(handle_available_transitions),
        )
        .route(
            "/api/contracts/{id}/status",
            patch(handle_request_transition),
        )
        .fallback(handle_not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

/// Start the HTTP server with an in-memory store.
///
/// When TLS cert/key paths are provided, the server listens over HTTPS
/// using `axum-server` with rustls. Otherwise it uses plain HTTP.
pub async fn start_server(
    config: ServerConfig,
    _tls_cert: Option<PathBuf>,
    _tls_key: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = LifecycleEngine::with_config(
        Arc::new(MemoryStorage::new()),
        EngineConfig {
            require_terms_acceptance: config.require_terms_acceptance,
        },
    );

    if config.api_key.is_some() {
        info!("API key authentication enabled");
    }
    if config.require_terms_acceptance {
        info!("terms acceptance required before approval");
    }
    info!(
        rate_limit = config.rate_limit,
        "rate limit: requests per minute per IP"
    );

    let state = Arc::new(AppState {
        engine,
        rate_limiter: RateLimiter::new(config.rate_limit),
        api_key: config.api_key.clone(),
    });
    let app = router(state);
    let addr = format!("0.0.0.0:{}", config.port);

    #[cfg(feature = "tls")]
    if let (Some(cert_path), Some(key_path)) = (&_tls_cert, &_tls_key) {
        let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert_path, key_path).await?;
        let socket_addr: std::net::SocketAddr = addr.parse()?;
        info!("contractly listening on https://{}", addr);
        axum_server::bind_rustls(socket_addr, tls)
            .serve(app.into_make_service_with_connect_info::<std::net::SocketAddr>())
            .await?;
        return Ok(());
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("contractly listening on http://{}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("server shut down");
    Ok(())
}

/// Wait for Ctrl+C. If the handler cannot be installed, run until killed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received shutdown signal"),
        Err(e) => {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
