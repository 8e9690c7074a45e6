//! HTTP middleware: rate limiting and API key authentication.

use std::sync::Arc;

use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

use super::json_error;
use super::state::AppState;

pub(crate) async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    match state.rate_limiter.check(addr.ip()).await {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            warn!(client = %addr.ip(), retry_after, "rate limit exceeded");
            let body = serde_json::json!({
                "error": "rate limit exceeded",
                "retry_after": retry_after,
            });
            (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response()
        }
    }
}

/// What the client presented, if anything.
enum Credential<'a> {
    Missing,
    Presented(&'a str),
}

fn credential(headers: &HeaderMap) -> Credential<'_> {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let api_key = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    match bearer.or(api_key) {
        Some(token) => Credential::Presented(token),
        None => Credential::Missing,
    }
}

/// When an API key is configured, every route except `/health` needs
/// `Authorization: Bearer <key>` or `X-API-Key: <key>`.
pub(crate) async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(request).await;
    };
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let rejection = match credential(request.headers()) {
        Credential::Presented(token) if token == expected => None,
        Credential::Presented(_) => Some((StatusCode::FORBIDDEN, "invalid API key")),
        Credential::Missing => Some((StatusCode::UNAUTHORIZED, "authentication required")),
    };
    match rejection {
        None => next.run(request).await,
        Some((status, message)) => json_error(status, message).into_response(),
    }
}
