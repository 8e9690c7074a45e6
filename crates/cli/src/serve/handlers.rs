//! Route handlers. Each one is a thin adapter from HTTP to one engine call.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contractly_core::{FieldDraft, FieldValues, Status};
use contractly_lifecycle::LifecycleError;
use serde::Deserialize;
use tracing::error;

use super::json_error;
use super::state::AppState;

/// A lifecycle rejection rendered as `{error, kind, current?, requested?}`.
pub(crate) struct ApiError(LifecycleError);

impl From<LifecycleError> for ApiError {
    fn from(e: LifecycleError) -> Self {
        ApiError(e)
    }
}

fn status_for(err: &LifecycleError) -> StatusCode {
    match err {
        LifecycleError::NotFound { .. } => StatusCode::NOT_FOUND,
        LifecycleError::TerminalState { .. }
        | LifecycleError::InvalidTransition { .. }
        | LifecycleError::InvalidState { .. }
        | LifecycleError::TermsNotAccepted { .. }
        | LifecycleError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        LifecycleError::ShapeMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        LifecycleError::Conflict { .. } => StatusCode::CONFLICT,
        LifecycleError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(&err);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %err, "storage fault");
        }

        let mut body = serde_json::json!({
            "error": err.to_string(),
            "kind": err.kind(),
        });
        if let Some(current) = err.current_status() {
            body["current"] = serde_json::json!(current);
        }
        if let Some(requested) = err.requested_status() {
            body["requested"] = serde_json::json!(requested);
        }
        (status, Json(body)).into_response()
    }
}

/// Malformed or missing JSON bodies get a JSON error, not axum's plain text.
fn body_error(rejection: JsonRejection) -> Response {
    json_error(rejection.status(), &rejection.body_text()).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateBlueprintRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    fields: Vec<FieldDraft>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateContractRequest {
    blueprint_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    field_values: FieldValues,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RenameRequest {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransitionRequest {
    next_status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListContractsQuery {
    status: Option<String>,
    expand: Option<String>,
}

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(response))
}

// ── Blueprints ────────────────────────────────────────────────────────────────

/// POST /api/blueprints
pub(crate) async fn handle_create_blueprint(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateBlueprintRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => return Ok(body_error(rejection)),
    };
    let blueprint = state.engine.create_blueprint(&req.name, req.fields).await?;
    Ok((StatusCode::CREATED, Json(blueprint)).into_response())
}

/// GET /api/blueprints
pub(crate) async fn handle_list_blueprints(
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let blueprints = state.engine.list_blueprints().await?;
    Ok(Json(blueprints).into_response())
}

/// GET /api/blueprints/{id}
pub(crate) async fn handle_get_blueprint(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let blueprint = state.engine.get_blueprint(&id).await?;
    Ok(Json(blueprint).into_response())
}

/// DELETE /api/blueprints/{id}
pub(crate) async fn handle_delete_blueprint(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let removed = state.engine.delete_blueprint(&id).await?;
    let body = serde_json::json!({ "message": "Deleted", "id": removed.id });
    Ok(Json(body).into_response())
}

// ── Contracts ─────────────────────────────────────────────────────────────────

/// POST /api/contracts
pub(crate) async fn handle_create_contract(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateContractRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => return Ok(body_error(rejection)),
    };
    let contract = state
        .engine
        .create_contract(&req.blueprint_id, &req.name, req.field_values)
        .await?;
    Ok((StatusCode::CREATED, Json(contract)).into_response())
}

/// GET /api/contracts?status=S&expand=blueprint
pub(crate) async fn handle_list_contracts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListContractsQuery>,
) -> Result<Response, ApiError> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<Status>)
        .transpose()
        .map_err(|e| LifecycleError::InvalidInput(e.to_string()))?;

    match query.expand.as_deref() {
        Some("blueprint") => {
            let views = state.engine.list_contract_views(status).await?;
            Ok(Json(views).into_response())
        }
        Some(other) => Err(LifecycleError::InvalidInput(format!(
            "cannot expand '{other}'; only 'blueprint' is supported"
        ))
        .into()),
        None => {
            let contracts = state.engine.list_contracts(status).await?;
            Ok(Json(contracts).into_response())
        }
    }
}

/// GET /api/contracts/{id}
pub(crate) async fn handle_get_contract(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let contract = state.engine.get_contract(&id).await?;
    Ok(Json(contract).into_response())
}

/// PATCH /api/contracts/{id}
pub(crate) async fn handle_rename_contract(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<RenameRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => return Ok(body_error(rejection)),
    };
    let contract = state.engine.rename_contract(&id, &req.name).await?;
    Ok(Json(contract).into_response())
}

/// GET /api/contracts/{id}/transitions
pub(crate) async fn handle_available_transitions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let available = state.engine.available_transitions(&id).await?;
    Ok(Json(available).into_response())
}

/// PATCH /api/contracts/{id}/status
pub(crate) async fn handle_request_transition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<TransitionRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => return Ok(body_error(rejection)),
    };
    let contract = state.engine.request_transition(&id, &req.next_status).await?;
    Ok(Json(contract).into_response())
}
