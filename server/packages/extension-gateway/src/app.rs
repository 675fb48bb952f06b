use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use extension_actions::{
    AcknowledgedResponse, ClusterStateRequest, ClusterStateResponse,
    ExtensionTransportActionsHandler, RegisterTransportActionsRequest,
    RemoteExtensionActionResponse, TransportActionRequestFromExtension,
};
use extension_gateway_error::{GatewayError, ProblemDetails};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct HealthResponse {
    ok: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Gateway(GatewayError::InvalidRequest {
            message: rejection.body_text(),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let problem: ProblemDetails = match &self {
            ApiError::Gateway(err) => err.to_problem_details(),
        };
        let status =
            StatusCode::from_u16(problem.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(problem)).into_response()
    }
}

pub fn build_router(dispatcher: Arc<ExtensionTransportActionsHandler>) -> Router {
    Router::new()
        .route("/v1/health", get(get_health))
        .route("/v1/extensions/actions/register", post(post_register_actions))
        .route("/v1/extensions/actions/request", post(post_action_request))
        .route("/v1/cluster/state", post(post_cluster_state))
        .with_state(dispatcher)
}

async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

async fn post_register_actions(
    State(dispatcher): State<Arc<ExtensionTransportActionsHandler>>,
    payload: Result<Json<RegisterTransportActionsRequest>, JsonRejection>,
) -> Result<Json<AcknowledgedResponse>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(
        dispatcher.handle_register_transport_actions_request(&request),
    ))
}

async fn post_action_request(
    State(dispatcher): State<Arc<ExtensionTransportActionsHandler>>,
    payload: Result<Json<TransportActionRequestFromExtension>, JsonRejection>,
) -> Result<Json<RemoteExtensionActionResponse>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(
        dispatcher
            .handle_transport_action_request_from_extension(request)
            .await,
    ))
}

async fn post_cluster_state(
    State(dispatcher): State<Arc<ExtensionTransportActionsHandler>>,
    payload: Result<Json<ClusterStateRequest>, JsonRejection>,
) -> Result<Json<ClusterStateResponse>, ApiError> {
    let Json(request) = payload?;
    let response = dispatcher.handle_cluster_state_request(request).await?;
    Ok(Json(response))
}
