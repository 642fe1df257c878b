//! HTTP route handlers for the stateless overlay API

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;

use crate::server::AppState;

use super::types::{OverlayError, OverlayRequest, OverlayResult};

/// Error response for overlay API
#[derive(Debug, Serialize)]
pub struct OverlayErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<OverlayError> for OverlayErrorResponse {
    fn from(e: OverlayError) -> Self {
        let code = match &e {
            OverlayError::InvalidArgument(_) => "invalid_argument",
            OverlayError::Transport(_) => "transport_error",
            OverlayError::Timeout(_) => "timeout",
            OverlayError::UpstreamStatus { .. } => "upstream_status",
            OverlayError::MalformedResponse(_) => "malformed_response",
        };
        Self {
            error: e.to_string(),
            code: code.to_string(),
        }
    }
}

impl IntoResponse for OverlayErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "invalid_argument" => StatusCode::BAD_REQUEST,
            "timeout" => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        };
        (status, Json(self)).into_response()
    }
}

/// Unwrap an extracted overlay request body
///
/// Bodies that are not JSON, or are missing required fields, are reported as
/// `invalid_argument` like any other bad request.
pub(crate) fn overlay_request_from(
    body: Result<Json<OverlayRequest>, JsonRejection>,
) -> Result<OverlayRequest, OverlayErrorResponse> {
    match body {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => {
            tracing::debug!("Rejected overlay request body: {}", rejection.body_text());
            Err(OverlayErrorResponse::from(OverlayError::InvalidArgument(
                rejection.body_text(),
            )))
        }
    }
}

/// POST /api/overlay - Generate an overlay without session tracking
///
/// Always 200 with an `OverlayResult` unless the request is malformed.
pub async fn create_overlay(
    State(state): State<AppState>,
    body: Result<Json<OverlayRequest>, JsonRejection>,
) -> Result<Json<OverlayResult>, OverlayErrorResponse> {
    let request = overlay_request_from(body)?;
    let result = state
        .orchestrator
        .generate_overlay(request)
        .await
        .map_err(|e| {
            tracing::debug!("Rejected overlay request: {}", e);
            OverlayErrorResponse::from(e)
        })?;

    Ok(Json(result))
}

/// Build overlay API routes
pub fn overlay_routes() -> Router<AppState> {
    Router::new().route("/overlay", post(create_overlay))
}
