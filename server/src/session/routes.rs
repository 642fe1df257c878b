//! HTTP route handlers for kiosk sessions

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use crate::overlay::routes::overlay_request_from;
use crate::overlay::{OverlayError, OverlayErrorResponse, OverlayRequest, OverlayResult, classify};
use crate::server::AppState;

use super::manager::SessionError;
use super::state::{SessionId, SessionSnapshot, validate_session_id};

/// Error response for session API
#[derive(Debug, Serialize)]
pub struct SessionErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<SessionError> for SessionErrorResponse {
    fn from(e: SessionError) -> Self {
        let code = match &e {
            SessionError::InvalidId(_) => "invalid_session_id",
            SessionError::NotFound(_) => "not_found",
            SessionError::AlreadyProcessing(_) => "already_processing",
        };
        Self {
            error: e.to_string(),
            code: code.to_string(),
        }
    }
}

impl IntoResponse for SessionErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "invalid_session_id" => StatusCode::BAD_REQUEST,
            "not_found" => StatusCode::NOT_FOUND,
            "already_processing" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Reject path ids that could never have been issued, before any lookup
fn checked_session_id(id: String) -> Result<SessionId, SessionErrorResponse> {
    if validate_session_id(&id) {
        Ok(id)
    } else {
        Err(SessionError::InvalidId(id).into())
    }
}

/// POST /api/sessions - Create a session for a kiosk surface
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionSnapshot>) {
    let snapshot = state.session_manager.create_session().await;
    (StatusCode::CREATED, Json(snapshot))
}

/// GET /api/sessions/:id - Current processing state
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, SessionErrorResponse> {
    let id = checked_session_id(id)?;
    let snapshot = state.session_manager.get_session(&id).await.map_err(|e| {
        tracing::debug!("Failed to get session {}: {}", id, e);
        SessionErrorResponse::from(e)
    })?;

    Ok(Json(snapshot))
}

/// DELETE /api/sessions/:id - Drop a session
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, SessionErrorResponse> {
    let id = checked_session_id(id)?;
    state
        .session_manager
        .remove_session(&id)
        .await
        .map_err(SessionErrorResponse::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sessions/:id/reset - Dismiss the last result
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, SessionErrorResponse> {
    let id = checked_session_id(id)?;
    let snapshot = state
        .session_manager
        .reset(&id)
        .await
        .map_err(SessionErrorResponse::from)?;

    Ok(Json(snapshot))
}

/// POST /api/sessions/:id/overlay - Run one overlay invocation for the session
///
/// The request is validated before `begin`, so a rejected request leaves the
/// session untouched. Once begun, the invocation runs in its own task and is
/// always settled, even if the client goes away.
pub async fn session_overlay(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<OverlayRequest>, JsonRejection>,
) -> Response {
    let id = match checked_session_id(id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let request = match overlay_request_from(body) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    if let Err(e) = request.validate() {
        return OverlayErrorResponse::from(e).into_response();
    }

    if let Err(e) = state.session_manager.begin(&id).await {
        return SessionErrorResponse::from(e).into_response();
    }

    let person_image = request.person_image.clone();
    let task_person_image = person_image.clone();
    let task_state = state.clone();
    let task_id = id.clone();
    let handle = tokio::spawn(async move {
        let result = match task_state.orchestrator.generate_overlay(request).await {
            Ok(result) => result,
            Err(e) => classify(&task_person_image, Err(e)),
        };
        settle_or_warn(&task_state, &task_id, result.clone()).await;
        result
    });

    let result = match handle.await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Overlay task for session {} failed: {}", id, e);
            let result = classify(
                &person_image,
                Err(OverlayError::Transport(format!("overlay task failed: {}", e))),
            );
            settle_or_warn(&state, &id, result.clone()).await;
            result
        }
    };

    Json(result).into_response()
}

async fn settle_or_warn(state: &AppState, session_id: &str, result: OverlayResult) {
    if let Err(e) = state.session_manager.settle(session_id, result).await {
        tracing::warn!("Could not settle overlay for session {}: {}", session_id, e);
    }
}

/// Build session API routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session).delete(delete_session))
        .route("/sessions/:id/reset", post(reset_session))
        .route("/sessions/:id/overlay", post(session_overlay))
}
