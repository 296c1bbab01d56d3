//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    ChatRequest, CreateSessionResponse, ErrorResponse, IntegrationsResponse, QueuedResponse,
    SelectRequest, SessionResponse, SuccessResponse,
};
use super::AppState;
use crate::integrations;
use crate::runtime::{SessionError, SessionHandle};
use crate::state_machine::{Event, TransitionError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        // SSE streaming
        .route("/api/sessions/:id/stream", get(stream_session))
        // Journey triggers
        .route("/api/sessions/:id/chat", post(send_chat))
        .route("/api/sessions/:id/trend", post(select_trend))
        .route("/api/sessions/:id/idea", post(select_idea))
        .route("/api/sessions/:id/build", post(request_build))
        .route("/api/sessions/:id/reset", post(reset_session))
        // Collaborators
        .route("/api/integrations", get(list_integrations))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Sessions
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<CreateSessionResponse> {
    let session = state.runtime.create().await;
    Json(CreateSessionResponse {
        session: session_response(&session),
    })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = find_session(&state, &id).await?;
    Ok(Json(session_response(&session)))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.runtime.remove(&id).await {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(session_not_found(&id))
    }
}

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = find_session(&state, &id).await?;

    // Subscribe before the snapshot so nothing falls between them
    let broadcast_rx = session.store().subscribe();
    let snapshot = session.store().snapshot();

    Ok(sse_stream(id, snapshot, broadcast_rx))
}

// ============================================================
// Journey Triggers
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("Message text is empty".to_string()));
    }

    queue(
        &state,
        &id,
        Event::UserMessage {
            text: text.to_string(),
        },
    )
    .await
}

async fn select_trend(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    queue(&state, &id, Event::SelectTrend { id: req.id }).await
}

async fn select_idea(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    queue(&state, &id, Event::SelectIdea { id: req.id }).await
}

async fn request_build(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QueuedResponse>, AppError> {
    queue(&state, &id, Event::BuildRequested).await
}

async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    let session = find_session(&state, &id).await?;
    session.reset().await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn queue(state: &AppState, id: &str, event: Event) -> Result<Json<QueuedResponse>, AppError> {
    let session = find_session(state, id).await?;
    session.submit(event).await?;
    Ok(Json(QueuedResponse { queued: true }))
}

// ============================================================
// Misc
// ============================================================

async fn list_integrations(State(state): State<AppState>) -> Json<IntegrationsResponse> {
    let integrations = integrations::check_all(state.runtime.backend().as_ref()).await;
    Json(IntegrationsResponse { integrations })
}

async fn get_version() -> &'static str {
    concat!("startup-hunter ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Helpers
// ============================================================

async fn find_session(state: &AppState, id: &str) -> Result<SessionHandle, AppError> {
    state
        .runtime
        .get(id)
        .await
        .ok_or_else(|| session_not_found(id))
}

fn session_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Session not found: {id}"))
}

fn session_response(session: &SessionHandle) -> SessionResponse {
    SessionResponse {
        id: session.id().to_string(),
        state: session.store().snapshot(),
    }
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Rejected(TransitionError::Busy) => AppError::Conflict(e.to_string()),
            SessionError::Rejected(_) => AppError::BadRequest(e.to_string()),
            SessionError::Closed => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
