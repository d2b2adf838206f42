//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    ChatRequest, ErrorResponse, SuccessResponse, SuggestionRequest, SuggestionsResponse,
};
use super::AppState;
use crate::instructions::Persona;
use crate::runtime::{Command, ControllerError, SessionError, SessionSnapshot, SseEvent};
use crate::state_machine::TransitionError;
use crate::suggestions::{grid, GRID_COLUMNS, SUGGESTIONS};
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
        // User actions
        .route("/api/sessions/:id/chat", post(send_chat))
        .route("/api/sessions/:id/suggestion", post(click_suggestion))
        .route("/api/sessions/:id/reset", post(reset_session))
        // Static copy
        .route("/api/suggestions", get(list_suggestions))
        .route("/api/profile", get(get_profile))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Session Lifecycle
// ============================================================

async fn create_session(State(state): State<AppState>) -> Result<Json<SessionSnapshot>, AppError> {
    let id = state.store.create().await?;
    let live = state.store.len().await;
    tracing::info!(session = %id, live, "Session started");
    let snapshot = state.store.send(&id, Command::Render).await?;
    Ok(Json(snapshot))
}

/// Every read is a render pass, so a fresh session comes back welcomed
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(state.store.send(&id, Command::Render).await?))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.store.remove(&id).await {
        return Err(AppError::NotFound(format!("No live session {id}")));
    }
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// SSE Streaming
// ============================================================

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // Subscribe before snapshotting so no update falls between the two
    let broadcast_rx = state.store.subscribe(&id).await?;
    let snapshot = state.store.send(&id, Command::Snapshot).await?;

    Ok(sse_stream(SseEvent::Init { snapshot }, broadcast_rx))
}

// ============================================================
// User Actions
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(
        state.store.send(&id, Command::SubmitText(req.text)).await?,
    ))
}

async fn click_suggestion(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SuggestionRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(
        state
            .store
            .send(&id, Command::ClickSuggestion(req.label))
            .await?,
    ))
}

async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(state.store.send(&id, Command::Reset).await?))
}

// ============================================================
// Static Copy
// ============================================================

async fn list_suggestions() -> Json<SuggestionsResponse> {
    Json(SuggestionsResponse {
        suggestions: SUGGESTIONS.to_vec(),
        columns: GRID_COLUMNS,
        grid: grid(),
    })
}

async fn get_profile(State(state): State<AppState>) -> Json<Persona> {
    Json(state.setup.persona.as_ref().clone())
}

async fn get_version() -> &'static str {
    concat!("wellness-guide ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unavailable(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(error: SessionError) -> Self {
        let message = error.to_string();
        match error {
            SessionError::Controller(
                ControllerError::Rejected(TransitionError::EmptyInput)
                | ControllerError::UnknownSuggestion(_),
            ) => AppError::BadRequest(message),
            SessionError::Controller(ControllerError::Rejected(TransitionError::AgentBusy)) => {
                AppError::Conflict(message)
            }
            SessionError::Controller(ControllerError::Setup(_)) => AppError::Unavailable(message),
            SessionError::NotFound(_) => AppError::NotFound(message),
            SessionError::Controller(ControllerError::Rejected(
                TransitionError::InvalidTransition(_),
            ))
            | SessionError::Closed => AppError::Internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
