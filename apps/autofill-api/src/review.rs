//! HTTP handlers for review sessions
//!
//! Thin adapters over `review_core::ReviewSession`: every endpoint applies
//! one session operation and returns the refreshed session view. Sessions
//! are keyed by a generated id in `AppState`; a client starts over by
//! posting a new extraction result.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use review_core::{fields_from_extraction, ReviewSession, SessionError};

use crate::error::ApiError;
use crate::models::{CreateReviewRequest, EditRequest, ReviewResponse};
use crate::state::AppState;

/// Handler: POST /api/review
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let fields = fields_from_extraction(&req.autofilled_fields, &req.explanations);
    let session = ReviewSession::new(fields);
    let id = Uuid::new_v4();

    let view = ReviewResponse::from_session(id, &session);
    state.sessions.write().await.insert(id, session);

    tracing::info!("Created review session {} with {} fields", id, view.length);
    Ok(Json(view))
}

/// Handler: GET /api/review/:id
pub async fn get_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(ApiError::SessionNotFound(id))?;
    Ok(Json(ReviewResponse::from_session(id, session)))
}

/// Handler: POST /api/review/:id/edit
pub async fn edit_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<EditRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    with_session(&state, id, |session| session.edit(req.text)).await
}

/// Handler: POST /api/review/:id/clear
pub async fn clear_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReviewResponse>, ApiError> {
    with_session(&state, id, ReviewSession::clear).await
}

/// Handler: POST /api/review/:id/save
pub async fn save_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReviewResponse>, ApiError> {
    with_session(&state, id, ReviewSession::save).await
}

/// Handler: POST /api/review/:id/next
///
/// The save gate lives in the session itself; a gate failure maps to a 409
/// so the UI can re-disable its forward control.
pub async fn next_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReviewResponse>, ApiError> {
    with_session(&state, id, ReviewSession::next).await
}

/// Handler: POST /api/review/:id/back
pub async fn back_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReviewResponse>, ApiError> {
    with_session(&state, id, |session| {
        session.back();
        Ok(())
    })
    .await
}

async fn with_session<F>(
    state: &AppState,
    id: Uuid,
    op: F,
) -> Result<Json<ReviewResponse>, ApiError>
where
    F: FnOnce(&mut ReviewSession) -> Result<(), SessionError>,
{
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(ApiError::SessionNotFound(id))?;
    op(session)?;
    Ok(Json(ReviewResponse::from_session(id, session)))
}
