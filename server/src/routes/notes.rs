//! Note routes — load, create, batched update, delete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use canvas::doc::{BoardId, Note, NoteId, PartialNote};
use canvas::persistence::UpdateNotesRequest;

use crate::error::ApiError;
use crate::routes::auth::AuthUser;
use crate::services::note;
use crate::state::AppState;

/// `GET /api/boards/{id}/notes` — every note on the board.
pub async fn list_notes(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<BoardId>,
) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(note::list_notes(&state.pool, auth.user.id, board_id).await?))
}

/// `POST /api/boards/{id}/notes` — create a note from defaults plus the body.
pub async fn create_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<BoardId>,
    Json(fields): Json<PartialNote>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let created = note::create_note(&state.pool, auth.user.id, board_id, &fields, &state.limits).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/boards/{id}/notes` — apply a batch of sparse updates atomically.
pub async fn update_notes(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<BoardId>,
    Json(body): Json<UpdateNotesRequest>,
) -> Result<StatusCode, ApiError> {
    note::update_notes(&state.pool, auth.user.id, board_id, &body.notes, &state.limits).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/notes/{id}`
pub async fn delete_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(note_id): Path<NoteId>,
) -> Result<StatusCode, ApiError> {
    note::delete_note(&state.pool, auth.user.id, note_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
