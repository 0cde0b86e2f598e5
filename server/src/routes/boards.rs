//! Board routes — list, create, update, delete, reorder.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use canvas::board::{Board, BoardPatch, NewBoard};
use canvas::doc::BoardId;
use canvas::persistence::ReorderRequest;

use crate::error::ApiError;
use crate::routes::auth::AuthUser;
use crate::services::board;
use crate::state::AppState;

/// `GET /api/boards` — the caller's boards in display order.
pub async fn list_boards(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Vec<Board>>, ApiError> {
    Ok(Json(board::list_boards(&state.pool, auth.user.id).await?))
}

/// `POST /api/boards` — create a board at the end of the order.
pub async fn create_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewBoard>,
) -> Result<(StatusCode, Json<Board>), ApiError> {
    let created = board::create_board(&state.pool, auth.user.id, &body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PATCH /api/boards/{id}` — rename or recolour.
pub async fn update_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<BoardId>,
    Json(patch): Json<BoardPatch>,
) -> Result<Json<Board>, ApiError> {
    Ok(Json(board::update_board(&state.pool, auth.user.id, board_id, &patch).await?))
}

/// `DELETE /api/boards/{id}` — delete a board and its notes.
pub async fn delete_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<BoardId>,
) -> Result<StatusCode, ApiError> {
    board::delete_board(&state.pool, auth.user.id, board_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/boards/reorder` — rewrite the whole order in one transaction.
pub async fn reorder_boards(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ReorderRequest>,
) -> Result<StatusCode, ApiError> {
    board::reorder_boards(&state.pool, auth.user.id, &body.board_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}
