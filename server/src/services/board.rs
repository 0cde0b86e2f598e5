//! Board service: per-user CRUD and atomic reorder.
//!
//! DESIGN
//! ======
//! Every query is scoped by `user_id`, so a board owned by someone else is
//! indistinguishable from a missing one (`NotFound`). Boards list in
//! `(order_index, id)` order; a new board goes one past the current maximum.
//!
//! ERROR HANDLING
//! ==============
//! Reorder locks the caller's board rows, checks the request names each of
//! them exactly once, and rewrites every index inside one transaction. Any
//! failure rolls the whole batch back.

use canvas::board::{Board, BoardPatch, NewBoard, validate_permutation};
use canvas::doc::BoardId;
use canvas::error::ErrorCode;
use sqlx::PgPool;
use tracing::info;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("board not found: {0}")]
    NotFound(BoardId),
    #[error("board title must not be empty")]
    EmptyTitle,
    #[error("invalid board order: {0}")]
    InvalidOrder(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for BoardError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_BOARD_NOT_FOUND",
            Self::EmptyTitle => "E_BOARD_TITLE",
            Self::InvalidOrder(_) => "E_BOARD_ORDER",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

type BoardTuple = (BoardId, String, String, i32);

fn board_from_tuple((id, title, background, order_index): BoardTuple) -> Board {
    Board { id, title, background, order_index }
}

/// Trimmed title, or `EmptyTitle` if nothing is left.
pub(crate) fn clean_title(raw: &str) -> Result<String, BoardError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(BoardError::EmptyTitle);
    }
    Ok(title.to_owned())
}

// =============================================================================
// CRUD
// =============================================================================

/// List the user's boards in display order.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_boards(pool: &PgPool, user_id: i64) -> Result<Vec<Board>, BoardError> {
    let rows = sqlx::query_as::<_, BoardTuple>(
        "SELECT id, title, background, order_index
         FROM boards
         WHERE user_id = $1
         ORDER BY order_index ASC, id ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(board_from_tuple).collect())
}

/// Create a board at the end of the user's order.
///
/// # Errors
///
/// `EmptyTitle` for a blank title, or a database error.
pub async fn create_board(pool: &PgPool, user_id: i64, board: &NewBoard) -> Result<Board, BoardError> {
    let title = clean_title(&board.title)?;
    let row = sqlx::query_as::<_, BoardTuple>(
        "INSERT INTO boards (user_id, title, background, order_index)
         VALUES ($1, $2, $3, (SELECT COALESCE(MAX(order_index) + 1, 0) FROM boards WHERE user_id = $1))
         RETURNING id, title, background, order_index",
    )
    .bind(user_id)
    .bind(&title)
    .bind(&board.background)
    .fetch_one(pool)
    .await?;

    let created = board_from_tuple(row);
    info!(board_id = created.id, user_id, order_index = created.order_index, "board created");
    Ok(created)
}

/// Apply a partial update to one of the user's boards.
///
/// # Errors
///
/// `NotFound` if the board is missing or not owned, `EmptyTitle` for a blank title.
pub async fn update_board(pool: &PgPool, user_id: i64, id: BoardId, patch: &BoardPatch) -> Result<Board, BoardError> {
    let title = patch.title.as_deref().map(clean_title).transpose()?;
    let row = sqlx::query_as::<_, BoardTuple>(
        "UPDATE boards SET
             title = COALESCE($3, title),
             background = COALESCE($4, background)
         WHERE id = $1 AND user_id = $2
         RETURNING id, title, background, order_index",
    )
    .bind(id)
    .bind(user_id)
    .bind(title)
    .bind(patch.background.as_deref())
    .fetch_optional(pool)
    .await?
    .ok_or(BoardError::NotFound(id))?;

    Ok(board_from_tuple(row))
}

/// Delete one of the user's boards. Its notes go with it.
///
/// # Errors
///
/// `NotFound` if the board is missing or not owned.
pub async fn delete_board(pool: &PgPool, user_id: i64, id: BoardId) -> Result<(), BoardError> {
    let result = sqlx::query("DELETE FROM boards WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(BoardError::NotFound(id));
    }
    info!(board_id = id, user_id, "board deleted");
    Ok(())
}

/// Rewrite the user's board order so `ids[i]` gets index `i`.
///
/// # Errors
///
/// `InvalidOrder` unless `ids` is a permutation of the user's boards.
pub async fn reorder_boards(pool: &PgPool, user_id: i64, ids: &[BoardId]) -> Result<(), BoardError> {
    let mut tx = pool.begin().await?;

    let current: Vec<BoardId> =
        sqlx::query_scalar("SELECT id FROM boards WHERE user_id = $1 ORDER BY order_index, id FOR UPDATE")
            .bind(user_id)
            .fetch_all(&mut *tx)
            .await?;
    validate_permutation(&current, ids).map_err(|e| BoardError::InvalidOrder(e.to_string()))?;

    for (index, id) in ids.iter().enumerate() {
        let order_index = i32::try_from(index).map_err(|e| BoardError::InvalidOrder(e.to_string()))?;
        sqlx::query("UPDATE boards SET order_index = $1 WHERE id = $2 AND user_id = $3")
            .bind(order_index)
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    info!(user_id, count = ids.len(), "boards reordered");
    Ok(())
}

/// Owner of a board, or `None` if it does not exist.
///
/// # Errors
///
/// Returns a database error if the lookup fails.
pub async fn board_owner(pool: &PgPool, id: BoardId) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT user_id FROM boards WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

#[cfg(test)]
#[path = "board_test.rs"]
mod tests;
