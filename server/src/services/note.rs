//! Note service: load, create, batched update, and delete.
//!
//! DESIGN
//! ======
//! Notes are reachable only through a board the caller owns; a board owned
//! by someone else yields `Forbidden`. Incoming fields go through the same
//! validation and clamping the canvas engine applies, so stored geometry
//! never drops below the minimum size or into negative coordinates.
//!
//! ERROR HANDLING
//! ==============
//! A batched update is validated in full before any row is written, then
//! applied inside one transaction. A patch naming a note outside the board
//! aborts the batch and nothing is saved.

use canvas::doc::{BoardId, FontWeight, Note, NoteId, NotePatch, Overflow, PartialNote, TextAlign, VerticalAlign};
use canvas::error::{CanvasError, ErrorCode};
use canvas::geometry::GeometryLimits;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, info};

use crate::services::board::board_owner;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    #[error("board not found: {0}")]
    BoardNotFound(BoardId),
    #[error("note not found: {0}")]
    NotFound(NoteId),
    #[error("board {0} belongs to another user")]
    Forbidden(BoardId),
    #[error("invalid note: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for NoteError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::BoardNotFound(_) => "E_BOARD_NOT_FOUND",
            Self::NotFound(_) => "E_NOTE_NOT_FOUND",
            Self::Forbidden(_) => "E_FORBIDDEN",
            Self::Invalid(_) => "E_NOTE_INVALID",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

impl From<CanvasError> for NoteError {
    fn from(err: CanvasError) -> Self {
        Self::Invalid(validation_message(err))
    }
}

const NOTE_COLUMNS: &str = "id, board_id, content, x, y, width, height, font_size, font_color, font_weight, \
                            font_family, background_color, border_width, border_color, overflow, text_align, \
                            vertical_align";

fn note_from_row(row: &PgRow) -> Result<Note, sqlx::Error> {
    let font_weight: String = row.try_get("font_weight")?;
    let overflow: String = row.try_get("overflow")?;
    let text_align: String = row.try_get("text_align")?;
    let vertical_align: String = row.try_get("vertical_align")?;
    Ok(Note {
        id: row.try_get("id")?,
        board_id: row.try_get("board_id")?,
        content: row.try_get("content")?,
        x: row.try_get("x")?,
        y: row.try_get("y")?,
        width: row.try_get("width")?,
        height: row.try_get("height")?,
        font_size: row.try_get("font_size")?,
        font_color: row.try_get("font_color")?,
        font_weight: FontWeight::parse(&font_weight).unwrap_or_default(),
        font_family: row.try_get("font_family")?,
        background_color: row.try_get("background_color")?,
        border_width: row.try_get("border_width")?,
        border_color: row.try_get("border_color")?,
        overflow: Overflow::parse(&overflow).unwrap_or_default(),
        text_align: TextAlign::parse(&text_align).unwrap_or_default(),
        vertical_align: VerticalAlign::parse(&vertical_align).unwrap_or_default(),
    })
}

/// Validate every patch and clamp its geometry. Fails on the first bad patch.
pub(crate) fn prepare_patches(patches: &[NotePatch], limits: &GeometryLimits) -> Result<Vec<NotePatch>, NoteError> {
    patches
        .iter()
        .map(|patch| {
            patch
                .fields
                .validate()
                .map_err(|e| NoteError::Invalid(format!("note {}: {}", patch.id, validation_message(e))))?;
            Ok(NotePatch { id: patch.id, fields: patch.fields.clamped(limits) })
        })
        .collect()
}

fn validation_message(err: CanvasError) -> String {
    match err {
        CanvasError::Validation(msg) => msg,
        other => other.to_string(),
    }
}

// =============================================================================
// OWNERSHIP
// =============================================================================

async fn ensure_board_owner(pool: &PgPool, user_id: i64, board_id: BoardId) -> Result<(), NoteError> {
    match board_owner(pool, board_id).await? {
        None => Err(NoteError::BoardNotFound(board_id)),
        Some(owner) if owner != user_id => Err(NoteError::Forbidden(board_id)),
        Some(_) => Ok(()),
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// All notes on one of the user's boards, most recently modified first.
/// The engine uses this order as its initial stacking order.
///
/// # Errors
///
/// `Forbidden` for another user's board, `BoardNotFound` for a missing one.
pub async fn list_notes(pool: &PgPool, user_id: i64, board_id: BoardId) -> Result<Vec<Note>, NoteError> {
    ensure_board_owner(pool, user_id, board_id).await?;
    let rows = sqlx::query(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE board_id = $1 ORDER BY updated_at DESC, id"))
        .bind(board_id)
        .fetch_all(pool)
        .await?;
    let notes = rows.iter().map(note_from_row).collect::<Result<Vec<_>, _>>()?;
    debug!(board_id, count = notes.len(), "notes loaded");
    Ok(notes)
}

/// Create a note from defaults plus `fields`.
///
/// # Errors
///
/// `Forbidden` for another user's board (checked first), `Invalid` for
/// fields no clamp can repair.
pub async fn create_note(
    pool: &PgPool,
    user_id: i64,
    board_id: BoardId,
    fields: &PartialNote,
    limits: &GeometryLimits,
) -> Result<Note, NoteError> {
    ensure_board_owner(pool, user_id, board_id).await?;
    let draft = Note::from_fields(0, board_id, fields, limits)?;

    let row = sqlx::query(&format!(
        "INSERT INTO notes (board_id, content, x, y, width, height, font_size, font_color, font_weight,
                            font_family, background_color, border_width, border_color, overflow,
                            text_align, vertical_align)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
         RETURNING {NOTE_COLUMNS}"
    ))
    .bind(board_id)
    .bind(&draft.content)
    .bind(draft.x)
    .bind(draft.y)
    .bind(draft.width)
    .bind(draft.height)
    .bind(draft.font_size)
    .bind(&draft.font_color)
    .bind(draft.font_weight.as_str())
    .bind(&draft.font_family)
    .bind(&draft.background_color)
    .bind(draft.border_width)
    .bind(&draft.border_color)
    .bind(draft.overflow.as_str())
    .bind(draft.text_align.as_str())
    .bind(draft.vertical_align.as_str())
    .fetch_one(pool)
    .await?;

    let note = note_from_row(&row)?;
    info!(note_id = note.id, board_id, "note created");
    Ok(note)
}

/// Apply a batch of sparse updates in one transaction.
///
/// # Errors
///
/// `Invalid` if any patch is invalid or names a note outside the board;
/// nothing is written in that case.
pub async fn update_notes(
    pool: &PgPool,
    user_id: i64,
    board_id: BoardId,
    patches: &[NotePatch],
    limits: &GeometryLimits,
) -> Result<(), NoteError> {
    let prepared = prepare_patches(patches, limits)?;
    ensure_board_owner(pool, user_id, board_id).await?;

    let mut tx = pool.begin().await?;
    for patch in &prepared {
        let f = &patch.fields;
        let result = sqlx::query(
            "UPDATE notes SET
                 content = COALESCE($3, content),
                 x = COALESCE($4, x),
                 y = COALESCE($5, y),
                 width = COALESCE($6, width),
                 height = COALESCE($7, height),
                 font_size = COALESCE($8, font_size),
                 font_color = COALESCE($9, font_color),
                 font_weight = COALESCE($10, font_weight),
                 font_family = COALESCE($11, font_family),
                 background_color = COALESCE($12, background_color),
                 border_width = COALESCE($13, border_width),
                 border_color = COALESCE($14, border_color),
                 overflow = COALESCE($15, overflow),
                 text_align = COALESCE($16, text_align),
                 vertical_align = COALESCE($17, vertical_align),
                 updated_at = now()
             WHERE id = $1 AND board_id = $2",
        )
        .bind(patch.id)
        .bind(board_id)
        .bind(f.content.as_deref())
        .bind(f.x)
        .bind(f.y)
        .bind(f.width)
        .bind(f.height)
        .bind(f.font_size)
        .bind(f.font_color.as_deref())
        .bind(f.font_weight.map(FontWeight::as_str))
        .bind(f.font_family.as_deref())
        .bind(f.background_color.as_deref())
        .bind(f.border_width)
        .bind(f.border_color.as_deref())
        .bind(f.overflow.map(Overflow::as_str))
        .bind(f.text_align.map(TextAlign::as_str))
        .bind(f.vertical_align.map(VerticalAlign::as_str))
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(NoteError::Invalid(format!("note {} is not on board {board_id}", patch.id)));
        }
    }
    tx.commit().await?;

    info!(board_id, count = prepared.len(), "notes saved");
    Ok(())
}

/// Delete a note on one of the user's boards.
///
/// # Errors
///
/// `NotFound` for a missing note, `Forbidden` when its board belongs to someone else.
pub async fn delete_note(pool: &PgPool, user_id: i64, id: NoteId) -> Result<(), NoteError> {
    let found: Option<(BoardId, i64)> = sqlx::query_as(
        "SELECT n.board_id, b.user_id FROM notes n JOIN boards b ON b.id = n.board_id WHERE n.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let (board_id, owner) = found.ok_or(NoteError::NotFound(id))?;
    if owner != user_id {
        return Err(NoteError::Forbidden(board_id));
    }

    sqlx::query("DELETE FROM notes WHERE id = $1").bind(id).execute(pool).await?;
    info!(note_id = id, board_id, "note deleted");
    Ok(())
}

#[cfg(test)]
#[path = "note_test.rs"]
mod tests;
