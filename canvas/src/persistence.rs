//! Collaborator seams: the persistence client and the session provider.
//!
//! The engine never performs credential checks or storage itself. It talks to
//! a `PersistenceClient` for every durable operation and asks a
//! `SessionProvider` whether anyone is signed in before touching it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::board::{Board, BoardPatch, NewBoard};
use crate::doc::{BoardId, Note, NoteId, NotePatch, PartialNote};
use crate::error::CanvasError;

/// The signed-in user as reported by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Answers "who is signed in". `None` means nobody.
pub trait SessionProvider: Send + Sync {
    fn current_user(&self) -> Option<UserIdentity>;
}

/// Session provider with a fixed answer.
#[derive(Debug, Clone, Default)]
pub struct FixedSession(pub Option<UserIdentity>);

impl FixedSession {
    #[must_use]
    pub fn signed_in(user: UserIdentity) -> Self {
        Self(Some(user))
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self(None)
    }
}

impl SessionProvider for FixedSession {
    fn current_user(&self) -> Option<UserIdentity> {
        self.0.clone()
    }
}

/// Durable storage for boards and notes, scoped to the session user.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// All notes of a board the caller owns.
    async fn load_notes(&self, board_id: BoardId) -> Result<Vec<Note>, CanvasError>;

    /// Create a note; the returned note carries the server-issued id.
    async fn create_note(&self, board_id: BoardId, fields: &PartialNote) -> Result<Note, CanvasError>;

    /// Write a batch of patches in one all-or-nothing request.
    async fn update_notes(&self, board_id: BoardId, patches: &[NotePatch]) -> Result<(), CanvasError>;

    async fn delete_note(&self, id: NoteId) -> Result<(), CanvasError>;

    /// The caller's boards ordered by `(order_index, id)`.
    async fn list_boards(&self) -> Result<Vec<Board>, CanvasError>;

    async fn create_board(&self, board: &NewBoard) -> Result<Board, CanvasError>;

    async fn update_board(&self, id: BoardId, patch: &BoardPatch) -> Result<Board, CanvasError>;

    async fn delete_board(&self, id: BoardId) -> Result<(), CanvasError>;

    /// Rewrite every board's order index to its position in `ids`, atomically.
    async fn reorder_boards(&self, ids: &[BoardId]) -> Result<(), CanvasError>;
}

/// Body of a board reorder request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub board_ids: Vec<BoardId>,
}

/// Body of a batched note update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateNotesRequest {
    pub notes: Vec<NotePatch>,
}
