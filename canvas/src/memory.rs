//! In-process persistence backend.
//!
//! Mirrors the server's ownership rules for a single signed-in user: boards
//! belonging to someone else are `Forbidden`, missing rows are `NotFound`,
//! batched note updates and reorders are all-or-nothing, and deleting a board
//! removes its notes. Failures can be injected per operation and calls are
//! counted, which is what the engine's own tests lean on.

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::board::{Board, BoardPatch, NewBoard, next_order_index, sort_boards, validate_permutation};
use crate::doc::{BoardId, Note, NoteId, NotePatch, PartialNote};
use crate::error::CanvasError;
use crate::geometry::GeometryLimits;
use crate::persistence::PersistenceClient;

/// Persistence operation names, used for failure injection and call counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    LoadNotes,
    CreateNote,
    UpdateNotes,
    DeleteNote,
    ListBoards,
    CreateBoard,
    UpdateBoard,
    DeleteBoard,
    ReorderBoards,
}

struct StoredBoard {
    owner: i64,
    board: Board,
}

#[derive(Default)]
struct Inner {
    boards: Vec<StoredBoard>,
    notes: Vec<Note>,
    next_board_id: BoardId,
    next_note_id: NoteId,
    failures: HashMap<Op, CanvasError>,
    calls: HashMap<Op, usize>,
}

impl Inner {
    /// Count the call and take any injected failure.
    fn enter(&mut self, op: Op) -> Result<(), CanvasError> {
        *self.calls.entry(op).or_insert(0) += 1;
        match self.failures.remove(&op) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn owned_board(&self, user: i64, id: BoardId) -> Result<usize, CanvasError> {
        let idx = self
            .boards
            .iter()
            .position(|b| b.board.id == id)
            .ok_or_else(|| CanvasError::NotFound(format!("board {id}")))?;
        if self.boards[idx].owner != user {
            return Err(CanvasError::Forbidden(format!("board {id} belongs to another user")));
        }
        Ok(idx)
    }

    fn user_boards(&self, user: i64) -> Vec<Board> {
        let mut out: Vec<Board> = self.boards.iter().filter(|b| b.owner == user).map(|b| b.board.clone()).collect();
        sort_boards(&mut out);
        out
    }
}

/// Persistence held in process memory for one user.
pub struct MemoryPersistence {
    user_id: i64,
    limits: GeometryLimits,
    latency: Mutex<Option<Duration>>,
    inner: Mutex<Inner>,
}

impl MemoryPersistence {
    #[must_use]
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            limits: GeometryLimits::default(),
            latency: Mutex::new(None),
            inner: Mutex::new(Inner { next_board_id: 1, next_note_id: 1, ..Inner::default() }),
        }
    }

    /// Use custom geometry minimums when creating notes.
    #[must_use]
    pub fn with_limits(mut self, limits: GeometryLimits) -> Self {
        self.limits = limits;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next call of `op` fail with `err`.
    pub fn fail_next(&self, op: Op, err: CanvasError) {
        self.lock().failures.insert(op, err);
    }

    /// Number of times `op` has been called.
    #[must_use]
    pub fn call_count(&self, op: Op) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap_or_else(PoisonError::into_inner) = Some(latency);
    }

    /// Add a board owned by another user.
    pub fn insert_foreign_board(&self, owner: i64, title: &str) -> BoardId {
        let mut inner = self.lock();
        let id = inner.next_board_id;
        inner.next_board_id += 1;
        let board = Board { id, title: title.to_owned(), background: "#ffffff".to_owned(), order_index: 0 };
        inner.boards.push(StoredBoard { owner, board });
        id
    }

    /// Store a note directly, bypassing validation. Returns its id.
    pub fn seed_note(&self, board_id: BoardId, note: Note) -> NoteId {
        let mut inner = self.lock();
        let id = inner.next_note_id;
        inner.next_note_id += 1;
        inner.notes.push(Note { id, board_id, ..note });
        id
    }

    /// Persisted copy of a note.
    #[must_use]
    pub fn stored_note(&self, id: NoteId) -> Option<Note> {
        self.lock().notes.iter().find(|n| n.id == id).cloned()
    }

    async fn delay(&self) {
        let latency = *self.latency.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(d) = latency {
            tokio::time::sleep(d).await;
        }
    }
}

#[async_trait]
impl PersistenceClient for MemoryPersistence {
    async fn load_notes(&self, board_id: BoardId) -> Result<Vec<Note>, CanvasError> {
        self.delay().await;
        let mut inner = self.lock();
        inner.enter(Op::LoadNotes)?;
        inner.owned_board(self.user_id, board_id)?;
        Ok(inner.notes.iter().filter(|n| n.board_id == board_id).cloned().collect())
    }

    async fn create_note(&self, board_id: BoardId, fields: &PartialNote) -> Result<Note, CanvasError> {
        self.delay().await;
        let mut inner = self.lock();
        inner.enter(Op::CreateNote)?;
        inner.owned_board(self.user_id, board_id)?;
        let id = inner.next_note_id;
        let note = Note::from_fields(id, board_id, fields, &self.limits)?;
        inner.next_note_id += 1;
        inner.notes.push(note.clone());
        Ok(note)
    }

    async fn update_notes(&self, board_id: BoardId, patches: &[NotePatch]) -> Result<(), CanvasError> {
        self.delay().await;
        let mut inner = self.lock();
        inner.enter(Op::UpdateNotes)?;
        inner.owned_board(self.user_id, board_id)?;

        // Validate the whole batch before touching anything.
        let mut targets = Vec::with_capacity(patches.len());
        for patch in patches {
            patch.fields.validate()?;
            let idx = inner
                .notes
                .iter()
                .position(|n| n.id == patch.id && n.board_id == board_id)
                .ok_or_else(|| CanvasError::validation(format!("note {} is not on board {board_id}", patch.id)))?;
            targets.push(idx);
        }
        for (idx, patch) in targets.into_iter().zip(patches) {
            patch.fields.clamped(&self.limits).apply_to(&mut inner.notes[idx]);
        }
        Ok(())
    }

    async fn delete_note(&self, id: NoteId) -> Result<(), CanvasError> {
        self.delay().await;
        let mut inner = self.lock();
        inner.enter(Op::DeleteNote)?;
        let idx = inner
            .notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| CanvasError::NotFound(format!("note {id}")))?;
        let board_id = inner.notes[idx].board_id;
        if inner.owned_board(self.user_id, board_id).is_err() {
            return Err(CanvasError::Forbidden(format!("note {id} is on a board you do not own")));
        }
        inner.notes.remove(idx);
        Ok(())
    }

    async fn list_boards(&self) -> Result<Vec<Board>, CanvasError> {
        self.delay().await;
        let mut inner = self.lock();
        inner.enter(Op::ListBoards)?;
        Ok(inner.user_boards(self.user_id))
    }

    async fn create_board(&self, board: &NewBoard) -> Result<Board, CanvasError> {
        self.delay().await;
        let mut inner = self.lock();
        inner.enter(Op::CreateBoard)?;
        let order_index = next_order_index(&inner.user_boards(self.user_id));
        let id = inner.next_board_id;
        inner.next_board_id += 1;
        let created = Board { id, title: board.title.clone(), background: board.background.clone(), order_index };
        inner.boards.push(StoredBoard { owner: self.user_id, board: created.clone() });
        Ok(created)
    }

    async fn update_board(&self, id: BoardId, patch: &BoardPatch) -> Result<Board, CanvasError> {
        self.delay().await;
        let mut inner = self.lock();
        inner.enter(Op::UpdateBoard)?;
        let idx = inner.owned_board(self.user_id, id)?;
        let board = &mut inner.boards[idx].board;
        if let Some(ref title) = patch.title {
            board.title.clone_from(title);
        }
        if let Some(ref background) = patch.background {
            board.background.clone_from(background);
        }
        Ok(board.clone())
    }

    async fn delete_board(&self, id: BoardId) -> Result<(), CanvasError> {
        self.delay().await;
        let mut inner = self.lock();
        inner.enter(Op::DeleteBoard)?;
        let idx = inner.owned_board(self.user_id, id)?;
        inner.boards.remove(idx);
        inner.notes.retain(|n| n.board_id != id);
        Ok(())
    }

    async fn reorder_boards(&self, ids: &[BoardId]) -> Result<(), CanvasError> {
        self.delay().await;
        let mut inner = self.lock();
        inner.enter(Op::ReorderBoards)?;
        let current: Vec<BoardId> = inner.user_boards(self.user_id).iter().map(|b| b.id).collect();
        validate_permutation(&current, ids)?;
        let user = self.user_id;
        for stored in inner.boards.iter_mut().filter(|b| b.owner == user) {
            if let Some(pos) = ids.iter().position(|id| *id == stored.board.id) {
                stored.board.order_index = i32::try_from(pos).unwrap_or(i32::MAX);
            }
        }
        Ok(())
    }
}
