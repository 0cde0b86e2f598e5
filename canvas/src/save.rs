//! Dirty/save coordinator: one explicit save entry point for the active board.
//!
//! DESIGN
//! ======
//! Exactly one flush handler is live at a time; registering a new one (on
//! board switch) replaces the old. `trigger_save` runs that handler with the
//! `saving` flag raised for its whole duration. A second trigger while a save
//! is in flight returns `Skipped` without calling the handler. The flag is
//! lowered by a drop guard, so it resets on success, on error, and if the
//! future is dropped mid-flight.
//!
//! `StoreFlush` is the handler the engine installs: it snapshots the store
//! under its lock, writes the batch with the lock released, and then records
//! the snapshot's revision as saved. Edits made during the write keep the
//! store dirty.

#[cfg(test)]
#[path = "save_test.rs"]
mod save_test;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::doc::{BoardId, SharedNoteStore, lock_store};
use crate::error::CanvasError;
use crate::persistence::PersistenceClient;

/// Persists all pending in-memory state for one board.
#[async_trait]
pub trait FlushHandler: Send + Sync {
    async fn flush(&self) -> Result<(), CanvasError>;
}

/// What `trigger_save` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The handler ran and succeeded.
    Saved,
    /// A save was already in flight; nothing ran.
    Skipped,
    /// No handler is registered (no active board).
    NoHandler,
}

#[derive(Default)]
pub struct SaveCoordinator {
    handler: Mutex<Option<Arc<dyn FlushHandler>>>,
    saving: AtomicBool,
}

/// Lowers the `saving` flag when dropped.
struct SavingGuard<'a>(&'a AtomicBool);

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SaveCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<dyn FlushHandler>>> {
        self.handler.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install the handler for the active board, replacing any previous one.
    pub fn register_flush_handler(&self, handler: Arc<dyn FlushHandler>) {
        *self.slot() = Some(handler);
    }

    /// Remove the handler (no active board).
    pub fn clear_flush_handler(&self) {
        *self.slot() = None;
    }

    #[must_use]
    pub fn has_handler(&self) -> bool {
        self.slot().is_some()
    }

    /// Whether a save is in flight.
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Run the registered handler unless a save is already in flight.
    ///
    /// # Errors
    ///
    /// Returns the handler's error. `is_saving` is false again either way.
    pub async fn trigger_save(&self) -> Result<SaveOutcome, CanvasError> {
        let current = self.slot().clone();
        let Some(handler) = current else {
            debug!("save requested with no active board");
            return Ok(SaveOutcome::NoHandler);
        };
        if self.saving.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            debug!("save already in flight; skipping");
            return Ok(SaveOutcome::Skipped);
        }
        let _guard = SavingGuard(&self.saving);
        match handler.flush().await {
            Ok(()) => Ok(SaveOutcome::Saved),
            Err(e) => {
                warn!(error = %e, "save failed");
                Err(e)
            }
        }
    }
}

/// Flush handler that writes every note of a store in one batch.
pub struct StoreFlush {
    board_id: BoardId,
    client: Arc<dyn PersistenceClient>,
    store: SharedNoteStore,
}

impl StoreFlush {
    #[must_use]
    pub fn new(board_id: BoardId, client: Arc<dyn PersistenceClient>, store: SharedNoteStore) -> Self {
        Self { board_id, client, store }
    }
}

#[async_trait]
impl FlushHandler for StoreFlush {
    async fn flush(&self) -> Result<(), CanvasError> {
        let (patches, revision) = lock_store(&self.store).snapshot_patches();
        info!(board_id = self.board_id, count = patches.len(), revision, "saving notes");
        self.client.update_notes(self.board_id, &patches).await?;
        lock_store(&self.store).mark_saved(revision);
        info!(board_id = self.board_id, revision, "notes saved");
        Ok(())
    }
}
