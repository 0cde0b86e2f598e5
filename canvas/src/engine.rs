//! Board canvas engine: the application-state container.
//!
//! DESIGN
//! ======
//! `BoardCanvas` owns every collaborator and wires the control flow:
//! board list selects a board, the note store loads its notes, the
//! interaction controller edits them in memory, and the save coordinator
//! flushes them on an explicit trigger.
//!
//! Persistence timing is deliberately asymmetric. Field edits stay in memory
//! until a save; note creation and deletion call through to the collaborator
//! immediately and only touch the store once the call succeeds.
//!
//! Only one board's notes are in memory at a time. Selecting another board
//! builds a fresh store and registers a fresh flush handler; unsaved edits on
//! the previous board are discarded, not autosaved. A save already in flight
//! for the previous board keeps running against that board's store.
//!
//! Every operation that reads or writes persisted state first asks the
//! session provider for a user and refuses with `Unauthorized` if there is
//! none.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::board::{Board, BoardList};
use crate::config::EngineConfig;
use crate::consts::STORE_EVENT_CAPACITY;
use crate::doc::{BoardId, Note, NoteId, NoteStore, OverlapRect, PartialNote, SharedNoteStore, StoreEvent, lock_store};
use crate::error::CanvasError;
use crate::geometry::Point;
use crate::input::{Button, Key, ModalKind, Modifiers, PointerTarget, Selection};
use crate::interaction::{Action, InteractionController, KeyOutcome, is_reserved_chord};
use crate::persistence::{PersistenceClient, SessionProvider, UserIdentity};
use crate::save::{SaveCoordinator, SaveOutcome, StoreFlush};
use crate::settings::{Settings, SettingsPatch, SettingsStore};

pub struct BoardCanvas {
    client: Arc<dyn PersistenceClient>,
    session: Arc<dyn SessionProvider>,
    config: EngineConfig,
    settings: SettingsStore,
    saver: SaveCoordinator,
    boards: BoardList,
    store: SharedNoteStore,
    events: broadcast::Sender<StoreEvent>,
    controller: InteractionController,
}

impl BoardCanvas {
    #[must_use]
    pub fn new(
        client: Arc<dyn PersistenceClient>,
        session: Arc<dyn SessionProvider>,
        settings: SettingsStore,
        config: EngineConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(STORE_EVENT_CAPACITY);
        let store = Arc::new(Mutex::new(NoteStore::with_events(config.limits, events.clone())));
        Self {
            client,
            session,
            config,
            settings,
            saver: SaveCoordinator::new(),
            boards: BoardList::new(),
            store,
            events,
            controller: InteractionController::new(config),
        }
    }

    fn require_session(&self) -> Result<UserIdentity, CanvasError> {
        self.session.current_user().ok_or(CanvasError::Unauthorized)
    }

    fn require_board(&self) -> Result<BoardId, CanvasError> {
        lock_store(&self.store)
            .board_id()
            .ok_or_else(|| CanvasError::validation("no board is selected"))
    }

    // --- Lifecycle ---

    /// Start honouring input events.
    pub fn start(&mut self) {
        self.controller.start();
    }

    /// Stop honouring input events.
    pub fn stop(&mut self) {
        self.controller.stop();
    }

    // --- Queries ---

    /// Subscribe to note store notifications. Survives board switches.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn active_board(&self) -> Option<BoardId> {
        lock_store(&self.store).board_id()
    }

    /// Snapshot of the active board's notes, bottom to top.
    #[must_use]
    pub fn notes(&self) -> Vec<Note> {
        let store = lock_store(&self.store);
        self.controller.ordered(store.notes()).into_iter().cloned().collect()
    }

    #[must_use]
    pub fn note(&self, id: NoteId) -> Option<Note> {
        lock_store(&self.store).get(id).cloned()
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.controller.selection()
    }

    #[must_use]
    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        lock_store(&self.store).is_dirty()
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saver.is_saving()
    }

    #[must_use]
    pub fn settings(&self) -> Settings {
        self.settings.get()
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Every overlapping pair on the active board.
    #[must_use]
    pub fn overlaps(&self) -> Vec<OverlapRect> {
        lock_store(&self.store).overlaps()
    }

    /// Overlaps to draw, empty when the overlap warning is switched off.
    #[must_use]
    pub fn visible_overlaps(&self) -> Vec<OverlapRect> {
        if self.settings.get().overlap_warning { self.overlaps() } else { Vec::new() }
    }

    /// `x, y` readout for a note, when coordinate display is on.
    #[must_use]
    pub fn coordinate_label(&self, id: NoteId) -> Option<String> {
        if !self.settings.get().show_coordinates {
            return None;
        }
        lock_store(&self.store).get(id).map(|n| format!("{:.0}, {:.0}", n.x, n.y))
    }

    // --- Settings ---

    /// Merge and persist a settings change.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a zero grid size.
    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<Settings, CanvasError> {
        self.settings.update(patch)
    }

    // --- Boards ---

    #[must_use]
    pub fn boards(&self) -> &[Board] {
        self.boards.list()
    }

    /// Reload the board list.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without a session, otherwise the collaborator's error.
    pub async fn refresh_boards(&mut self) -> Result<Vec<Board>, CanvasError> {
        self.require_session()?;
        Ok(self.boards.refresh(self.client.as_ref()).await?.to_vec())
    }

    /// Create a board at the end of the list.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `Validation` for a blank title, or the collaborator's error.
    pub async fn create_board(&mut self, title: &str, background: &str) -> Result<Board, CanvasError> {
        self.require_session()?;
        self.boards.create(self.client.as_ref(), title, background).await
    }

    /// # Errors
    ///
    /// `Unauthorized`, `Validation` for a blank title, or the collaborator's error.
    pub async fn rename_board(&mut self, id: BoardId, title: &str) -> Result<Board, CanvasError> {
        self.require_session()?;
        self.boards.rename(self.client.as_ref(), id, title).await
    }

    /// # Errors
    ///
    /// `Unauthorized`, `Validation` for a blank colour, or the collaborator's error.
    pub async fn recolor_board(&mut self, id: BoardId, background: &str) -> Result<Board, CanvasError> {
        self.require_session()?;
        self.boards.recolor(self.client.as_ref(), id, background).await
    }

    /// Delete a board. Deleting the active board empties the canvas.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, or the collaborator's error.
    pub async fn delete_board(&mut self, id: BoardId) -> Result<(), CanvasError> {
        self.require_session()?;
        self.boards.delete(self.client.as_ref(), id).await?;
        if self.active_board() == Some(id) {
            self.close_board();
        }
        Ok(())
    }

    /// Reorder boards; all-or-nothing.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `Validation` unless `ids` is a permutation of the
    /// current boards, or the collaborator's error.
    pub async fn reorder_boards(&mut self, ids: &[BoardId]) -> Result<(), CanvasError> {
        self.require_session()?;
        self.boards.reorder(self.client.as_ref(), ids).await
    }

    /// Make `id` the active board and load its notes.
    ///
    /// On failure the previously active board stays loaded.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `Forbidden`/`NotFound` for boards the user does not
    /// own, or the collaborator's error.
    pub async fn select_board(&mut self, id: BoardId) -> Result<usize, CanvasError> {
        self.require_session()?;
        let notes = self.client.load_notes(id).await?;

        if self.is_dirty() {
            warn!(board_id = ?self.active_board(), "discarding unsaved edits on board switch");
        }
        let mut store = NoteStore::with_events(self.config.limits, self.events.clone());
        store.load_snapshot(id, notes);
        let count = store.len();

        self.store = Arc::new(Mutex::new(store));
        self.controller.reset();
        self.saver
            .register_flush_handler(Arc::new(StoreFlush::new(id, Arc::clone(&self.client), Arc::clone(&self.store))));
        info!(board_id = id, count, "board loaded");
        Ok(count)
    }

    /// Leave the active board without saving.
    pub fn close_board(&mut self) {
        let mut store = NoteStore::with_events(self.config.limits, self.events.clone());
        store.clear();
        self.store = Arc::new(Mutex::new(store));
        self.controller.reset();
        self.saver.clear_flush_handler();
    }

    // --- Notes ---

    /// Create a note on the active board, persisting it immediately. The new
    /// note is selected and brought to the front.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `Validation` for an invalid initial patch or no active
    /// board, or the collaborator's error.
    pub async fn create_note(&mut self, initial: PartialNote) -> Result<Note, CanvasError> {
        self.require_session()?;
        let board_id = self.require_board()?;
        initial.validate()?;
        let fields = initial.clamped(&self.config.limits);

        let note = self.client.create_note(board_id, &fields).await?;

        {
            let mut store = lock_store(&self.store);
            if store.board_id() != Some(board_id) {
                debug!(board_id, id = note.id, "board changed during create; not inserting");
                return Ok(note);
            }
            store.insert(note.clone());
        }
        self.controller.select(note.id);
        info!(board_id, id = note.id, "note created");
        Ok(note)
    }

    /// Edit a note in memory. Nothing is persisted until the next save.
    ///
    /// Returns `false` if the note is not on the active board.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, or `Validation` for a patch clamping cannot repair.
    pub fn update_note(&mut self, id: NoteId, patch: &PartialNote) -> Result<bool, CanvasError> {
        self.require_session()?;
        lock_store(&self.store).apply_partial(id, patch)
    }

    /// Delete a note, persisting immediately, then drop it from memory.
    /// A note already gone on the server is removed locally as well.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `Forbidden` for notes on boards the user does not own,
    /// or the collaborator's error.
    pub async fn delete_note(&mut self, id: NoteId) -> Result<(), CanvasError> {
        self.require_session()?;
        match self.client.delete_note(id).await {
            Ok(()) => {}
            Err(CanvasError::NotFound(detail)) => {
                debug!(id, %detail, "note already deleted on server");
            }
            Err(e) => return Err(e),
        }
        lock_store(&self.store).remove(id);
        self.controller.on_note_deleted(id);
        Ok(())
    }

    /// Flush the active board.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, or the flush handler's error.
    pub async fn save(&self) -> Result<SaveOutcome, CanvasError> {
        self.require_session()?;
        self.saver.trigger_save().await
    }

    // --- Input ---

    pub fn on_pointer_down(&mut self, target: PointerTarget, pt: Point, button: Button) -> Vec<Action> {
        let settings = self.settings.get();
        let store = lock_store(&self.store);
        self.controller.on_pointer_down(target, pt, button, &store, &settings)
    }

    /// # Errors
    ///
    /// `Unauthorized` without a session.
    pub fn on_pointer_move(&mut self, pt: Point) -> Result<Vec<Action>, CanvasError> {
        self.require_session()?;
        let settings = self.settings.get();
        let mut store = lock_store(&self.store);
        Ok(self.controller.on_pointer_move(pt, &mut store, &settings))
    }

    pub fn on_pointer_up(&mut self) {
        self.controller.on_pointer_up();
    }

    pub fn open_modal(&mut self, kind: ModalKind) -> Vec<Action> {
        self.controller.open_modal(kind)
    }

    pub fn close_modal(&mut self) -> Vec<Action> {
        self.controller.close_modal()
    }

    /// Handle a key-down, running any create or save it requests.
    ///
    /// The outcome always comes back, so the host can suppress the platform
    /// default even when the session is missing or a requested create or
    /// save fails. The first such failure is reported in `error`.
    pub async fn on_key_down(&mut self, key: &Key, mods: Modifiers) -> KeyDispatch {
        if let Err(error) = self.require_session() {
            let outcome = KeyOutcome { actions: Vec::new(), prevent_default: is_reserved_chord(key, mods) };
            return KeyDispatch { outcome, error: Some(error) };
        }
        let settings = self.settings.get();
        let outcome = {
            let mut store = lock_store(&self.store);
            self.controller.on_key_down(key, mods, &mut store, &settings)
        };
        let mut error = None;
        for action in &outcome.actions {
            let result = match action {
                Action::CreateNoteRequested { at } => self.create_note(PartialNote::position(at.x, at.y)).await.map(drop),
                Action::SaveRequested => self.save().await.map(drop),
                _ => Ok(()),
            };
            if let Err(e) = result {
                warn!(error = %e, "keyboard action failed");
                error.get_or_insert(e);
            }
        }
        KeyDispatch { outcome, error }
    }
}

/// What a key-down produced: the controller's outcome, plus the error of a
/// missing session or a failed create or save.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDispatch {
    pub outcome: KeyOutcome,
    pub error: Option<CanvasError>,
}

impl KeyDispatch {
    /// Whether the host must suppress the platform default.
    #[must_use]
    pub fn prevent_default(&self) -> bool {
        self.outcome.prevent_default
    }

    /// The outcome, or the error if one occurred.
    ///
    /// # Errors
    ///
    /// Returns the recorded error.
    pub fn into_result(self) -> Result<KeyOutcome, CanvasError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.outcome),
        }
    }
}
