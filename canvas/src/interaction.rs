//! Interaction controller: turns pointer and keyboard events into selection
//! changes, in-memory note edits, and requests for the host.
//!
//! DESIGN
//! ======
//! The controller owns only transient state: the selection, the open modal,
//! the last pointer position, the pointer gesture and the stacking order. It
//! mutates the `NoteStore` it is handed for move/resize, and returns
//! `Action`s for everything that needs I/O (note creation, save) so the
//! owner can run those asynchronously.
//!
//! Listeners are registered in the capture phase so the save shortcut wins
//! over the platform's own binding. `start`/`stop` bracket the period in
//! which events are honoured; while stopped every handler is a no-op.
//!
//! Stacking order is a monotonically increasing counter. Bumping a note
//! assigns the next value; values are never reused within a board and the
//! counter restarts when the board changes.

#[cfg(test)]
#[path = "interaction_test.rs"]
mod interaction_test;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::doc::{Note, NoteId, NoteStore, PartialNote};
use crate::geometry::{Point, snap_to_grid};
use crate::input::{
    Button, Direction, InputState, Key, ListenerPhase, ModalKind, Modifiers, PointerTarget, Selection, UiState,
};
use crate::settings::Settings;

/// Listener phase the host must register the controller's handlers in.
pub const LISTENER_PHASE: ListenerPhase = ListenerPhase::Capture;

/// Chords the engine always claims from the platform: primary+S (save) and
/// Alt+N (create), whatever the selection, modal or session state.
#[must_use]
pub fn is_reserved_chord(key: &Key, mods: Modifiers) -> bool {
    (mods.primary_only() && key.is_char('s')) || (mods.alt_only() && key.is_char('n'))
}

/// Actions returned from input handlers for the owner to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A note was edited in memory.
    NoteUpdated { id: NoteId, fields: PartialNote },
    /// Create a note whose top-left corner is `at`.
    CreateNoteRequested { at: Point },
    /// Flush the active board.
    SaveRequested,
    SelectionChanged(Selection),
    ModalOpened(ModalKind),
    ModalClosed,
    /// Stacking order changed.
    RenderNeeded,
}

/// Result of a key-down: actions plus whether the host must suppress the
/// platform default for this key combination.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyOutcome {
    pub actions: Vec<Action>,
    pub prevent_default: bool,
}

impl KeyOutcome {
    fn handled(actions: Vec<Action>) -> Self {
        Self { actions, prevent_default: true }
    }

    fn ignored() -> Self {
        Self::default()
    }
}

pub struct InteractionController {
    config: EngineConfig,
    running: bool,
    ui: UiState,
    input: InputState,
    z_counter: u64,
    z_order: HashMap<NoteId, u64>,
}

impl InteractionController {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            running: false,
            ui: UiState::default(),
            input: InputState::Idle,
            z_counter: 0,
            z_order: HashMap::new(),
        }
    }

    // --- Lifecycle ---

    /// Begin honouring events. The host registers its listeners in
    /// [`LISTENER_PHASE`] when calling this.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop honouring events and abandon any gesture in progress.
    pub fn stop(&mut self) {
        self.running = false;
        self.input = InputState::Idle;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn listener_phase(&self) -> ListenerPhase {
        LISTENER_PHASE
    }

    // --- State queries ---

    #[must_use]
    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.ui.selection
    }

    #[must_use]
    pub fn modal(&self) -> Option<ModalKind> {
        self.ui.modal
    }

    #[must_use]
    pub fn input(&self) -> InputState {
        self.input
    }

    /// Stacking value of a note; 0 if it was never bumped.
    #[must_use]
    pub fn z_of(&self, id: NoteId) -> u64 {
        self.z_order.get(&id).copied().unwrap_or(0)
    }

    /// Notes sorted bottom to top. Ties keep store order.
    #[must_use]
    pub fn ordered<'a>(&self, notes: &'a [Note]) -> Vec<&'a Note> {
        let mut out: Vec<&Note> = notes.iter().collect();
        out.sort_by_key(|n| self.z_of(n.id));
        out
    }

    // --- State transitions ---

    /// Move a note to the top of the stacking order.
    pub fn bring_to_front(&mut self, id: NoteId) {
        self.z_counter += 1;
        self.z_order.insert(id, self.z_counter);
    }

    /// Select a note and bring it to the front.
    pub fn select(&mut self, id: NoteId) -> Vec<Action> {
        self.bring_to_front(id);
        self.ui.selection = Selection::Selected(id);
        vec![Action::SelectionChanged(self.ui.selection), Action::RenderNeeded]
    }

    fn set_unselected(&mut self) -> Vec<Action> {
        if self.ui.selection == Selection::Unselected {
            return Vec::new();
        }
        self.ui.selection = Selection::Unselected;
        vec![Action::SelectionChanged(Selection::Unselected)]
    }

    /// Forget all board-scoped state. Called when the active board changes.
    pub fn reset(&mut self) {
        self.ui.selection = Selection::Unselected;
        self.ui.modal = None;
        self.input = InputState::Idle;
        self.z_counter = 0;
        self.z_order.clear();
    }

    /// A note left the store; drop any reference to it.
    pub fn on_note_deleted(&mut self, id: NoteId) -> Vec<Action> {
        self.z_order.remove(&id);
        if matches!(self.input, InputState::DraggingNote { id: drag, .. } if drag == id) {
            self.input = InputState::Idle;
        }
        if matches!(self.ui.modal, Some(ModalKind::NoteProperties(m)) if m == id) {
            self.ui.modal = None;
        }
        if self.ui.selection == Selection::Selected(id) {
            return self.set_unselected();
        }
        Vec::new()
    }

    /// A modal gained input focus. Selection is dropped.
    pub fn open_modal(&mut self, kind: ModalKind) -> Vec<Action> {
        self.input = InputState::Idle;
        self.ui.modal = Some(kind);
        let mut actions = self.set_unselected();
        actions.push(Action::ModalOpened(kind));
        actions
    }

    pub fn close_modal(&mut self) -> Vec<Action> {
        if self.ui.modal.take().is_some() {
            vec![Action::ModalClosed]
        } else {
            Vec::new()
        }
    }

    // --- Pointer events ---

    /// Pointer-down on a note selects it and may begin a drag; on empty
    /// canvas it clears the selection.
    pub fn on_pointer_down(
        &mut self,
        target: PointerTarget,
        pt: Point,
        button: Button,
        store: &NoteStore,
        settings: &Settings,
    ) -> Vec<Action> {
        if !self.running || self.ui.modal.is_some() || button != Button::Primary {
            return Vec::new();
        }
        self.ui.last_pointer = Some(pt);
        match target {
            PointerTarget::Canvas => {
                self.input = InputState::Idle;
                self.set_unselected()
            }
            PointerTarget::Note(id) => {
                let Some(note) = store.get(id) else {
                    debug!(id, "pointer-down on unknown note");
                    return Vec::new();
                };
                if settings.move_enabled {
                    self.input = InputState::DraggingNote { id, start: pt, orig_x: note.x, orig_y: note.y };
                }
                self.select(id)
            }
        }
    }

    /// Track the pointer; while dragging, move the note through the store.
    pub fn on_pointer_move(&mut self, pt: Point, store: &mut NoteStore, settings: &Settings) -> Vec<Action> {
        if !self.running {
            return Vec::new();
        }
        self.ui.last_pointer = Some(pt);
        let InputState::DraggingNote { id, start, orig_x, orig_y } = self.input else {
            return Vec::new();
        };
        let mut x = orig_x + (pt.x - start.x);
        let mut y = orig_y + (pt.y - start.y);
        if settings.grid_snap {
            x = snap_to_grid(x, settings.grid_size);
            y = snap_to_grid(y, settings.grid_size);
        }
        apply_geometry(store, id, &PartialNote::position(x, y))
    }

    pub fn on_pointer_up(&mut self) {
        self.input = InputState::Idle;
    }

    // --- Keyboard ---

    /// Interpret a key-down.
    ///
    /// The save shortcut fires regardless of selection. While a modal is open
    /// only Escape is honoured (it closes the modal). Move and resize need a
    /// selected note that is still in the store; a stale selection is ignored.
    pub fn on_key_down(&mut self, key: &Key, mods: Modifiers, store: &mut NoteStore, settings: &Settings) -> KeyOutcome {
        if !self.running {
            return KeyOutcome::ignored();
        }

        if mods.primary_only() && key.is_char('s') {
            return KeyOutcome::handled(vec![Action::SaveRequested]);
        }

        if self.ui.modal.is_some() {
            if key.is_escape() {
                return KeyOutcome::handled(self.close_modal());
            }
            return KeyOutcome::ignored();
        }

        if mods.alt_only() && key.is_char('n') {
            let at = self.create_position(settings);
            return KeyOutcome::handled(vec![Action::CreateNoteRequested { at }]);
        }

        let Selection::Selected(id) = self.ui.selection else {
            return KeyOutcome::ignored();
        };

        if key.is_escape() {
            return KeyOutcome::handled(self.set_unselected());
        }

        let Some(dir) = key.arrow() else {
            return KeyOutcome::ignored();
        };
        let Some(note) = store.get(id) else {
            debug!(id, "key on stale selection ignored");
            return KeyOutcome::ignored();
        };

        if mods.primary_only() {
            if !settings.move_enabled {
                return KeyOutcome::ignored();
            }
            let step = if settings.grid_snap { f64::from(settings.grid_size) } else { self.config.move_step };
            let (dx, dy) = dir.unit();
            let patch = PartialNote::position(note.x + dx * step, note.y + dy * step);
            return KeyOutcome::handled(apply_geometry(store, id, &patch));
        }

        if mods.alt_only() {
            if !settings.resize_enabled {
                return KeyOutcome::ignored();
            }
            let step = self.config.resize_step;
            let (w, h) = match dir {
                Direction::Right => (note.width + step, note.height),
                Direction::Left => (note.width - step, note.height),
                Direction::Down => (note.width, note.height + step),
                Direction::Up => (note.width, note.height - step),
            };
            return KeyOutcome::handled(apply_geometry(store, id, &PartialNote::size(w, h)));
        }

        KeyOutcome::ignored()
    }

    /// Top-left corner for a keyboard-created note: the pointer lands
    /// `create_offset` inside the note on both axes.
    fn create_position(&self, settings: &Settings) -> Point {
        let pointer = self.ui.last_pointer.unwrap_or_default();
        let mut x = pointer.x - self.config.create_offset;
        let mut y = pointer.y - self.config.create_offset;
        if settings.grid_snap {
            x = snap_to_grid(x, settings.grid_size);
            y = snap_to_grid(y, settings.grid_size);
        }
        Point::new(self.config.limits.clamp_x(x), self.config.limits.clamp_y(y))
    }
}

/// Apply a geometry patch and report the clamped result.
fn apply_geometry(store: &mut NoteStore, id: NoteId, patch: &PartialNote) -> Vec<Action> {
    match store.apply_partial(id, patch) {
        Ok(true) => {
            let fields = store.get(id).map_or_else(
                || patch.clone(),
                |n| PartialNote {
                    x: Some(n.x),
                    y: Some(n.y),
                    width: Some(n.width),
                    height: Some(n.height),
                    ..PartialNote::default()
                },
            );
            vec![Action::NoteUpdated { id, fields }]
        }
        Ok(false) => Vec::new(),
        Err(e) => {
            warn!(id, error = %e, "interaction produced an invalid patch");
            Vec::new()
        }
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
