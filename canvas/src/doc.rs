//! Document model: notes, their style, sparse updates, and the in-memory store.
//!
//! This module defines what sits on a board (`Note` and its style enums), a
//! sparse-update type for incremental edits (`PartialNote`), the batched save
//! payload (`NotePatch`), and the runtime store that owns the active board's
//! notes (`NoteStore`).
//!
//! Notes flow into the store from the persistence collaborator (board load,
//! note creation) and from the interaction controller (keyboard edits). Every
//! edit is immediately visible in the store and marks it dirty; nothing here
//! performs I/O. Subscribers learn about changes through `StoreEvent`s.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::consts::{
    DEFAULT_BACKGROUND_COLOR, DEFAULT_BORDER_COLOR, DEFAULT_BORDER_WIDTH, DEFAULT_FONT_COLOR, DEFAULT_FONT_FAMILY,
    DEFAULT_FONT_SIZE, DEFAULT_NOTE_HEIGHT, DEFAULT_NOTE_WIDTH, STORE_EVENT_CAPACITY,
};
use crate::error::CanvasError;
use crate::geometry::{GeometryLimits, Rect, overlap};

/// Server-issued note identifier, unique per board.
pub type NoteId = i64;

/// Server-issued board identifier.
pub type BoardId = i64;

// =============================================================================
// STYLE ENUMS
// =============================================================================

/// Horizontal text alignment inside a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical text alignment inside a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

/// What happens to content that does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    /// Clip overflowing content.
    #[default]
    Hidden,
    /// Scroll overflowing content.
    Auto,
}

/// Font weight keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
    Lighter,
    Bolder,
}

macro_rules! keyword_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Wire keyword for this value.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            /// Parse a wire keyword; `None` for anything unrecognized.
            #[must_use]
            pub fn parse(raw: &str) -> Option<Self> {
                match raw {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

keyword_enum!(TextAlign { Left => "left", Center => "center", Right => "right" });
keyword_enum!(VerticalAlign { Top => "top", Center => "center", Bottom => "bottom" });
keyword_enum!(Overflow { Hidden => "hidden", Auto => "auto" });
keyword_enum!(FontWeight { Normal => "normal", Bold => "bold", Lighter => "lighter", Bolder => "bolder" });

// =============================================================================
// NOTE
// =============================================================================

/// A positioned, styled note as held in memory and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub board_id: BoardId,
    /// Opaque text payload.
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    pub font_color: String,
    pub font_weight: FontWeight,
    pub font_family: String,
    pub background_color: String,
    pub border_width: f64,
    pub border_color: String,
    pub overflow: Overflow,
    pub text_align: TextAlign,
    pub vertical_align: VerticalAlign,
}

impl Note {
    /// A note at the origin with every default style applied.
    #[must_use]
    pub fn new(id: NoteId, board_id: BoardId) -> Self {
        Self {
            id,
            board_id,
            content: String::new(),
            x: 0.0,
            y: 0.0,
            width: DEFAULT_NOTE_WIDTH,
            height: DEFAULT_NOTE_HEIGHT,
            font_size: DEFAULT_FONT_SIZE,
            font_color: DEFAULT_FONT_COLOR.to_owned(),
            font_weight: FontWeight::default(),
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_owned(),
            border_width: DEFAULT_BORDER_WIDTH,
            border_color: DEFAULT_BORDER_COLOR.to_owned(),
            overflow: Overflow::default(),
            text_align: TextAlign::default(),
            vertical_align: VerticalAlign::default(),
        }
    }

    /// Build a note from defaults plus `fields`, clamped to `limits`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `fields` cannot be corrected by clamping.
    pub fn from_fields(
        id: NoteId,
        board_id: BoardId,
        fields: &PartialNote,
        limits: &GeometryLimits,
    ) -> Result<Self, CanvasError> {
        fields.validate()?;
        let mut note = Self::new(id, board_id);
        fields.clamped(limits).apply_to(&mut note);
        Ok(note)
    }

    /// Bounding box of the note.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Full-field patch describing this note, used for batched saves.
    #[must_use]
    pub fn to_patch(&self) -> NotePatch {
        NotePatch {
            id: self.id,
            fields: PartialNote {
                content: Some(self.content.clone()),
                x: Some(self.x),
                y: Some(self.y),
                width: Some(self.width),
                height: Some(self.height),
                font_size: Some(self.font_size),
                font_color: Some(self.font_color.clone()),
                font_weight: Some(self.font_weight),
                font_family: Some(self.font_family.clone()),
                background_color: Some(self.background_color.clone()),
                border_width: Some(self.border_width),
                border_color: Some(self.border_color.clone()),
                overflow: Some(self.overflow),
                text_align: Some(self.text_align),
                vertical_align: Some(self.vertical_align),
            },
        }
    }

    fn clamp_geometry(&mut self, limits: &GeometryLimits) {
        let rect = limits.clamp(self.rect());
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
        self.border_width = self.border_width.max(0.0);
    }
}

// =============================================================================
// SPARSE UPDATES
// =============================================================================

/// Sparse update for a note. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialNote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overflow: Option<Overflow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<VerticalAlign>,
}

impl PartialNote {
    /// Patch that only moves the note.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    /// Patch that only resizes the note.
    #[must_use]
    pub fn size(width: f64, height: f64) -> Self {
        Self { width: Some(width), height: Some(height), ..Self::default() }
    }

    /// Patch that only replaces the text payload.
    #[must_use]
    pub fn content(text: impl Into<String>) -> Self {
        Self { content: Some(text.into()), ..Self::default() }
    }

    /// Returns `true` if no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reject values no clamp can repair: non-finite numbers, non-positive
    /// font sizes, and empty colour or font-family strings.
    ///
    /// # Errors
    ///
    /// Returns `Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), CanvasError> {
        let numbers = [
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
            ("fontSize", self.font_size),
            ("borderWidth", self.border_width),
        ];
        for (name, value) in numbers {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(CanvasError::validation(format!("{name} must be a finite number")));
            }
        }
        if self.font_size.is_some_and(|v| v <= 0.0) {
            return Err(CanvasError::validation("fontSize must be positive"));
        }
        let strings = [
            ("fontColor", &self.font_color),
            ("fontFamily", &self.font_family),
            ("backgroundColor", &self.background_color),
            ("borderColor", &self.border_color),
        ];
        for (name, value) in strings {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(CanvasError::validation(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }

    /// Copy with geometry clamped: negative `x`/`y` become 0, sizes are raised
    /// to the minimums, and a negative border width becomes 0.
    #[must_use]
    pub fn clamped(&self, limits: &GeometryLimits) -> Self {
        let mut out = self.clone();
        out.x = self.x.map(|v| limits.clamp_x(v));
        out.y = self.y.map(|v| limits.clamp_y(v));
        out.width = self.width.map(|v| limits.clamp_width(v));
        out.height = self.height.map(|v| limits.clamp_height(v));
        out.border_width = self.border_width.map(|v| v.max(0.0));
        out
    }

    /// Merge present fields into `note` without any checks.
    pub fn apply_to(&self, note: &mut Note) {
        if let Some(ref content) = self.content {
            note.content.clone_from(content);
        }
        if let Some(x) = self.x {
            note.x = x;
        }
        if let Some(y) = self.y {
            note.y = y;
        }
        if let Some(w) = self.width {
            note.width = w;
        }
        if let Some(h) = self.height {
            note.height = h;
        }
        if let Some(size) = self.font_size {
            note.font_size = size;
        }
        if let Some(ref color) = self.font_color {
            note.font_color.clone_from(color);
        }
        if let Some(weight) = self.font_weight {
            note.font_weight = weight;
        }
        if let Some(ref family) = self.font_family {
            note.font_family.clone_from(family);
        }
        if let Some(ref color) = self.background_color {
            note.background_color.clone_from(color);
        }
        if let Some(width) = self.border_width {
            note.border_width = width;
        }
        if let Some(ref color) = self.border_color {
            note.border_color.clone_from(color);
        }
        if let Some(overflow) = self.overflow {
            note.overflow = overflow;
        }
        if let Some(align) = self.text_align {
            note.text_align = align;
        }
        if let Some(align) = self.vertical_align {
            note.vertical_align = align;
        }
    }
}

/// One entry of a batched save: the note id plus the fields to write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    pub id: NoteId,
    #[serde(flatten)]
    pub fields: PartialNote,
}

// =============================================================================
// OVERLAPS
// =============================================================================

/// Intersection of two notes' bounding boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapRect {
    /// The unordered pair, stored as `(lower id, higher id)`.
    pub pair: (NoteId, NoteId),
    pub rect: Rect,
}

impl OverlapRect {
    /// Stable identity for the pair, independent of note order.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}-{}", self.pair.0, self.pair.1)
    }
}

/// Every overlapping pair among `notes`. Quadratic; boards hold tens of notes.
#[must_use]
pub fn compute_overlaps(notes: &[Note]) -> Vec<OverlapRect> {
    let mut out = Vec::new();
    for (i, a) in notes.iter().enumerate() {
        for b in &notes[i + 1..] {
            if let Some(rect) = overlap(&a.rect(), &b.rect()) {
                let pair = if a.id <= b.id { (a.id, b.id) } else { (b.id, a.id) };
                out.push(OverlapRect { pair, rect });
            }
        }
    }
    out.sort_by_key(|o| o.pair);
    out
}

// =============================================================================
// STORE
// =============================================================================

/// Change notification published by a [`NoteStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// The store was replaced with a board's notes.
    Loaded { board_id: BoardId, count: usize },
    /// The store was emptied (no active board).
    Cleared,
    Created(NoteId),
    Updated(NoteId),
    Deleted(NoteId),
    /// A flush covering everything up to `revision` was persisted.
    Saved { board_id: BoardId, revision: u64 },
}

/// In-memory store of the active board's notes.
///
/// Notes keep their load/creation order. Each in-memory edit bumps a
/// revision; the store is dirty while the latest revision is newer than the
/// last persisted one.
pub struct NoteStore {
    board_id: Option<BoardId>,
    notes: Vec<Note>,
    limits: GeometryLimits,
    revision: u64,
    saved_revision: u64,
    events: broadcast::Sender<StoreEvent>,
}

/// A store shared between the engine and its registered flush handler.
pub type SharedNoteStore = Arc<Mutex<NoteStore>>;

/// Lock a shared store, recovering the data if a previous holder panicked.
pub fn lock_store(store: &SharedNoteStore) -> MutexGuard<'_, NoteStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

impl NoteStore {
    /// Create an empty store with its own notification channel.
    #[must_use]
    pub fn new(limits: GeometryLimits) -> Self {
        let (events, _) = broadcast::channel(STORE_EVENT_CAPACITY);
        Self::with_events(limits, events)
    }

    /// Create an empty store that publishes on an existing channel.
    #[must_use]
    pub fn with_events(limits: GeometryLimits, events: broadcast::Sender<StoreEvent>) -> Self {
        Self { board_id: None, notes: Vec::new(), limits, revision: 0, saved_revision: 0, events }
    }

    /// Subscribe to change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Board whose notes are currently loaded.
    #[must_use]
    pub fn board_id(&self) -> Option<BoardId> {
        self.board_id
    }

    #[must_use]
    pub fn limits(&self) -> GeometryLimits {
        self.limits
    }

    /// Replace every note with a board snapshot. Geometry is clamped and the
    /// store starts clean.
    pub fn load_snapshot(&mut self, board_id: BoardId, notes: Vec<Note>) {
        self.board_id = Some(board_id);
        self.notes = notes;
        for note in &mut self.notes {
            note.clamp_geometry(&self.limits);
        }
        self.revision = 0;
        self.saved_revision = 0;
        let count = self.notes.len();
        self.emit(StoreEvent::Loaded { board_id, count });
    }

    /// Drop every note and forget the board.
    pub fn clear(&mut self) {
        self.board_id = None;
        self.notes.clear();
        self.revision = 0;
        self.saved_revision = 0;
        self.emit(StoreEvent::Cleared);
    }

    /// Insert an already-persisted note, replacing one with the same id.
    /// Does not mark the store dirty.
    pub fn insert(&mut self, mut note: Note) {
        note.clamp_geometry(&self.limits);
        let id = note.id;
        if let Some(existing) = self.notes.iter_mut().find(|n| n.id == id) {
            *existing = note;
        } else {
            self.notes.push(note);
        }
        self.emit(StoreEvent::Created(id));
    }

    /// Validate, clamp and merge `partial` into note `id`, marking the store dirty.
    ///
    /// Returns `Ok(false)` when the note is not in the store.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the patch cannot be corrected by clamping.
    pub fn apply_partial(&mut self, id: NoteId, partial: &PartialNote) -> Result<bool, CanvasError> {
        partial.validate()?;
        let clamped = partial.clamped(&self.limits);
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            return Ok(false);
        };
        clamped.apply_to(note);
        self.revision += 1;
        self.emit(StoreEvent::Updated(id));
        Ok(true)
    }

    /// Remove a note by id, returning it if it was present.
    pub fn remove(&mut self, id: NoteId) -> Option<Note> {
        let idx = self.notes.iter().position(|n| n.id == id)?;
        let note = self.notes.remove(idx);
        self.emit(StoreEvent::Deleted(id));
        Some(note)
    }

    #[must_use]
    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: NoteId) -> bool {
        self.get(id).is_some()
    }

    /// All notes in load/creation order.
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Current edit revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether in-memory state has diverged from the last persisted snapshot.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.revision > self.saved_revision
    }

    /// Snapshot every note as a full-field patch, with the revision it reflects.
    #[must_use]
    pub fn snapshot_patches(&self) -> (Vec<NotePatch>, u64) {
        (self.notes.iter().map(Note::to_patch).collect(), self.revision)
    }

    /// Record that everything up to `revision` has been persisted. Edits made
    /// after that snapshot keep the store dirty.
    pub fn mark_saved(&mut self, revision: u64) {
        self.saved_revision = self.saved_revision.max(revision);
        if let Some(board_id) = self.board_id {
            self.emit(StoreEvent::Saved { board_id, revision });
        }
    }

    /// Every overlapping pair of notes, keyed by the unordered id pair.
    #[must_use]
    pub fn overlaps(&self) -> Vec<OverlapRect> {
        compute_overlaps(&self.notes)
    }

    fn emit(&self, event: StoreEvent) {
        if self.events.send(event).is_err() {
            trace!("no store subscribers");
        }
    }
}

impl Default for NoteStore {
    fn default() -> Self {
        Self::new(GeometryLimits::default())
    }
}
