//! Input model: modifier keys, pointer buttons, keys, selection and gestures.
//!
//! This module defines the types consumed by the interaction controller.
//! `Modifiers` and `Key` capture the user's intent at the time of a keyboard
//! event. `Selection` is the two-state selection machine, `ModalKind` tracks
//! which dialog (if any) owns input focus, and `InputState` is the pointer
//! gesture being tracked between pointer-down and pointer-up.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::NoteId;
use crate::geometry::Point;

/// Keyboard/pointer modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl or the platform equivalent (Command on macOS).
    #[must_use]
    pub fn primary(self) -> bool {
        self.ctrl || self.meta
    }

    /// Only the primary modifier is held.
    #[must_use]
    pub fn primary_only(self) -> bool {
        self.primary() && !self.alt && !self.shift
    }

    /// Only Alt is held.
    #[must_use]
    pub fn alt_only(self) -> bool {
        self.alt && !self.primary() && !self.shift
    }

    #[must_use]
    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::default() }
    }

    #[must_use]
    pub fn meta() -> Self {
        Self { meta: true, ..Self::default() }
    }

    #[must_use]
    pub fn alt() -> Self {
        Self { alt: true, ..Self::default() }
    }
}

/// Pointer button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button.
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// Arrow-key direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit vector in canvas space (y grows downward).
    #[must_use]
    pub fn unit(self) -> (f64, f64) {
        match self {
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
        }
    }
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the host (e.g. `"ArrowUp"`, `"Escape"`, `"s"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Arrow direction, if this is an arrow key.
    #[must_use]
    pub fn arrow(&self) -> Option<Direction> {
        match self.0.as_str() {
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Case-insensitive match against a single character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        let mut chars = self.0.chars();
        matches!((chars.next(), chars.next()), (Some(k), None) if k.eq_ignore_ascii_case(&c))
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }
}

/// What a pointer-down landed on. The host resolves this from its own layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Note(NoteId),
    Canvas,
}

/// Selection state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(NoteId),
}

impl Selection {
    #[must_use]
    pub fn id(self) -> Option<NoteId> {
        match self {
            Self::Unselected => None,
            Self::Selected(id) => Some(id),
        }
    }
}

/// A dialog that owns input focus while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    /// Style/content editor for one note.
    NoteProperties(NoteId),
    Settings,
}

/// Where the controller's listeners sit in the host's event dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerPhase {
    /// Runs before any default or bubbling handler.
    Capture,
    Bubble,
}

/// Transient UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub selection: Selection,
    /// Last pointer position in canvas space, if the pointer has moved over it.
    pub last_pointer: Option<Point>,
    pub modal: Option<ModalKind>,
}

/// Pointer gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is dragging a note.
    DraggingNote {
        id: NoteId,
        /// Canvas position of the pointer at pointer-down.
        start: Point,
        /// Note x at the start of the drag.
        orig_x: f64,
        /// Note y at the start of the drag.
        orig_y: f64,
    },
}
