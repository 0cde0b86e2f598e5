//! Shared numeric and style constants for the canvas crate.

// ── Geometry ────────────────────────────────────────────────────

/// Smallest width a note may shrink to, in pixels.
pub const MIN_NOTE_WIDTH: f64 = 100.0;

/// Smallest height a note may shrink to, in pixels.
pub const MIN_NOTE_HEIGHT: f64 = 80.0;

/// Width applied to new notes when none is given.
pub const DEFAULT_NOTE_WIDTH: f64 = 250.0;

/// Height applied to new notes when none is given.
pub const DEFAULT_NOTE_HEIGHT: f64 = 200.0;

// ── Keyboard steps ──────────────────────────────────────────────

/// Move step in pixels when grid snap is off.
pub const MOVE_STEP_PX: f64 = 5.0;

/// Resize step in pixels.
pub const RESIZE_STEP_PX: f64 = 10.0;

/// How far inside a keyboard-created note the pointer lands, in pixels.
pub const CREATE_POINTER_OFFSET_PX: f64 = 20.0;

/// Default grid size for snapping.
pub const DEFAULT_GRID_SIZE: u32 = 20;

// ── Note style defaults ─────────────────────────────────────────

pub const DEFAULT_FONT_SIZE: f64 = 16.0;
pub const DEFAULT_FONT_COLOR: &str = "#18181b";
pub const DEFAULT_FONT_FAMILY: &str = "inherit";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";
pub const DEFAULT_BORDER_WIDTH: f64 = 1.0;
pub const DEFAULT_BORDER_COLOR: &str = "#e5e7eb";

// ── Settings persistence ────────────────────────────────────────

/// Storage key for the persisted settings blob.
pub const SETTINGS_STORAGE_KEY: &str = "user-settings";

/// Schema version written alongside persisted settings.
pub const SETTINGS_SCHEMA_VERSION: u32 = 1;

// ── Notifications ───────────────────────────────────────────────

/// Buffer size of the store change-notification channel.
pub const STORE_EVENT_CAPACITY: usize = 256;
