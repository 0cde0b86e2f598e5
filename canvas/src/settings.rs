//! User-tunable interaction settings and their client-local persistence.
//!
//! Settings are per-session, not per-board. They are read once at startup,
//! mutated by user toggles, and written back on every change. Writes are
//! fire-and-forget: a failed write is logged and the in-memory value stays
//! authoritative.
//!
//! The persisted blob is JSON under a fixed key and carries a schema
//! `version`. Blobs from an unknown future version, blobs that do not parse,
//! and blobs with an invalid grid size fall back to defaults. Missing fields
//! are defaulted one by one, so older blobs keep whatever they did store.

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::consts::{DEFAULT_GRID_SIZE, SETTINGS_SCHEMA_VERSION, SETTINGS_STORAGE_KEY};
use crate::error::CanvasError;

// =============================================================================
// SETTINGS
// =============================================================================

/// Interaction toggles read by the controller on every event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub version: u32,
    #[serde(rename = "isMoveEnabled")]
    pub move_enabled: bool,
    #[serde(rename = "isResizeEnabled")]
    pub resize_enabled: bool,
    #[serde(rename = "showOverlapWarning")]
    pub overlap_warning: bool,
    #[serde(rename = "useGridSnap")]
    pub grid_snap: bool,
    pub show_coordinates: bool,
    /// Grid spacing in pixels. Always positive.
    pub grid_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_SCHEMA_VERSION,
            move_enabled: true,
            resize_enabled: true,
            overlap_warning: true,
            grid_snap: false,
            show_coordinates: true,
            grid_size: DEFAULT_GRID_SIZE,
        }
    }
}

impl Settings {
    /// Parse a persisted blob, or `None` if it should be replaced by defaults.
    fn from_blob(raw: &str) -> Option<Self> {
        let parsed: Self = match serde_json::from_str(raw) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "settings blob did not parse; using defaults");
                return None;
            }
        };
        if parsed.version > SETTINGS_SCHEMA_VERSION {
            warn!(version = parsed.version, "settings blob from a newer schema; using defaults");
            return None;
        }
        if parsed.grid_size == 0 {
            warn!("settings blob has zero grid size; using defaults");
            return None;
        }
        Some(Self { version: SETTINGS_SCHEMA_VERSION, ..parsed })
    }
}

/// Sparse settings update. Only present fields are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, rename = "isMoveEnabled", skip_serializing_if = "Option::is_none")]
    pub move_enabled: Option<bool>,
    #[serde(default, rename = "isResizeEnabled", skip_serializing_if = "Option::is_none")]
    pub resize_enabled: Option<bool>,
    #[serde(default, rename = "showOverlapWarning", skip_serializing_if = "Option::is_none")]
    pub overlap_warning: Option<bool>,
    #[serde(default, rename = "useGridSnap", skip_serializing_if = "Option::is_none")]
    pub grid_snap: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_coordinates: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_size: Option<u32>,
}

impl SettingsPatch {
    fn apply_to(self, settings: &mut Settings) {
        if let Some(v) = self.move_enabled {
            settings.move_enabled = v;
        }
        if let Some(v) = self.resize_enabled {
            settings.resize_enabled = v;
        }
        if let Some(v) = self.overlap_warning {
            settings.overlap_warning = v;
        }
        if let Some(v) = self.grid_snap {
            settings.grid_snap = v;
        }
        if let Some(v) = self.show_coordinates {
            settings.show_coordinates = v;
        }
        if let Some(v) = self.grid_size {
            settings.grid_size = v;
        }
    }
}

// =============================================================================
// STORAGE BACKENDS
// =============================================================================

/// Durable client-local key-value storage for the settings blob.
pub trait SettingsStorage: Send + Sync {
    /// Read the blob stored under `key`, or `None` if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn read(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn write(&self, key: &str, value: &str) -> io::Result<()>;
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileSettingsStorage {
    dir: PathBuf,
}

impl FileSettingsStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SettingsStorage for FileSettingsStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)
    }
}

/// Process-local storage; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySettingsStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySettingsStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one blob.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage.lock().insert(key.to_owned(), value.to_owned());
        storage
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SettingsStorage for MemorySettingsStorage {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        self.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Current settings plus the storage they persist to.
pub struct SettingsStore {
    storage: Box<dyn SettingsStorage>,
    current: Settings,
}

impl SettingsStore {
    /// Read the persisted blob once, falling back to defaults if it is
    /// missing, unreadable or invalid.
    #[must_use]
    pub fn load(storage: Box<dyn SettingsStorage>) -> Self {
        let current = match storage.read(SETTINGS_STORAGE_KEY) {
            Ok(Some(raw)) => Settings::from_blob(&raw).unwrap_or_default(),
            Ok(None) => {
                debug!("no stored settings; using defaults");
                Settings::default()
            }
            Err(e) => {
                warn!(error = %e, "settings read failed; using defaults");
                Settings::default()
            }
        };
        Self { storage, current }
    }

    /// In-memory store starting from defaults.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::load(Box::new(MemorySettingsStorage::new()))
    }

    #[must_use]
    pub fn get(&self) -> Settings {
        self.current
    }

    /// Merge `patch` and persist the result.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the patch sets a zero grid size. A failed write
    /// is logged, not returned.
    pub fn update(&mut self, patch: SettingsPatch) -> Result<Settings, CanvasError> {
        if patch.grid_size == Some(0) {
            return Err(CanvasError::validation("gridSize must be positive"));
        }
        patch.apply_to(&mut self.current);
        self.persist();
        Ok(self.current)
    }

    fn persist(&self) {
        let blob = match serde_json::to_string(&self.current) {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "settings serialize failed");
                return;
            }
        };
        if let Err(e) = self.storage.write(SETTINGS_STORAGE_KEY, &blob) {
            warn!(error = %e, "settings write failed");
        }
    }
}
