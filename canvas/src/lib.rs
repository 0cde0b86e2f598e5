//! Board canvas engine for the sticky-note board.
//!
//! This crate is host-agnostic: it owns the in-memory state of the active
//! board and interprets pointer and keyboard input, but it never draws and
//! never stores anything itself. The host forwards input events to the
//! engine, renders what the note store holds, and listens for
//! [`doc::StoreEvent`]s. Durable state lives behind the
//! [`persistence::PersistenceClient`] seam.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::BoardCanvas`], the application-state container |
//! | [`doc`] | Note types, sparse updates, and the in-memory note store |
//! | [`interaction`] | Selection, z-order, keyboard move/resize, shortcuts |
//! | [`save`] | Dirty/save coordinator and the store flush handler |
//! | [`settings`] | User settings and their client-local storage |
//! | [`board`] | Ordered board list with rename, delete and atomic reorder |
//! | [`geometry`] | Rectangles, overlap, clamping and grid snap |
//! | [`input`] | Modifier keys, keys, pointer targets and gesture state |
//! | [`persistence`] | Persistence and session collaborator traits |
//! | [`memory`] | In-process persistence backend |
//! | [`http`] | HTTP persistence client (feature `http`) |
//! | [`config`] | Engine step sizes and geometry floors |
//! | [`error`] | Error taxonomy and codes |
//! | [`consts`] | Shared defaults |

pub mod board;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod geometry;
#[cfg(feature = "http")]
pub mod http;
pub mod input;
pub mod interaction;
pub mod memory;
pub mod persistence;
pub mod save;
pub mod settings;
