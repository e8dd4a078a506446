//! Persistence: the flat map document `{ version, objects, history }`.
//!
//! # Invariants
//! - Loading never re-executes history; the saved objects already are the
//!   final state, and the history only restores the ability to undo.
//! - A bad history entry or an object the factory rejects is dropped on its
//!   own; the rest of the document still loads.
//! - Documents newer than [`DOCUMENT_VERSION`] are refused.

pub mod document;
pub mod store;

pub use document::{DOCUMENT_VERSION, DocumentError, LoadReport, MapDocument};
pub use store::{load_from_path, save_to_path};
