//! Editing core: reversible commands, undo/redo history, selection,
//! clipboard and object lifecycle, vehicle path editing, and the
//! reconciliation pass that keeps derived state in step with every edit.
//!
//! # Invariants
//! - Every edit is exactly reversible; create/delete restore existence and
//!   serialized content rather than identity.
//! - Commands hold stable ids, never live keys they trust across a
//!   create/delete boundary; targets are resolved when the command runs.
//! - A missing target is filtered out silently. Undo and redo are always
//!   safe to call.
//! - Pushing a command clears the redo stack.

pub mod clipboard;
pub mod command;
pub mod config;
pub mod editor;
pub mod history;
pub mod host;
pub mod lifecycle;
pub mod path;
pub mod reconcile;
pub mod resolve;
pub mod selection;
pub mod snapshot;

pub use clipboard::Clipboard;
pub use command::{
    Command, CreateObjectCommand, DecodeError, DeleteObjectCommand, PathEditCommand,
    PropertyChangeCommand, TransformCommand,
};
pub use config::EditorConfig;
pub use editor::Editor;
pub use history::{History, RestoredHistory};
pub use host::{EditContext, GizmoTarget, HeadlessHost, SceneHost, UiNotice};
pub use selection::Selection;
pub use snapshot::{PathState, TransformState};

#[cfg(test)]
pub(crate) mod testing;
