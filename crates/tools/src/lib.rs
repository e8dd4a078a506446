//! Developer tooling: scene inspector and history timeline.
//!
//! # Invariants
//! - Tools only read; nothing here mutates a scene or a history.

pub mod inspector;
pub mod timeline;

pub use inspector::{ObjectInfo, SceneInspector, SceneSummary};
pub use timeline::{DEFAULT_TIMELINE_LEN, HistoryTimeline};
