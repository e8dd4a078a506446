//! Live scene: the collection of placed objects the editor works on.
//!
//! # Invariants
//! - At most one live object per stable id.
//! - An `ObjectKey` stops resolving as soon as its object is removed; slots
//!   are reused under a new generation.
//! - All mutations flow through explicit operations and produce events.

pub mod object;
pub mod prefab;
pub mod scene;

pub use object::{Aabb, SceneObject, WaypointHandle};
pub use prefab::{Prefab, PrefabRegistry};
pub use scene::{ObjectKey, PathVisual, Scene, SceneError, SceneEvent};
