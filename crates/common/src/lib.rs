//! Shared types for the world editor.
//!
//! # Invariants
//! - An `ObjectId` is issued once and survives serialization; it is the only
//!   safe way to name an object across an undo/redo boundary.
//! - Plain-data vectors (`Vec3Data`) round-trip through JSON bit-identically.

pub mod entity;
pub mod types;

pub use entity::{Params, PropertyValue, SerializedEntity, UUID_PARAM};
pub use types::{ObjectId, ParseObjectIdError, Transform, Vec3Data};
