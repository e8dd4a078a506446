//! Input mapping: raw key chords and pointer picks become editor actions.
//!
//! # Invariants
//! - The editing core consumes actions, never raw input events.
//! - Unbound input maps to `Action::Noop`.

pub mod action;

pub use action::{Action, Key, KeyChord};
