//! Stable id to live object resolution.
//!
//! Commands call this at the moment they run and never keep the answer:
//! between a command being pushed and later undone or redone, the object it
//! names may have been destroyed and recreated under a new key.

use tracing::trace;
use worldedit_common::ObjectId;
use worldedit_kernel::{ObjectKey, Scene};

/// The live object currently carrying `id`, or `None` if it is absent.
pub fn resolve(scene: &Scene, id: &ObjectId) -> Option<ObjectKey> {
    let key = scene.find(id);
    if key.is_none() {
        trace!(%id, "identifier did not resolve");
    }
    key
}

/// Resolve every id, dropping misses and duplicates, keeping first-seen order.
pub fn resolve_all<'a>(scene: &Scene, ids: impl IntoIterator<Item = &'a ObjectId>) -> Vec<ObjectKey> {
    let mut keys: Vec<ObjectKey> = Vec::new();
    for id in ids {
        if let Some(key) = resolve(scene, id) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    keys
}
