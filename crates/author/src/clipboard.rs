use crate::command::{CreateObjectCommand, DeleteObjectCommand};
use crate::history::History;
use crate::host::EditContext;
use crate::lifecycle::{instantiate_all, remove_objects};
use crate::path::delete_waypoints;
use crate::reconcile::reconcile;
use crate::selection::Selection;
use crate::snapshot::serialize_objects;
use tracing::debug;
use worldedit_common::SerializedEntity;
use worldedit_kernel::{ObjectKey, Scene};

/// Serialized copies of the objects last copied. Owned by the editor and
/// handed to paste explicitly; there is no process-wide clipboard.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    entries: Option<Vec<SerializedEntity>>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.as_ref().is_none_or(Vec::is_empty)
    }

    pub fn entries(&self) -> &[SerializedEntity] {
        self.entries.as_deref().unwrap_or(&[])
    }

    /// Serialize the selection into the clipboard. Returns false, leaving the
    /// previous contents in place, if nothing serializes.
    pub fn copy(&mut self, scene: &Scene, selection: &Selection) -> bool {
        if selection.is_empty() {
            return false;
        }
        let entries = serialize_objects(scene, selection.as_slice());
        if entries.is_empty() {
            return false;
        }
        debug!(count = entries.len(), "copied to clipboard");
        self.entries = Some(entries);
        true
    }

    /// Recreate the clipboard contents, select them and record one
    /// `Paste objects` creation. Ids that are already live are reissued.
    pub fn paste(&self, ctx: &mut EditContext<'_>, history: &mut History) -> Vec<ObjectKey> {
        let Some(entries) = &self.entries else {
            return Vec::new();
        };
        let keys = instantiate_all(ctx.host, entries);
        if keys.is_empty() {
            return keys;
        }
        ctx.selection.replace_all(ctx.host, keys.iter().copied());
        let data = serialize_objects(ctx.scene(), &keys);
        history.push(CreateObjectCommand::new(data, keys.clone()).with_description("Paste objects"));
        reconcile(ctx, &keys);
        keys
    }

    /// Copy the selection and paste it straight back.
    pub fn duplicate(&mut self, ctx: &mut EditContext<'_>, history: &mut History) -> Vec<ObjectKey> {
        if !self.copy(ctx.host.scene(), ctx.selection) {
            return Vec::new();
        }
        self.paste(ctx, history)
    }
}

/// Delete objects and waypoint handles.
///
/// Ordinary objects are serialized before they are destroyed and recorded as
/// one `Delete objects` entry; handles go to the path editor. The selection
/// is cleared afterwards.
pub fn delete_objects(ctx: &mut EditContext<'_>, history: &mut History, keys: &[ObjectKey]) -> bool {
    if keys.is_empty() {
        return false;
    }
    let (handles, objects): (Vec<ObjectKey>, Vec<ObjectKey>) = keys
        .iter()
        .copied()
        .filter(|key| ctx.scene().contains(*key))
        .partition(|key| {
            ctx.scene()
                .get(*key)
                .is_some_and(|obj| obj.is_waypoint_handle())
        });

    let mut changed = false;
    let data = serialize_objects(ctx.scene(), &objects);
    if !data.is_empty() {
        remove_objects(ctx.host, &objects);
        history.push(DeleteObjectCommand::new(data).with_description("Delete objects"));
        changed = true;
    }
    if !handles.is_empty() {
        changed |= delete_waypoints(ctx, history, &handles);
    }
    ctx.selection.clear(ctx.host);
    changed
}
