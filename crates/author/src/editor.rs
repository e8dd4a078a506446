use crate::clipboard::{Clipboard, delete_objects};
use crate::command::{Command, PathEditCommand, PropertyChangeCommand, TransformCommand};
use crate::config::EditorConfig;
use crate::history::History;
use crate::host::{EditContext, SceneHost};
use crate::path;
use crate::reconcile::{apply_path_snapshot, apply_transform_snapshot, reconcile};
use crate::resolve::resolve_all;
use crate::selection::Selection;
use crate::snapshot::{PathState, TransformState, capture_paths, capture_transforms, poses_match};
use tracing::{debug, warn};
use worldedit_common::PropertyValue;
use worldedit_input::Action;
use worldedit_kernel::ObjectKey;

/// The editing session: history, selection, clipboard and any drag in
/// progress.
///
/// All state changes go through here, one input event or frame at a time.
/// The host is passed into every call rather than owned.
#[derive(Debug, Default)]
pub struct Editor {
    config: EditorConfig,
    history: History,
    selection: Selection,
    clipboard: Clipboard,
    drag: Option<Drag>,
}

/// State captured when a drag starts.
///
/// Handles are derived from their vehicle's path and get fresh ids when the
/// path is rebuilt, so a dragged handle is recorded as an edit of the
/// vehicle's path rather than as a pose of the handle itself.
#[derive(Debug, Default)]
struct Drag {
    poses: Vec<TransformState>,
    paths: Vec<PathState>,
    handles: Vec<ObjectKey>,
}

impl Drag {
    fn capture(host: &dyn SceneHost, selection: &[ObjectKey]) -> Self {
        let scene = host.scene();
        let (handles, objects): (Vec<ObjectKey>, Vec<ObjectKey>) = selection
            .iter()
            .copied()
            .partition(|key| scene.get(*key).is_some_and(|obj| obj.is_waypoint_handle()));
        let mut vehicles: Vec<ObjectKey> = handles
            .iter()
            .filter_map(|key| scene.get(*key)?.handle)
            .map(|handle| handle.vehicle)
            .collect();
        vehicles.sort();
        vehicles.dedup();
        Self {
            poses: capture_transforms(scene, &objects),
            paths: capture_paths(scene, &vehicles),
            handles,
        }
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            history: History::with_limit(config.history_limit),
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Swap in a history restored from a saved document.
    pub fn replace_history(&mut self, history: History) {
        self.history = history;
    }

    /// Pointer selection; `additive` is the shift modifier.
    pub fn select(&mut self, host: &mut dyn SceneHost, target: Option<ObjectKey>, additive: bool) {
        self.selection.select(host, target, additive);
    }

    pub fn deselect(&mut self, host: &mut dyn SceneHost) {
        self.selection.clear(host);
    }

    /// Capture the selection's poses at the start of a gizmo drag.
    pub fn begin_transform(&mut self, host: &dyn SceneHost) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        self.drag = Some(Drag::capture(host, self.selection.as_slice()));
        true
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Finish a drag. Moved objects are recorded as one Transform entry and
    /// moved handles as one Waypoint entry on their vehicles; nothing is
    /// recorded if nothing moved.
    pub fn commit_transform(&mut self, host: &mut dyn SceneHost) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        let mut recorded = false;

        let mut before = drag.poses;
        before.retain(|state| host.scene().find(&state.object_uuid).is_some());
        let keys = resolve_all(host.scene(), before.iter().map(|state| &state.object_uuid));
        let after = capture_transforms(host.scene(), &keys);
        if poses_match(&before, &after) {
            debug!(objects = keys.len(), "drag moved no objects");
        } else {
            reconcile(&mut EditContext::new(host, &mut self.selection), &keys);
            self.history.push(TransformCommand::new(before, after));
            recorded = true;
        }

        if !drag.paths.is_empty() {
            reconcile(&mut EditContext::new(host, &mut self.selection), &drag.handles);
            let mut before = drag.paths;
            before.retain(|state| host.scene().find(&state.car_uuid).is_some());
            let vehicles = resolve_all(host.scene(), before.iter().map(|state| &state.car_uuid));
            let after = capture_paths(host.scene(), &vehicles);
            if before == after {
                debug!(vehicles = vehicles.len(), "drag moved no waypoints");
            } else {
                self.history.push(PathEditCommand::new(before, after));
                recorded = true;
            }
        }
        recorded
    }

    /// Abandon a drag and put the objects back. History is untouched.
    pub fn cancel_transform(&mut self, host: &mut dyn SceneHost) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        let mut ctx = EditContext::new(host, &mut self.selection);
        apply_transform_snapshot(&mut ctx, &drag.poses);
        apply_path_snapshot(&mut ctx, &drag.paths);
        true
    }

    /// Set one property and record it as `Set <name>`.
    ///
    /// Returns false when the object is gone, the value is unchanged, or the
    /// current value is not a scalar.
    pub fn set_property(
        &mut self,
        host: &mut dyn SceneHost,
        key: ObjectKey,
        name: &str,
        value: PropertyValue,
    ) -> bool {
        let Some(obj) = host.scene_mut().get_mut(key) else {
            return false;
        };
        let before = match obj.property(name) {
            None => None,
            Some(current) => match PropertyValue::from_json(current) {
                Some(current) => Some(current),
                None => {
                    warn!(property = name, "not a scalar property, edit refused");
                    return false;
                }
            },
        };
        if before.as_ref() == Some(&value) {
            return false;
        }
        obj.set_property(name, Some(value.to_json()));
        let id = obj.id;
        if self.selection.contains(key) {
            host.on_properties_changed(key);
        }
        self.history
            .push(PropertyChangeCommand::new(id, name, before, Some(value)));
        true
    }

    /// Record an edit the host already applied.
    pub fn record(&mut self, command: impl Into<Command>) {
        self.history.push(command);
    }

    pub fn copy(&mut self, host: &dyn SceneHost) -> bool {
        self.clipboard.copy(host.scene(), &self.selection)
    }

    pub fn paste(&mut self, host: &mut dyn SceneHost) -> Vec<ObjectKey> {
        let mut ctx = EditContext::new(host, &mut self.selection);
        self.clipboard.paste(&mut ctx, &mut self.history)
    }

    pub fn duplicate(&mut self, host: &mut dyn SceneHost) -> Vec<ObjectKey> {
        let mut ctx = EditContext::new(host, &mut self.selection);
        self.clipboard.duplicate(&mut ctx, &mut self.history)
    }

    pub fn delete_selected(&mut self, host: &mut dyn SceneHost) -> bool {
        let targets = self.selection.as_slice().to_vec();
        let mut ctx = EditContext::new(host, &mut self.selection);
        delete_objects(&mut ctx, &mut self.history, &targets)
    }

    pub fn add_waypoint(&mut self, host: &mut dyn SceneHost) -> Vec<ObjectKey> {
        let targets = self.selection.as_slice().to_vec();
        let mut ctx = EditContext::new(host, &mut self.selection);
        path::add_waypoint(&mut ctx, &mut self.history, &targets, &self.config)
    }

    pub fn remove_waypoint(&mut self, host: &mut dyn SceneHost) -> bool {
        let targets = self.selection.as_slice().to_vec();
        let mut ctx = EditContext::new(host, &mut self.selection);
        path::remove_last_waypoint(&mut ctx, &mut self.history, &targets)
    }

    /// Undo the last edit. A drag in progress is cancelled first.
    pub fn undo(&mut self, host: &mut dyn SceneHost) -> bool {
        self.cancel_transform(host);
        let mut ctx = EditContext::new(host, &mut self.selection);
        self.history.undo(&mut ctx)
    }

    /// Redo the last undone edit. A drag in progress is cancelled first.
    pub fn redo(&mut self, host: &mut dyn SceneHost) -> bool {
        self.cancel_transform(host);
        let mut ctx = EditContext::new(host, &mut self.selection);
        self.history.redo(&mut ctx)
    }

    /// Per-frame sync: a dragged handle pulls its vehicle's path along, and a
    /// dragged vehicle drags the start of its line. Never touches history.
    pub fn tick(&mut self, host: &mut dyn SceneHost) {
        let mut stale = Vec::new();
        for key in self.selection.iter() {
            let Some(obj) = host.scene().get(key) else {
                continue;
            };
            let position = obj.transform.position;
            if let Some(handle) = obj.handle {
                let node = host
                    .scene()
                    .get(handle.vehicle)
                    .and_then(|vehicle| vehicle.waypoints().get(handle.index).copied());
                if node.is_some_and(|node| node != position) {
                    if let Some(path) = host
                        .scene_mut()
                        .get_mut(handle.vehicle)
                        .and_then(|vehicle| vehicle.path.as_mut())
                    {
                        path[handle.index] = position;
                    }
                    stale.push(handle.vehicle);
                }
            } else if obj.is_vehicle() {
                let origin = host
                    .scene()
                    .path_visual(key)
                    .and_then(|visual| visual.line.first().copied());
                if origin.is_some_and(|origin| origin != position) {
                    stale.push(key);
                }
            }
        }
        stale.sort();
        stale.dedup();
        for vehicle in stale {
            host.rebuild_path_visual(vehicle);
        }
    }

    /// Run one input action. Returns whether anything happened.
    pub fn apply(&mut self, host: &mut dyn SceneHost, action: Action) -> bool {
        match action {
            Action::Select(key) => {
                self.select(host, Some(key), false);
                true
            }
            Action::ToggleSelect(key) => {
                self.select(host, Some(key), true);
                true
            }
            Action::Deselect => {
                self.deselect(host);
                true
            }
            Action::Undo => self.undo(host),
            Action::Redo => self.redo(host),
            Action::Copy => self.copy(host),
            Action::Paste => !self.paste(host).is_empty(),
            Action::Duplicate => !self.duplicate(host).is_empty(),
            Action::Delete => self.delete_selected(host),
            Action::AddWaypoint => !self.add_waypoint(host).is_empty(),
            Action::RemoveWaypoint => self.remove_waypoint(host),
            Action::Noop => false,
        }
    }
}
