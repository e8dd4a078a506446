use crate::selection::Selection;
use glam::Vec3;
use tracing::debug;
use worldedit_common::Params;
use worldedit_kernel::{ObjectKey, PrefabRegistry, Scene};

/// Everything the editing core needs from the application around it.
///
/// The host owns the live scene and the object factory, and receives the
/// reconciliation callbacks (bounds, path visuals, gizmo, panels). All calls
/// are synchronous and happen inside one input event or frame tick.
pub trait SceneHost {
    /// The live object collection.
    fn scene(&self) -> &Scene;
    fn scene_mut(&mut self) -> &mut Scene;

    /// Build an object of `kind` from `params` and add it to the scene.
    fn create(&mut self, kind: &str, params: &Params) -> Option<ObjectKey>;
    /// Remove an object together with its derived visuals and physics entry.
    fn destroy(&mut self, key: ObjectKey) -> bool;

    fn recompute_bounds(&mut self, key: ObjectKey);
    fn rebuild_path_visual(&mut self, vehicle: ObjectKey);

    /// Attach the manipulation gizmo to the whole selection.
    fn attach_gizmo(&mut self, targets: &[ObjectKey]);
    fn detach_gizmo(&mut self);

    fn on_selection_changed(&mut self, selection: &[ObjectKey]);
    fn on_properties_changed(&mut self, key: ObjectKey);
}

/// What a command sees while it runs.
pub struct EditContext<'a> {
    pub host: &'a mut dyn SceneHost,
    pub selection: &'a mut Selection,
}

impl<'a> EditContext<'a> {
    pub fn new(host: &'a mut dyn SceneHost, selection: &'a mut Selection) -> Self {
        Self { host, selection }
    }

    pub fn scene(&self) -> &Scene {
        self.host.scene()
    }
}

/// A notification sent to the property/outliner UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiNotice {
    SelectionChanged(Vec<ObjectKey>),
    PropertiesChanged(ObjectKey),
}

/// What the gizmo is attached to. Several objects are driven through a
/// proxy placed at their centroid.
#[derive(Debug, Clone, PartialEq)]
pub enum GizmoTarget {
    Single(ObjectKey),
    Group { members: Vec<ObjectKey>, pivot: Vec3 },
}

/// In-memory host: a scene, the prefab factory, a gizmo slot and a log of
/// UI notifications. Used by the CLI and by tests.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    scene: Scene,
    prefabs: PrefabRegistry,
    gizmo: Option<GizmoTarget>,
    notices: Vec<UiNotice>,
}

impl HeadlessHost {
    pub fn new(prefabs: PrefabRegistry) -> Self {
        Self {
            prefabs,
            ..Self::default()
        }
    }

    /// Host with the default object catalogue.
    pub fn with_builtins() -> Self {
        Self::new(PrefabRegistry::with_builtins())
    }

    pub fn prefabs(&self) -> &PrefabRegistry {
        &self.prefabs
    }

    pub fn gizmo(&self) -> Option<&GizmoTarget> {
        self.gizmo.as_ref()
    }

    pub fn notices(&self) -> &[UiNotice] {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<UiNotice> {
        std::mem::take(&mut self.notices)
    }
}

impl SceneHost for HeadlessHost {
    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    fn create(&mut self, kind: &str, params: &Params) -> Option<ObjectKey> {
        self.prefabs.create(&mut self.scene, kind, params)
    }

    fn destroy(&mut self, key: ObjectKey) -> bool {
        let removed = self.scene.remove(key);
        if let Some(obj) = &removed {
            debug!(kind = %obj.kind, id = %obj.id, "object destroyed");
        }
        removed.is_some()
    }

    fn recompute_bounds(&mut self, key: ObjectKey) {
        self.scene.recompute_bounds(key);
    }

    fn rebuild_path_visual(&mut self, vehicle: ObjectKey) {
        self.scene.rebuild_path(vehicle);
    }

    fn attach_gizmo(&mut self, targets: &[ObjectKey]) {
        self.gizmo = match targets {
            [] => None,
            [single] => Some(GizmoTarget::Single(*single)),
            members => {
                let positions: Vec<Vec3> = members
                    .iter()
                    .filter_map(|key| self.scene.get(*key))
                    .map(|obj| obj.transform.position)
                    .collect();
                let pivot = if positions.is_empty() {
                    Vec3::ZERO
                } else {
                    positions.iter().copied().sum::<Vec3>() / positions.len() as f32
                };
                Some(GizmoTarget::Group {
                    members: members.to_vec(),
                    pivot,
                })
            }
        };
    }

    fn detach_gizmo(&mut self) {
        self.gizmo = None;
    }

    fn on_selection_changed(&mut self, selection: &[ObjectKey]) {
        self.notices
            .push(UiNotice::SelectionChanged(selection.to_vec()));
    }

    fn on_properties_changed(&mut self, key: ObjectKey) {
        self.notices.push(UiNotice::PropertiesChanged(key));
    }
}
