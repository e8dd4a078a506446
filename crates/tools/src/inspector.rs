use std::collections::BTreeMap;
use worldedit_common::ObjectId;
use worldedit_kernel::{ObjectKey, Scene};

/// Scene inspector for developer tooling.
///
/// Read-only queries against the live scene for debugging and the CLI.
pub struct SceneInspector;

impl SceneInspector {
    /// Count objects per kind, vehicles and path nodes. Waypoint handles are
    /// derived visuals and are not counted as objects.
    pub fn summary(scene: &Scene) -> SceneSummary {
        let mut summary = SceneSummary::default();
        for (_, obj) in scene.iter() {
            if obj.is_waypoint_handle() {
                summary.handles += 1;
                continue;
            }
            summary.objects += 1;
            *summary.by_kind.entry(obj.kind.clone()).or_default() += 1;
            if obj.is_vehicle() {
                summary.vehicles += 1;
                summary.waypoints += obj.waypoints().len();
            }
        }
        summary
    }

    /// Describe one live object.
    pub fn inspect_object(scene: &Scene, key: ObjectKey) -> Option<ObjectInfo> {
        scene.get(key).map(|obj| {
            let p = obj.transform.position;
            let r = obj.transform.rotation;
            let s = obj.transform.scale;
            ObjectInfo {
                id: obj.id,
                kind: obj.kind.clone(),
                position: [p.x, p.y, p.z],
                rotation: [r.x, r.y, r.z],
                scale: [s.x, s.y, s.z],
                waypoints: obj.waypoints().len(),
            }
        })
    }

    /// Every live object in id order, handles included.
    pub fn list_objects(scene: &Scene) -> Vec<ObjectKey> {
        scene.iter().map(|(key, _)| key).collect()
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneSummary {
    pub objects: usize,
    pub by_kind: BTreeMap<String, usize>,
    pub vehicles: usize,
    pub waypoints: usize,
    pub handles: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Scene: objects={} vehicles={} waypoints={}",
            self.objects, self.vehicles, self.waypoints
        )?;
        for (kind, count) in &self.by_kind {
            writeln!(f, "  {kind:<16} {count}")?;
        }
        Ok(())
    }
}

/// Detailed info about a single object.
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub id: ObjectId,
    pub kind: String,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub waypoints: usize,
}

impl std::fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{:.8}] pos=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2})",
            self.kind,
            &self.id.to_string()[..8],
            self.position[0],
            self.position[1],
            self.position[2],
            self.scale[0],
            self.scale[1],
            self.scale[2],
        )?;
        if self.waypoints > 0 {
            write!(f, " waypoints={}", self.waypoints)?;
        }
        Ok(())
    }
}
