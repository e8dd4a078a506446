//! Plain-data copies of live state: transforms, paths and whole objects.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use worldedit_common::{ObjectId, SerializedEntity, Transform, UUID_PARAM, Vec3Data};
use worldedit_kernel::{ObjectKey, Scene, SceneObject};

/// Transform of one object at one moment, keyed by stable id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformState {
    pub object_uuid: ObjectId,
    pub position: Vec3Data,
    pub rotation: Vec3Data,
    pub scale: Vec3Data,
}

impl TransformState {
    pub fn new(object_uuid: ObjectId, transform: &Transform) -> Self {
        Self {
            object_uuid,
            position: transform.position.into(),
            rotation: transform.rotation.into(),
            scale: transform.scale.into(),
        }
    }

    pub fn capture(scene: &Scene, key: ObjectKey) -> Option<Self> {
        let obj = scene.get(key)?;
        Some(Self::new(obj.id, &obj.transform))
    }

    /// Rebuild the live transform.
    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position.into(),
            rotation: self.rotation.into(),
            scale: self.scale.into(),
        }
    }

    /// Whether all nine scalars match exactly.
    pub fn same_pose(&self, other: &Self) -> bool {
        self.position == other.position
            && self.rotation == other.rotation
            && self.scale == other.scale
    }
}

/// Capture the transforms of every live key, skipping dead ones.
pub fn capture_transforms(scene: &Scene, keys: &[ObjectKey]) -> Vec<TransformState> {
    keys.iter()
        .filter_map(|key| TransformState::capture(scene, *key))
        .collect()
}

/// True when both lists name the same objects in the same poses, i.e. the
/// edit between them changed nothing.
pub fn poses_match(before: &[TransformState], after: &[TransformState]) -> bool {
    before.len() == after.len()
        && before
            .iter()
            .zip(after)
            .all(|(b, a)| b.object_uuid == a.object_uuid && b.same_pose(a))
}

/// A vehicle's complete path at one moment. Node order is traversal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathState {
    pub car_uuid: ObjectId,
    pub waypoints: Vec<Vec3Data>,
}

impl PathState {
    /// `None` unless `key` is a live vehicle.
    pub fn capture(scene: &Scene, key: ObjectKey) -> Option<Self> {
        let obj = scene.get(key)?;
        let path = obj.path.as_ref()?;
        Some(Self {
            car_uuid: obj.id,
            waypoints: path.iter().copied().map(Vec3Data::from).collect(),
        })
    }

    pub fn nodes(&self) -> Vec<Vec3> {
        self.waypoints.iter().copied().map(Vec3Data::to_vec3).collect()
    }
}

pub fn capture_paths(scene: &Scene, vehicles: &[ObjectKey]) -> Vec<PathState> {
    vehicles
        .iter()
        .filter_map(|key| PathState::capture(scene, *key))
        .collect()
}

/// Describe a live object so the factory can rebuild it.
///
/// The parameter bag (or flat metadata for bag-less kinds) is deep-cloned,
/// and the stable id and any path are written into it. Waypoint handles are
/// derived visuals and do not serialize.
pub fn serialize_object(obj: &SceneObject) -> Option<SerializedEntity> {
    if obj.is_waypoint_handle() {
        return None;
    }
    let mut params = obj.params.clone().unwrap_or_else(|| obj.metadata.clone());
    params.insert(UUID_PARAM.to_owned(), Value::String(obj.id.to_string()));
    if let Some(path) = &obj.path {
        let nodes: Vec<Vec3Data> = path.iter().copied().map(Vec3Data::from).collect();
        if let Ok(value) = serde_json::to_value(nodes) {
            params.insert("waypoints".to_owned(), value);
        }
    }
    Some(SerializedEntity {
        kind: obj.kind.clone(),
        params: Some(params),
        position: obj.transform.position.into(),
        rotation: obj.transform.rotation.into(),
        scale: obj.transform.scale.into(),
    })
}

pub fn serialize_objects(scene: &Scene, keys: &[ObjectKey]) -> Vec<SerializedEntity> {
    keys.iter()
        .filter_map(|key| scene.get(*key))
        .filter_map(serialize_object)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HeadlessHost, SceneHost};
    use crate::testing::{spawn, spawn_car};
    use serde_json::json;

    #[test]
    fn transform_state_round_trips_live_transform() {
        let t = Transform {
            position: Vec3::new(10.0, 5.0, 0.0),
            rotation: Vec3::new(0.0, std::f32::consts::PI, 0.0),
            scale: Vec3::splat(2.0),
        };
        let state = TransformState::new(ObjectId::new(), &t);
        assert_eq!(state.transform(), t);
    }

    #[test]
    fn same_pose_compares_all_nine_scalars() {
        let id = ObjectId::new();
        let a = TransformState::new(id, &Transform::default());
        let mut b = a;
        assert!(a.same_pose(&b));
        b.scale.z = 1.0001;
        assert!(!a.same_pose(&b));
        assert!(!poses_match(&[a], &[b]));
        assert!(poses_match(&[a], &[a]));
        assert!(!poses_match(&[a], &[]));
    }

    #[test]
    fn transform_state_wire_names() {
        let state = TransformState::new(ObjectId::new(), &Transform::default());
        let json = serde_json::to_value(state).unwrap();
        assert!(json.get("objectUuid").is_some());
        assert_eq!(json["scale"], json!({ "x": 1.0, "y": 1.0, "z": 1.0 }));
    }

    #[test]
    fn path_state_preserves_order_and_duplicates() {
        let mut host = HeadlessHost::with_builtins();
        let nodes = [Vec3::X, Vec3::X, Vec3::Z, Vec3::Y];
        let car = spawn_car(&mut host, Vec3::ZERO, &nodes);
        let state = PathState::capture(host.scene(), car).unwrap();
        assert_eq!(state.nodes(), nodes.to_vec());
        assert!(serde_json::to_value(&state).unwrap().get("carUuid").is_some());
    }

    #[test]
    fn path_state_needs_a_vehicle() {
        let mut host = HeadlessHost::with_builtins();
        let tree = spawn(&mut host, "tree", Vec3::ZERO);
        assert!(PathState::capture(host.scene(), tree).is_none());
    }

    #[test]
    fn serialize_object_records_id_and_path() {
        let mut host = HeadlessHost::with_builtins();
        let car = spawn_car(&mut host, Vec3::new(1.0, 0.0, 0.0), &[Vec3::new(5.0, 0.0, 0.0)]);
        let obj = host.scene().get(car).unwrap();
        let entity = serialize_object(obj).unwrap();

        assert_eq!(entity.kind, "car");
        assert_eq!(entity.uuid(), Some(obj.id));
        assert_eq!(entity.position, Vec3Data::new(1.0, 0.0, 0.0));
        assert_eq!(
            entity.params.as_ref().unwrap()["waypoints"],
            json!([{ "x": 5.0, "y": 0.0, "z": 0.0 }])
        );
    }

    #[test]
    fn serialize_skips_waypoint_handles() {
        let mut host = HeadlessHost::with_builtins();
        let car = spawn_car(&mut host, Vec3::ZERO, &[Vec3::X]);
        let handle = host.scene().waypoint_handle(car, 0).unwrap();
        assert!(serialize_object(host.scene().get(handle).unwrap()).is_none());
        assert_eq!(serialize_objects(host.scene(), &[car, handle]).len(), 1);
    }

    #[test]
    fn serialized_params_are_a_deep_copy() {
        let mut host = HeadlessHost::with_builtins();
        let tree = spawn(&mut host, "tree", Vec3::ZERO);
        let entity = serialize_object(host.scene().get(tree).unwrap()).unwrap();
        host.scene_mut()
            .get_mut(tree)
            .unwrap()
            .set_property("height", Some(json!(9)));
        assert!(!entity.params.unwrap().contains_key("height"));
    }
}
