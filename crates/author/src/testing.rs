//! Fixtures shared by the unit tests.

use crate::host::{HeadlessHost, SceneHost};
use glam::Vec3;
use serde_json::json;
use worldedit_common::Params;
use worldedit_kernel::ObjectKey;

pub(crate) fn spawn(host: &mut HeadlessHost, kind: &str, position: Vec3) -> ObjectKey {
    let mut params = Params::new();
    params.insert("x".into(), json!(position.x));
    params.insert("y".into(), json!(position.y));
    params.insert("z".into(), json!(position.z));
    host.create(kind, &params).expect("builtin kind")
}

pub(crate) fn spawn_car(host: &mut HeadlessHost, position: Vec3, waypoints: &[Vec3]) -> ObjectKey {
    let key = spawn(host, "car", position);
    host.scene_mut().get_mut(key).unwrap().path = Some(waypoints.to_vec());
    host.rebuild_path_visual(key);
    key
}

pub(crate) fn position(host: &HeadlessHost, key: ObjectKey) -> Vec3 {
    host.scene().get(key).unwrap().transform.position
}

pub(crate) fn waypoints(host: &HeadlessHost, key: ObjectKey) -> Vec<Vec3> {
    host.scene().get(key).unwrap().waypoints().to_vec()
}
