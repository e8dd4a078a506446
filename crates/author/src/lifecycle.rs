//! Turning serialized descriptions back into live objects, and back out.

use crate::host::SceneHost;
use crate::resolve::resolve_all;
use serde_json::json;
use tracing::{debug, warn};
use worldedit_common::{SerializedEntity, Transform, UUID_PARAM};
use worldedit_kernel::ObjectKey;

/// Rebuild one object through the factory.
///
/// The stored id is kept unless another live object already carries it, in
/// which case the factory issues a fresh one. The serialized transform is
/// applied in full (the factory only understands position and rotation).
pub fn instantiate(host: &mut dyn SceneHost, entity: &SerializedEntity) -> Option<ObjectKey> {
    let mut params = entity.params.clone().unwrap_or_default();
    if let Some(id) = entity.uuid() {
        if host.scene().find(&id).is_some() {
            debug!(%id, "identifier collides, issuing a new one");
            params.remove(UUID_PARAM);
        }
    }
    let p = entity.position;
    let r = entity.rotation;
    for (name, value) in [
        ("x", p.x),
        ("y", p.y),
        ("z", p.z),
        ("rotX", r.x),
        ("rotY", r.y),
        ("rotZ", r.z),
    ] {
        params.insert(name.to_owned(), json!(value));
    }

    let Some(key) = host.create(&entity.kind, &params) else {
        warn!(kind = %entity.kind, "factory returned nothing, skipping object");
        return None;
    };
    let transform = Transform {
        position: entity.position.into(),
        rotation: entity.rotation.into(),
        scale: entity.scale.into(),
    };
    host.scene_mut().set_transform(key, transform);
    host.recompute_bounds(key);
    if host.scene().get(key).is_some_and(|obj| obj.is_vehicle()) {
        host.rebuild_path_visual(key);
    }
    Some(key)
}

/// Rebuild a batch. Factory failures are skipped; the rest still proceed.
pub fn instantiate_all(host: &mut dyn SceneHost, entities: &[SerializedEntity]) -> Vec<ObjectKey> {
    entities
        .iter()
        .filter_map(|entity| instantiate(host, entity))
        .collect()
}

/// Destroy ordinary objects. Handles and dead keys are ignored.
pub fn remove_objects(host: &mut dyn SceneHost, keys: &[ObjectKey]) -> usize {
    let mut removed = 0;
    for &key in keys {
        let ordinary = host
            .scene()
            .get(key)
            .is_some_and(|obj| !obj.is_waypoint_handle());
        if ordinary && host.destroy(key) {
            removed += 1;
        }
    }
    removed
}

/// Live objects described by `entities`, plus any still-live tracked keys.
pub fn tracked_targets(
    host: &dyn SceneHost,
    entities: &[SerializedEntity],
    tracked: &[ObjectKey],
) -> Vec<ObjectKey> {
    let ids: Vec<_> = entities.iter().filter_map(SerializedEntity::uuid).collect();
    let mut keys = resolve_all(host.scene(), &ids);
    for &key in tracked {
        if host.scene().contains(key) && !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;
    use crate::snapshot::serialize_object;
    use crate::testing::{spawn, spawn_car, waypoints};
    use glam::Vec3;

    #[test]
    fn instantiate_preserves_id_and_transform() {
        let mut host = HeadlessHost::with_builtins();
        let tree = spawn(&mut host, "tree", Vec3::new(1.0, 2.0, 3.0));
        host.scene_mut().get_mut(tree).unwrap().transform.scale = Vec3::splat(2.0);
        let entity = serialize_object(host.scene().get(tree).unwrap()).unwrap();
        host.destroy(tree);

        let again = instantiate(&mut host, &entity).unwrap();
        let obj = host.scene().get(again).unwrap();
        assert_eq!(Some(obj.id), entity.uuid());
        assert_eq!(obj.transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(obj.transform.scale, Vec3::splat(2.0));
        assert!(obj.bounds.contains(Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn colliding_id_gets_a_fresh_one() {
        let mut host = HeadlessHost::with_builtins();
        let tree = spawn(&mut host, "tree", Vec3::ZERO);
        let entity = serialize_object(host.scene().get(tree).unwrap()).unwrap();
        assert!(entity.uuid().is_some());

        let copy = instantiate(&mut host, &entity).unwrap();
        assert_ne!(copy, tree);
        assert_ne!(host.scene().get(copy).unwrap().id, host.scene().get(tree).unwrap().id);
    }

    #[test]
    fn vehicles_come_back_with_their_path() {
        let mut host = HeadlessHost::with_builtins();
        let car = spawn_car(&mut host, Vec3::ZERO, &[Vec3::X, Vec3::Z]);
        let entity = serialize_object(host.scene().get(car).unwrap()).unwrap();
        host.destroy(car);
        assert!(host.scene().is_empty());

        let again = instantiate(&mut host, &entity).unwrap();
        assert_eq!(waypoints(&host, again), vec![Vec3::X, Vec3::Z]);
        assert_eq!(host.scene().path_visual(again).unwrap().handles.len(), 2);
    }

    #[test]
    fn factory_failure_skips_only_that_entity() {
        let mut host = HeadlessHost::with_builtins();
        let tree = spawn(&mut host, "tree", Vec3::ZERO);
        let good = serialize_object(host.scene().get(tree).unwrap()).unwrap();
        let mut bad = good.clone();
        bad.kind = "spaceship".into();
        host.destroy(tree);

        let keys = instantiate_all(&mut host, &[bad, good]);
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn remove_objects_leaves_handles_alone() {
        let mut host = HeadlessHost::with_builtins();
        let car = spawn_car(&mut host, Vec3::ZERO, &[Vec3::X]);
        let handle = host.scene().waypoint_handle(car, 0).unwrap();
        let tree = spawn(&mut host, "tree", Vec3::ZERO);

        assert_eq!(remove_objects(&mut host, &[handle, tree]), 1);
        assert!(host.scene().contains(handle));
        assert!(!host.scene().contains(tree));
    }
}
