use crate::object::SceneObject;
use crate::scene::{ObjectKey, Scene};
use glam::Vec3;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use worldedit_common::{ObjectId, Params, UUID_PARAM, Vec3Data};

/// Construction recipe for one object type.
#[derive(Debug, Clone, PartialEq)]
pub struct Prefab {
    pub kind: String,
    /// Collider half extents at unit scale.
    pub half_extents: Vec3,
    /// Vehicle-like objects carry an editable travel path.
    pub vehicle: bool,
    /// Whether the type keeps a structured parameter bag; types without one
    /// store leftover parameters as flat metadata.
    pub parametric: bool,
}

impl Prefab {
    pub fn new(kind: impl Into<String>, half_extents: Vec3) -> Self {
        Self {
            kind: kind.into(),
            half_extents,
            vehicle: false,
            parametric: true,
        }
    }

    pub fn vehicle(mut self) -> Self {
        self.vehicle = true;
        self
    }

    pub fn without_params(mut self) -> Self {
        self.parametric = false;
        self
    }
}

/// The object factory: builds live scene objects from a type name and a
/// parameter bag.
#[derive(Debug, Clone, Default)]
pub struct PrefabRegistry {
    prefabs: BTreeMap<String, Prefab>,
}

impl PrefabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the default object catalogue.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let statics = [
            ("building", Vec3::new(5.0, 10.0, 5.0)),
            ("house", Vec3::new(4.0, 3.5, 4.0)),
            ("skyscraper", Vec3::new(8.0, 40.0, 8.0)),
            ("shop", Vec3::new(5.0, 3.0, 4.0)),
            ("road", Vec3::new(5.0, 0.1, 20.0)),
            ("tree", Vec3::new(1.5, 4.0, 1.5)),
            ("orangeTree", Vec3::new(1.5, 3.0, 1.5)),
            ("bush", Vec3::new(1.0, 0.8, 1.0)),
            ("fence", Vec3::new(2.0, 0.6, 0.1)),
            ("bench", Vec3::new(1.0, 0.5, 0.4)),
            ("lamp", Vec3::new(0.2, 2.5, 0.2)),
            ("billboard", Vec3::new(3.0, 4.0, 0.3)),
            ("busStop", Vec3::new(2.0, 1.5, 1.0)),
            ("dumpster", Vec3::new(1.0, 0.75, 0.6)),
            ("fireHydrant", Vec3::new(0.2, 0.4, 0.2)),
            ("gazebo", Vec3::new(3.0, 2.5, 3.0)),
        ];
        for (kind, half_extents) in statics {
            registry.register(Prefab::new(kind, half_extents));
        }
        let vehicles = [
            ("car", Vec3::new(1.0, 0.75, 2.0)),
            ("pickup", Vec3::new(1.1, 0.9, 2.6)),
            ("bicycle", Vec3::new(0.3, 0.6, 0.9)),
            ("bus", Vec3::new(1.3, 1.6, 6.0)),
            ("deliveryVan", Vec3::new(1.1, 1.2, 2.8)),
            ("fireTruck", Vec3::new(1.3, 1.5, 4.5)),
            ("bird", Vec3::new(0.3, 0.2, 0.3)),
        ];
        for (kind, half_extents) in vehicles {
            registry.register(Prefab::new(kind, half_extents).vehicle());
        }
        registry.register(Prefab::new("ring", Vec3::new(3.0, 3.0, 0.5)).without_params());
        registry
    }

    pub fn register(&mut self, prefab: Prefab) {
        self.prefabs.insert(prefab.kind.clone(), prefab);
    }

    pub fn get(&self, kind: &str) -> Option<&Prefab> {
        self.prefabs.get(kind)
    }

    pub fn len(&self) -> usize {
        self.prefabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }

    /// Build an object of `kind` and insert it into the scene.
    ///
    /// Consumes the construction keys from `params` (`uuid`, `x`/`y`/`z`,
    /// `rotX`/`rotY`/`rotZ`, `waypoints`). A `uuid` is kept unless it is
    /// malformed or already live. Returns `None` for unknown kinds.
    pub fn create(&self, scene: &mut Scene, kind: &str, params: &Params) -> Option<ObjectKey> {
        let Some(prefab) = self.prefabs.get(kind) else {
            warn!(kind, "unknown object type");
            return None;
        };

        let mut rest = params.clone();
        let id = rest
            .remove(UUID_PARAM)
            .and_then(|v| v.as_str().and_then(|s| s.parse::<ObjectId>().ok()))
            .filter(|id| scene.find(id).is_none())
            .unwrap_or_default();
        let position = take_vec3(&mut rest, ["x", "y", "z"]);
        let rotation = take_vec3(&mut rest, ["rotX", "rotY", "rotZ"]);
        let waypoints = rest.remove("waypoints").map(parse_waypoints);

        let mut obj = SceneObject::new(kind);
        obj.id = id;
        obj.half_extents = prefab.half_extents;
        obj.transform.position = position;
        obj.transform.rotation = rotation;
        if prefab.vehicle {
            obj.path = Some(waypoints.unwrap_or_default());
        }
        if prefab.parametric {
            obj.params = Some(rest);
        } else {
            obj.metadata = rest;
        }
        obj.bounds = obj.compute_bounds();

        let key = match scene.insert(obj) {
            Ok(key) => key,
            Err(err) => {
                warn!(kind, %err, "factory could not place object");
                return None;
            }
        };
        if prefab.vehicle {
            scene.rebuild_path(key);
        }
        debug!(kind, %id, "object created");
        Some(key)
    }
}

fn take_vec3(params: &mut Params, keys: [&str; 3]) -> Vec3 {
    let [x, y, z] = keys.map(|k| {
        params
            .remove(k)
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0) as f32
    });
    Vec3::new(x, y, z)
}

fn parse_waypoints(value: Value) -> Vec<Vec3> {
    serde_json::from_value::<Vec<Vec3Data>>(value)
        .map(|nodes| nodes.into_iter().map(Vec3Data::to_vec3).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Aabb;
    use serde_json::json;

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => Params::new(),
        }
    }

    #[test]
    fn builtins_include_vehicles_and_statics() {
        let registry = PrefabRegistry::with_builtins();
        assert!(registry.get("car").unwrap().vehicle);
        assert!(!registry.get("tree").unwrap().vehicle);
        assert!(!registry.get("ring").unwrap().parametric);
        assert!(registry.len() > 20);
    }

    #[test]
    fn unknown_kind_is_a_factory_miss() {
        let registry = PrefabRegistry::with_builtins();
        let mut scene = Scene::new();
        assert!(registry.create(&mut scene, "spaceship", &Params::new()).is_none());
        assert!(scene.is_empty());
    }

    #[test]
    fn create_consumes_construction_params() {
        let registry = PrefabRegistry::with_builtins();
        let mut scene = Scene::new();
        let id = ObjectId::new();
        let key = registry
            .create(
                &mut scene,
                "tree",
                &params(json!({
                    "uuid": id.to_string(),
                    "x": 1.0, "y": 2.0, "z": 3.0,
                    "rotY": 0.5,
                    "height": 6
                })),
            )
            .unwrap();

        let obj = scene.get(key).unwrap();
        assert_eq!(obj.id, id);
        assert_eq!(obj.transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(obj.transform.rotation, Vec3::new(0.0, 0.5, 0.0));
        let bag = obj.params.as_ref().unwrap();
        assert_eq!(bag.len(), 1);
        assert_eq!(bag.get("height"), Some(&json!(6)));
        assert_ne!(obj.bounds, Aabb::default());
    }

    #[test]
    fn colliding_uuid_gets_a_fresh_id() {
        let registry = PrefabRegistry::with_builtins();
        let mut scene = Scene::new();
        let p = params(json!({ "uuid": ObjectId::new().to_string() }));
        let first = registry.create(&mut scene, "bench", &p).unwrap();
        let second = registry.create(&mut scene, "bench", &p).unwrap();
        assert_ne!(scene.get(first).unwrap().id, scene.get(second).unwrap().id);
    }

    #[test]
    fn vehicles_get_path_and_handles() {
        let registry = PrefabRegistry::with_builtins();
        let mut scene = Scene::new();
        let key = registry
            .create(
                &mut scene,
                "car",
                &params(json!({
                    "waypoints": [{ "x": 10.0, "y": 0.0, "z": 0.0 }, { "x": 20.0, "y": 0.0, "z": 0.0 }]
                })),
            )
            .unwrap();
        let car = scene.get(key).unwrap();
        assert_eq!(car.waypoints(), &[Vec3::new(10.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0)]);
        assert!(!car.params.as_ref().unwrap().contains_key("waypoints"));
        assert_eq!(scene.path_visual(key).unwrap().handles.len(), 2);
    }

    #[test]
    fn bagless_kinds_store_metadata() {
        let registry = PrefabRegistry::with_builtins();
        let mut scene = Scene::new();
        let key = registry
            .create(&mut scene, "ring", &params(json!({ "visible": true })))
            .unwrap();
        let ring = scene.get(key).unwrap();
        assert!(ring.params.is_none());
        assert_eq!(ring.metadata.get("visible"), Some(&json!(true)));
    }
}
