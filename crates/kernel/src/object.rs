use crate::scene::ObjectKey;
use glam::{Mat3, Vec3};
use serde_json::Value;
use worldedit_common::{ObjectId, Params, Transform};

/// Marks an object as the draggable handle of one node of a vehicle's path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaypointHandle {
    pub vehicle: ObjectKey,
    pub index: usize,
}

/// Axis-aligned bounding box used by the collision collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Bounds of a box with the given half extents, placed by `transform`.
    pub fn from_transform(transform: &Transform, half_extents: Vec3) -> Self {
        let half = half_extents * transform.scale.abs();
        let m = Mat3::from_quat(transform.rotation_quat());
        let world_half =
            m.x_axis.abs() * half.x + m.y_axis.abs() * half.y + m.z_axis.abs() * half.z;
        Self {
            min: transform.position - world_half,
            max: transform.position + world_half,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// A placed object as the scene holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: ObjectId,
    pub kind: String,
    /// Structured parameter bag. `None` for kinds that only carry flat metadata.
    pub params: Option<Params>,
    pub metadata: Params,
    pub transform: Transform,
    /// Travel path. `Some` exactly for vehicle-like objects.
    pub path: Option<Vec<Vec3>>,
    pub handle: Option<WaypointHandle>,
    pub half_extents: Vec3,
    pub bounds: Aabb,
}

impl SceneObject {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            kind: kind.into(),
            params: None,
            metadata: Params::new(),
            transform: Transform::default(),
            path: None,
            handle: None,
            half_extents: Vec3::splat(0.5),
            bounds: Aabb::default(),
        }
    }

    pub fn is_vehicle(&self) -> bool {
        self.path.is_some()
    }

    pub fn is_waypoint_handle(&self) -> bool {
        self.handle.is_some()
    }

    /// Path nodes, empty for objects without a path.
    pub fn waypoints(&self) -> &[Vec3] {
        self.path.as_deref().unwrap_or(&[])
    }

    /// Look a property up in the parameter bag, then in flat metadata.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.params
            .as_ref()
            .and_then(|bag| bag.get(name))
            .or_else(|| self.metadata.get(name))
    }

    /// Write a property where it lives: the bag when there is one (unless the
    /// key is only known as flat metadata), otherwise flat metadata.
    /// `None` removes the key.
    pub fn set_property(&mut self, name: &str, value: Option<Value>) {
        let in_metadata_only = self.metadata.contains_key(name)
            && !self.params.as_ref().is_some_and(|bag| bag.contains_key(name));
        let target = match self.params.as_mut() {
            Some(bag) if !in_metadata_only => bag,
            _ => &mut self.metadata,
        };
        match value {
            Some(v) => {
                target.insert(name.to_owned(), v);
            }
            None => {
                target.remove(name);
            }
        }
    }

    pub fn compute_bounds(&self) -> Aabb {
        Aabb::from_transform(&self.transform, self.half_extents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn property_prefers_parameter_bag() {
        let mut obj = SceneObject::new("lamp");
        obj.params = Some(Params::new());
        obj.params.as_mut().unwrap().insert("height".into(), json!(3));
        obj.metadata.insert("height".into(), json!(99));
        assert_eq!(obj.property("height"), Some(&json!(3)));
    }

    #[test]
    fn property_falls_back_to_metadata() {
        let mut obj = SceneObject::new("ring");
        obj.metadata.insert("visible".into(), json!(true));
        assert_eq!(obj.property("visible"), Some(&json!(true)));

        obj.set_property("visible", Some(json!(false)));
        assert_eq!(obj.metadata.get("visible"), Some(&json!(false)));
        assert!(obj.params.is_none());
    }

    #[test]
    fn set_property_keeps_metadata_only_keys_in_metadata() {
        let mut obj = SceneObject::new("bench");
        obj.params = Some(Params::new());
        obj.metadata.insert("isLocked".into(), json!(false));

        obj.set_property("isLocked", Some(json!(true)));
        assert_eq!(obj.metadata.get("isLocked"), Some(&json!(true)));
        assert!(!obj.params.as_ref().unwrap().contains_key("isLocked"));

        obj.set_property("speed", Some(json!(4.0)));
        assert_eq!(obj.params.as_ref().unwrap().get("speed"), Some(&json!(4.0)));

        obj.set_property("speed", None);
        assert!(obj.property("speed").is_none());
    }

    #[test]
    fn bounds_follow_scale_and_rotation() {
        let mut obj = SceneObject::new("crate");
        obj.half_extents = Vec3::new(2.0, 1.0, 1.0);
        obj.transform.position = Vec3::new(10.0, 0.0, 0.0);
        obj.transform.scale = Vec3::splat(2.0);
        let b = obj.compute_bounds();
        assert_eq!(b.min, Vec3::new(6.0, -2.0, -2.0));
        assert_eq!(b.max, Vec3::new(14.0, 2.0, 2.0));

        obj.transform.rotation.y = std::f32::consts::FRAC_PI_2;
        let b = obj.compute_bounds();
        assert!((b.max.z - 4.0).abs() < 1e-4);
        assert!((b.max.x - 12.0).abs() < 1e-4);
        assert!(b.contains(Vec3::new(10.0, 0.0, 3.5)));
    }

    #[test]
    fn only_vehicles_have_waypoints() {
        let mut car = SceneObject::new("car");
        assert!(!car.is_vehicle());
        assert!(car.waypoints().is_empty());
        car.path = Some(vec![Vec3::X]);
        assert!(car.is_vehicle());
        assert_eq!(car.waypoints(), &[Vec3::X]);
    }
}
