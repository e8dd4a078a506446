use crate::object::{SceneObject, WaypointHandle};
use glam::Vec3;
use std::collections::BTreeMap;
use worldedit_common::{ObjectId, Transform};

/// Generational handle to a live object.
///
/// Cheap to copy and hold, but only meaningful while the object it was issued
/// for is alive: once removed, the slot's generation moves on and the key
/// resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    index: u32,
    generation: u32,
}

impl ObjectKey {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// An event record produced by every mutation of the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    Spawned {
        key: ObjectKey,
        id: ObjectId,
        kind: String,
    },
    Despawned {
        key: ObjectKey,
        id: ObjectId,
    },
    TransformUpdated {
        key: ObjectKey,
        old: Transform,
        new: Transform,
    },
    BoundsRecomputed {
        key: ObjectKey,
    },
    PathRebuilt {
        vehicle: ObjectKey,
        nodes: usize,
    },
}

/// Errors from scene mutations.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("object id {0} is already live")]
    DuplicateId(ObjectId),
}

/// Derived visuals of a vehicle's path: the polyline and one handle per node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathVisual {
    /// Vehicle position followed by every waypoint. Empty when there are none.
    pub line: Vec<Vec3>,
    pub handles: Vec<ObjectKey>,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    object: Option<SceneObject>,
}

/// The live object collection.
///
/// Objects live in a slot arena addressed by `ObjectKey`; a BTreeMap indexes
/// them by stable id for deterministic iteration and lookup.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    index: BTreeMap<ObjectId, ObjectKey>,
    paths: BTreeMap<ObjectKey, PathVisual>,
    event_log: Vec<SceneEvent>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live objects, waypoint handles included.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    /// Add an object. Fails if another live object already has its id.
    pub fn insert(&mut self, object: SceneObject) -> Result<ObjectKey, SceneError> {
        if self.index.contains_key(&object.id) {
            return Err(SceneError::DuplicateId(object.id));
        }
        let key = match self.free.pop() {
            Some(index) => ObjectKey {
                index,
                generation: self.slots[index as usize].generation,
            },
            None => {
                self.slots.push(Slot::default());
                ObjectKey {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        self.index.insert(object.id, key);
        self.event_log.push(SceneEvent::Spawned {
            key,
            id: object.id,
            kind: object.kind.clone(),
        });
        self.slots[key.index as usize].object = Some(object);
        Ok(key)
    }

    /// Remove an object. Removing a vehicle also removes its path handles.
    pub fn remove(&mut self, key: ObjectKey) -> Option<SceneObject> {
        let slot = self.slots.get_mut(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        let object = slot.object.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.index);
        if self.index.get(&object.id) == Some(&key) {
            self.index.remove(&object.id);
        }
        self.event_log.push(SceneEvent::Despawned { key, id: object.id });

        if let Some(visual) = self.paths.remove(&key) {
            for handle in visual.handles {
                self.remove(handle);
            }
        }
        Some(object)
    }

    pub fn get(&self, key: ObjectKey) -> Option<&SceneObject> {
        let slot = self.slots.get(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.object.as_ref()
    }

    pub fn get_mut(&mut self, key: ObjectKey) -> Option<&mut SceneObject> {
        let slot = self.slots.get_mut(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.object.as_mut()
    }

    pub fn contains(&self, key: ObjectKey) -> bool {
        self.get(key).is_some()
    }

    /// Key of the live object carrying `id`, if any.
    pub fn find(&self, id: &ObjectId) -> Option<ObjectKey> {
        self.index.get(id).copied().filter(|key| self.contains(*key))
    }

    /// Live objects in stable-id order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectKey, &SceneObject)> + '_ {
        self.index
            .values()
            .filter_map(|key| self.get(*key).map(|obj| (*key, obj)))
    }

    /// Update an object's transform and log the change.
    pub fn set_transform(&mut self, key: ObjectKey, new: Transform) -> bool {
        let Some(obj) = self.get_mut(key) else {
            return false;
        };
        let old = obj.transform;
        obj.transform = new;
        self.event_log
            .push(SceneEvent::TransformUpdated { key, old, new });
        true
    }

    /// Recompute an object's collision bounds from its current transform.
    pub fn recompute_bounds(&mut self, key: ObjectKey) -> bool {
        let Some(obj) = self.get_mut(key) else {
            return false;
        };
        obj.bounds = obj.compute_bounds();
        self.event_log.push(SceneEvent::BoundsRecomputed { key });
        true
    }

    /// Rebuild a vehicle's path line and handles from its current waypoints.
    ///
    /// Handles are reused by index, so a handle survives the rebuild unless
    /// its node was removed.
    pub fn rebuild_path(&mut self, vehicle: ObjectKey) -> bool {
        let Some(obj) = self.get(vehicle) else {
            return false;
        };
        let Some(path) = obj.path.clone() else {
            return false;
        };
        let origin = obj.transform.position;

        let mut visual = self.paths.remove(&vehicle).unwrap_or_default();
        visual.handles.retain(|handle| self.contains(*handle));
        if visual.handles.len() > path.len() {
            for surplus in visual.handles.split_off(path.len()) {
                self.remove(surplus);
            }
        }

        for (index, node) in path.iter().enumerate() {
            match visual.handles.get(index).copied() {
                Some(handle) => {
                    if let Some(h) = self.get_mut(handle) {
                        h.transform.position = *node;
                        h.handle = Some(WaypointHandle { vehicle, index });
                        h.bounds = h.compute_bounds();
                    }
                }
                None => {
                    let mut h = SceneObject::new("waypoint");
                    h.transform.position = *node;
                    h.handle = Some(WaypointHandle { vehicle, index });
                    h.bounds = h.compute_bounds();
                    if let Ok(handle) = self.insert(h) {
                        visual.handles.push(handle);
                    }
                }
            }
        }

        visual.line = if path.is_empty() {
            Vec::new()
        } else {
            std::iter::once(origin).chain(path.iter().copied()).collect()
        };
        self.paths.insert(vehicle, visual);
        self.event_log.push(SceneEvent::PathRebuilt {
            vehicle,
            nodes: path.len(),
        });
        true
    }

    pub fn path_visual(&self, vehicle: ObjectKey) -> Option<&PathVisual> {
        self.paths.get(&vehicle)
    }

    /// Handle object for node `index` of a vehicle's path.
    pub fn waypoint_handle(&self, vehicle: ObjectKey, index: usize) -> Option<ObjectKey> {
        self.paths
            .get(&vehicle)?
            .handles
            .get(index)
            .copied()
            .filter(|handle| self.contains(*handle))
    }
}
