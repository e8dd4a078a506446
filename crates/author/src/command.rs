//! The five reversible edits and their persisted form.
//!
//! Every command stores stable ids or serialized descriptions, never live
//! keys it trusts across runs. `undo` and `redo` resolve their targets when
//! they execute and quietly skip whatever no longer exists, so both are
//! always safe to call.
//!
//! On the wire a command is a flat JSON object whose `type` field is one of
//! `Transform`, `PropertyChange`, `CreateObject`, `DeleteObject` or
//! `Waypoint`.

use crate::host::EditContext;
use crate::lifecycle::{instantiate_all, remove_objects, tracked_targets};
use crate::reconcile::{apply_path_snapshot, apply_transform_snapshot, reconcile};
use crate::resolve::resolve;
use crate::snapshot::{PathState, TransformState};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use worldedit_common::{ObjectId, PropertyValue, SerializedEntity};
use worldedit_kernel::ObjectKey;

const KINDS: [&str; 5] = [
    "Transform",
    "PropertyChange",
    "CreateObject",
    "DeleteObject",
    "Waypoint",
];

/// Why a persisted history entry could not be rebuilt.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("history entry has no type discriminator")]
    MissingType,
    #[error("unknown history entry type `{0}`")]
    UnknownType(String),
    #[error("malformed {kind} entry: {source}")]
    Malformed {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    Transform(TransformCommand),
    PropertyChange(PropertyChangeCommand),
    CreateObject(CreateObjectCommand),
    DeleteObject(DeleteObjectCommand),
    #[serde(rename = "Waypoint")]
    PathEdit(PathEditCommand),
}

impl Command {
    pub fn description(&self) -> &str {
        match self {
            Self::Transform(c) => &c.description,
            Self::PropertyChange(c) => &c.description,
            Self::CreateObject(c) => &c.description,
            Self::DeleteObject(c) => &c.description,
            Self::PathEdit(c) => &c.description,
        }
    }

    /// The wire discriminator.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transform(_) => "Transform",
            Self::PropertyChange(_) => "PropertyChange",
            Self::CreateObject(_) => "CreateObject",
            Self::DeleteObject(_) => "DeleteObject",
            Self::PathEdit(_) => "Waypoint",
        }
    }

    pub fn undo(&mut self, ctx: &mut EditContext<'_>) {
        match self {
            Self::Transform(c) => apply_transform_snapshot(ctx, &c.before_states),
            Self::PropertyChange(c) => c.apply(ctx, c.before_value.as_ref()),
            Self::CreateObject(c) => c.destroy(ctx),
            Self::DeleteObject(c) => c.recreate(ctx),
            Self::PathEdit(c) => apply_path_snapshot(ctx, &c.states_before),
        }
    }

    pub fn redo(&mut self, ctx: &mut EditContext<'_>) {
        match self {
            Self::Transform(c) => apply_transform_snapshot(ctx, &c.after_states),
            Self::PropertyChange(c) => c.apply(ctx, c.after_value.as_ref()),
            Self::CreateObject(c) => c.recreate(ctx),
            Self::DeleteObject(c) => c.destroy(ctx),
            Self::PathEdit(c) => apply_path_snapshot(ctx, &c.states_after),
        }
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Rebuild a command from its persisted form. Nothing is executed.
    pub fn from_json(value: Value) -> Result<Self, DecodeError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingType)?;
        if !KINDS.contains(&kind) {
            return Err(DecodeError::UnknownType(kind.to_owned()));
        }
        let kind = kind.to_owned();
        serde_json::from_value(value).map_err(|source| DecodeError::Malformed { kind, source })
    }
}

impl From<TransformCommand> for Command {
    fn from(c: TransformCommand) -> Self {
        Self::Transform(c)
    }
}

impl From<PropertyChangeCommand> for Command {
    fn from(c: PropertyChangeCommand) -> Self {
        Self::PropertyChange(c)
    }
}

impl From<CreateObjectCommand> for Command {
    fn from(c: CreateObjectCommand) -> Self {
        Self::CreateObject(c)
    }
}

impl From<DeleteObjectCommand> for Command {
    fn from(c: DeleteObjectCommand) -> Self {
        Self::DeleteObject(c)
    }
}

impl From<PathEditCommand> for Command {
    fn from(c: PathEditCommand) -> Self {
        Self::PathEdit(c)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformCommand {
    #[serde(default)]
    pub description: String,
    pub before_states: Vec<TransformState>,
    pub after_states: Vec<TransformState>,
}

impl TransformCommand {
    pub fn new(before_states: Vec<TransformState>, after_states: Vec<TransformState>) -> Self {
        Self {
            description: "Transform change".into(),
            before_states,
            after_states,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// One property of one object. A `None` value means the property was
/// absent, and applying it removes the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyChangeCommand {
    #[serde(default)]
    pub description: String,
    pub object_uuid: ObjectId,
    pub property: String,
    #[serde(default)]
    pub before_value: Option<PropertyValue>,
    #[serde(default)]
    pub after_value: Option<PropertyValue>,
}

impl PropertyChangeCommand {
    pub fn new(
        object_uuid: ObjectId,
        property: impl Into<String>,
        before_value: Option<PropertyValue>,
        after_value: Option<PropertyValue>,
    ) -> Self {
        let property = property.into();
        Self {
            description: format!("Set {property}"),
            object_uuid,
            property,
            before_value,
            after_value,
        }
    }

    fn apply(&self, ctx: &mut EditContext<'_>, value: Option<&PropertyValue>) {
        let Some(key) = resolve(ctx.host.scene(), &self.object_uuid) else {
            return;
        };
        if let Some(obj) = ctx.host.scene_mut().get_mut(key) {
            obj.set_property(&self.property, value.map(PropertyValue::to_json));
        }
        if ctx.selection.contains(key) {
            ctx.host.on_properties_changed(key);
        }
    }
}

/// Objects that came into existence: a paste, a duplicate, a placement.
///
/// `objects` tracks the live instances produced by the latest run; it is
/// never persisted and is only a hint, since targets are also re-resolved
/// from the ids in `serialized_data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateObjectCommand {
    #[serde(default)]
    pub description: String,
    pub serialized_data: Vec<SerializedEntity>,
    #[serde(skip)]
    pub objects: Vec<ObjectKey>,
}

impl CreateObjectCommand {
    pub fn new(serialized_data: Vec<SerializedEntity>, objects: Vec<ObjectKey>) -> Self {
        Self {
            description: "Create object".into(),
            serialized_data,
            objects,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    fn destroy(&mut self, ctx: &mut EditContext<'_>) {
        let targets = tracked_targets(ctx.host, &self.serialized_data, &self.objects);
        remove_objects(ctx.host, &targets);
        self.objects.clear();
        ctx.selection.clear(ctx.host);
    }

    /// Always rebuilds from `serialized_data`, never from live state.
    fn recreate(&mut self, ctx: &mut EditContext<'_>) {
        self.objects = recreate(ctx, &self.serialized_data);
    }
}

/// Objects that were removed. The inverse of [`CreateObjectCommand`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteObjectCommand {
    #[serde(default)]
    pub description: String,
    pub serialized_data: Vec<SerializedEntity>,
    #[serde(skip)]
    pub objects: Vec<ObjectKey>,
}

impl DeleteObjectCommand {
    pub fn new(serialized_data: Vec<SerializedEntity>) -> Self {
        Self {
            description: "Delete object".into(),
            serialized_data,
            objects: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    fn recreate(&mut self, ctx: &mut EditContext<'_>) {
        self.objects = recreate(ctx, &self.serialized_data);
    }

    fn destroy(&mut self, ctx: &mut EditContext<'_>) {
        let targets = tracked_targets(ctx.host, &self.serialized_data, &self.objects);
        self.objects.clear();
        if targets.is_empty() {
            return;
        }
        remove_objects(ctx.host, &targets);
        ctx.selection.clear(ctx.host);
    }
}

fn recreate(ctx: &mut EditContext<'_>, data: &[SerializedEntity]) -> Vec<ObjectKey> {
    let keys = instantiate_all(ctx.host, data);
    if !keys.is_empty() {
        ctx.selection.replace_all(ctx.host, keys.iter().copied());
    }
    reconcile(ctx, &keys);
    keys
}

/// Whole-path replacement for one or more vehicles, applied atomically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathEditCommand {
    #[serde(default)]
    pub description: String,
    pub states_before: Vec<PathState>,
    pub states_after: Vec<PathState>,
}

impl PathEditCommand {
    pub fn new(states_before: Vec<PathState>, states_after: Vec<PathState>) -> Self {
        Self {
            description: "Waypoint change".into(),
            states_before,
            states_after,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HeadlessHost, SceneHost, UiNotice};
    use crate::selection::Selection;
    use crate::snapshot::{serialize_object, serialize_objects};
    use crate::testing::{position, spawn, spawn_car, waypoints};
    use glam::Vec3;
    use serde_json::json;
    use worldedit_common::Transform;

    fn id_of(host: &HeadlessHost, key: ObjectKey) -> ObjectId {
        host.scene().get(key).unwrap().id
    }

    fn run(host: &mut HeadlessHost, selection: &mut Selection, cmd: &mut Command, forward: bool) {
        let mut ctx = EditContext::new(host, selection);
        if forward {
            cmd.redo(&mut ctx);
        } else {
            cmd.undo(&mut ctx);
        }
    }

    #[test]
    fn transform_undo_redo_moves_object() {
        let mut host = HeadlessHost::with_builtins();
        let mut selection = Selection::new();
        let a = spawn(&mut host, "tree", Vec3::ZERO);
        let id = id_of(&host, a);
        let before = TransformState::new(id, &Transform::default());
        let after = TransformState::new(id, &Transform::from_position(Vec3::new(10.0, 5.0, 0.0)));
        let mut cmd = Command::from(TransformCommand::new(vec![before], vec![after]));

        run(&mut host, &mut selection, &mut cmd, true);
        assert_eq!(position(&host, a), Vec3::new(10.0, 5.0, 0.0));
        run(&mut host, &mut selection, &mut cmd, false);
        assert_eq!(position(&host, a), Vec3::ZERO);
        assert_eq!(TransformState::capture(host.scene(), a), Some(before));
    }

    #[test]
    fn transform_follows_recreated_object() {
        let mut host = HeadlessHost::with_builtins();
        let mut selection = Selection::new();
        let a = spawn(&mut host, "tree", Vec3::ZERO);
        let id = id_of(&host, a);
        let entity = serialize_object(host.scene().get(a).unwrap()).unwrap();
        let after = TransformState::new(id, &Transform::from_position(Vec3::X));
        let mut cmd = Command::from(TransformCommand::new(vec![after], vec![after]));

        host.destroy(a);
        run(&mut host, &mut selection, &mut cmd, true);
        assert!(host.scene().is_empty());

        let again = crate::lifecycle::instantiate(&mut host, &entity).unwrap();
        assert_ne!(again, a);
        run(&mut host, &mut selection, &mut cmd, true);
        assert_eq!(position(&host, again), Vec3::X);
    }

    #[test]
    fn property_change_writes_and_removes() {
        let mut host = HeadlessHost::with_builtins();
        let mut selection = Selection::new();
        let lamp = spawn(&mut host, "lamp", Vec3::ZERO);
        selection.select_one(&mut host, Some(lamp));
        host.drain_notices();

        let mut cmd = Command::from(PropertyChangeCommand::new(
            id_of(&host, lamp),
            "isLocked",
            None,
            Some(true.into()),
        ));
        assert_eq!(cmd.description(), "Set isLocked");

        run(&mut host, &mut selection, &mut cmd, true);
        assert_eq!(host.scene().get(lamp).unwrap().property("isLocked"), Some(&json!(true)));
        assert_eq!(host.drain_notices(), vec![UiNotice::PropertiesChanged(lamp)]);

        run(&mut host, &mut selection, &mut cmd, false);
        assert!(host.scene().get(lamp).unwrap().property("isLocked").is_none());
    }

    #[test]
    fn property_change_on_missing_object_is_noop() {
        let mut host = HeadlessHost::with_builtins();
        let mut selection = Selection::new();
        let mut cmd = Command::from(PropertyChangeCommand::new(
            ObjectId::new(),
            "speed",
            Some(10.into()),
            Some(20.into()),
        ));
        run(&mut host, &mut selection, &mut cmd, true);
        run(&mut host, &mut selection, &mut cmd, false);
        assert!(host.notices().is_empty());
    }

    #[test]
    fn create_undo_destroys_and_redo_recreates_from_data() {
        let mut host = HeadlessHost::with_builtins();
        let mut selection = Selection::new();
        let a = spawn(&mut host, "tree", Vec3::ZERO);
        let data = serialize_objects(host.scene(), &[a]);
        let mut cmd = Command::from(CreateObjectCommand::new(data.clone(), vec![a]));

        selection.select_one(&mut host, Some(a));
        run(&mut host, &mut selection, &mut cmd, false);
        assert!(host.scene().is_empty());
        assert!(selection.is_empty());

        // Live state drifts between runs; redo must ignore it.
        run(&mut host, &mut selection, &mut cmd, true);
        let key = selection.as_slice()[0];
        host.scene_mut()
            .get_mut(key)
            .unwrap()
            .set_property("height", Some(json!(42)));
        host.scene_mut().set_transform(key, Transform::from_position(Vec3::Y));

        run(&mut host, &mut selection, &mut cmd, false);
        run(&mut host, &mut selection, &mut cmd, true);
        let key = selection.as_slice()[0];
        assert_eq!(serialize_objects(host.scene(), &[key]), data);
        match &cmd {
            Command::CreateObject(c) => assert_eq!(c.serialized_data, data),
            other => panic!("unexpected {}", other.kind()),
        }
    }

    #[test]
    fn delete_undo_restores_serialized_content() {
        let mut host = HeadlessHost::with_builtins();
        let mut selection = Selection::new();
        let car = spawn_car(&mut host, Vec3::ZERO, &[Vec3::X, Vec3::Z]);
        host.scene_mut()
            .get_mut(car)
            .unwrap()
            .set_property("speed", Some(json!(12.5)));
        let data = serialize_objects(host.scene(), &[car]);
        host.destroy(car);

        let mut cmd = Command::from(DeleteObjectCommand::new(data.clone()));
        run(&mut host, &mut selection, &mut cmd, false);
        assert_eq!(selection.len(), 1);
        let again = selection.as_slice()[0];
        assert_eq!(serialize_objects(host.scene(), &[again]), data);
        assert_eq!(waypoints(&host, again), vec![Vec3::X, Vec3::Z]);

        run(&mut host, &mut selection, &mut cmd, true);
        assert!(host.scene().is_empty());
        assert!(selection.is_empty());
    }

    #[test]
    fn delete_redo_with_nothing_live_is_silent() {
        let mut host = HeadlessHost::with_builtins();
        let mut selection = Selection::new();
        let keep = spawn(&mut host, "bench", Vec3::ZERO);
        let gone = spawn(&mut host, "tree", Vec3::ZERO);
        let data = serialize_objects(host.scene(), &[gone]);
        host.destroy(gone);
        selection.select_one(&mut host, Some(keep));
        host.drain_notices();

        let mut cmd = Command::from(DeleteObjectCommand::new(data));
        run(&mut host, &mut selection, &mut cmd, true);
        assert_eq!(selection.as_slice(), &[keep]);
        assert!(host.notices().is_empty());
    }

    #[test]
    fn path_edit_restores_exact_arrays() {
        let mut host = HeadlessHost::with_builtins();
        let mut selection = Selection::new();
        let before_nodes = [Vec3::X, Vec3::X, Vec3::Z];
        let car = spawn_car(&mut host, Vec3::ZERO, &before_nodes);
        let before = PathState::capture(host.scene(), car).unwrap();
        let after = PathState {
            car_uuid: before.car_uuid,
            waypoints: vec![Vec3::Z.into()],
        };
        let mut cmd = Command::from(PathEditCommand::new(vec![before.clone()], vec![after.clone()]));

        run(&mut host, &mut selection, &mut cmd, true);
        assert_eq!(PathState::capture(host.scene(), car), Some(after));
        run(&mut host, &mut selection, &mut cmd, false);
        assert_eq!(PathState::capture(host.scene(), car), Some(before));
        assert_eq!(host.scene().path_visual(car).unwrap().handles.len(), 3);
    }

    #[test]
    fn wire_format_uses_stable_names() {
        let id = ObjectId::new();
        let cmd = Command::from(PathEditCommand::new(
            vec![PathState { car_uuid: id, waypoints: vec![] }],
            vec![],
        ));
        let json = cmd.to_json().unwrap();
        assert_eq!(json["type"], "Waypoint");
        assert_eq!(json["statesBefore"][0]["carUuid"], json!(id.to_string()));

        let prop = Command::from(PropertyChangeCommand::new(id, "speed", Some(10.into()), None));
        let json = prop.to_json().unwrap();
        assert_eq!(json["type"], "PropertyChange");
        assert_eq!(json["objectUuid"], json!(id.to_string()));
        assert_eq!(json["beforeValue"], json!(10));
        assert_eq!(json["afterValue"], Value::Null);
    }

    #[test]
    fn decode_round_trips_every_kind() {
        let id = ObjectId::new();
        let state = TransformState::new(id, &Transform::from_position(Vec3::new(1.5, -2.0, 0.25)));
        let entity = SerializedEntity {
            kind: "tree".into(),
            params: Some(worldedit_common::Params::new()),
            position: Vec3::X.into(),
            rotation: Vec3::ZERO.into(),
            scale: Vec3::ONE.into(),
        };
        let commands = [
            Command::from(TransformCommand::new(vec![state], vec![state]).with_description("Align X min")),
            Command::from(PropertyChangeCommand::new(id, "isLocked", Some(false.into()), Some(true.into()))),
            Command::from(CreateObjectCommand::new(vec![entity.clone()], vec![])),
            Command::from(DeleteObjectCommand::new(vec![entity])),
            Command::from(PathEditCommand::new(vec![], vec![])),
        ];
        for cmd in commands {
            let json = cmd.to_json().unwrap();
            let back = Command::from_json(json.clone()).unwrap();
            assert_eq!(back.kind(), cmd.kind());
            assert_eq!(back.description(), cmd.description());
            assert_eq!(back.to_json().unwrap(), json);
        }
    }

    #[test]
    fn decode_errors_are_classified() {
        assert!(matches!(Command::from_json(json!({})), Err(DecodeError::MissingType)));
        assert!(matches!(
            Command::from_json(json!({ "type": "Teleport" })),
            Err(DecodeError::UnknownType(kind)) if kind == "Teleport"
        ));
        assert!(matches!(
            Command::from_json(json!({ "type": "Transform", "beforeStates": 3 })),
            Err(DecodeError::Malformed { .. })
        ));
    }

    #[test]
    fn missing_description_defaults_to_empty() {
        let cmd = Command::from_json(json!({
            "type": "Waypoint",
            "statesBefore": [],
            "statesAfter": []
        }))
        .unwrap();
        assert_eq!(cmd.description(), "");
    }
}
