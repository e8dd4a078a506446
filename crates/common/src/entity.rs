use crate::types::{ObjectId, Vec3Data};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque per-object parameter bag.
pub type Params = serde_json::Map<String, Value>;

/// Parameter key that carries an object's stable id inside serialized data.
pub const UUID_PARAM: &str = "uuid";

/// Engine-agnostic description of an object, enough to recreate it through
/// the object factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedEntity {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
    #[serde(default)]
    pub position: Vec3Data,
    #[serde(default)]
    pub rotation: Vec3Data,
    #[serde(default = "unit_scale")]
    pub scale: Vec3Data,
}

fn unit_scale() -> Vec3Data {
    Vec3Data::new(1.0, 1.0, 1.0)
}

impl SerializedEntity {
    /// The stable id recorded in the params, if any and if well formed.
    pub fn uuid(&self) -> Option<ObjectId> {
        self.params
            .as_ref()?
            .get(UUID_PARAM)?
            .as_str()?
            .parse()
            .ok()
    }
}

/// A scalar or boolean object property.
///
/// Numbers keep their JSON representation, so an integer stays an integer
/// through an edit and its undo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl PropertyValue {
    /// Convert a JSON value, rejecting arrays, objects and null.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// A floating-point number. `None` for NaN and infinities, which JSON
    /// cannot hold.
    pub fn from_f64(n: f64) -> Option<Self> {
        serde_json::Number::from_f64(n).map(Self::Number)
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Text(s) => Value::String(s.clone()),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for PropertyValue {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<u64> for PropertyValue {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}
