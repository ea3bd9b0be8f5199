//! Canonical records handed to the UI layer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Hospital,
    Resource,
    Encouragement,
    SelfExamStep,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Hospital,
        RecordKind::Resource,
        RecordKind::Encouragement,
        RecordKind::SelfExamStep,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Hospital => "hospital",
            RecordKind::Resource => "resource",
            RecordKind::Encouragement => "encouragement",
            RecordKind::SelfExamStep => "self_exam_step",
        }
    }

    /// Wrapper keys a backend may nest the list under, tried in order
    pub fn entity_keys(self) -> &'static [&'static str] {
        match self {
            RecordKind::Hospital => &["hospitals"],
            RecordKind::Resource => &["resources", "articles"],
            RecordKind::Encouragement => &["encouragements", "messages"],
            RecordKind::SelfExamStep => &["steps"],
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hospital" | "hospitals" => Ok(RecordKind::Hospital),
            "resource" | "resources" => Ok(RecordKind::Resource),
            "encouragement" => Ok(RecordKind::Encouragement),
            "self_exam_step" | "self_exam" | "steps" => Ok(RecordKind::SelfExamStep),
            other => Err(format!("unknown record kind '{other}'")),
        }
    }
}

/// A fully-defaulted record: every required field of its kind is present.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(skip)]
    kind: Option<RecordKind>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl CanonicalRecord {
    pub(crate) fn new(kind: RecordKind, fields: Map<String, Value>) -> Self {
        Self {
            kind: Some(kind),
            fields,
        }
    }

    /// Build from a JSON object literal. Non-objects give an empty record.
    pub(crate) fn from_json(kind: RecordKind, value: Value) -> Self {
        match value {
            Value::Object(fields) => Self::new(kind, fields),
            _ => Self::new(kind, Map::new()),
        }
    }

    pub fn kind(&self) -> Option<RecordKind> {
        self.kind
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(Value::as_f64)
    }

    pub fn integer(&self, field: &str) -> Option<i64> {
        self.fields.get(field).and_then(Value::as_i64)
    }

    pub fn flag(&self, field: &str) -> Option<bool> {
        self.fields.get(field).and_then(Value::as_bool)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub(crate) fn insert(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
    }

    pub fn into_json(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Normalised chat answer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Set when the reply did not come from the live backend
    #[serde(default)]
    pub is_offline: bool,
}

/// Feature/settings descriptor shown on the mobile features screen
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MobileFeatures {
    #[serde(default)]
    pub exclusive: Vec<Value>,
    #[serde(default)]
    pub upcoming: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_flat() {
        let r = CanonicalRecord::from_json(RecordKind::Resource, json!({"id": 1, "title": "Guide"}));
        assert_eq!(serde_json::to_value(&r).unwrap(), json!({"id": 1, "title": "Guide"}));
        assert_eq!(r.text("title"), Some("Guide"));
        assert_eq!(r.integer("id"), Some(1));
        assert_eq!(r.kind(), Some(RecordKind::Resource));
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in RecordKind::ALL {
            assert_eq!(kind.as_str().parse::<RecordKind>().unwrap(), kind);
        }
    }
}
