//! Response normalisation.
//!
//! Backends answer in several shapes (`[...]`, `{"hospitals": [...]}`,
//! `{"data": [...]}`) and with inconsistent field names. This module picks
//! the record list out of a payload with an ordered list of shape matchers,
//! then rebuilds every record from a per-kind table of field rules. Each rule
//! lists alternate source names in precedence order and a default used when
//! none of them carries a usable value.
//!
//! Records are never dropped: a malformed entry comes out fully defaulted.
//! An empty list or an unrecognised shape yields an empty result, which the
//! caller treats as the cue to use fallback data.

use crate::constants::messages;
use crate::record::{CanonicalRecord, ChatReply, MobileFeatures, RecordKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};
use std::sync::Mutex;

/// Where a record list was found inside a payload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadShape {
    /// The payload itself is the list
    BareArray,
    /// `{<entity>: [...]}`
    EntityKey(&'static str),
    /// `{data: [...]}`
    DataKey,
}

impl PayloadShape {
    fn extract<'a>(&self, payload: &'a Value) -> Option<&'a Vec<Value>> {
        match self {
            PayloadShape::BareArray => payload.as_array(),
            PayloadShape::EntityKey(key) => payload.get(*key).and_then(Value::as_array),
            PayloadShape::DataKey => payload.get("data").and_then(Value::as_array),
        }
    }
}

/// Matchers for `kind`, in the order they are tried
pub fn shape_matchers(kind: RecordKind) -> Vec<PayloadShape> {
    let mut shapes = vec![PayloadShape::BareArray];
    shapes.extend(kind.entity_keys().iter().copied().map(PayloadShape::EntityKey));
    shapes.push(PayloadShape::DataKey);
    shapes
}

/// First matcher that finds a list in `payload`
pub fn detect_shape(payload: &Value, kind: RecordKind) -> Option<PayloadShape> {
    shape_matchers(kind)
        .into_iter()
        .find(|shape| shape.extract(payload).is_some())
}

fn extract_list(payload: &Value, kind: RecordKind) -> Option<&Vec<Value>> {
    detect_shape(payload, kind).and_then(|shape| shape.extract(payload))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Float,
    Bool,
    TextList,
}

/// Value used when no source field is usable
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldDefault {
    Text(&'static str),
    /// 1-based position of the record in its list
    Position,
    /// `"{prefix} {position}"`
    Numbered(&'static str),
    Integer(i64),
    TextList(&'static [&'static str]),
    /// Uniform in `[min, max]`, rounded to `decimals` places
    UniformFloat { min: f64, max: f64, decimals: i32 },
    /// Uniform in `[min, max]`
    UniformInt { min: i64, max: i64 },
    /// `true` with probability `p`
    Chance(f64),
    Choice(&'static [&'static str]),
}

impl FieldDefault {
    pub fn is_randomized(&self) -> bool {
        matches!(
            self,
            FieldDefault::UniformFloat { .. }
                | FieldDefault::UniformInt { .. }
                | FieldDefault::Chance(_)
                | FieldDefault::Choice(_)
        )
    }

    fn produce<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> Value {
        let position = index as i64 + 1;
        match *self {
            FieldDefault::Text(s) => Value::from(s),
            FieldDefault::Position => Value::from(position),
            FieldDefault::Numbered(prefix) => Value::from(format!("{prefix} {position}")),
            FieldDefault::Integer(n) => Value::from(n),
            FieldDefault::TextList(items) => {
                Value::Array(items.iter().map(|s| Value::from(*s)).collect())
            }
            FieldDefault::UniformFloat { min, max, decimals } => {
                let scale = 10f64.powi(decimals);
                let raw: f64 = rng.gen_range(min..=max);
                let rounded = ((raw * scale).round() / scale).clamp(min, max);
                Value::from(rounded)
            }
            FieldDefault::UniformInt { min, max } => Value::from(rng.gen_range(min..=max)),
            FieldDefault::Chance(p) => Value::from(rng.gen_bool(p)),
            FieldDefault::Choice(items) => {
                if items.is_empty() {
                    Value::from("")
                } else {
                    Value::from(items[rng.gen_range(0..items.len())])
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldRule {
    pub field: &'static str,
    pub ty: FieldType,
    pub sources: &'static [&'static str],
    pub default: FieldDefault,
}

const fn rule(
    field: &'static str,
    ty: FieldType,
    sources: &'static [&'static str],
    default: FieldDefault,
) -> FieldRule {
    FieldRule {
        field,
        ty,
        sources,
        default,
    }
}

const SPECIALTIES: &[&str] = &[
    "Breast Cancer Center",
    "Women Health Specialist",
    "Comprehensive Care",
    "Oncology Center",
    "Mammography Expert",
    "General Healthcare",
    "Specialized Women's Services",
];

pub const RATING_RANGE: (f64, f64) = (3.0, 5.0);
pub const WAIT_TIME_RANGE: (i64, i64) = (10, 40);

use FieldDefault as D;
use FieldType as T;

const HOSPITAL_RULES: &[FieldRule] = &[
    rule("id", T::Integer, &["id"], D::Position),
    rule("name", T::Text, &["name", "Facility_N", "Facility_Name"], D::Numbered("Hospital")),
    rule("address", T::Text, &["address", "Location", "Address"], D::Text("Address not available")),
    rule("phone", T::Text, &["phone", "Phone"], D::Text("+254 XXX XXX XXX")),
    rule("services", T::Text, &["services", "Services"], D::Text("General healthcare services")),
    rule("hours", T::Text, &["hours", "Hours"], D::Text("Mon-Fri: 8AM-5PM")),
    rule("specialty", T::Text, &["specialty", "Specialty"], D::Choice(SPECIALTIES)),
    rule("insurance", T::TextList, &["insurance"], D::TextList(&["NHIF", "Private Pay"])),
    rule(
        "rating",
        T::Float,
        &["rating"],
        D::UniformFloat { min: RATING_RANGE.0, max: RATING_RANGE.1, decimals: 1 },
    ),
    rule(
        "waitTime",
        T::Integer,
        &["waitTime", "wait_time"],
        D::UniformInt { min: WAIT_TIME_RANGE.0, max: WAIT_TIME_RANGE.1 },
    ),
    rule("isOpen", T::Bool, &["isOpen", "is_open"], D::Chance(0.8)),
    rule("type", T::Text, &["type", "Type"], D::Text("Medical Clinic")),
    rule("county", T::Text, &["county", "County"], D::Text("Nairobi")),
    rule(
        "latitude",
        T::Float,
        &["latitude", "lat", "Latitude"],
        D::UniformFloat { min: -5.0, max: -1.0, decimals: 4 },
    ),
    rule(
        "longitude",
        T::Float,
        &["longitude", "lon", "Longitude"],
        D::UniformFloat { min: 34.0, max: 42.0, decimals: 4 },
    ),
];

const RESOURCE_RULES: &[FieldRule] = &[
    rule("id", T::Integer, &["id"], D::Position),
    rule("title", T::Text, &["title", "name"], D::Numbered("Resource")),
    rule("description", T::Text, &["description", "summary"], D::Text("No description available")),
    rule("category", T::Text, &["category"], D::Text("general")),
    rule("type", T::Text, &["type"], D::Text("article")),
    rule("duration", T::Text, &["duration", "reading_time"], D::Text("5 min read")),
    rule("level", T::Text, &["level"], D::Text("Beginner")),
    rule("url", T::Text, &["url", "link"], D::Text("")),
    rule("icon", T::Text, &["icon"], D::Text("📖")),
];

const ENCOURAGEMENT_RULES: &[FieldRule] = &[
    rule("id", T::Integer, &["id"], D::Position),
    rule("message", T::Text, &["message", "content"], D::Text("You are not alone 💖")),
    rule("type", T::Text, &["type"], D::Text(messages::DEFAULT_ENCOURAGEMENT_TYPE)),
    rule("author", T::Text, &["author"], D::Text("Anonymous Friend")),
    rule("timestamp", T::Text, &["timestamp"], D::Text("")),
    rule("likes", T::Integer, &["likes"], D::Integer(0)),
];

const SELF_EXAM_RULES: &[FieldRule] = &[
    rule("id", T::Integer, &["id", "step"], D::Position),
    rule("title", T::Text, &["title"], D::Numbered("Step")),
    rule("description", T::Text, &["description", "instructions"], D::Text("")),
    rule("icon", T::Text, &["icon"], D::Text("🖐️")),
    rule("tip", T::Text, &["tip"], D::Text("")),
];

/// Field rules for a record kind, in output order
pub fn rules(kind: RecordKind) -> &'static [FieldRule] {
    match kind {
        RecordKind::Hospital => HOSPITAL_RULES,
        RecordKind::Resource => RESOURCE_RULES,
        RecordKind::Encouragement => ENCOURAGEMENT_RULES,
        RecordKind::SelfExamStep => SELF_EXAM_RULES,
    }
}

/// Required field names for a record kind
pub fn required_fields(kind: RecordKind) -> impl Iterator<Item = &'static str> {
    rules(kind).iter().map(|r| r.field)
}

/// Coerce a raw value to `ty`; `None` when absent, empty or unusable
fn coerce(value: &Value, ty: FieldType) -> Option<Value> {
    match ty {
        FieldType::Text => match value {
            Value::String(s) if !s.trim().is_empty() => Some(Value::from(s.as_str())),
            Value::Number(n) => Some(Value::from(n.to_string())),
            _ => None,
        },
        FieldType::Integer => match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
                .map(Value::from),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.round() as i64))
                    .map(Value::from)
            }
            _ => None,
        },
        FieldType::Float => match value {
            Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).map(Value::from),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::from),
            _ => None,
        },
        FieldType::Bool => match value {
            Value::Bool(b) => Some(Value::from(*b)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "open" => Some(Value::from(true)),
                "false" | "no" | "closed" => Some(Value::from(false)),
                _ => None,
            },
            _ => None,
        },
        FieldType::TextList => {
            let items: Vec<Value> = match value {
                Value::Array(arr) => arr
                    .iter()
                    .filter_map(|v| coerce(v, FieldType::Text))
                    .collect(),
                Value::String(s) => s
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(Value::from)
                    .collect(),
                _ => Vec::new(),
            };
            (!items.is_empty()).then_some(Value::Array(items))
        }
    }
}

/// Rebuild one raw record. Non-object input yields an all-default record.
pub fn shape_record<R: Rng + ?Sized>(
    raw: &Value,
    index: usize,
    kind: RecordKind,
    rng: &mut R,
) -> CanonicalRecord {
    let empty = Map::new();
    let source = raw.as_object().unwrap_or(&empty);
    let mut fields = Map::new();

    for rule in rules(kind) {
        let picked = rule
            .sources
            .iter()
            .filter_map(|name| source.get(*name))
            .find_map(|v| coerce(v, rule.ty));
        let value = picked.unwrap_or_else(|| rule.default.produce(index, rng));
        fields.insert(rule.field.to_string(), value);
    }

    CanonicalRecord::new(kind, fields)
}

/// Normalise `payload` with an explicit random source
pub fn normalize_with<R: Rng + ?Sized>(
    payload: &Value,
    kind: RecordKind,
    rng: &mut R,
) -> Vec<CanonicalRecord> {
    match extract_list(payload, kind) {
        Some(list) => list
            .iter()
            .enumerate()
            .map(|(i, raw)| shape_record(raw, i, kind, rng))
            .collect(),
        None => {
            log::warn!("[normalize] unrecognised {kind} payload shape");
            Vec::new()
        }
    }
}

/// Chat answer: `response`, else `message`, else the fixed fallback text
pub fn normalize_chat(payload: &Value, fallback: &str) -> ChatReply {
    let response = ["response", "message"]
        .iter()
        .filter_map(|k| payload.get(*k))
        .find_map(|v| coerce(v, FieldType::Text))
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| fallback.to_string());

    let suggestions = payload
        .get("suggestions")
        .and_then(|v| coerce(v, FieldType::TextList))
        .and_then(|v| {
            v.as_array()
                .map(|a| a.iter().filter_map(|s| s.as_str().map(str::to_string)).collect())
        })
        .unwrap_or_default();

    let is_offline = payload
        .get("is_offline")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    ChatReply {
        response,
        suggestions,
        is_offline,
    }
}

/// Feature descriptor from `{exclusive, upcoming}` or `{data: {...}}`
pub fn normalize_features(payload: &Value) -> Option<MobileFeatures> {
    let candidates = [Some(payload), payload.get("data")];
    candidates.into_iter().flatten().find_map(|obj| {
        let exclusive = obj.get("exclusive").and_then(Value::as_array);
        let upcoming = obj.get("upcoming").and_then(Value::as_array);
        if exclusive.is_none() && upcoming.is_none() {
            return None;
        }
        Some(MobileFeatures {
            exclusive: exclusive.cloned().unwrap_or_default(),
            upcoming: upcoming.cloned().unwrap_or_default(),
        })
    })
}

/// Normaliser owning its random source.
///
/// Seed it for reproducible defaults in tests.
pub struct Normalizer {
    rng: Mutex<StdRng>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn normalize(&self, payload: &Value, kind: RecordKind) -> Vec<CanonicalRecord> {
        self.with_rng(|rng| normalize_with(payload, kind, rng))
    }

    /// Rebuild a single record, e.g. the echo of a POST
    pub fn normalize_one(&self, raw: &Value, kind: RecordKind) -> CanonicalRecord {
        self.with_rng(|rng| shape_record(raw, 0, kind, rng))
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        match self.rng.lock() {
            Ok(mut rng) => f(&mut *rng),
            // A poisoned lock only means another caller panicked mid-draw.
            Err(poisoned) => f(&mut *poisoned.into_inner()),
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn shape_precedence_is_array_then_entity_then_data() {
        assert_eq!(
            shape_matchers(RecordKind::Hospital),
            vec![
                PayloadShape::BareArray,
                PayloadShape::EntityKey("hospitals"),
                PayloadShape::DataKey
            ]
        );

        let both = json!({"hospitals": [{"name": "A"}], "data": [{"name": "B"}, {"name": "C"}]});
        assert_eq!(
            detect_shape(&both, RecordKind::Hospital),
            Some(PayloadShape::EntityKey("hospitals"))
        );
        let out = normalize_with(&both, RecordKind::Hospital, &mut rng());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text("name"), Some("A"));

        assert_eq!(
            detect_shape(&json!({"data": []}), RecordKind::Hospital),
            Some(PayloadShape::DataKey)
        );
        assert_eq!(detect_shape(&json!([]), RecordKind::Hospital), Some(PayloadShape::BareArray));
        assert_eq!(detect_shape(&json!({"rows": []}), RecordKind::Hospital), None);
    }

    #[test]
    fn resource_accepts_articles_key() {
        let payload = json!({"articles": [{"title": "Mammograms"}], "pdfs": []});
        assert_eq!(
            detect_shape(&payload, RecordKind::Resource),
            Some(PayloadShape::EntityKey("articles"))
        );
    }

    #[test]
    fn hospital_name_precedence() {
        let mut r = rng();
        let rec = |v: Value, r: &mut StdRng| shape_record(&v, 0, RecordKind::Hospital, r);

        let all = json!({"name": "N", "Facility_N": "F", "Facility_Name": "FN"});
        assert_eq!(rec(all, &mut r).text("name"), Some("N"));

        let no_name = json!({"Facility_N": "F", "Facility_Name": "FN"});
        assert_eq!(rec(no_name, &mut r).text("name"), Some("F"));

        let last = json!({"name": "", "Facility_Name": "FN"});
        assert_eq!(rec(last, &mut r).text("name"), Some("FN"));

        let none = shape_record(&json!({}), 4, RecordKind::Hospital, &mut r);
        assert_eq!(none.text("name"), Some("Hospital 5"));
        assert_eq!(none.integer("id"), Some(5));
    }

    #[test]
    fn malformed_records_are_defaulted_not_dropped() {
        let payload = json!([null, 3, "text", {"name": 42}, {"rating": "4.4", "isOpen": "false"}]);
        let out = normalize_with(&payload, RecordKind::Hospital, &mut rng());
        assert_eq!(out.len(), 5);
        for record in &out {
            for field in required_fields(RecordKind::Hospital) {
                let v = record.get(field).unwrap_or(&Value::Null);
                assert!(!v.is_null(), "missing {field}");
            }
        }
        assert_eq!(out[3].text("name"), Some("42"));
        assert_eq!(out[4].number("rating"), Some(4.4));
        assert_eq!(out[4].flag("isOpen"), Some(false));
    }

    #[test]
    fn every_shape_keeps_length_and_fills_required_fields() {
        let partial = json!([
            {},
            {"id": 9},
            {"name": "KNH", "title": "Checkup", "message": "Keep going"},
            {"unrelated": true},
        ]);
        let len = partial.as_array().map(Vec::len).unwrap_or(0);

        for kind in RecordKind::ALL {
            let shapes = [
                partial.clone(),
                json!({ kind.entity_keys()[0]: partial.clone() }),
                json!({"data": partial.clone()}),
            ];
            for payload in &shapes {
                let out = normalize_with(payload, kind, &mut rng());
                assert_eq!(out.len(), len, "{kind}: {payload}");
                for record in &out {
                    for field in required_fields(kind) {
                        let v = record.get(field).unwrap_or(&Value::Null);
                        assert!(!v.is_null(), "{kind} missing {field} for {payload}");
                    }
                }
            }
        }
    }

    #[test]
    fn provided_values_are_kept() {
        let payload = json!([{
            "id": 9, "name": "Aga Khan", "rating": 4.9, "waitTime": 20, "isOpen": false,
            "insurance": ["AAR"], "lat": -1.25, "Longitude": 36.8
        }]);
        let out = normalize_with(&payload, RecordKind::Hospital, &mut rng());
        let h = &out[0];
        assert_eq!(h.integer("id"), Some(9));
        assert_eq!(h.number("rating"), Some(4.9));
        assert_eq!(h.integer("waitTime"), Some(20));
        assert_eq!(h.flag("isOpen"), Some(false));
        assert_eq!(h.get("insurance"), Some(&json!(["AAR"])));
        assert_eq!(h.number("latitude"), Some(-1.25));
        assert_eq!(h.number("longitude"), Some(36.8));
        assert_eq!(h.text("county"), Some("Nairobi"));
    }

    #[test]
    fn randomized_defaults_stay_in_bounds() {
        let mut r = rng();
        for i in 0..1000 {
            let h = shape_record(&json!({}), i, RecordKind::Hospital, &mut r);
            let rating = h.number("rating").unwrap();
            assert!((RATING_RANGE.0..=RATING_RANGE.1).contains(&rating), "rating {rating}");
            let wait = h.integer("waitTime").unwrap();
            assert!((WAIT_TIME_RANGE.0..=WAIT_TIME_RANGE.1).contains(&wait), "wait {wait}");
            let lat = h.number("latitude").unwrap();
            assert!((-5.0..=-1.0).contains(&lat));
            let lng = h.number("longitude").unwrap();
            assert!((34.0..=42.0).contains(&lng));
            assert!(SPECIALTIES.contains(&h.text("specialty").unwrap()));
        }
    }

    #[test]
    fn seeded_normalizers_agree() {
        let payload = json!([{}, {}, {}]);
        let a = Normalizer::seeded(42).normalize(&payload, RecordKind::Hospital);
        let b = Normalizer::seeded(42).normalize(&payload, RecordKind::Hospital);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_or_unknown_payload_is_empty() {
        let mut r = rng();
        assert!(normalize_with(&json!([]), RecordKind::Resource, &mut r).is_empty());
        assert!(normalize_with(&json!({"error": "You are offline"}), RecordKind::Resource, &mut r).is_empty());
        assert!(normalize_with(&Value::Null, RecordKind::Resource, &mut r).is_empty());
    }

    #[test]
    fn self_exam_keeps_order() {
        let payload = json!({"steps": [{"step": 2, "title": "Raise Arms"}, {"title": "Visual"}]});
        let out = normalize_with(&payload, RecordKind::SelfExamStep, &mut rng());
        assert_eq!(out[0].integer("id"), Some(2));
        assert_eq!(out[0].text("title"), Some("Raise Arms"));
        assert_eq!(out[1].integer("id"), Some(2));
        assert_eq!(out[1].text("icon"), Some("🖐️"));
    }

    #[test]
    fn chat_precedence() {
        let r = normalize_chat(&json!({"message": "Hi!"}), "fallback");
        assert_eq!(r.response, "Hi!");
        assert!(!r.is_offline);

        let r = normalize_chat(&json!({"response": "R", "message": "M", "suggestions": ["a"]}), "fallback");
        assert_eq!(r.response, "R");
        assert_eq!(r.suggestions, vec!["a".to_string()]);

        let r = normalize_chat(&json!({"answer": "?"}), "fallback");
        assert_eq!(r.response, "fallback");
    }

    #[test]
    fn features_accept_bare_and_data() {
        let bare = json!({"exclusive": [{"id": 1}], "upcoming": []});
        assert_eq!(normalize_features(&bare).unwrap().exclusive.len(), 1);

        let wrapped = json!({"data": {"upcoming": [{"id": 7}]}});
        let f = normalize_features(&wrapped).unwrap();
        assert!(f.exclusive.is_empty());
        assert_eq!(f.upcoming.len(), 1);

        assert!(normalize_features(&json!({"hospitals": []})).is_none());
    }
}
