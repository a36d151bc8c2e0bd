//! Skill contract domain types.
//!
//! A [`SkillContract`] is the versioned, declarative description of one
//! capability: its id, the shape of its input and output payloads, and the
//! failure modes its handler may report. Contracts are loaded from JSON
//! documents and never mutated afterwards.
//!
//! Every struct here keeps unrecognized keys in an `extensions` map so that a
//! document re-serialized from a loaded contract carries exactly the fields
//! it was loaded with.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output field stamped by the runtime with the contract's `spec_version`.
pub const SPEC_VERSION_FIELD: &str = "spec_version";

/// Output field stamped by the runtime with the contract's `version`.
pub const CONTRACT_VERSION_FIELD: &str = "contract_version";

/// Output fields owned by the dispatcher rather than by skill handlers.
pub const STAMPED_OUTPUT_FIELDS: [&str; 2] = [SPEC_VERSION_FIELD, CONTRACT_VERSION_FIELD];

// ---------------------------------------------------------------------------
// Field kinds
// ---------------------------------------------------------------------------

/// The primitive kind a schema field declares through its `type` key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Number,
    /// A number without a fractional part.
    Integer,
    Boolean,
    Array,
    Object,
}

impl FieldKind {
    /// Whether `value` is an instance of this kind.
    ///
    /// `null` never matches; callers decide separately whether a null value
    /// counts as absent.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => match value {
                Value::Number(n) => {
                    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
                }
                _ => false,
            },
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    /// Name of the JSON kind of an arbitrary value, for diagnostics.
    pub fn describe(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Integer => write!(f, "integer"),
            Self::Boolean => write!(f, "boolean"),
            Self::Array => write!(f, "array"),
            Self::Object => write!(f, "object"),
        }
    }
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "integer" => Ok(Self::Integer),
            "boolean" => Ok(Self::Boolean),
            "array" => Ok(Self::Array),
            "object" => Ok(Self::Object),
            other => Err(format!("unknown field type: '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Schema documents
// ---------------------------------------------------------------------------

/// Descriptor for a single declared field.
///
/// Arrays may declare an element descriptor in `items`; objects may declare
/// nested `properties`, `required` and `additionalProperties` inline, the
/// same way a top-level [`ObjectSchema`] does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<FieldSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, FieldSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(
        default,
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<bool>,
    /// Unrecognized keys (`description`, `minimum`, ...), kept for round trips.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl FieldSchema {
    /// A bare descriptor of the given kind.
    pub fn of(kind: FieldKind) -> Self {
        Self {
            kind,
            items: None,
            properties: None,
            required: None,
            additional_properties: None,
            extensions: BTreeMap::new(),
        }
    }

    /// An array descriptor whose elements must match `items`.
    pub fn array_of(items: FieldSchema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of(FieldKind::Array)
        }
    }

    /// An object descriptor with nested properties and required fields.
    pub fn object_with(properties: BTreeMap<String, FieldSchema>, required: Vec<String>) -> Self {
        Self {
            properties: Some(properties),
            required: Some(required),
            ..Self::of(FieldKind::Object)
        }
    }

    /// Whether this descriptor declares any nested object structure.
    pub fn has_nested_object(&self) -> bool {
        self.properties.is_some() || self.required.is_some() || self.additional_properties.is_some()
    }
}

/// A schema document for a whole payload (a skill's input or output).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSchema {
    #[serde(default)]
    pub properties: BTreeMap<String, FieldSchema>,
    #[serde(default)]
    pub required: Vec<String>,
    /// `false` closes the object to undeclared fields. Open by default.
    #[serde(
        default,
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<bool>,
    /// Unrecognized keys (`type`, `$schema`, ...), kept for round trips.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl ObjectSchema {
    pub fn new(properties: BTreeMap<String, FieldSchema>, required: Vec<String>) -> Self {
        Self {
            properties,
            required,
            additional_properties: None,
            extensions: BTreeMap::new(),
        }
    }

    /// Whether fields not listed in `properties` are accepted.
    pub fn allows_additional(&self) -> bool {
        self.additional_properties.unwrap_or(true)
    }

    pub fn requires(&self, field: &str) -> bool {
        self.required.iter().any(|r| r == field)
    }
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// A declared failure a skill handler may report, and whether callers may
/// retry after seeing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureMode {
    pub code: String,
    pub description: String,
    pub retryable: bool,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// A loaded, validated skill contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillContract {
    pub id: String,
    pub name: String,
    pub description: String,
    pub input_schema: ObjectSchema,
    pub output_schema: ObjectSchema,
    pub failure_modes: Vec<FailureMode>,
    /// The contract's own semantic version, stamped as `contract_version`.
    pub version: String,
    /// Protocol-level version, stamped as `spec_version`.
    pub spec_version: String,
    /// RFC 3339 creation timestamp, kept verbatim.
    pub created_at: String,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl SkillContract {
    /// Look up a declared failure mode by its code.
    pub fn failure_mode(&self, code: &str) -> Option<&FailureMode> {
        self.failure_modes.iter().find(|fm| fm.code == code)
    }

    /// The parsed creation timestamp, if `created_at` is valid RFC 3339.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_kind_accepts() {
        assert!(FieldKind::String.accepts(&json!("x")));
        assert!(!FieldKind::String.accepts(&json!(1)));
        assert!(FieldKind::Number.accepts(&json!(1.5)));
        assert!(FieldKind::Integer.accepts(&json!(3)));
        assert!(FieldKind::Integer.accepts(&json!(3.0)));
        assert!(!FieldKind::Integer.accepts(&json!(3.5)));
        assert!(FieldKind::Boolean.accepts(&json!(false)));
        assert!(FieldKind::Array.accepts(&json!([])));
        assert!(FieldKind::Object.accepts(&json!({})));
        assert!(!FieldKind::Object.accepts(&Value::Null));
    }

    #[test]
    fn test_field_kind_roundtrip() {
        for kind in [
            FieldKind::String,
            FieldKind::Number,
            FieldKind::Integer,
            FieldKind::Boolean,
            FieldKind::Array,
            FieldKind::Object,
        ] {
            let parsed: FieldKind = kind.to_string().parse().unwrap();
            assert_eq!(kind, parsed);
        }
        assert!("tuple".parse::<FieldKind>().is_err());
    }

    #[test]
    fn test_field_schema_keeps_unknown_keys() {
        let raw = json!({
            "type": "array",
            "description": "tags",
            "items": {"type": "string", "minLength": 1}
        });
        let field: FieldSchema = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(field.kind, FieldKind::Array);
        assert_eq!(field.items.as_ref().unwrap().kind, FieldKind::String);
        assert_eq!(serde_json::to_value(&field).unwrap(), raw);
    }

    #[test]
    fn test_object_schema_defaults_open() {
        let schema: ObjectSchema =
            serde_json::from_value(json!({"properties": {}, "required": []})).unwrap();
        assert!(schema.allows_additional());

        let closed: ObjectSchema = serde_json::from_value(
            json!({"properties": {}, "required": [], "additionalProperties": false}),
        )
        .unwrap();
        assert!(!closed.allows_additional());
    }

    #[test]
    fn test_contract_failure_mode_lookup() {
        let contract: SkillContract = serde_json::from_value(json!({
            "id": "skill_demo_v1",
            "name": "Demo",
            "description": "demo",
            "input_schema": {"properties": {}, "required": []},
            "output_schema": {"properties": {}, "required": ["spec_version", "contract_version"]},
            "failure_modes": [{"code": "RATE_LIMITED", "description": "slow down", "retryable": true}],
            "version": "1.0.0",
            "spec_version": "1.0.0",
            "created_at": "2026-01-15T00:00:00Z",
            "owner": "growth-team"
        }))
        .unwrap();

        assert!(contract.failure_mode("RATE_LIMITED").unwrap().retryable);
        assert!(contract.failure_mode("NOPE").is_none());
        assert!(contract.created_at_utc().is_some());
        assert_eq!(contract.extensions.get("owner"), Some(&json!("growth-team")));
    }
}
