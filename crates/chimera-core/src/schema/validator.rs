//! The shared schema validator.
//!
//! Pure and deterministic: no I/O, no mutation of the payload. Violations
//! come out in a fixed order: required checks in declared order, then
//! declared properties in key order, then undeclared fields of closed
//! objects in key order.

use std::collections::BTreeMap;

use chimera_types::Payload;
use chimera_types::contract::{FieldKind, FieldSchema, ObjectSchema};
use chimera_types::validation::{ValidationResult, Violation, ViolationReason};
use serde_json::Value;

/// Validate `payload` against `schema`.
pub fn validate(payload: &Payload, schema: &ObjectSchema) -> ValidationResult {
    validate_excluding(payload, schema, &[])
}

/// Validate `payload` against `schema`, skipping the given top-level fields
/// entirely (neither required nor type-checked).
///
/// The dispatcher uses this for output fields it stamps itself.
pub fn validate_excluding(
    payload: &Payload,
    schema: &ObjectSchema,
    exempt: &[&str],
) -> ValidationResult {
    let mut violations = Vec::new();
    check_object(
        payload,
        ObjectRules {
            properties: Some(&schema.properties),
            required: &schema.required,
            allow_additional: schema.allows_additional(),
        },
        "",
        exempt,
        &mut violations,
    );
    ValidationResult::from_violations(violations)
}

/// The object-level rules shared by top-level schemas and nested fields.
struct ObjectRules<'a> {
    properties: Option<&'a BTreeMap<String, FieldSchema>>,
    required: &'a [String],
    allow_additional: bool,
}

impl<'a> ObjectRules<'a> {
    fn nested(field: &'a FieldSchema) -> Self {
        Self {
            properties: field.properties.as_ref(),
            required: field.required.as_deref().unwrap_or(&[]),
            allow_additional: field.additional_properties.unwrap_or(true),
        }
    }

    fn declares(&self, name: &str) -> bool {
        self.properties.is_some_and(|p| p.contains_key(name))
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}.{name}")
    }
}

fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn check_object(
    object: &Payload,
    rules: ObjectRules<'_>,
    prefix: &str,
    exempt: &[&str],
    out: &mut Vec<Violation>,
) {
    for name in rules.required {
        if exempt.contains(&name.as_str()) {
            continue;
        }
        if is_absent(object.get(name)) {
            out.push(Violation::new(
                join_path(prefix, name),
                ViolationReason::MissingRequired,
                "required field is missing",
            ));
        }
    }

    if let Some(properties) = rules.properties {
        for (name, field) in properties {
            if exempt.contains(&name.as_str()) {
                continue;
            }
            // Optional fields may be null; required ones were reported above.
            match object.get(name) {
                None | Some(Value::Null) => {}
                Some(value) => check_field(value, field, &join_path(prefix, name), out),
            }
        }
    }

    if !rules.allow_additional {
        for key in object.keys() {
            if rules.declares(key) || exempt.contains(&key.as_str()) {
                continue;
            }
            out.push(Violation::new(
                join_path(prefix, key),
                ViolationReason::UnexpectedField,
                "field is not declared and additional properties are not allowed",
            ));
        }
    }
}

fn check_field(value: &Value, field: &FieldSchema, path: &str, out: &mut Vec<Violation>) {
    if !field.kind.accepts(value) {
        out.push(Violation::new(
            path,
            ViolationReason::WrongType,
            format!("expected {}, got {}", field.kind, FieldKind::describe(value)),
        ));
        return;
    }

    let mut nested = Vec::new();
    match (field.kind, value) {
        (FieldKind::Array, Value::Array(elements)) => {
            if let Some(ref items) = field.items {
                for (i, element) in elements.iter().enumerate() {
                    check_field(element, items, &format!("{path}[{i}]"), &mut nested);
                }
            }
        }
        (FieldKind::Object, Value::Object(map)) if field.has_nested_object() => {
            check_object(map, ObjectRules::nested(field), path, &[], &mut nested);
        }
        _ => {}
    }

    if !nested.is_empty() {
        out.push(Violation::nested(path, nested));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: Value) -> ObjectSchema {
        serde_json::from_value(value).unwrap()
    }

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn write_post_input() -> ObjectSchema {
        schema(json!({
            "type": "object",
            "properties": {
                "topic": {"type": "string"},
                "platform": {"type": "string"},
                "variants": {"type": "integer"}
            },
            "required": ["topic", "platform"]
        }))
    }

    fn trend_output() -> ObjectSchema {
        schema(json!({
            "properties": {
                "spec_version": {"type": "string"},
                "contract_version": {"type": "string"},
                "topics": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "topic": {"type": "string"},
                            "confidence": {"type": "number"},
                            "sources": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "title": {"type": "string"},
                                        "url": {"type": "string"}
                                    },
                                    "required": ["title", "url"]
                                }
                            }
                        },
                        "required": ["topic", "confidence", "sources"]
                    }
                }
            },
            "required": ["spec_version", "contract_version", "topics"]
        }))
    }

    #[test]
    fn valid_payload_has_no_violations() {
        let result = validate(
            &payload(json!({"topic": "Rust", "platform": "x", "variants": 2})),
            &write_post_input(),
        );
        assert!(result.is_valid(), "{}", result.summary());
    }

    #[test]
    fn missing_required_field_is_reported() {
        let result = validate(&payload(json!({"platform": "x"})), &write_post_input());
        assert_eq!(result.violations().len(), 1);
        let v = &result.violations()[0];
        assert_eq!(v.path, "topic");
        assert_eq!(v.reason, ViolationReason::MissingRequired);
    }

    #[test]
    fn null_counts_as_missing_for_required_fields() {
        let result = validate(
            &payload(json!({"topic": null, "platform": "x"})),
            &write_post_input(),
        );
        assert_eq!(result.violations()[0].reason, ViolationReason::MissingRequired);
    }

    #[test]
    fn null_optional_field_is_accepted() {
        let result = validate(
            &payload(json!({"topic": "t", "platform": "x", "variants": null})),
            &write_post_input(),
        );
        assert!(result.is_valid());
    }

    #[test]
    fn wrong_type_is_reported() {
        let result = validate(
            &payload(json!({"topic": 42, "platform": "x", "variants": 1.5})),
            &write_post_input(),
        );
        let reasons: Vec<_> = result
            .violations()
            .iter()
            .map(|v| (v.path.as_str(), v.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                ("topic", ViolationReason::WrongType),
                ("variants", ViolationReason::WrongType),
            ]
        );
        assert_eq!(result.violations()[0].message, "expected string, got number");
    }

    #[test]
    fn unknown_fields_are_allowed_by_default() {
        let result = validate(
            &payload(json!({"topic": "t", "platform": "x", "tone": "witty"})),
            &write_post_input(),
        );
        assert!(result.is_valid());
    }

    #[test]
    fn closed_schema_rejects_unknown_fields() {
        let mut closed = write_post_input();
        closed.additional_properties = Some(false);
        let result = validate(
            &payload(json!({"topic": "t", "platform": "x", "tone": "witty"})),
            &closed,
        );
        assert_eq!(result.violations().len(), 1);
        assert_eq!(result.violations()[0].path, "tone");
        assert_eq!(result.violations()[0].reason, ViolationReason::UnexpectedField);
    }

    #[test]
    fn nested_array_violations_carry_full_paths() {
        let output = payload(json!({
            "spec_version": "1.0.0",
            "contract_version": "1.0.0",
            "topics": [
                {"topic": "ok", "confidence": 0.9, "sources": []},
                {"topic": "bad", "confidence": "high", "sources": [{"title": "t"}]}
            ]
        }));
        let result = validate(&output, &trend_output());
        assert_eq!(result.violations().len(), 1);

        let top = &result.violations()[0];
        assert_eq!(top.path, "topics");
        assert_eq!(top.reason, ViolationReason::NestedViolation);

        let element = &top.causes[0];
        assert_eq!(element.path, "topics[1]");
        assert_eq!(element.reason, ViolationReason::NestedViolation);

        let leaves: Vec<_> = element
            .causes
            .iter()
            .map(|v| (v.path.as_str(), v.reason))
            .collect();
        assert_eq!(
            leaves,
            vec![
                ("topics[1].confidence", ViolationReason::WrongType),
                ("topics[1].sources", ViolationReason::NestedViolation),
            ]
        );
        assert_eq!(element.causes[1].causes[0].path, "topics[1].sources[0]");
        assert_eq!(
            element.causes[1].causes[0].causes[0].path,
            "topics[1].sources[0].url"
        );
    }

    #[test]
    fn array_element_type_is_checked() {
        let schema = schema(json!({
            "properties": {"platforms": {"type": "array", "items": {"type": "string"}}},
            "required": ["platforms"]
        }));
        let result = validate(&payload(json!({"platforms": ["web", 3]})), &schema);
        let top = &result.violations()[0];
        assert_eq!(top.reason, ViolationReason::NestedViolation);
        assert_eq!(top.causes[0].path, "platforms[1]");
        assert_eq!(top.causes[0].reason, ViolationReason::WrongType);
    }

    #[test]
    fn exempt_fields_are_skipped() {
        let output = payload(json!({"topics": []}));
        assert!(!validate(&output, &trend_output()).is_valid());
        assert!(
            validate_excluding(&output, &trend_output(), &["spec_version", "contract_version"])
                .is_valid()
        );
    }

    #[test]
    fn validation_is_deterministic() {
        let input = payload(json!({"topic": 1, "variants": "two"}));
        let a = validate(&input, &write_post_input());
        let b = validate(&input, &write_post_input());
        assert_eq!(a, b);
        assert_eq!(a.violations()[0].path, "platform");
    }
}
