//! Schema validation result types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a payload field failed validation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViolationReason {
    /// A required field is absent or null.
    MissingRequired,
    /// A field's value is not of the declared kind.
    WrongType,
    /// An array element or nested object failed its own schema.
    NestedViolation,
    /// A field is present that a closed schema does not declare.
    UnexpectedField,
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired => write!(f, "missing_required"),
            Self::WrongType => write!(f, "wrong_type"),
            Self::NestedViolation => write!(f, "nested_violation"),
            Self::UnexpectedField => write!(f, "unexpected_field"),
        }
    }
}

/// A single validation failure at a field path such as `topics[0].sources`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub path: String,
    pub reason: ViolationReason,
    pub message: String,
    /// Inner violations, only for [`ViolationReason::NestedViolation`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<Violation>,
}

impl Violation {
    pub fn new(path: impl Into<String>, reason: ViolationReason, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason,
            message: message.into(),
            causes: Vec::new(),
        }
    }

    pub fn nested(path: impl Into<String>, causes: Vec<Violation>) -> Self {
        let path = path.into();
        let message = format!("{} nested violation(s) under '{path}'", causes.len());
        Self {
            path,
            reason: ViolationReason::NestedViolation,
            message,
            causes,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.path, self.message, self.reason)
    }
}

/// The outcome of validating one payload against one schema.
///
/// Empty means valid. Violations are kept in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// One-line summary, e.g. `"topic: missing (missing_required); ..."`.
    pub fn summary(&self) -> String {
        summarize(&self.violations)
    }
}

/// Join violations into a single human-readable line.
pub fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_serializes_reason_snake_case() {
        let v = Violation::new("topic", ViolationReason::MissingRequired, "required field is missing");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["reason"], "missing_required");
        assert!(json.get("causes").is_none());
    }

    #[test]
    fn test_nested_violation_carries_causes() {
        let inner = Violation::new("items[0].text", ViolationReason::WrongType, "expected string");
        let outer = Violation::nested("items", vec![inner.clone()]);
        assert_eq!(outer.reason, ViolationReason::NestedViolation);
        assert_eq!(outer.causes, vec![inner]);
        assert!(outer.message.contains("1 nested"));
    }

    #[test]
    fn test_validation_result_summary() {
        let result = ValidationResult::from_violations(vec![
            Violation::new("a", ViolationReason::MissingRequired, "missing"),
            Violation::new("b", ViolationReason::WrongType, "expected number, got string"),
        ]);
        assert!(!result.is_valid());
        assert_eq!(
            result.summary(),
            "a: missing (missing_required); b: expected number, got string (wrong_type)"
        );
        assert!(ValidationResult::default().is_valid());
    }
}
