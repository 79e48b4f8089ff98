//! Core types for verification results.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FailureKind, InspectError};

/// Names of the checks in the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRule {
    ClassAnnotation,
    ClassAnnotationValue,
    MethodAnnotation,
    MethodAnnotationValue,
    ConstructorAnnotation,
    FieldAnnotation,
    ConstructorParameterAnnotation,
    MethodParameterAnnotation,
    MarkupContains,
}

impl CheckRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckRule::ClassAnnotation => "class_annotation",
            CheckRule::ClassAnnotationValue => "class_annotation_value",
            CheckRule::MethodAnnotation => "method_annotation",
            CheckRule::MethodAnnotationValue => "method_annotation_value",
            CheckRule::ConstructorAnnotation => "constructor_annotation",
            CheckRule::FieldAnnotation => "field_annotation",
            CheckRule::ConstructorParameterAnnotation => "constructor_parameter_annotation",
            CheckRule::MethodParameterAnnotation => "method_parameter_annotation",
            CheckRule::MarkupContains => "markup_contains",
        }
    }
}

impl std::fmt::Display for CheckRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a single check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub rule: CheckRule,
    pub file: String,
    pub passed: bool,
    /// What was expected and what was found.
    pub message: String,
    /// Set on failed verdicts only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl Verdict {
    pub fn pass(rule: CheckRule, file: &Path, message: impl Into<String>) -> Self {
        Self {
            rule,
            file: file.display().to_string(),
            passed: true,
            message: message.into(),
            failure: None,
        }
    }

    pub fn fail(rule: CheckRule, file: &Path, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            rule,
            file: file.display().to_string(),
            passed: false,
            message: message.into(),
            failure: Some(kind),
        }
    }

    /// Fold a lower-layer error into a failed verdict.
    pub fn from_error(rule: CheckRule, file: &Path, err: &InspectError) -> Self {
        let kind = err.kind();
        Self::fail(
            rule,
            file,
            kind,
            format!("{} in {}: {}", kind, file.display(), err),
        )
    }
}

/// Verdicts of one plan run, in plan order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationReport {
    pub verdicts: Vec<Verdict>,
}

impl VerificationReport {
    pub fn new(verdicts: Vec<Verdict>) -> Self {
        Self { verdicts }
    }

    /// True when every check passed.
    pub fn passed(&self) -> bool {
        self.verdicts.iter().all(|v| v.passed)
    }

    pub fn total(&self) -> usize {
        self.verdicts.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| !v.passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_rule_serializes_snake_case() {
        let json = serde_json::to_string(&CheckRule::ConstructorParameterAnnotation).unwrap();
        assert_eq!(json, "\"constructor_parameter_annotation\"");
        assert_eq!(CheckRule::MarkupContains.to_string(), "markup_contains");
    }

    #[test]
    fn test_from_error_names_kind_and_path() {
        let path = PathBuf::from("src/Missing.java");
        let err = InspectError::NotFound { path: path.clone() };
        let verdict = Verdict::from_error(CheckRule::ClassAnnotation, &path, &err);

        assert!(!verdict.passed);
        assert_eq!(verdict.failure, Some(FailureKind::NotFound));
        assert!(verdict.message.starts_with("NotFound"));
        assert!(verdict.message.contains("src/Missing.java"));
    }

    #[test]
    fn test_report_counts() {
        let path = PathBuf::from("A.java");
        let report = VerificationReport::new(vec![
            Verdict::pass(CheckRule::ClassAnnotation, &path, "ok"),
            Verdict::fail(CheckRule::MethodAnnotation, &path, FailureKind::Missing, "no"),
        ]);

        assert!(!report.passed());
        assert_eq!(report.total(), 2);
        assert_eq!(report.failed_count(), 1);
        assert!(VerificationReport::default().passed());
    }
}
