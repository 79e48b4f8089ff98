//! Verification plan schema.
//!
//! A plan lists the structural checks to run against a source tree.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::verify::{self, CheckRule, ParameterCheck, Verdict};

/// Top-level plan definition.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub checks: Vec<Check>,
}

impl Plan {
    /// Parse a plan from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read plan {}", path.display()))?;
        Self::parse_str(&content).with_context(|| format!("invalid plan {}", path.display()))
    }

    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        let plan: Plan = serde_yaml::from_str(content)?;
        Ok(plan)
    }
}

/// One check; `rule` picks the variant, the other keys are its parameters.
///
/// Keys a rule does not define are rejected, so a misspelled optional
/// constraint cannot silently drop out of a check.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case", deny_unknown_fields)]
pub enum Check {
    ClassAnnotation {
        file: String,
        annotation: String,
    },
    ClassAnnotationValue {
        file: String,
        annotation: String,
        value: String,
    },
    MethodAnnotation {
        file: String,
        annotation: String,
    },
    /// Any method, or only `method` (narrowed by `parameter_types`) when set.
    MethodAnnotationValue {
        file: String,
        annotation: String,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parameter_types: Option<Vec<String>>,
    },
    ConstructorAnnotation {
        file: String,
        annotation: String,
    },
    FieldAnnotation {
        file: String,
        field_type: String,
        annotation: String,
    },
    ConstructorParameterAnnotation {
        file: String,
        annotation: String,
        parameter: String,
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        parameter_types: Option<Vec<String>>,
    },
    MethodParameterAnnotation {
        file: String,
        method: String,
        annotation: String,
        #[serde(default)]
        parameter: Option<String>,
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        parameter_types: Option<Vec<String>>,
    },
    MarkupContains {
        file: String,
        needle: String,
    },
}

impl Check {
    pub fn rule(&self) -> CheckRule {
        match self {
            Check::ClassAnnotation { .. } => CheckRule::ClassAnnotation,
            Check::ClassAnnotationValue { .. } => CheckRule::ClassAnnotationValue,
            Check::MethodAnnotation { .. } => CheckRule::MethodAnnotation,
            Check::MethodAnnotationValue { .. } => CheckRule::MethodAnnotationValue,
            Check::ConstructorAnnotation { .. } => CheckRule::ConstructorAnnotation,
            Check::FieldAnnotation { .. } => CheckRule::FieldAnnotation,
            Check::ConstructorParameterAnnotation { .. } => {
                CheckRule::ConstructorParameterAnnotation
            }
            Check::MethodParameterAnnotation { .. } => CheckRule::MethodParameterAnnotation,
            Check::MarkupContains { .. } => CheckRule::MarkupContains,
        }
    }

    /// File path as written in the plan.
    pub fn file(&self) -> &str {
        match self {
            Check::ClassAnnotation { file, .. }
            | Check::ClassAnnotationValue { file, .. }
            | Check::MethodAnnotation { file, .. }
            | Check::MethodAnnotationValue { file, .. }
            | Check::ConstructorAnnotation { file, .. }
            | Check::FieldAnnotation { file, .. }
            | Check::ConstructorParameterAnnotation { file, .. }
            | Check::MethodParameterAnnotation { file, .. }
            | Check::MarkupContains { file, .. } => file,
        }
    }

    /// Run this check with its file resolved against `base_dir`.
    pub fn run(&self, base_dir: &Path) -> Verdict {
        let path = base_dir.join(self.file());
        match self {
            Check::ClassAnnotation { annotation, .. } => verify::class_annotation(&path, annotation),
            Check::ClassAnnotationValue {
                annotation, value, ..
            } => verify::class_annotation_value(&path, annotation, value),
            Check::MethodAnnotation { annotation, .. } => {
                verify::method_annotation(&path, annotation)
            }
            Check::MethodAnnotationValue {
                annotation,
                value,
                method: Some(method),
                parameter_types,
                ..
            } => verify::named_method_annotation_value(
                &path,
                method,
                parameter_types.as_deref(),
                annotation,
                value,
            ),
            Check::MethodAnnotationValue {
                annotation, value, ..
            } => verify::method_annotation_value(&path, annotation, value),
            Check::ConstructorAnnotation { annotation, .. } => {
                verify::constructor_annotation(&path, annotation)
            }
            Check::FieldAnnotation {
                field_type,
                annotation,
                ..
            } => verify::field_annotation(&path, field_type, annotation),
            Check::ConstructorParameterAnnotation {
                annotation,
                parameter,
                value,
                parameter_types,
                ..
            } => verify::constructor_parameter_annotation(
                &path,
                &ParameterCheck {
                    annotation: annotation.as_str(),
                    parameter: Some(parameter.as_str()),
                    value: value.as_deref(),
                    parameter_types: parameter_types.as_deref(),
                },
            ),
            Check::MethodParameterAnnotation {
                method,
                annotation,
                parameter,
                value,
                parameter_types,
                ..
            } => verify::method_parameter_annotation(
                &path,
                method,
                &ParameterCheck {
                    annotation: annotation.as_str(),
                    parameter: parameter.as_deref(),
                    value: value.as_deref(),
                    parameter_types: parameter_types.as_deref(),
                },
            ),
            Check::MarkupContains { needle, .. } => verify::markup_contains(&path, needle),
        }
    }

    /// Required string parameters, by key.
    fn required_strings(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![("file", self.file())];
        match self {
            Check::ClassAnnotation { annotation, .. }
            | Check::MethodAnnotation { annotation, .. }
            | Check::ConstructorAnnotation { annotation, .. } => {
                fields.push(("annotation", annotation.as_str()));
            }
            Check::ClassAnnotationValue {
                annotation, value, ..
            } => {
                fields.push(("annotation", annotation.as_str()));
                fields.push(("value", value.as_str()));
            }
            Check::MethodAnnotationValue {
                annotation,
                value,
                method,
                ..
            } => {
                fields.push(("annotation", annotation.as_str()));
                fields.push(("value", value.as_str()));
                if let Some(method) = method {
                    fields.push(("method", method.as_str()));
                }
            }
            Check::FieldAnnotation {
                field_type,
                annotation,
                ..
            } => {
                fields.push(("field_type", field_type.as_str()));
                fields.push(("annotation", annotation.as_str()));
            }
            Check::ConstructorParameterAnnotation {
                annotation,
                parameter,
                value,
                ..
            } => {
                fields.push(("annotation", annotation.as_str()));
                fields.push(("parameter", parameter.as_str()));
                if let Some(value) = value {
                    fields.push(("value", value.as_str()));
                }
            }
            Check::MethodParameterAnnotation {
                method,
                annotation,
                parameter,
                value,
                ..
            } => {
                fields.push(("method", method.as_str()));
                fields.push(("annotation", annotation.as_str()));
                if let Some(parameter) = parameter {
                    fields.push(("parameter", parameter.as_str()));
                }
                if let Some(value) = value {
                    fields.push(("value", value.as_str()));
                }
            }
            Check::MarkupContains { needle, .. } => fields.push(("needle", needle.as_str())),
        }
        fields
    }

    fn annotation(&self) -> Option<&str> {
        match self {
            Check::ClassAnnotation { annotation, .. }
            | Check::ClassAnnotationValue { annotation, .. }
            | Check::MethodAnnotation { annotation, .. }
            | Check::MethodAnnotationValue { annotation, .. }
            | Check::ConstructorAnnotation { annotation, .. }
            | Check::FieldAnnotation { annotation, .. }
            | Check::ConstructorParameterAnnotation { annotation, .. }
            | Check::MethodParameterAnnotation { annotation, .. } => Some(annotation.as_str()),
            Check::MarkupContains { .. } => None,
        }
    }

    fn parameter_types(&self) -> Option<&[String]> {
        match self {
            Check::ConstructorParameterAnnotation {
                parameter_types, ..
            }
            | Check::MethodParameterAnnotation {
                parameter_types, ..
            }
            | Check::MethodAnnotationValue {
                parameter_types, ..
            } => parameter_types.as_deref(),
            _ => None,
        }
    }
}

/// Validate a plan for correctness.
pub fn validate(plan: &Plan) -> anyhow::Result<()> {
    if plan.checks.is_empty() {
        anyhow::bail!("plan {:?} defines no checks", plan.name);
    }

    for (index, check) in plan.checks.iter().enumerate() {
        let at = format!("check #{} ({})", index + 1, check.rule());

        for (key, text) in check.required_strings() {
            if text.trim().is_empty() {
                anyhow::bail!("{}: `{}` must not be empty", at, key);
            }
        }

        if let Some(annotation) = check.annotation() {
            if annotation.starts_with('@') {
                anyhow::bail!(
                    "{}: annotation {:?} must be written without the leading '@'",
                    at,
                    annotation
                );
            }
        }

        if let Some(types) = check.parameter_types() {
            if types.iter().any(|t| t.trim().is_empty()) {
                anyhow::bail!("{}: `parameter_types` contains an empty entry", at);
            }
        }

        if let Check::MethodAnnotationValue {
            method: None,
            parameter_types: Some(_),
            ..
        } = check
        {
            anyhow::bail!("{}: `parameter_types` needs a `method` to select", at);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"
version: "1.0"
name: "Greeting controller"
checks:
  - rule: class_annotation
    file: src/GreetingController.java
    annotation: Controller
  - rule: method_annotation_value
    file: src/GreetingController.java
    annotation: GetMapping
    value: "/greet"
  - rule: method_parameter_annotation
    file: src/GreetingController.java
    method: greet
    annotation: RequestParam
    parameter_types: [String, Model]
  - rule: markup_contains
    file: views/index.jsp
    needle: "<form"
"#;

    #[test]
    fn test_parse_plan() {
        let plan = Plan::parse_str(PLAN).unwrap();
        assert_eq!(plan.name, "Greeting controller");
        assert_eq!(plan.checks.len(), 4);
        assert_eq!(plan.checks[0].rule(), CheckRule::ClassAnnotation);
        assert_eq!(plan.checks[3].file(), "views/index.jsp");

        match &plan.checks[2] {
            Check::MethodParameterAnnotation {
                parameter,
                parameter_types,
                ..
            } => {
                assert!(parameter.is_none());
                assert_eq!(parameter_types.as_deref().map(|t| t.len()), Some(2));
            }
            other => panic!("unexpected check {:?}", other),
        }
        validate(&plan).unwrap();
    }

    #[test]
    fn test_unknown_rule_is_rejected() {
        let yaml = r#"
checks:
  - rule: class_tag
    file: A.java
    annotation: X
"#;
        assert!(Plan::parse_str(yaml).is_err());
    }

    #[test]
    fn test_misspelled_key_is_rejected() {
        let yaml = r#"
checks:
  - rule: constructor_parameter_annotation
    file: Svc.java
    annotation: Qualifier
    parameter: gateway
    vaule: payPalPaymentGateway
"#;
        let err = Plan::parse_str(yaml).unwrap_err();
        assert!(format!("{:#}", err).contains("vaule"), "{:#}", err);

        assert!(Plan::parse_str("chekcs: []\n").is_err());
    }

    #[test]
    fn test_named_method_value_check() {
        let yaml = r#"
checks:
  - rule: method_annotation_value
    file: src/GreetingController.java
    method: greet
    parameter_types: [String, int, Model]
    annotation: GetMapping
    value: "/greet"
  - rule: method_annotation_value
    file: src/GreetingController.java
    annotation: GetMapping
    value: "/"
"#;
        let plan = Plan::parse_str(yaml).unwrap();
        match &plan.checks[0] {
            Check::MethodAnnotationValue {
                method,
                parameter_types,
                ..
            } => {
                assert_eq!(method.as_deref(), Some("greet"));
                assert_eq!(parameter_types.as_deref().map(|t| t.len()), Some(3));
            }
            other => panic!("unexpected check {:?}", other),
        }
        assert!(matches!(
            &plan.checks[1],
            Check::MethodAnnotationValue { method: None, .. }
        ));
        validate(&plan).unwrap();

        let orphan = r#"
checks:
  - rule: method_annotation_value
    file: A.java
    annotation: GetMapping
    value: "/"
    parameter_types: [String]
"#;
        let err = validate(&Plan::parse_str(orphan).unwrap()).unwrap_err();
        assert!(err.to_string().contains("needs a `method`"));
    }

    #[test]
    fn test_validate_rejects_empty_plan() {
        let err = validate(&Plan::default()).unwrap_err();
        assert!(err.to_string().contains("no checks"));
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let mut plan = Plan {
            checks: vec![Check::ClassAnnotation {
                file: "A.java".to_string(),
                annotation: "@Service".to_string(),
            }],
            ..Default::default()
        };
        let err = validate(&plan).unwrap_err();
        assert!(err.to_string().contains("leading '@'"));

        plan.checks = vec![Check::MarkupContains {
            file: "index.jsp".to_string(),
            needle: " ".to_string(),
        }];
        let err = validate(&plan).unwrap_err();
        assert!(err.to_string().contains("`needle`"));

        plan.checks = vec![Check::ConstructorParameterAnnotation {
            file: "A.java".to_string(),
            annotation: "Qualifier".to_string(),
            parameter: "gateway".to_string(),
            value: None,
            parameter_types: Some(vec!["Gateway".to_string(), String::new()]),
        }];
        let err = validate(&plan).unwrap_err();
        assert!(err.to_string().contains("parameter_types"));
    }
}
