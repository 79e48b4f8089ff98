//! The verification check catalogue.
//!
//! Each check loads one file, runs one query and returns a `Verdict`.
//! Checks never return errors: a missing file, a parse failure or an
//! unresolvable member becomes a failed verdict naming the failure kind.

use std::path::Path;

use crate::analysis::{
    self, any_constructor_has_annotation, canonical_type, any_field_of_type_has_annotation,
    any_method_has_annotation, any_method_has_annotation_with_value, has_annotation,
    has_annotation_with_value_contains, parameter_has_annotation, select_constructor,
    select_method, Annotation, MemberSelector, TypeDeclaration,
};
use crate::error::{FailureKind, Result};

use super::{CheckRule, Verdict};

/// Parameters of a parameter-level check.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterCheck<'a> {
    pub annotation: &'a str,
    /// Restrict the check to this parameter and select members declaring it.
    pub parameter: Option<&'a str>,
    /// Substring the annotation's argument text must contain.
    pub value: Option<&'a str>,
    /// Exact declared parameter types, for overload selection.
    pub parameter_types: Option<&'a [String]>,
}

impl ParameterCheck<'_> {
    fn selector(&self) -> MemberSelector<'_> {
        MemberSelector::new()
            .parameter(self.parameter)
            .parameter_types(self.parameter_types)
    }

    fn describe(&self) -> String {
        let mut text = format!("@{}", self.annotation);
        if let Some(value) = self.value {
            text.push_str(&format!(" with value containing {:?}", value));
        }
        match self.parameter {
            Some(name) => text.push_str(&format!(" on parameter `{}`", name)),
            None => text.push_str(" on any parameter"),
        }
        text
    }
}

/// Result of a query that ran to completion.
struct Outcome {
    passed: bool,
    message: String,
}

impl Outcome {
    fn new(passed: bool, expected: String, found: impl FnOnce() -> String) -> Self {
        let message = if passed {
            format!("found {}", expected)
        } else {
            format!("expected {}, found {}", expected, found())
        };
        Self { passed, message }
    }
}

fn describe_annotations(annotations: &[Annotation]) -> String {
    if annotations.is_empty() {
        return "no annotations".to_string();
    }
    annotations
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load `path`, run `query` against its declaration and log the verdict.
fn inspect<F>(rule: CheckRule, path: &Path, query: F) -> Verdict
where
    F: FnOnce(&TypeDeclaration) -> Result<Outcome>,
{
    tracing::info!(rule = %rule, file = %path.display(), "running check");

    let verdict = match analysis::load_unit(path).and_then(|unit| query(&unit.declaration)) {
        Ok(outcome) if outcome.passed => Verdict::pass(rule, path, outcome.message),
        Ok(outcome) => Verdict::fail(rule, path, FailureKind::Missing, outcome.message),
        Err(e) => Verdict::from_error(rule, path, &e),
    };

    log_verdict(&verdict);
    verdict
}

fn log_verdict(verdict: &Verdict) {
    if verdict.passed {
        tracing::info!(rule = %verdict.rule, file = %verdict.file, "{}", verdict.message);
    } else {
        tracing::warn!(rule = %verdict.rule, file = %verdict.file, "{}", verdict.message);
    }
}

/// The file's type carries `@annotation`.
pub fn class_annotation(path: &Path, annotation: &str) -> Verdict {
    inspect(CheckRule::ClassAnnotation, path, |ty| {
        Ok(Outcome::new(
            has_annotation(ty, annotation),
            format!("@{} on {} {}", annotation, ty.kind, ty.name),
            || describe_annotations(&ty.annotations),
        ))
    })
}

/// The file's type carries `@annotation` with an argument containing `value`.
pub fn class_annotation_value(path: &Path, annotation: &str, value: &str) -> Verdict {
    inspect(CheckRule::ClassAnnotationValue, path, |ty| {
        Ok(Outcome::new(
            has_annotation_with_value_contains(ty, annotation, value),
            format!(
                "@{} with value containing {:?} on {} {}",
                annotation, value, ty.kind, ty.name
            ),
            || describe_annotations(&ty.annotations),
        ))
    })
}

/// Some method of the type carries `@annotation`.
pub fn method_annotation(path: &Path, annotation: &str) -> Verdict {
    inspect(CheckRule::MethodAnnotation, path, |ty| {
        Ok(Outcome::new(
            any_method_has_annotation(ty, annotation),
            format!("@{} on a method of {}", annotation, ty.name),
            || format!("{} methods without it", ty.methods.len()),
        ))
    })
}

/// Some method of the type carries `@annotation` with an argument containing `value`.
pub fn method_annotation_value(path: &Path, annotation: &str, value: &str) -> Verdict {
    inspect(CheckRule::MethodAnnotationValue, path, |ty| {
        Ok(Outcome::new(
            any_method_has_annotation_with_value(ty, annotation, value),
            format!(
                "@{} with value containing {:?} on a method of {}",
                annotation, value, ty.name
            ),
            || {
                let found: Vec<String> = ty
                    .methods
                    .iter()
                    .flat_map(|m| m.annotations.iter())
                    .filter(|a| a.name == annotation)
                    .map(|a| a.to_string())
                    .collect();
                if found.is_empty() {
                    format!("no method carrying @{}", annotation)
                } else {
                    found.join(", ")
                }
            },
        ))
    })
}

/// The method named `method`, narrowed by `parameter_types` when it is
/// overloaded, carries `@annotation` with an argument containing `value`.
pub fn named_method_annotation_value(
    path: &Path,
    method: &str,
    parameter_types: Option<&[String]>,
    annotation: &str,
    value: &str,
) -> Verdict {
    inspect(CheckRule::MethodAnnotationValue, path, |ty| {
        let selector = MemberSelector::new().parameter_types(parameter_types);
        let target = select_method(ty, method, &selector)?;
        Ok(Outcome::new(
            has_annotation_with_value_contains(target, annotation, value),
            format!(
                "@{} with value containing {:?} on method {}.{} at {}",
                annotation, value, ty.name, method, target.span
            ),
            || describe_annotations(&target.annotations),
        ))
    })
}

/// Some constructor of the type carries `@annotation`.
pub fn constructor_annotation(path: &Path, annotation: &str) -> Verdict {
    inspect(CheckRule::ConstructorAnnotation, path, |ty| {
        Ok(Outcome::new(
            any_constructor_has_annotation(ty, annotation),
            format!("@{} on a constructor of {}", annotation, ty.name),
            || format!("{} constructors without it", ty.constructors.len()),
        ))
    })
}

/// Some field binding declared as `field_type` carries `@annotation`.
pub fn field_annotation(path: &Path, field_type: &str, annotation: &str) -> Verdict {
    inspect(CheckRule::FieldAnnotation, path, |ty| {
        Ok(Outcome::new(
            any_field_of_type_has_annotation(ty, field_type, annotation),
            format!("@{} on a field of type {} in {}", annotation, field_type, ty.name),
            || {
                let wanted = canonical_type(field_type);
                let matching = ty
                    .fields
                    .iter()
                    .flat_map(|f| f.variables())
                    .filter(|(binding, _)| binding.declared_type == wanted)
                    .count();
                format!("{} field(s) of type {} without it", matching, field_type)
            },
        ))
    })
}

/// A parameter of the selected constructor carries the annotation.
///
/// Fails with `AmbiguousMatch` when `check` does not narrow the
/// constructors down to one.
pub fn constructor_parameter_annotation(path: &Path, check: &ParameterCheck) -> Verdict {
    inspect(CheckRule::ConstructorParameterAnnotation, path, |ty| {
        let ctor = select_constructor(ty, &check.selector())?;
        let passed = parameter_has_annotation(ctor, check.parameter, check.annotation, check.value);
        Ok(Outcome::new(
            passed,
            format!("{} of constructor {} at {}", check.describe(), ty.name, ctor.span),
            || parameter_findings(&ctor.parameters, check.parameter),
        ))
    })
}

/// A parameter of the selected method carries the annotation.
pub fn method_parameter_annotation(path: &Path, method: &str, check: &ParameterCheck) -> Verdict {
    inspect(CheckRule::MethodParameterAnnotation, path, |ty| {
        let target = select_method(ty, method, &check.selector())?;
        let passed =
            parameter_has_annotation(target, check.parameter, check.annotation, check.value);
        Ok(Outcome::new(
            passed,
            format!("{} of method {}.{} at {}", check.describe(), ty.name, method, target.span),
            || parameter_findings(&target.parameters, check.parameter),
        ))
    })
}

fn parameter_findings(parameters: &[analysis::Parameter], only: Option<&str>) -> String {
    let listed: Vec<String> = parameters
        .iter()
        .filter(|p| only.map_or(true, |name| p.name == name))
        .map(|p| format!("`{}`: {}", p.name, describe_annotations(&p.annotations)))
        .collect();
    if listed.is_empty() {
        "no parameters".to_string()
    } else {
        listed.join("; ")
    }
}

/// The view template at `path` contains `needle` literally.
pub fn markup_contains(path: &Path, needle: &str) -> Verdict {
    let rule = CheckRule::MarkupContains;
    tracing::info!(rule = %rule, file = %path.display(), "running check");

    let verdict = match analysis::load(path) {
        Ok(text) if text.contains(needle) => Verdict::pass(rule, path, format!("found {:?}", needle)),
        Ok(_) => Verdict::fail(
            rule,
            path,
            FailureKind::Missing,
            format!("expected {:?} in markup, not present", needle),
        ),
        Err(e) => Verdict::from_error(rule, path, &e),
    };

    log_verdict(&verdict);
    verdict
}
