//! Integration tests for the full verification pipeline.
//!
//! These tests run the plans under testdata/ end to end: plan parsing,
//! validation, the parallel runner and every check in the catalogue.

use std::path::PathBuf;

use annocheck::error::FailureKind;
use annocheck::plan::{self, Plan};
use annocheck::verify::{self, CheckRule, ParameterCheck, Runner, VerificationReport};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn greeting_root() -> PathBuf {
    testdata_path().join("greeting")
}

fn java_file(name: &str) -> PathBuf {
    greeting_root()
        .join("src/main/java/com/example")
        .join(name)
}

fn run_plan(dir: &str, plan_file: &str) -> VerificationReport {
    annocheck::init();

    let root = testdata_path().join(dir);
    let plan = Plan::parse_file(root.join(plan_file)).expect("should parse plan");
    plan::validate(&plan).expect("plan should be valid");

    Runner::new(&root).run(&plan)
}

#[test]
fn test_greeting_plan_passes() {
    let report = run_plan("greeting", "greeting-plan.yaml");

    let failures: Vec<_> = report
        .failures()
        .map(|v| format!("{} {}: {}", v.rule, v.file, v.message))
        .collect();
    assert!(failures.is_empty(), "unexpected failures: {:#?}", failures);
    assert_eq!(report.total(), 13);
}

#[test]
fn test_verdicts_follow_plan_order() {
    let report = run_plan("greeting", "greeting-plan.yaml");
    let rules: Vec<CheckRule> = report.verdicts.iter().map(|v| v.rule).collect();

    assert_eq!(rules[0], CheckRule::ClassAnnotation);
    assert_eq!(rules[4], CheckRule::MethodParameterAnnotation);
    assert_eq!(rules[8], CheckRule::ConstructorParameterAnnotation);
    assert_eq!(rules[10], CheckRule::MarkupContains);
    assert_eq!(rules[12], CheckRule::MethodAnnotationValue);
}

#[test]
fn test_failing_plan_reports_each_failure_kind() {
    let report = run_plan("invalid", "failing-plan.yaml");

    assert!(!report.passed());
    assert_eq!(report.failed_count(), 4);

    let kinds: Vec<Option<FailureKind>> = report.verdicts.iter().map(|v| v.failure).collect();
    assert_eq!(
        kinds,
        vec![
            Some(FailureKind::NotFound),
            Some(FailureKind::TypeNotFound),
            Some(FailureKind::ParseError),
            Some(FailureKind::Missing),
        ]
    );

    assert!(report.verdicts[0].message.contains("Missing.java"));
    assert!(report.verdicts[1].message.contains("Foo"));
}

#[test]
fn test_class_level_scenario() {
    let path = java_file("PaymentService.java");

    assert!(verify::class_annotation(&path, "Service").passed);

    let verdict = verify::class_annotation(&path, "Repository");
    assert!(!verdict.passed);
    assert!(verdict.message.contains("@Repository"));
    assert!(verdict.message.contains("@Service"));
}

#[test]
fn test_method_value_scenario() {
    let path = java_file("GreetingController.java");

    assert!(verify::method_annotation_value(&path, "GetMapping", "/greet").passed);
    assert!(!verify::method_annotation_value(&path, "GetMapping", "/other").passed);
    // Containment, not equality.
    assert!(verify::method_annotation_value(&path, "GetMapping", "/gr").passed);
}

#[test]
fn test_named_method_value_scenario() {
    let path = java_file("GreetingController.java");
    let with_age = vec!["String".to_string(), "int".to_string(), "Model".to_string()];
    let without_age = vec!["String".to_string(), "Model".to_string()];

    let verdict = verify::named_method_annotation_value(
        &path,
        "greet",
        Some(with_age.as_slice()),
        "GetMapping",
        "/greet",
    );
    assert!(verdict.passed, "{}", verdict.message);

    // The other overload is routed to /hello.
    let verdict = verify::named_method_annotation_value(
        &path,
        "greet",
        Some(without_age.as_slice()),
        "GetMapping",
        "/greet",
    );
    assert!(!verdict.passed);
    assert_eq!(verdict.failure, Some(FailureKind::Missing));
    assert!(verdict.message.contains("/hello"), "{}", verdict.message);

    // An any-method check cannot tell which method carries the route.
    assert!(verify::method_annotation_value(&path, "GetMapping", "/hello").passed);
    let verdict = verify::named_method_annotation_value(&path, "index", None, "GetMapping", "/hello");
    assert!(!verdict.passed);
}

#[test]
fn test_misspelled_plan_key_is_rejected() {
    let yaml = r#"
checks:
  - rule: constructor_parameter_annotation
    file: src/main/java/com/example/PaymentService.java
    annotation: Qualifier
    parameter: gateway
    vaule: stripeGateway
"#;
    assert!(Plan::parse_str(yaml).is_err());
}

#[test]
fn test_constructor_parameter_scenario() {
    let path = java_file("PaymentService.java");
    let check = ParameterCheck {
        annotation: "Qualifier",
        parameter: Some("gateway"),
        value: Some("payPalPaymentGateway"),
        parameter_types: None,
    };

    assert!(verify::constructor_parameter_annotation(&path, &check).passed);

    let verdict = verify::constructor_parameter_annotation(
        &path,
        &ParameterCheck {
            parameter: Some("orders"),
            ..check
        },
    );
    assert!(!verdict.passed);
    assert_eq!(verdict.failure, Some(FailureKind::MemberNotFound));
}

#[test]
fn test_overloaded_methods_need_disambiguation() {
    let path = java_file("GreetingController.java");
    let check = ParameterCheck {
        annotation: "RequestParam",
        parameter: Some("name"),
        value: Some("name"),
        parameter_types: None,
    };

    let verdict = verify::method_parameter_annotation(&path, "greet", &check);
    assert_eq!(verdict.failure, Some(FailureKind::AmbiguousMatch));

    let types = vec!["String".to_string(), "Model".to_string()];
    let verdict = verify::method_parameter_annotation(
        &path,
        "greet",
        &ParameterCheck {
            parameter_types: Some(types.as_slice()),
            ..check
        },
    );
    assert!(verdict.passed, "{}", verdict.message);
}

#[test]
fn test_field_fan_out_scenario() {
    let path = java_file("PaymentService.java");

    assert!(verify::field_annotation(&path, "OrderRepository", "Autowired").passed);
    // The annotated PaymentGateway field lives in a nested class.
    assert!(!verify::field_annotation(&path, "PaymentGateway", "Autowired").passed);
}

#[test]
fn test_sequential_and_parallel_agree() {
    annocheck::init();
    let root = greeting_root();
    let plan = Plan::parse_file(root.join("greeting-plan.yaml")).unwrap();

    let parallel = Runner::new(&root).run(&plan);
    let sequential = Runner::new(&root).sequential(true).run(&plan);

    let a: Vec<_> = parallel.verdicts.iter().map(|v| (v.rule, v.passed, &v.message)).collect();
    let b: Vec<_> = sequential.verdicts.iter().map(|v| (v.rule, v.passed, &v.message)).collect();
    assert_eq!(a, b);
}
