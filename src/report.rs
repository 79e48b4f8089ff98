//! Output formatting for verification results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::analysis::{Annotation, Parameter, SourceUnit};
use crate::error::InspectError;
use crate::verify::{Verdict, VerificationReport};

// =============================================================================
// Verification report
// =============================================================================

/// JSON document for one plan run.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub plan: String,
    pub root: String,
    pub passed: bool,
    pub total: usize,
    pub failed: usize,
    pub verdicts: Vec<JsonVerdict>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonVerdict {
    pub rule: String,
    pub file: String,
    pub passed: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl JsonReport {
    pub fn new(plan: &str, root: &str, report: &VerificationReport) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            plan: plan.to_string(),
            root: root.to_string(),
            passed: report.passed(),
            total: report.total(),
            failed: report.failed_count(),
            verdicts: report.verdicts.iter().map(verdict_to_json).collect(),
        }
    }
}

fn verdict_to_json(v: &Verdict) -> JsonVerdict {
    JsonVerdict {
        rule: v.rule.as_str().to_string(),
        file: v.file.clone(),
        passed: v.passed,
        message: v.message.clone(),
        failure: v.failure.map(|k| k.as_str().to_string()),
    }
}

/// Render a plan run as pretty-printed JSON.
pub fn render_json(plan: &str, root: &str, report: &VerificationReport) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&JsonReport::new(plan, root, report))?)
}

/// Write a plan run in JSON format to stdout.
pub fn write_json(plan: &str, root: &str, report: &VerificationReport) -> anyhow::Result<()> {
    println!("{}", render_json(plan, root, report)?);
    Ok(())
}

/// Write a plan run with colors to stdout.
pub fn write_pretty(plan: &str, plan_name: &str, root: &str, report: &VerificationReport) {
    // Header
    println!();
    print!("  ");
    print!("{}", "annocheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Plan: ".dimmed());
    if plan_name.is_empty() {
        println!("{}", plan);
    } else {
        println!("{} ({})", plan_name, plan);
    }
    print!("  {}", "Root: ".dimmed());
    println!("{}", root);
    println!();

    for v in &report.verdicts {
        write_verdict(v);
    }
    println!();

    write_final_status(report);
    println!();
}

fn write_verdict(v: &Verdict) {
    if v.passed {
        print!("    {} ", "PASS".green());
    } else {
        print!("    {} ", "FAIL".red());
    }
    print!("{:<34}", v.rule.as_str().dimmed());
    println!("{}", v.file.blue());

    let message = match v.failure {
        Some(kind) if !v.passed => format!("[{}] {}", kind, v.message),
        _ => v.message.clone(),
    };
    println!("         {}", message);
}

fn write_final_status(report: &VerificationReport) {
    let passed = report.total() - report.failed_count();
    print!("  {}", format!("{}/{} checks passed", passed, report.total()).dimmed());
    print!("  ");

    if report.passed() {
        print!("{}", "PASSED".green());
    } else {
        print!("{}", "FAILED".red());
    }
    println!();
}

// =============================================================================
// Inspection output
// =============================================================================

/// One file's inspection result as JSON.
#[derive(Debug, Serialize)]
pub struct JsonInspection<'a> {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'a SourceUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonInspectError>,
}

#[derive(Debug, Serialize)]
pub struct JsonInspectError {
    pub kind: String,
    pub message: String,
}

pub type Inspection = (PathBuf, Result<SourceUnit, InspectError>);

pub fn render_inspection_json(results: &[Inspection]) -> anyhow::Result<String> {
    let entries: Vec<JsonInspection> = results
        .iter()
        .map(|(path, result)| JsonInspection {
            file: path.display().to_string(),
            unit: result.as_ref().ok(),
            error: result.as_ref().err().map(|e| JsonInspectError {
                kind: e.kind().as_str().to_string(),
                message: e.to_string(),
            }),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

pub fn write_inspection_json(results: &[Inspection]) -> anyhow::Result<()> {
    println!("{}", render_inspection_json(results)?);
    Ok(())
}

/// Print the structural tree of each inspected file.
pub fn write_inspection_pretty(results: &[Inspection]) {
    for (path, result) in results {
        println!();
        match result {
            Ok(unit) => write_unit(unit),
            Err(e) => {
                print!("  {} ", "ERROR".red());
                println!("{}", path.display().to_string().blue());
                println!("        {}", format!("[{}] {}", e.kind(), e).dimmed());
            }
        }
    }
    println!();
}

fn write_unit(unit: &SourceUnit) {
    let ty = &unit.declaration;
    println!("  {}", unit.path.blue());
    if let Some(package) = &unit.package {
        println!("    {} {}", "package".dimmed(), package);
    }
    for import in &unit.imports {
        println!("    {} {}", "import".dimmed(), import);
    }

    write_annotations(4, &ty.annotations);
    println!(
        "    {} {} {}",
        ty.kind.as_str().dimmed(),
        ty.name.bold(),
        format!(":{}", ty.span).dimmed()
    );

    for component in &ty.components {
        println!("      {} {}", "component".dimmed(), describe_parameter(component));
    }
    for field in &ty.fields {
        write_annotations(6, &field.annotations);
        for binding in &field.bindings {
            println!(
                "      {} {} {}",
                "field".dimmed(),
                binding.declared_type,
                binding.name
            );
        }
    }
    for ctor in &ty.constructors {
        write_annotations(6, &ctor.annotations);
        println!(
            "      {} {}({})",
            "constructor".dimmed(),
            ty.name,
            describe_parameters(&ctor.parameters)
        );
    }
    for method in &ty.methods {
        write_annotations(6, &method.annotations);
        println!(
            "      {} {} {}({})",
            "method".dimmed(),
            method.return_type,
            method.name,
            describe_parameters(&method.parameters)
        );
    }
}

fn write_annotations(indent: usize, annotations: &[Annotation]) {
    for a in annotations {
        println!("{:indent$}{}", "", a.to_string().yellow(), indent = indent);
    }
}

fn describe_parameters(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(describe_parameter)
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_parameter(p: &Parameter) -> String {
    let mut parts: Vec<String> = p.annotations.iter().map(|a| a.to_string()).collect();
    parts.push(p.declared_type.clone());
    parts.push(p.name.clone());
    parts.join(" ")
}
