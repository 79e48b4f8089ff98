//! Command-line interface for annocheck.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::analysis;
use crate::plan::{self, Plan};
use crate::report::{self, Inspection};
use crate::verify::Runner;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Structural annotation verifier for Java sources.
///
/// Annocheck parses source files and checks that classes, methods,
/// constructors, fields and parameters carry the annotations a
/// verification plan expects, without compiling or running the code.
#[derive(Parser)]
#[command(name = "annocheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every check of a verification plan
    #[command(visible_alias = "check")]
    Verify(VerifyArgs),
    /// Print the structural tree of a source file or directory
    Inspect(InspectArgs),
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Pretty,
    Json,
}

/// Arguments for the verify command.
#[derive(Parser)]
pub struct VerifyArgs {
    /// Path to the plan YAML file
    pub plan: PathBuf,

    /// Directory plan file paths are resolved against (default: the plan's directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: Format,

    /// Run checks one at a time
    #[arg(long)]
    pub sequential: bool,
}

/// Arguments for the inspect command.
#[derive(Parser)]
pub struct InspectArgs {
    /// Source file, or directory to scan for .java files
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: Format,
}

/// Directory plan paths are resolved against when `--root` is absent.
fn default_root(plan_path: &Path) -> PathBuf {
    match plan_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Collect source files under `root`.
fn collect_files(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            // Skip hidden and build output directories
            !(e.file_type().is_dir()
                && e.depth() > 0
                && (name.starts_with('.') || name == "target" || name == "build"))
        })
    {
        let entry = entry?;
        if entry.file_type().is_file() {
            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if analysis::get_analyzer(ext).is_some() {
                files.push(path.to_path_buf());
            }
        }
    }

    Ok(files)
}

/// Run the verify command.
pub fn run_verify(args: &VerifyArgs) -> anyhow::Result<i32> {
    let plan = match Plan::parse_file(&args.plan) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error parsing plan: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if let Err(e) = plan::validate(&plan) {
        eprintln!("Error: invalid plan: {}", e);
        return Ok(EXIT_ERROR);
    }

    let root = args.root.clone().unwrap_or_else(|| default_root(&args.plan));
    if !root.is_dir() {
        eprintln!("Error: root is not a directory: {}", root.display());
        return Ok(EXIT_ERROR);
    }

    tracing::info!(
        plan = %args.plan.display(),
        root = %root.display(),
        checks = plan.checks.len(),
        "verifying plan"
    );

    let runner = Runner::new(&root).sequential(args.sequential);
    let report = runner.run(&plan);

    let plan_str = args.plan.to_string_lossy().to_string();
    let root_str = root.to_string_lossy().to_string();

    match args.format {
        Format::Json => report::write_json(&plan_str, &root_str, &report)?,
        Format::Pretty => report::write_pretty(&plan_str, &plan.name, &root_str, &report),
    }

    if report.passed() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the inspect command.
pub fn run_inspect(args: &InspectArgs) -> anyhow::Result<i32> {
    let metadata = match std::fs::metadata(&args.path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let files = if metadata.is_dir() {
        collect_files(&args.path)?
    } else {
        vec![args.path.clone()]
    };

    if files.is_empty() {
        eprintln!("Warning: no source files found under {}", args.path.display());
        return Ok(EXIT_SUCCESS);
    }

    let results: Vec<Inspection> = files
        .into_iter()
        .map(|path| {
            let unit = analysis::load_unit(&path);
            (path, unit)
        })
        .collect();

    match args.format {
        Format::Json => report::write_inspection_json(&results)?,
        Format::Pretty => report::write_inspection_pretty(&results),
    }

    if results.iter().all(|(_, r)| r.is_ok()) {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}
