//! Annocheck - structural annotation verifier.
//!
//! Annocheck parses Java sources with tree-sitter and verifies that
//! declarations carry the annotations a plan expects: class, method,
//! constructor, field and parameter level, optionally with an argument
//! value. Nothing is compiled or executed.
//!
//! # Architecture
//!
//! - `analysis`: source loading, the declaration parser and annotation queries
//! - `verify`: the check catalogue, verdicts and the batch runner
//! - `plan`: YAML verification plan schema
//! - `report`: output formatting (pretty, JSON)
//! - `error`: the failure taxonomy shared by all layers
//!
//! # Adding a New Language
//!
//! See `src/analysis/languages/java.rs`. Implement the `LanguageAnalyzer`
//! trait and register it in `languages/mod.rs`.

pub mod analysis;
pub mod cli;
pub mod error;
pub mod plan;
pub mod report;
pub mod verify;

pub use analysis::{
    load_unit, register_analyzers, Annotation, JavaAnalyzer, LanguageAnalyzer, SourceUnit,
    TypeDeclaration,
};
pub use error::{FailureKind, InspectError};
pub use plan::{Check, Plan};
pub use verify::{CheckRule, Runner, Verdict, VerificationReport};

/// Initialize all subsystems.
///
/// Call this once at startup.
pub fn init() {
    register_analyzers();
}
