//! Core traits for language analysis.

use std::path::Path;

use super::SourceUnit;
use crate::error::Result;

/// Holds a parsed tree-sitter tree and associated metadata.
///
/// Lives only for the duration of one declaration extraction.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// Source bytes, kept for node text extraction.
    pub source: Vec<u8>,
    /// The file path (for error reporting).
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }
}

/// Language-specific declaration parser.
///
/// # Thread Safety
///
/// tree_sitter::Parser is not Sync, so implementations create a parser
/// per call.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language identifier (e.g., "java").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse `source` and extract the top-level type named `expected_type`.
    ///
    /// Fails with `Parse` on malformed syntax and `TypeNotFound` when no
    /// top-level declaration carries that name.
    fn parse_unit(&self, path: &Path, source: &str, expected_type: &str) -> Result<SourceUnit>;

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
