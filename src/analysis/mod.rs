//! AST-backed source inspection.
//!
//! This module turns a source file into a structural tree and answers
//! annotation queries against it. The pipeline is:
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Source file │────▶│ Loader       │────▶│ Analyzer     │────▶│ SourceUnit   │
//! └─────────────┘     │ (source.rs)  │     │ (tree-sitter)│     │ (facts.rs)   │
//!                     └──────────────┘     └──────────────┘     └──────────────┘
//!                                                                      │
//!                                                                      ▼
//!                                                               ┌──────────────┐
//!                                                               │ Queries      │
//!                                                               │ (query.rs)   │
//!                                                               └──────────────┘
//! ```
//!
//! Every call parses afresh; nothing is cached between files.

mod facts;
mod languages;
mod query;
mod source;
mod traits;

use std::path::Path;

use crate::error::Result;

pub use facts::{
    canonical_type, Annotation, ConstructorDeclaration, FieldDeclaration, MethodDeclaration, Parameter,
    SourceUnit, Span, TypeDeclaration, TypeKind, VariableBinding,
};
pub use languages::{analyzer_for_path, get_analyzer, register_analyzers, JavaAnalyzer};
pub use query::{
    any_constructor_has_annotation, any_field_of_type_has_annotation, any_method_has_annotation,
    any_method_has_annotation_with_value, has_annotation, has_annotation_with_value_contains,
    parameter_has_annotation, select_constructor, select_method, Annotated, Callable,
    MemberSelector,
};
pub use source::{expected_type_name, load};
pub use traits::{LanguageAnalyzer, ParsedFile};

/// Load and parse `path`, extracting the top-level type named after the file.
pub fn load_unit(path: &Path) -> Result<SourceUnit> {
    let text = load(path)?;
    let expected = expected_type_name(path);
    let analyzer = analyzer_for_path(path);

    tracing::debug!(
        path = %path.display(),
        language = analyzer.language_id(),
        expected = %expected,
        "parsing source unit"
    );
    analyzer.parse_unit(path, &text, &expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InspectError;
    use tempfile::TempDir;

    #[test]
    fn test_load_unit_uses_file_stem() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Foo.src");
        std::fs::write(&path, "class Bar {}\n").unwrap();

        let err = load_unit(&path).unwrap_err();
        assert!(matches!(err, InspectError::TypeNotFound { ref name } if name == "Foo"));
    }

    #[test]
    fn test_load_unit_success() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Foo.java");
        std::fs::write(&path, "@Service\nclass Foo {}\n").unwrap();

        let unit = load_unit(&path).unwrap();
        assert_eq!(unit.declaration.name, "Foo");
        assert!(has_annotation(&unit.declaration, "Service"));
    }

    #[test]
    fn test_load_unit_with_invalid_utf8() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Foo.java");
        std::fs::write(&path, b"@Service(\"caf\xe9\")\nclass Foo {}\n").unwrap();

        let unit = load_unit(&path).unwrap();
        assert!(has_annotation(&unit.declaration, "Service"));
        assert!(unit.declaration.annotations[0].argument_contains("caf\u{FFFD}"));
    }
}
