//! Language-specific analyzer implementations.

mod java;

pub use java::JavaAnalyzer;

use std::path::Path;

use super::LanguageAnalyzer;
use once_cell::sync::OnceCell;

/// Static storage for Java analyzer.
static JAVA_ANALYZER: OnceCell<JavaAnalyzer> = OnceCell::new();

/// Register all available language analyzers.
///
/// Idempotent; lookups call it implicitly.
pub fn register_analyzers() {
    JAVA_ANALYZER.get_or_init(JavaAnalyzer::new);
}

/// Get an analyzer for the given file extension.
///
/// Returns None if no analyzer is registered for the extension.
pub fn get_analyzer(ext: &str) -> Option<&'static dyn LanguageAnalyzer> {
    let java: &'static JavaAnalyzer = JAVA_ANALYZER.get_or_init(JavaAnalyzer::new);
    if java.handles_extension(ext) {
        Some(java as &'static dyn LanguageAnalyzer)
    } else {
        None
    }
}

/// Pick the analyzer for a path.
///
/// Fixtures are not always named `*.java`, so unknown extensions fall
/// back to the Java grammar.
pub fn analyzer_for_path(path: &Path) -> &'static dyn LanguageAnalyzer {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    get_analyzer(ext)
        .unwrap_or_else(|| JAVA_ANALYZER.get_or_init(JavaAnalyzer::new) as &'static dyn LanguageAnalyzer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_extension() {
        assert_eq!(get_analyzer("java").map(|a| a.language_id()), Some("java"));
        assert!(get_analyzer("py").is_none());
    }

    #[test]
    fn test_unknown_extension_falls_back_to_java() {
        let analyzer = analyzer_for_path(Path::new("fixtures/Foo.src"));
        assert_eq!(analyzer.language_id(), "java");
        assert!(analyzer.handles_extension("java"));
    }
}
