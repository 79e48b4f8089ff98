//! Error taxonomy for source inspection.
//!
//! Every failure below the verification layer is an `InspectError`. The
//! checks in `verify` never propagate these; they fold them into a failed
//! verdict tagged with the matching `FailureKind`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading, parsing, or querying a source file.
#[derive(Error, Debug)]
pub enum InspectError {
    #[error("source file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("no top-level type named `{name}`")]
    TypeNotFound { name: String },

    #[error("no {member} matching {signature}")]
    MemberNotFound {
        member: &'static str,
        signature: String,
    },

    #[error("{count} {member}s match {signature}; specify parameter types to disambiguate")]
    AmbiguousMatch {
        member: &'static str,
        signature: String,
        count: usize,
    },

    #[error("grammar error: {0}")]
    Grammar(String),
}

impl InspectError {
    /// Classify the error for reporting.
    pub fn kind(&self) -> FailureKind {
        match self {
            InspectError::NotFound { .. } => FailureKind::NotFound,
            InspectError::Io { .. } => FailureKind::Io,
            InspectError::Parse { .. } => FailureKind::ParseError,
            InspectError::TypeNotFound { .. } => FailureKind::TypeNotFound,
            InspectError::MemberNotFound { .. } => FailureKind::MemberNotFound,
            InspectError::AmbiguousMatch { .. } => FailureKind::AmbiguousMatch,
            InspectError::Grammar(_) => FailureKind::Grammar,
        }
    }
}

/// Serializable failure classification attached to failed verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    Io,
    ParseError,
    TypeNotFound,
    MemberNotFound,
    AmbiguousMatch,
    Grammar,
    /// The file was inspected successfully but the expected structure is absent.
    Missing,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NotFound => "NotFound",
            FailureKind::Io => "Io",
            FailureKind::ParseError => "ParseError",
            FailureKind::TypeNotFound => "TypeNotFound",
            FailureKind::MemberNotFound => "MemberNotFound",
            FailureKind::AmbiguousMatch => "AmbiguousMatch",
            FailureKind::Grammar => "Grammar",
            FailureKind::Missing => "Missing",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub type Result<T> = std::result::Result<T, InspectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = InspectError::NotFound {
            path: PathBuf::from("Missing.java"),
        };
        assert_eq!(err.kind(), FailureKind::NotFound);
        assert!(err.to_string().contains("Missing.java"));

        let err = InspectError::AmbiguousMatch {
            member: "method",
            signature: "greet(..)".to_string(),
            count: 2,
        };
        assert_eq!(err.kind(), FailureKind::AmbiguousMatch);
        assert!(err.to_string().starts_with("2 methods match greet(..)"));
    }
}
