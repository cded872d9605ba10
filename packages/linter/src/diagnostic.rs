use marble_ast::NodePath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A problem found at one node of a rule tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Path of the offending node
    pub node_path: NodePath,

    pub severity: Severity,

    /// Stable machine-readable code, see [`codes`]
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Optional suggestion for fixing the issue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn error(code: impl Into<String>, message: impl Into<String>, node_path: NodePath) -> Self {
        Self {
            node_path,
            severity: Severity::Error,
            code: code.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>, node_path: NodePath) -> Self {
        Self {
            node_path,
            severity: Severity::Warning,
            code: code.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}: {}", self.node_path, self.severity, self.code, self.message)
    }
}

pub mod codes {
    pub const ARITY_MISMATCH: &str = "arity-mismatch";
    pub const UNKNOWN_FUNCTION: &str = "unknown-function";
    pub const MISSING_NAMED_ARGUMENT: &str = "missing-named-argument";
    pub const UNEXPECTED_NAMED_ARGUMENT: &str = "unexpected-named-argument";
    pub const INCOMPLETE_EXPRESSION: &str = "incomplete-expression";
    pub const UNKNOWN_TABLE: &str = "unknown-table";
    pub const UNKNOWN_FIELD: &str = "unknown-field";
    pub const TYPE_MISMATCH: &str = "type-mismatch";
    pub const DIVISION_BY_ZERO: &str = "division-by-zero";
    pub const REDUNDANT_DOUBLE_NEGATION: &str = "redundant-double-negation";

    /// Synthetic warning standing in for an unreachable remote validator
    pub const REMOTE_UNAVAILABLE: &str = "RemoteUnavailable";
}
