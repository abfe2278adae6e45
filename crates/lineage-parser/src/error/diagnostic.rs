//! The core diagnostic type for the roster error system.

use std::fmt;

use crate::{
    error::{Severity, error_code::ErrorCode, label::Label},
    span::Span,
};

/// A diagnostic message with optional source location information.
///
/// Diagnostics carry:
/// - A severity level
/// - An optional error code for documentation and searchability
/// - A primary message describing the issue
/// - Zero or more labeled source spans (JSON rows have none)
/// - Optional help text with suggestions
///
/// # Example
///
/// ```text
/// error[E200]: big `Jon Smith` of `Ann Lee` does not match any member
///   --> roster.csv:4:1
///    |
///  4 | Ann,,Lee,Jon Smith,Fall 2011,
///    | ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^ row 3
///    |
///    = help: leave the big empty when it is unknown
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a primary label when a span is available.
    pub fn with_optional_label(self, span: Option<Span>, message: impl Into<String>) -> Self {
        match span {
            Some(span) => self.with_label(span, message),
            None => self,
        }
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}[{}]: {}", self.severity, code, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_builder() {
        let diag = Diagnostic::error("missing last name")
            .with_code(ErrorCode::E100)
            .with_label(Span::new(0..10), "row 1")
            .with_help("fill in the `last_name` column");

        assert!(diag.severity().is_error());
        assert_eq!(diag.code(), Some(ErrorCode::E100));
        assert_eq!(diag.labels().len(), 1);
        assert_eq!(diag.help(), Some("fill in the `last_name` column"));
    }

    #[test]
    fn test_optional_label() {
        let diag = Diagnostic::error("no span").with_optional_label(None, "ignored");
        assert!(diag.labels().is_empty());

        let diag = Diagnostic::error("span").with_optional_label(Some(Span::new(1..2)), "kept");
        assert_eq!(diag.labels()[0].message(), "kept");
        assert!(diag.labels()[0].is_primary());
    }

    #[test]
    fn test_display() {
        let diag = Diagnostic::error("unknown big").with_code(ErrorCode::E200);
        assert_eq!(diag.to_string(), "error[E200]: unknown big");

        let diag = Diagnostic::warning("odd row");
        assert_eq!(diag.to_string(), "warning: odd row");
    }
}
