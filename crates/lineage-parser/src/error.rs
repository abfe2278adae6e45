//! Error and diagnostic system for the roster parser.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans for rich error context
//! - Severity levels
//! - Diagnostic collector for accumulating multiple errors
//!
//! # Overview
//!
//! Every problem found while reading and validating a roster becomes a
//! [`Diagnostic`]. Validation does not stop at the first bad row; all diagnostics
//! are collected and returned together in a [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use lineage_parser::{Diagnostic, ErrorCode, Span};
//!
//! let row = Span::new(120..164);
//! let first = Span::new(40..80);
//!
//! let diag = Diagnostic::error("designation `Alpha 12` is used by more than one member")
//!     .with_code(ErrorCode::E203)
//!     .with_label(row, "duplicate designation")
//!     .with_secondary_label(first, "first used here")
//!     .with_help("each designation belongs to exactly one member");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
