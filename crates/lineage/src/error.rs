//! Error types for lineage operations.
//!
//! This module provides the main error type [`LineageError`] which wraps the
//! errors of every pipeline stage.

use std::io;

use thiserror::Error;

use lineage_parser::ParseError;

use crate::structure::TreeError;

/// The main error type for lineage operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the roster source next to the diagnostics so
/// callers can show source snippets for every reported span.
#[derive(Debug, Error)]
pub enum LineageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl From<crate::export::Error> for LineageError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl LineageError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
