//! Export of lineage trees.
//!
//! This module provides the [`Exporter`] trait that turns a built [`Tree`]
//! into an output document. It is the final stage of the pipeline.
//!
//! # Pipeline Position
//!
//! ```text
//! Roster (CSV / JSON)
//!     ↓ parse
//! Members + custom entities
//!     ↓ build
//! Tree (families, ranks, cohorts)
//!     ↓ export (this module)
//! DOT text / PDF bytes
//! ```
//!
//! # Available Backends
//!
//! - [`dot`] - Graphviz DOT text via [`dot::DotBuilder`] and [`dot::Dot`]
//! - `pdf` - PDF rendered by the Graphviz `dot` binary (feature `graphviz`)
//!
//! # Error Handling
//!
//! Export operations return [`Error`]. It converts into
//! [`LineageError::Export`](crate::LineageError::Export) at the crate boundary.

pub mod dot;
#[cfg(feature = "graphviz")]
pub mod pdf;

use lineage_core::rank::Rank;

use crate::structure::Tree;

/// Abstraction for tree export backends.
pub trait Exporter {
    /// Exports a tree to the backend's output format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the tree cannot be converted to the
    /// target format, or [`Error::Io`] if producing the output fails.
    fn export_tree<R: Rank>(&mut self, tree: &Tree<R>) -> Result<(), Error>;
}

/// Errors that can occur during export.
#[derive(Debug)]
pub enum Error {
    /// A rendering or conversion failure described by `message`.
    Render(String),
    /// An I/O error encountered while producing output.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Self::Render(err.to_string())
    }
}
