//! Tree assembly.
//!
//! - [`Tree`] - The validated forest and its derived views
//! - [`TreeConfig`] - Seed, rank padding and pruning settings
//! - [`TreeError`] - Structural violations found while building

mod error;
mod graph;
mod tree;

pub use error::TreeError;
pub use tree::{PLACEHOLDER_CLASS, Tree, TreeConfig};
