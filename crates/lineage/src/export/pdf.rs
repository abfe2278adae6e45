//! PDF export through the Graphviz `dot` binary.

use graphviz_rust::{
    cmd::{CommandArg, Format},
    exec_dot,
};
use log::info;

use lineage_core::rank::Rank;

use crate::{
    export::{Error, Exporter, dot::Dot},
    structure::Tree,
};

/// Renders a tree to PDF by laying out its DOT document with Graphviz.
#[derive(Debug)]
pub struct Pdf {
    dot: Dot,
    bytes: Vec<u8>,
}

impl Pdf {
    /// Creates a PDF exporter on top of a configured DOT exporter.
    pub fn new(dot: Dot) -> Self {
        Self {
            dot,
            bytes: Vec::new(),
        }
    }

    /// The PDF produced by the last export.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl Exporter for Pdf {
    fn export_tree<R: Rank>(&mut self, tree: &Tree<R>) -> Result<(), Error> {
        self.dot.export_tree(tree)?;
        self.bytes = exec_dot(
            self.dot.as_str().to_string(),
            vec![CommandArg::Format(Format::Pdf)],
        )
        .map_err(Error::Io)?;

        info!(bytes = self.bytes.len(); "PDF rendered");
        Ok(())
    }
}
