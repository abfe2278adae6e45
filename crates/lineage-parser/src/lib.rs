//! # Lineage Parser
//!
//! Reads membership rosters and turns them into typed
//! [`Member`](lineage_core::member::Member)s ready for tree assembly.
//!
//! The pipeline has two phases:
//!
//! 1. **Read** - CSV or JSON text becomes flat rows ([`read_rows`])
//! 2. **Validate** - Rows become members: required fields, semesters,
//!    affiliations, name disambiguation and big resolution
//!
//! All problems of a phase are reported together as [`Diagnostic`]s inside a
//! [`ParseError`].
//!
//! ## Usage
//!
//! ```
//! # use lineage_parser::{parse, ParseConfig, ParseError, SourceFormat};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = "\
//! first_name,last_name,big,semester
//! Ada,Lovelace,none,Fall 2010
//! Grace,Hopper,Ada Lovelace,Spring 2011
//! ";
//!
//!     let members = parse(source, SourceFormat::Csv, &ParseConfig::default())?;
//!     assert_eq!(members.len(), 2);
//!     Ok(())
//! }
//! ```

mod affiliation;
mod error;
mod reader;
mod roster;
mod semester;
mod span;

pub use affiliation::parse_affiliations;
pub use error::{Diagnostic, ErrorCode, Label, ParseError, Severity};
pub use reader::{Row, SourceFormat, read_rows};
pub use roster::{Columns, IdSequence, ParseConfig, validate_rows};
pub use semester::parse_semester;
pub use span::Span;

use lineage_core::member::Member;
use log::info;

/// Parse roster text into members.
///
/// # Arguments
///
/// * `source` - The roster text
/// * `format` - Whether `source` is CSV or JSON
/// * `config` - Column names and big-resolution options
///
/// # Returns
///
/// The members in roster order, or a [`ParseError`] carrying every
/// diagnostic found.
pub fn parse(
    source: &str,
    format: SourceFormat,
    config: &ParseConfig,
) -> Result<Vec<Member>, ParseError> {
    info!(format:% = format; "Parsing roster");

    // Step 1: Read
    let rows = read_rows(source, format)?;

    // Step 2: Validate
    validate_rows(&rows, config, &mut IdSequence::new())
}
