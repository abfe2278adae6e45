//! CLI logic for the lineage tree tool.
//!
//! Reads a roster, assembles the lineage tree and writes it as DOT (and
//! optionally PDF).

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Format};

use std::{fs, path::Path};

use log::info;

use lineage::{LineageBuilder, LineageError, SourceFormat};

/// Run the lineage CLI application
///
/// # Errors
///
/// Returns `LineageError` for:
/// - File I/O errors
/// - Configuration loading errors or an undeterminable roster format
/// - Roster diagnostics
/// - Tree assembly errors
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), LineageError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing roster"
    );

    let format = source_format(args)?;

    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(seed) = args.seed {
        app_config = app_config.with_seed(seed);
    }

    let source = fs::read_to_string(&args.input)?;

    let builder = LineageBuilder::new(app_config);
    let members = builder.parse(&source, format)?;
    let tree = builder.build_tree(members)?;

    let dot = builder.render_dot(&tree)?;
    fs::write(&args.output, dot)?;
    info!(output_file = args.output; "DOT exported successfully");

    if let Some(pdf_path) = &args.pdf {
        write_pdf(&builder, &tree, pdf_path)?;
    }

    Ok(())
}

fn source_format(args: &Args) -> Result<SourceFormat, LineageError> {
    match args.format {
        Some(format) => Ok(format.into()),
        None => SourceFormat::from_path(Path::new(&args.input)).ok_or_else(|| {
            LineageError::Config(format!(
                "cannot infer the roster format of `{}`; pass --format csv or --format json",
                args.input
            ))
        }),
    }
}

#[cfg(feature = "graphviz")]
fn write_pdf(
    builder: &LineageBuilder,
    tree: &lineage::Tree,
    path: &str,
) -> Result<(), LineageError> {
    let pdf = builder.render_pdf(tree)?;
    fs::write(path, pdf)?;
    info!(output_file = path; "PDF exported successfully");
    Ok(())
}

#[cfg(not(feature = "graphviz"))]
fn write_pdf(
    _builder: &LineageBuilder,
    _tree: &lineage::Tree,
    _path: &str,
) -> Result<(), LineageError> {
    Err(LineageError::Config(
        "PDF output requires the `graphviz` feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(input: &str, format: Option<Format>) -> Args {
        Args {
            input: input.to_string(),
            output: "out.dot".to_string(),
            format,
            config: None,
            pdf: None,
            seed: None,
            log_level: "off".to_string(),
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(source_format(&args("roster.CSV", None)).unwrap(), SourceFormat::Csv);
        assert_eq!(source_format(&args("a/b.json", None)).unwrap(), SourceFormat::Json);
    }

    #[test]
    fn test_explicit_format_wins() {
        let format = source_format(&args("roster.txt", Some(Format::Json))).unwrap();
        assert_eq!(format, SourceFormat::Json);
    }

    #[test]
    fn test_unknown_extension() {
        let err = source_format(&args("roster.txt", None)).unwrap_err();
        assert!(matches!(err, LineageError::Config(_)), "{err:?}");
    }
}
