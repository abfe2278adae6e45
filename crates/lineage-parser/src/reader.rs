//! Roster readers.
//!
//! Readers turn CSV or JSON text into flat [`Row`]s: string-keyed field maps in
//! column order. They have no opinion on what the columns mean; that is the job
//! of the [`roster`](crate::roster) validation pass.

use std::{fmt, path::Path};

use indexmap::IndexMap;
use log::{debug, trace};
use serde_json::Value;

use crate::{
    error::{Diagnostic, ErrorCode, ParseError},
    span::Span,
};

/// Format of a roster source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// A JSON array of objects.
    Json,
}

impl SourceFormat {
    /// Guess the format from a file extension (`.csv`, `.json`).
    ///
    /// # Examples
    ///
    /// ```
    /// use lineage_parser::SourceFormat;
    ///
    /// assert_eq!(SourceFormat::from_path("roster.CSV"), Some(SourceFormat::Csv));
    /// assert_eq!(SourceFormat::from_path("roster.json"), Some(SourceFormat::Json));
    /// assert_eq!(SourceFormat::from_path("roster.txt"), None);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Csv => write!(f, "csv"),
            SourceFormat::Json => write!(f, "json"),
        }
    }
}

/// One record of the roster.
///
/// Blank values are dropped at read time, so [`Row::get`] returning `Some`
/// always means the field has content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    number: usize,
    span: Option<Span>,
    fields: IndexMap<String, String>,
}

impl Row {
    /// Creates a row. `number` is the 1-based position of the record in the roster.
    pub fn new(number: usize, span: Option<Span>, fields: IndexMap<String, String>) -> Self {
        Self {
            number,
            span,
            fields,
        }
    }

    /// The 1-based position of the record, not counting the CSV header.
    pub fn number(&self) -> usize {
        self.number
    }

    /// The byte span of the record in the source, if known.
    pub fn span(&self) -> Option<Span> {
        self.span
    }

    /// Returns the trimmed value of a column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Iterates over all non-blank fields in column order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Read all rows of a roster.
///
/// # Errors
///
/// Returns a [`ParseError`] with an `E0xx` diagnostic when the source is not
/// valid CSV/JSON or does not have the expected shape.
pub fn read_rows(source: &str, format: SourceFormat) -> Result<Vec<Row>, ParseError> {
    let rows = match format {
        SourceFormat::Csv => read_csv(source)?,
        SourceFormat::Json => read_json(source)?,
    };
    debug!(format:% = format, rows = rows.len(); "Roster read");
    Ok(rows)
}

fn insert_field(fields: &mut IndexMap<String, String>, column: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        fields.insert(column.trim().to_string(), value.to_string());
    }
}

fn read_csv(source: &str) -> Result<Vec<Row>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(source.as_bytes());

    let headers = reader.headers().map_err(csv_diagnostic)?.clone();
    trace!(headers:? = headers; "CSV headers");

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_diagnostic)?;
        let start = record
            .position()
            .map(|position| position.byte() as usize)
            .unwrap_or_default();
        records.push((start, record));
    }

    // A record ends where the next one starts. With CRLF terminators the
    // reported position sits on the `\n` of the previous line, so line breaks
    // are trimmed from both ends.
    let mut rows = Vec::with_capacity(records.len());
    for (idx, (position, record)) in records.iter().enumerate() {
        let next_start = records
            .get(idx + 1)
            .map(|(next, _)| *next)
            .unwrap_or(source.len());
        let text = &source[*position..next_start];
        let start = position + (text.len() - text.trim_start_matches(['\r', '\n']).len());
        let end = start + source[start..next_start].trim_end_matches(['\r', '\n']).len();

        let mut fields = IndexMap::new();
        for (column, value) in headers.iter().zip(record.iter()) {
            insert_field(&mut fields, column, value);
        }
        rows.push(Row::new(idx + 1, Some(Span::new(start..end)), fields));
    }
    Ok(rows)
}

fn csv_diagnostic(err: csv::Error) -> ParseError {
    let diagnostic = Diagnostic::error(format!("malformed CSV: {err}"))
        .with_code(ErrorCode::E001)
        .with_help("every record needs as many fields as the header row");
    match err.position() {
        Some(position) => {
            let start = position.byte() as usize;
            diagnostic.with_label(Span::new(start..start), "here").into()
        }
        None => diagnostic.into(),
    }
}

fn read_json(source: &str) -> Result<Vec<Row>, ParseError> {
    let document: Value = serde_json::from_str(source).map_err(|err| {
        let offset = line_column_to_offset(source, err.line(), err.column());
        Diagnostic::error(format!("malformed JSON: {err}"))
            .with_code(ErrorCode::E002)
            .with_label(Span::new(offset..offset), "here")
    })?;

    let Value::Array(records) = document else {
        return Err(Diagnostic::error("JSON roster must be an array of member objects")
            .with_code(ErrorCode::E003)
            .into());
    };

    let mut rows = Vec::with_capacity(records.len());
    for (idx, record) in records.into_iter().enumerate() {
        let number = idx + 1;
        let Value::Object(object) = record else {
            return Err(Diagnostic::error(format!("record {number} is not an object"))
                .with_code(ErrorCode::E003)
                .into());
        };

        let mut fields = IndexMap::new();
        for (column, value) in object {
            match value {
                Value::Null => {}
                Value::String(text) => insert_field(&mut fields, &column, &text),
                Value::Number(number) => insert_field(&mut fields, &column, &number.to_string()),
                Value::Bool(flag) => insert_field(&mut fields, &column, &flag.to_string()),
                Value::Array(_) | Value::Object(_) => {
                    return Err(Diagnostic::error(format!(
                        "field `{column}` of record {number} is not a scalar value"
                    ))
                    .with_code(ErrorCode::E004)
                    .with_help("use strings, numbers, booleans or null")
                    .into());
                }
            }
        }
        rows.push(Row::new(number, None, fields));
    }
    Ok(rows)
}

/// Convert serde_json's 1-based line/column position into a byte offset.
fn line_column_to_offset(source: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(source.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_rows() {
        let source = "first_name,last_name,big\nAda,Byron,\nGrace,Hopper,Ada Byron\n";
        let rows = read_rows(source, SourceFormat::Csv).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].number(), 1);
        assert_eq!(rows[0].get("first_name"), Some("Ada"));
        assert_eq!(rows[0].get("big"), None);
        assert_eq!(rows[1].get("big"), Some("Ada Byron"));
    }

    #[test]
    fn test_csv_row_spans_cover_the_line() {
        let source = "first_name,last_name\r\nAda,Byron\r\nGrace,Hopper";
        let rows = read_rows(source, SourceFormat::Csv).unwrap();

        let first = rows[0].span().unwrap();
        assert_eq!(&source[first.start()..first.end()], "Ada,Byron");
        let second = rows[1].span().unwrap();
        assert_eq!(&source[second.start()..second.end()], "Grace,Hopper");
    }

    #[test]
    fn test_csv_trims_values() {
        let source = "first_name, last_name\n  Ada , Byron \n";
        let rows = read_rows(source, SourceFormat::Csv).unwrap();
        assert_eq!(rows[0].get("last_name"), Some("Byron"));
        assert_eq!(rows[0].get("first_name"), Some("Ada"));
    }

    #[test]
    fn test_csv_wrong_field_count() {
        let source = "first_name,last_name\nAda,Byron,extra\n";
        let err = read_rows(source, SourceFormat::Csv).unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E001));
    }

    #[test]
    fn test_read_json_rows() {
        let source = r#"[
            {"first_name": "Ada", "last_name": "Byron", "big": null, "year": 1843},
            {"first_name": "Grace", "last_name": "Hopper", "reorganization": true}
        ]"#;
        let rows = read_rows(source, SourceFormat::Json).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("big"), None);
        assert_eq!(rows[0].get("year"), Some("1843"));
        assert_eq!(rows[1].get("reorganization"), Some("true"));
        assert_eq!(rows[1].span(), None);
    }

    #[test]
    fn test_json_must_be_array() {
        let err = read_rows(r#"{"first_name": "Ada"}"#, SourceFormat::Json).unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E003));
    }

    #[test]
    fn test_json_nested_value_rejected() {
        let err = read_rows(r#"[{"first_name": ["Ada"]}]"#, SourceFormat::Json).unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E004));
    }

    #[test]
    fn test_malformed_json_points_at_error() {
        let source = "[\n  {\"first_name\": }\n]";
        let err = read_rows(source, SourceFormat::Json).unwrap_err();
        let diagnostic = &err.diagnostics()[0];

        assert_eq!(diagnostic.code(), Some(ErrorCode::E002));
        let span = diagnostic.labels()[0].span();
        assert_eq!(&source[span.start()..span.start() + 1], "}");
    }
}
