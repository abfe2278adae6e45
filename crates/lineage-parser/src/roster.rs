//! Roster validation.
//!
//! Turns the flat [`Row`]s produced by the [readers](crate::reader) into typed
//! [`Member`]s. Every problem found is collected as a [`Diagnostic`] so one run
//! reports all of them.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::{debug, info, trace};

use lineage_core::{
    entity::{Data, ParentKey},
    identifier::Id,
    member::{Affiliation, Member, MemberKind},
    rank::Semester,
};

use crate::{
    affiliation::parse_affiliations,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    reader::Row,
    semester::parse_semester,
    span::Span,
};

/// Names of the roster columns the parser interprets.
///
/// All other columns are carried through as extra member data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    pub first_name: String,
    pub preferred_name: String,
    pub last_name: String,
    pub big: String,
    pub semester: String,
    pub affiliations: String,
    pub reorganization: String,
}

impl Columns {
    fn is_known(&self, column: &str) -> bool {
        [
            &self.first_name,
            &self.preferred_name,
            &self.last_name,
            &self.big,
            &self.semester,
            &self.affiliations,
            &self.reorganization,
        ]
        .into_iter()
        .any(|known| known == column)
    }
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            first_name: "first_name".to_string(),
            preferred_name: "preferred_name".to_string(),
            last_name: "last_name".to_string(),
            big: "big".to_string(),
            semester: "semester".to_string(),
            affiliations: "affiliations".to_string(),
            reorganization: "reorganization".to_string(),
        }
    }
}

/// Options controlling how roster rows become members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConfig {
    columns: Columns,
    no_parent_marker: String,
    chapter: Option<String>,
}

impl ParseConfig {
    /// Creates a parse configuration.
    ///
    /// # Arguments
    ///
    /// * `columns` - Column names of the interpreted fields.
    /// * `no_parent_marker` - Value of the big column marking a member as
    ///   deliberately rootless. Compared case-insensitively.
    /// * `chapter` - Chapter whose affiliation makes a member a brother.
    ///   When `None`, any affiliation does.
    pub fn new(columns: Columns, no_parent_marker: impl Into<String>, chapter: Option<String>) -> Self {
        Self {
            columns,
            no_parent_marker: no_parent_marker.into(),
            chapter,
        }
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn no_parent_marker(&self) -> &str {
        &self.no_parent_marker
    }

    pub fn chapter(&self) -> Option<&str> {
        self.chapter.as_deref()
    }

    fn is_home_chapter(&self, affiliation: &Affiliation) -> bool {
        match &self.chapter {
            Some(chapter) => affiliation.chapter().eq_ignore_ascii_case(chapter),
            None => true,
        }
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self::new(Columns::default(), "none", None)
    }
}

/// Source of the sequence numbers used to tell apart members that share a
/// name, designation and semester.
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: u32,
}

impl IdSequence {
    /// Creates a sequence starting at 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u32) -> Self {
        Self { next: first }
    }

    /// Returns the next number of the sequence.
    pub fn next_value(&mut self) -> u32 {
        let value = self.next;
        self.next += 1;
        value
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

/// A row that passed field validation, waiting for names and bigs to be resolved.
struct Draft {
    row: usize,
    span: Option<Span>,
    first_name: String,
    preferred_name: Option<String>,
    last_name: String,
    semester: Option<Semester>,
    affiliations: Vec<Affiliation>,
    kind: MemberKind,
    big: Option<String>,
    reorganization: bool,
    extra: Data,
}

impl Draft {
    fn display_name(&self) -> String {
        let given = self.preferred_name.as_deref().unwrap_or(&self.first_name);
        format!("{given} {}", self.last_name)
    }

    /// Lowercased names other rows may use to refer to this member as their big.
    fn reference_names(&self) -> Vec<String> {
        let mut names = vec![format!("{} {}", self.first_name, self.last_name).to_lowercase()];
        if let Some(preferred) = &self.preferred_name {
            names.push(format!("{preferred} {}", self.last_name).to_lowercase());
        }
        names
    }

    fn designation<'a>(&'a self, config: &ParseConfig) -> Option<&'a Affiliation> {
        self.affiliations
            .iter()
            .find(|affiliation| config.is_home_chapter(affiliation))
            .or_else(|| self.affiliations.first())
    }
}

const TRUTHY: [&str; 5] = ["true", "yes", "y", "1", "x"];
const FALSY: [&str; 5] = ["false", "no", "n", "0", "-"];

fn parse_flag(value: &str) -> Option<bool> {
    if TRUTHY.iter().any(|word| value.eq_ignore_ascii_case(word)) {
        Some(true)
    } else if FALSY.iter().any(|word| value.eq_ignore_ascii_case(word)) {
        Some(false)
    } else {
        None
    }
}

/// Validates rows into members.
///
/// # Errors
///
/// Returns every field (`E1xx`) and cross-row (`E2xx`) diagnostic found.
/// Warnings are logged when validation succeeds and returned alongside the
/// errors when it fails.
pub fn validate_rows(
    rows: &[Row],
    config: &ParseConfig,
    sequence: &mut IdSequence,
) -> Result<Vec<Member>, ParseError> {
    let mut collector = DiagnosticCollector::new();

    let drafts: Vec<Draft> = rows
        .iter()
        .filter_map(|row| validate_row(row, config, &mut collector))
        .collect();
    trace!(rows = rows.len(), drafts = drafts.len(); "Rows validated");

    check_designations(&drafts, &mut collector);
    let ids = assign_ids(&drafts, config, sequence);
    let parents = resolve_bigs(&drafts, &ids, config, &mut collector);

    collector.finish()?;

    let members: Vec<Member> = drafts
        .into_iter()
        .zip(ids)
        .zip(parents)
        .map(|((draft, id), parent)| {
            Member::new(id, draft.first_name, draft.last_name, draft.kind)
                .with_preferred_name(draft.preferred_name)
                .with_semester(draft.semester)
                .with_affiliations(draft.affiliations)
                .with_parent(parent)
                .with_reorganization(draft.reorganization)
                .with_extra(draft.extra)
        })
        .collect();

    info!(members = members.len(); "Roster parsed");
    Ok(members)
}

fn validate_row(row: &Row, config: &ParseConfig, collector: &mut DiagnosticCollector) -> Option<Draft> {
    let columns = config.columns();
    let span = row.span();
    let number = row.number();

    let first_name = row.get(&columns.first_name);
    let last_name = row.get(&columns.last_name);
    for (column, value) in [(&columns.first_name, first_name), (&columns.last_name, last_name)] {
        if value.is_none() {
            collector.emit(
                Diagnostic::error(format!("row {number} has no `{column}`"))
                    .with_code(ErrorCode::E100)
                    .with_optional_label(span, "in this row"),
            );
        }
    }

    let semester = row
        .get(&columns.semester)
        .and_then(|text| match parse_semester(text) {
            Ok(semester) => Some(semester),
            Err(message) => {
                collector.emit(
                    Diagnostic::error(format!("row {number}: {message}"))
                        .with_code(ErrorCode::E101)
                        .with_optional_label(span, "in this row"),
                );
                None
            }
        });

    let affiliations = match row.get(&columns.affiliations).map(parse_affiliations) {
        None => Vec::new(),
        Some(Ok(affiliations)) => affiliations,
        Some(Err(message)) => {
            collector.emit(
                Diagnostic::error(format!("row {number}: {message}"))
                    .with_code(ErrorCode::E102)
                    .with_optional_label(span, "in this row")
                    .with_help("separate affiliations with `,`, `;` or `/`"),
            );
            Vec::new()
        }
    };

    let mut chapters = HashSet::new();
    for affiliation in &affiliations {
        if !chapters.insert(affiliation.chapter().to_lowercase()) {
            collector.emit(
                Diagnostic::error(format!(
                    "row {number} lists chapter `{}` more than once",
                    affiliation.chapter()
                ))
                .with_code(ErrorCode::E202)
                .with_optional_label(span, "in this row"),
            );
        }
    }

    let reorganization = match row.get(&columns.reorganization) {
        None => false,
        Some(value) => parse_flag(value).unwrap_or_else(|| {
            collector.emit(
                Diagnostic::warning(format!(
                    "row {number}: `{value}` in `{}` is not a yes/no value, treating it as no",
                    columns.reorganization
                ))
                .with_code(ErrorCode::E103)
                .with_optional_label(span, "in this row")
                .with_help("use `yes` or `no`"),
            );
            false
        }),
    };

    let (first_name, last_name) = (first_name?, last_name?);

    let kind = if affiliations.iter().any(|a| config.is_home_chapter(a)) {
        MemberKind::Brother
    } else {
        MemberKind::Candidate
    };

    let extra: Data = row
        .fields()
        .filter(|(column, _)| !columns.is_known(column))
        .map(|(column, value)| (column.to_string(), value.to_string()))
        .collect();

    Some(Draft {
        row: number,
        span,
        first_name: first_name.to_string(),
        preferred_name: row.get(&columns.preferred_name).map(str::to_string),
        last_name: last_name.to_string(),
        semester,
        affiliations,
        kind,
        big: row.get(&columns.big).map(str::to_string),
        reorganization,
        extra,
    })
}

fn check_designations(drafts: &[Draft], collector: &mut DiagnosticCollector) {
    let mut seen: HashMap<(String, u32), &Draft> = HashMap::new();
    for draft in drafts {
        for affiliation in &draft.affiliations {
            let key = (affiliation.chapter().to_lowercase(), affiliation.designation());
            match seen.get(&key) {
                Some(first) => {
                    let mut diagnostic = Diagnostic::error(format!(
                        "`{affiliation}` is used by rows {} and {}",
                        first.row, draft.row
                    ))
                    .with_code(ErrorCode::E203)
                    .with_optional_label(draft.span, "duplicate designation");
                    if let Some(first_span) = first.span {
                        diagnostic = diagnostic.with_secondary_label(first_span, "first used here");
                    }
                    collector.emit(diagnostic);
                }
                None => {
                    seen.insert(key, draft);
                }
            }
        }
    }
}

/// Pick a unique id for every draft.
///
/// Unique display names are used as-is. Members sharing a display name get
/// their designation appended, then their semester, and finally a number from
/// `sequence`.
fn assign_ids(drafts: &[Draft], config: &ParseConfig, sequence: &mut IdSequence) -> Vec<Id> {
    let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (idx, draft) in drafts.iter().enumerate() {
        groups.entry(draft.display_name()).or_default().push(idx);
    }

    let mut names: Vec<Option<String>> = vec![None; drafts.len()];
    let mut taken: HashSet<String> = groups
        .iter()
        .filter(|(_, members)| members.len() == 1)
        .map(|(name, _)| name.clone())
        .collect();

    for (base, members) in &groups {
        if members.len() == 1 {
            names[members[0]] = Some(base.clone());
            continue;
        }
        debug!(name = base.as_str(), count = members.len(); "Disambiguating shared name");

        let tiers: [&dyn Fn(&Draft) -> Option<String>; 2] = [
            &|draft| draft.designation(config).map(|a| format!("{base} ({a})")),
            &|draft| draft.semester.map(|s| format!("{base} ({s})")),
        ];

        let mut pending: Vec<usize> = members.clone();
        for tier in tiers {
            let candidates: Vec<(usize, Option<String>)> =
                pending.iter().map(|&idx| (idx, tier(&drafts[idx]))).collect();
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for name in candidates.iter().filter_map(|(_, name)| name.as_deref()) {
                *counts.entry(name).or_default() += 1;
            }

            let mut still_pending = Vec::new();
            for (idx, candidate) in &candidates {
                match candidate {
                    Some(name) if counts[name.as_str()] == 1 && !taken.contains(name) => {
                        taken.insert(name.clone());
                        names[*idx] = Some(name.clone());
                    }
                    _ => still_pending.push(*idx),
                }
            }
            pending = still_pending;
        }

        for idx in pending {
            let name = loop {
                let candidate = format!("{base} #{}", sequence.next_value());
                if !taken.contains(&candidate) {
                    break candidate;
                }
            };
            taken.insert(name.clone());
            names[idx] = Some(name);
        }
    }

    names
        .into_iter()
        .zip(drafts)
        .map(|(name, draft)| Id::new(&name.unwrap_or_else(|| draft.display_name())))
        .collect()
}

fn resolve_bigs(
    drafts: &[Draft],
    ids: &[Id],
    config: &ParseConfig,
    collector: &mut DiagnosticCollector,
) -> Vec<ParentKey> {
    let mut lookup: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, draft) in drafts.iter().enumerate() {
        let mut names = draft.reference_names();
        names.push(ids[idx].to_string().to_lowercase());
        names.sort();
        names.dedup();
        for name in names {
            lookup.entry(name).or_default().push(idx);
        }
    }

    drafts
        .iter()
        .map(|draft| {
            let Some(big) = &draft.big else {
                return ParentKey::Unknown;
            };
            if big.eq_ignore_ascii_case(config.no_parent_marker()) {
                return ParentKey::None;
            }

            match lookup.get(&big.to_lowercase()).map(Vec::as_slice) {
                Some([idx]) => ParentKey::Id(ids[*idx]),
                Some(candidates) if candidates.len() > 1 => {
                    let names: Vec<String> =
                        candidates.iter().map(|idx| format!("`{}`", ids[*idx])).collect();
                    collector.emit(
                        Diagnostic::error(format!(
                            "big `{big}` of row {} is ambiguous",
                            draft.row
                        ))
                        .with_code(ErrorCode::E201)
                        .with_optional_label(draft.span, "in this row")
                        .with_help(format!("use one of {}", names.join(", "))),
                    );
                    ParentKey::Unknown
                }
                _ => {
                    collector.emit(
                        Diagnostic::error(format!(
                            "big `{big}` of row {} is not on the roster",
                            draft.row
                        ))
                        .with_code(ErrorCode::E200)
                        .with_optional_label(draft.span, "in this row")
                        .with_help(format!(
                            "leave the big empty if unknown, or use `{}` for no big",
                            config.no_parent_marker()
                        )),
                    );
                    ParentKey::Unknown
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{SourceFormat, read_rows};

    fn validate(source: &str, config: &ParseConfig) -> Result<Vec<Member>, ParseError> {
        let rows = read_rows(source, SourceFormat::Csv).unwrap();
        validate_rows(&rows, config, &mut IdSequence::new())
    }

    fn codes(err: &ParseError) -> Vec<ErrorCode> {
        err.diagnostics().iter().filter_map(|d| d.code()).collect()
    }

    #[test]
    fn test_basic_roster() {
        let source = "\
first_name,last_name,big,semester,affiliations
Ada,Lovelace,none,Fall 2010,Alpha 1
Grace,Hopper,Ada Lovelace,Spring 2011,Alpha 2
Alan,Turing,,Fall 2011,
";
        let members = validate(source, &ParseConfig::default()).unwrap();

        assert_eq!(members.len(), 3);
        assert_eq!(members[0].id(), "Ada Lovelace");
        assert_eq!(members[0].parent(), ParentKey::None);
        assert_eq!(members[1].parent(), ParentKey::Id(Id::new("Ada Lovelace")));
        assert_eq!(members[2].parent(), ParentKey::Unknown);
        assert_eq!(members[0].kind(), MemberKind::Brother);
        assert_eq!(members[2].kind(), MemberKind::Candidate);
    }

    #[test]
    fn test_big_by_preferred_name_and_case() {
        let source = "\
first_name,preferred_name,last_name,big
Margaret,Peggy,Hamilton,NONE
Katherine,,Johnson,peggy hamilton
Dorothy,,Vaughan,MARGARET HAMILTON
";
        let members = validate(source, &ParseConfig::default()).unwrap();
        assert_eq!(members[0].id(), "Peggy Hamilton");
        assert_eq!(members[0].parent(), ParentKey::None);
        assert_eq!(members[1].parent(), ParentKey::Id(members[0].id()));
        assert_eq!(members[2].parent(), ParentKey::Id(members[0].id()));
    }

    #[test]
    fn test_chapter_decides_kind() {
        let source = "\
first_name,last_name,affiliations
Ada,Lovelace,Alpha 1
Grace,Hopper,Beta 3
";
        let config = ParseConfig::new(Columns::default(), "none", Some("alpha".to_string()));
        let members = validate(source, &config).unwrap();
        assert_eq!(members[0].kind(), MemberKind::Brother);
        assert_eq!(members[1].kind(), MemberKind::Candidate);
    }

    #[test]
    fn test_extra_columns_and_reorganization() {
        let source = "\
first_name,last_name,reorganization,major
Ada,Lovelace,Yes,Mathematics
Grace,Hopper,no,
";
        let members = validate(source, &ParseConfig::default()).unwrap();
        assert!(members[0].is_reorganization());
        assert!(!members[1].is_reorganization());
        assert_eq!(members[0].extra().get("major").map(String::as_str), Some("Mathematics"));
        assert!(members[1].extra().is_empty());
    }

    #[test]
    fn test_unrecognized_reorganization_is_a_warning() {
        let source = "\
first_name,last_name,reorganization
Ada,Lovelace,maybe
";
        let members = validate(source, &ParseConfig::default()).unwrap();
        assert!(!members[0].is_reorganization());
    }

    #[test]
    fn test_warnings_are_reported_with_errors() {
        let source = "\
first_name,last_name,big,reorganization
Ada,Lovelace,Nobody,perhaps
";
        let err = validate(source, &ParseConfig::default()).unwrap_err();
        assert_eq!(codes(&err), vec![ErrorCode::E103, ErrorCode::E200]);
        assert!(err.diagnostics()[0].severity().is_warning());
        assert!(err.diagnostics()[1].severity().is_error());
    }

    #[test]
    fn test_disambiguation_tiers() {
        let source = "\
first_name,last_name,semester,affiliations
John,Smith,Fall 2010,Alpha 1
John,Smith,Fall 2011,
John,Smith,Fall 2012,
John,Smith,,
John,Smith,,
";
        let members = validate(source, &ParseConfig::default()).unwrap();
        let ids: Vec<String> = members.iter().map(|m| m.id().to_string()).collect();
        assert_eq!(
            ids,
            vec![
                "John Smith (Alpha 1)",
                "John Smith (Fall 2011)",
                "John Smith (Fall 2012)",
                "John Smith #1",
                "John Smith #2",
            ]
        );
    }

    #[test]
    fn test_sequence_is_threaded() {
        let source = "first_name,last_name\nJo,Doe\nJo,Doe\n";
        let rows = read_rows(source, SourceFormat::Csv).unwrap();
        let mut sequence = IdSequence::starting_at(7);
        let members = validate_rows(&rows, &ParseConfig::default(), &mut sequence).unwrap();
        assert_eq!(members[0].id(), "Jo Doe #7");
        assert_eq!(members[1].id(), "Jo Doe #8");
        assert_eq!(sequence.next_value(), 9);
    }

    #[test]
    fn test_big_by_disambiguated_id() {
        let source = "\
first_name,last_name,semester,big
John,Smith,Fall 2010,none
John,Smith,Fall 2011,none
Ada,Lovelace,Fall 2012,John Smith (Fall 2011)
";
        let members = validate(source, &ParseConfig::default()).unwrap();
        assert_eq!(members[2].parent(), ParentKey::Id(members[1].id()));
    }

    #[test]
    fn test_ambiguous_and_unknown_bigs() {
        let source = "\
first_name,last_name,semester,big
John,Smith,Fall 2010,none
John,Smith,Fall 2011,none
Ada,Lovelace,Fall 2012,John Smith
Grace,Hopper,Fall 2012,Alan Turing
";
        let err = validate(source, &ParseConfig::default()).unwrap_err();
        assert_eq!(codes(&err), vec![ErrorCode::E201, ErrorCode::E200]);
    }

    #[test]
    fn test_field_errors_are_collected() {
        let source = "\
first_name,last_name,semester,affiliations
,Lovelace,Fall 2010,
Grace,Hopper,Winter 2011,
Alan,Turing,,Alpha
Edsger,Dijkstra,,\"Alpha 1, alpha 2\"
";
        let err = validate(source, &ParseConfig::default()).unwrap_err();
        assert_eq!(
            codes(&err),
            vec![ErrorCode::E100, ErrorCode::E101, ErrorCode::E102, ErrorCode::E202]
        );
        let label = err.diagnostics()[0].labels()[0].span();
        assert_eq!(&source[label.start()..label.end()], ",Lovelace,Fall 2010,");
    }

    #[test]
    fn test_duplicate_designation() {
        let source = "\
first_name,last_name,affiliations
Ada,Lovelace,Alpha 1
Grace,Hopper,Alpha 1
";
        let err = validate(source, &ParseConfig::default()).unwrap_err();
        let diagnostic = &err.diagnostics()[0];
        assert_eq!(diagnostic.code(), Some(ErrorCode::E203));
        assert_eq!(diagnostic.labels().len(), 2);
    }
}
