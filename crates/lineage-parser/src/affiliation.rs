//! Affiliation lists such as `Alpha Beta 123, Gamma 4`.

use lineage_core::member::Affiliation;
use winnow::{
    Parser as _,
    ascii::{digit1, space0},
    combinator::{delimited, eof, separated, terminated},
    error::ModalResult,
    token::{one_of, take_while},
};

fn chapter<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| !c.is_ascii_digit() && !matches!(c, ',' | ';' | '/'))
        .map(str::trim)
        .verify(|name: &str| !name.is_empty())
        .parse_next(input)
}

fn designation(input: &mut &str) -> ModalResult<u32> {
    digit1.try_map(str::parse::<u32>).parse_next(input)
}

fn affiliation(input: &mut &str) -> ModalResult<Affiliation> {
    delimited(space0, (chapter, designation), space0)
        .map(|(chapter, designation)| Affiliation::new(chapter, designation))
        .parse_next(input)
}

fn affiliations(input: &mut &str) -> ModalResult<Vec<Affiliation>> {
    terminated(separated(1.., affiliation, one_of([',', ';', '/'])), eof).parse_next(input)
}

/// Parse a list of chapter affiliations.
///
/// Each affiliation is a chapter name followed by a designation number.
/// Affiliations are separated by `,`, `;` or `/`. Blank input is an empty list.
///
/// # Errors
///
/// Returns a message describing the expected format when `text` is not an
/// affiliation list.
///
/// # Examples
///
/// ```
/// use lineage_core::member::Affiliation;
/// use lineage_parser::parse_affiliations;
///
/// assert_eq!(
///     parse_affiliations("Alpha Beta 123, Gamma 4"),
///     Ok(vec![Affiliation::new("Alpha Beta", 123), Affiliation::new("Gamma", 4)])
/// );
/// assert_eq!(parse_affiliations("  "), Ok(vec![]));
/// ```
pub fn parse_affiliations(text: &str) -> Result<Vec<Affiliation>, String> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    affiliations.parse(text).map_err(|_| {
        format!(
            "`{text}` is not an affiliation list; expected entries like `Alpha Beta 123, Gamma 4`"
        )
    })
}
