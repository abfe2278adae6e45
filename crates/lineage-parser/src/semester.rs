//! Semester strings such as `Fall 2010`, `Sp11` or `F 2012`.

use lineage_core::rank::{Season, Semester};
use winnow::{
    Parser as _,
    ascii::Caseless,
    combinator::{alt, eof, terminated},
    error::ModalResult,
    token::{literal, take_while},
};

fn season(input: &mut &str) -> ModalResult<Season> {
    alt((
        alt((
            literal(Caseless("spring")),
            literal(Caseless("spr")),
            literal(Caseless("sp")),
            literal(Caseless("s")),
        ))
        .value(Season::Spring),
        alt((
            literal(Caseless("fall")),
            literal(Caseless("fa")),
            literal(Caseless("f")),
        ))
        .value(Season::Fall),
    ))
    .parse_next(input)
}

fn separator<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(0.., |c: char| c.is_whitespace() || c == '-' || c == '\'').parse_next(input)
}

/// Two-digit years are taken to be in the 2000s.
fn year(input: &mut &str) -> ModalResult<i32> {
    take_while(2..=4, |c: char| c.is_ascii_digit())
        .verify(|digits: &str| digits.len() != 3)
        .try_map(|digits: &str| {
            digits.parse::<i32>().map(|year| {
                if digits.len() == 2 {
                    2000 + year
                } else {
                    year
                }
            })
        })
        .parse_next(input)
}

fn semester(input: &mut &str) -> ModalResult<Semester> {
    terminated((season, separator, year), eof)
        .map(|(season, _, year)| Semester::new(season, year))
        .parse_next(input)
}

/// Parse a semester string.
///
/// Accepts a season (`Spring`, `Spr`, `Sp`, `S`, `Fall`, `Fa`, `F`, any case)
/// followed by a two or four digit year, optionally separated by spaces,
/// dashes or an apostrophe.
///
/// # Errors
///
/// Returns a message describing the expected format when `text` is not a
/// semester.
///
/// # Examples
///
/// ```
/// use lineage_core::rank::{Season, Semester};
/// use lineage_parser::parse_semester;
///
/// assert_eq!(parse_semester("Fall 2010"), Ok(Semester::new(Season::Fall, 2010)));
/// assert_eq!(parse_semester("sp11"), Ok(Semester::new(Season::Spring, 2011)));
/// assert!(parse_semester("Summer 2010").is_err());
/// ```
pub fn parse_semester(text: &str) -> Result<Semester, String> {
    semester.parse(text.trim()).map_err(|_| {
        format!("`{text}` is not a semester; expected a season and year like `Fall 2010` or `Sp11`")
    })
}
