//! Rank types for positioning entities along the rank axis.
//!
//! A rank is any totally ordered value that maps onto a contiguous integer index.
//! The tree engine only ever manipulates ranks through their index, so plain
//! integers ([`i64`]) and academic terms ([`Semester`]) are interchangeable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A totally ordered, integer-indexable position on the rank axis.
///
/// Implementations must satisfy `R::from_index(r.to_index()) == r` and order
/// consistently with their index.
pub trait Rank: Copy + Ord + fmt::Debug + fmt::Display {
    /// Returns the integer index of this rank.
    fn to_index(&self) -> i64;

    /// Builds the rank located at `index`.
    fn from_index(index: i64) -> Self;

    /// Returns the rank `delta` steps away from this one.
    ///
    /// # Examples
    ///
    /// ```
    /// use lineage_core::rank::{Rank, Season, Semester};
    ///
    /// let fall = Semester::new(Season::Fall, 2010);
    /// assert_eq!(fall.offset(1), Semester::new(Season::Spring, 2011));
    /// assert_eq!(5_i64.offset(-1), 4);
    /// ```
    fn offset(&self, delta: i64) -> Self {
        Self::from_index(self.to_index() + delta)
    }
}

impl Rank for i64 {
    fn to_index(&self) -> i64 {
        *self
    }

    fn from_index(index: i64) -> Self {
        index
    }
}

/// The half of the academic year a semester falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Fall,
}

impl Season {
    fn index(self) -> i64 {
        match self {
            Season::Spring => 0,
            Season::Fall => 1,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Spring => write!(f, "Spring"),
            Season::Fall => write!(f, "Fall"),
        }
    }
}

/// An academic term, the rank type used for rosters.
///
/// Semesters alternate Spring, Fall, Spring, ... so the index of a semester is
/// `year * 2 + season`. Field order makes the derived ordering chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Semester {
    year: i32,
    season: Season,
}

impl Semester {
    /// Creates a semester from its season and year.
    pub fn new(season: Season, year: i32) -> Self {
        Self { year, season }
    }

    /// Returns the season of this semester.
    pub fn season(&self) -> Season {
        self.season
    }

    /// Returns the calendar year of this semester.
    pub fn year(&self) -> i32 {
        self.year
    }
}

impl Rank for Semester {
    fn to_index(&self) -> i64 {
        i64::from(self.year) * 2 + self.season.index()
    }

    fn from_index(index: i64) -> Self {
        let season = if index.rem_euclid(2) == 0 {
            Season::Spring
        } else {
            Season::Fall
        };
        // Saturates at the ends of the year range
        let year = index
            .div_euclid(2)
            .clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        Self { year, season }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.season, self.year)
    }
}
