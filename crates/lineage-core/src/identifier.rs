//! Identifier management using string interning for efficient string storage and comparison
//!
//! This module provides the [`Id`] type with an efficient string-interner based approach.
//! Unlike the raw interner symbols, [`Id`] orders by its resolved string so that sorted
//! collections of identifiers are lexicographic.

use std::{
    cmp::Ordering,
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for efficient identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<T>(f: impl FnOnce(&mut DefaultStringInterner) -> T) -> T {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// Efficient identifier type using string interning
///
/// Entity ids, relationship endpoints and family roots are all [`Id`]s. The type is
/// `Copy`, hashes by symbol, and compares lexicographically by its string value.
///
/// # Examples
///
/// ```
/// use lineage_core::identifier::Id;
///
/// let alice = Id::new("Alice Smith");
/// let bob = Id::new("Bob Jones");
/// assert!(alice < bob);
///
/// let parent = Id::placeholder_parent(bob);
/// assert_eq!(parent, "Bob Jones Parent");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    ///
    /// # Arguments
    ///
    /// * `name` - The string representation of the identifier
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Creates the id of the synthesized parent of an orphaned member: `"{child} Parent"`.
    pub fn placeholder_parent(child: Id) -> Self {
        with_interner(|interner| {
            let child_str = interner
                .resolve(child.0)
                .expect("Child ID should exist in interner");
            let name = format!("{child_str} Parent");
            Self(interner.get_or_intern(name))
        })
    }
}

impl Ord for Id {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 == other.0 {
            return Ordering::Equal;
        }
        with_interner(|interner| {
            let lhs = interner
                .resolve(self.0)
                .expect("Symbol should exist in interner");
            let rhs = interner
                .resolve(other.0)
                .expect("Symbol should exist in interner");
            lhs.cmp(rhs)
        })
    }
}

impl PartialOrd for Id {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let str_value = with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                .to_string()
        });
        write!(f, "{str_value}")
    }
}

impl std::str::FromStr for Id {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice
    ///
    /// This is a convenience implementation that calls `Id::new`.
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<&String> for Id {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                == other
        })
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let id1 = Id::new("Alpha");
        let id2 = Id::new("Alpha");
        let id3 = Id::new("Beta");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1, "Alpha");
    }

    #[test]
    fn test_placeholder_parent() {
        let child = Id::new("Dana Reyes");
        let parent = Id::placeholder_parent(child);

        assert_eq!(parent, "Dana Reyes Parent");
        assert_eq!(parent, Id::placeholder_parent(child));
    }

    #[test]
    fn test_ord_is_lexicographic() {
        // Intern in reverse order so symbol order disagrees with string order
        let z = Id::new("zz-ord");
        let m = Id::new("mm-ord");
        let a = Id::new("aa-ord");

        let mut ids = vec![z, a, m];
        ids.sort();
        assert_eq!(ids, vec![a, m, z]);
        assert_eq!(a.cmp(&a), Ordering::Equal);
    }

    #[test]
    fn test_display_trait() {
        let id = Id::new("display_test");
        assert_eq!(format!("{}", id), "display_test");
    }

    #[test]
    fn test_from_trait() {
        let id1: Id = "test_string".into();
        let id2 = Id::new("test_string");
        let owned = String::from("test_string");
        let id3: Id = (&owned).into();

        assert_eq!(id1, id2);
        assert_eq!(id1, id3);
    }

    #[test]
    fn test_hash_and_eq() {
        use std::collections::HashMap;

        let id1 = Id::new("key1");
        let id2 = Id::new("key1");
        let id3 = Id::new("key2");

        let mut map = HashMap::new();
        map.insert(id1, "value1");
        map.insert(id3, "value2");

        assert_eq!(map.get(&id2), Some(&"value1"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_partial_eq_str() {
        let id = Id::new("Component");
        let name = String::from("Component");

        assert!(id == "Component");
        assert!(id != "Element");
        assert!(id == name.as_str());
    }
}
