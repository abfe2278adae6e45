//! Entities: the nodes of a lineage tree.
//!
//! An [`Entity`] is either a roster member or a custom node (a landmark or a
//! reorganization point declared in configuration). Both share an id, an optional
//! rank, styling classes and display data; only members carry a [`ParentKey`].

use std::fmt;

use indexmap::{IndexMap, IndexSet};

use crate::{identifier::Id, rank::Semester};

/// Insertion-ordered set of styling labels consumed by the renderer.
pub type Classes = IndexSet<String>;

/// Opaque display data consumed by the renderer (names, label template fields).
pub type Data = IndexMap<String, String>;

/// The parent reference of a member.
///
/// `None` and `Unknown` are both rootless, but only `Unknown` roots get a
/// synthesized placeholder parent when the tree is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentKey {
    /// The member's parent is the entity with this id.
    Id(Id),
    /// The member deliberately has no parent.
    None,
    /// The member's parent is missing from the data.
    Unknown,
}

impl ParentKey {
    /// Returns the concrete parent id, if any.
    pub fn id(&self) -> Option<Id> {
        match self {
            ParentKey::Id(id) => Some(*id),
            ParentKey::None | ParentKey::Unknown => None,
        }
    }
}

impl fmt::Display for ParentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentKey::Id(id) => write!(f, "{id}"),
            ParentKey::None => write!(f, "<none>"),
            ParentKey::Unknown => write!(f, "<unknown>"),
        }
    }
}

/// Kind-specific payload of an [`Entity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    /// A member of the organization with its parent reference.
    Member(ParentKey),
    /// A custom node that only participates through explicit relationships.
    Custom,
}

/// A node of the lineage graph.
///
/// # Examples
///
/// ```
/// use lineage_core::{entity::{Entity, ParentKey}, identifier::Id};
///
/// let root: Entity<i64> = Entity::member(Id::new("A"), ParentKey::None, Some(1))
///     .with_class("founder")
///     .with_data("name", "Ada");
///
/// assert!(root.is_member());
/// assert_eq!(root.rank(), Some(1));
/// assert_eq!(root.data().get("name").map(String::as_str), Some("Ada"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity<R = Semester> {
    id: Id,
    kind: EntityKind,
    rank: Option<R>,
    classes: Classes,
    data: Data,
}

impl<R: Copy> Entity<R> {
    fn new(id: Id, kind: EntityKind, rank: Option<R>) -> Self {
        Self {
            id,
            kind,
            rank,
            classes: Classes::new(),
            data: Data::new(),
        }
    }

    /// Creates a member entity.
    pub fn member(id: Id, parent: ParentKey, rank: Option<R>) -> Self {
        Self::new(id, EntityKind::Member(parent), rank)
    }

    /// Creates a custom (non-member) entity.
    pub fn custom(id: Id, rank: Option<R>) -> Self {
        Self::new(id, EntityKind::Custom, rank)
    }

    /// Adds a styling class. Adding an existing class keeps its original position.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    /// Sets a display data field, replacing any previous value.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Returns the id of this entity.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns the kind-specific payload.
    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Returns `true` for member entities.
    pub fn is_member(&self) -> bool {
        matches!(self.kind, EntityKind::Member(_))
    }

    /// Returns the parent key of a member, or `None` for custom entities.
    pub fn parent_key(&self) -> Option<ParentKey> {
        match self.kind {
            EntityKind::Member(parent) => Some(parent),
            EntityKind::Custom => None,
        }
    }

    /// Returns the rank of this entity, if it has one.
    pub fn rank(&self) -> Option<R> {
        self.rank
    }

    /// Returns the styling classes in insertion order.
    pub fn classes(&self) -> &Classes {
        &self.classes
    }

    /// Returns the display data.
    pub fn data(&self) -> &Data {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_parent_key() {
        let parent = Id::new("entity-parent");
        let member: Entity<i64> = Entity::member(Id::new("entity-child"), ParentKey::Id(parent), None);

        assert!(member.is_member());
        assert_eq!(member.parent_key(), Some(ParentKey::Id(parent)));
        assert_eq!(member.parent_key().and_then(|p| p.id()), Some(parent));
    }

    #[test]
    fn test_custom_has_no_parent_key() {
        let custom: Entity<i64> = Entity::custom(Id::new("entity-landmark"), Some(3));

        assert!(!custom.is_member());
        assert_eq!(custom.parent_key(), None);
        assert_eq!(custom.rank(), Some(3));
    }

    #[test]
    fn test_classes_keep_insertion_order() {
        let entity: Entity<i64> = Entity::custom(Id::new("entity-classes"), None)
            .with_class("b")
            .with_class("a")
            .with_class("b");

        let classes: Vec<_> = entity.classes().iter().map(String::as_str).collect();
        assert_eq!(classes, vec!["b", "a"]);
    }

    #[test]
    fn test_parent_key_display() {
        assert_eq!(ParentKey::Id(Id::new("P")).to_string(), "P");
        assert_eq!(ParentKey::None.to_string(), "<none>");
        assert_eq!(ParentKey::Unknown.to_string(), "<unknown>");
    }
}
