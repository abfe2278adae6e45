//! Explicit directed edges between entities.

use crate::{
    entity::{Classes, Data},
    identifier::Id,
};

/// A directed edge from `parent` to `child`, identified by that ordered pair.
///
/// Relationships are independent of the implicit parent edge a member gets from
/// its [`ParentKey`](crate::entity::ParentKey) and carry their own styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    parent: Id,
    child: Id,
    classes: Classes,
    data: Data,
}

impl Relationship {
    /// Creates a relationship without classes or data.
    pub fn new(parent: Id, child: Id) -> Self {
        Self {
            parent,
            child,
            classes: Classes::new(),
            data: Data::new(),
        }
    }

    /// Adds a styling class.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    /// Sets a display data field.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Returns the `(parent, child)` key of this relationship.
    pub fn key(&self) -> (Id, Id) {
        (self.parent, self.child)
    }

    pub fn parent(&self) -> Id {
        self.parent
    }

    pub fn child(&self) -> Id {
        self.child
    }

    pub fn classes(&self) -> &Classes {
        &self.classes
    }

    pub fn data(&self) -> &Data {
        &self.data
    }
}
