//! Typed roster members.
//!
//! A [`Member`] is what the roster parser produces for each valid row. It keeps the
//! typed fields (names, semester, affiliations, parent) until [`Member::into_entity`]
//! moves every display string into the entity's data so the renderer never needs
//! to know what a member is.

use std::fmt;

use crate::{
    entity::{Data, Entity, ParentKey},
    identifier::Id,
    rank::Semester,
};

/// Class carried by every member entity.
pub const MEMBER_CLASS: &str = "member";

/// Class carried by members flagged as reorganization nodes.
pub const REORGANIZATION_CLASS: &str = "reorganization";

/// Whether a member has been initiated into the chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// An initiated member holding a designation in the chapter.
    Brother,
    /// A member without a designation in the chapter.
    Candidate,
}

impl MemberKind {
    /// The styling class for this kind.
    pub fn class(self) -> &'static str {
        match self {
            MemberKind::Brother => "brother",
            MemberKind::Candidate => "candidate",
        }
    }
}

/// A chapter affiliation such as `Virginia Alpha 1234`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Affiliation {
    chapter: String,
    designation: u32,
}

impl Affiliation {
    pub fn new(chapter: impl Into<String>, designation: u32) -> Self {
        Self {
            chapter: chapter.into(),
            designation,
        }
    }

    /// The chapter name, e.g. `Virginia Alpha`.
    pub fn chapter(&self) -> &str {
        &self.chapter
    }

    /// The member's number within the chapter.
    pub fn designation(&self) -> u32 {
        self.designation
    }
}

impl fmt::Display for Affiliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.chapter, self.designation)
    }
}

/// A validated roster record.
///
/// # Examples
///
/// ```
/// use lineage_core::{
///     entity::ParentKey,
///     identifier::Id,
///     member::{Affiliation, Member, MemberKind},
/// };
///
/// let member = Member::new(Id::new("Ada Byron"), "Ada", "Byron", MemberKind::Brother)
///     .with_affiliations(vec![Affiliation::new("Alpha", 12)])
///     .with_parent(ParentKey::None);
///
/// let entity = member.into_entity();
/// assert!(entity.classes().contains("brother"));
/// assert_eq!(entity.data()["affiliations"], "Alpha 12");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    id: Id,
    kind: MemberKind,
    first_name: String,
    preferred_name: Option<String>,
    last_name: String,
    semester: Option<Semester>,
    affiliations: Vec<Affiliation>,
    parent: ParentKey,
    reorganization: bool,
    extra: Data,
}

impl Member {
    /// Creates a member with an unknown parent and no optional fields.
    pub fn new(
        id: Id,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        kind: MemberKind,
    ) -> Self {
        Self {
            id,
            kind,
            first_name: first_name.into(),
            preferred_name: None,
            last_name: last_name.into(),
            semester: None,
            affiliations: Vec::new(),
            parent: ParentKey::Unknown,
            reorganization: false,
            extra: Data::new(),
        }
    }

    pub fn with_preferred_name(mut self, preferred_name: Option<String>) -> Self {
        self.preferred_name = preferred_name;
        self
    }

    pub fn with_semester(mut self, semester: Option<Semester>) -> Self {
        self.semester = semester;
        self
    }

    pub fn with_affiliations(mut self, affiliations: Vec<Affiliation>) -> Self {
        self.affiliations = affiliations;
        self
    }

    pub fn with_parent(mut self, parent: ParentKey) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_reorganization(mut self, reorganization: bool) -> Self {
        self.reorganization = reorganization;
        self
    }

    /// Attaches pass-through columns that end up in the entity data.
    pub fn with_extra(mut self, extra: Data) -> Self {
        self.extra = extra;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn preferred_name(&self) -> Option<&str> {
        self.preferred_name.as_deref()
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// The name a member goes by: preferred name if present, else first name, then last name.
    pub fn display_name(&self) -> String {
        let given = self.preferred_name.as_deref().unwrap_or(&self.first_name);
        format!("{given} {}", self.last_name)
    }

    pub fn semester(&self) -> Option<Semester> {
        self.semester
    }

    pub fn affiliations(&self) -> &[Affiliation] {
        &self.affiliations
    }

    pub fn parent(&self) -> ParentKey {
        self.parent
    }

    pub fn is_reorganization(&self) -> bool {
        self.reorganization
    }

    pub fn extra(&self) -> &Data {
        &self.extra
    }

    /// Converts this member into a tree entity.
    ///
    /// Classes are `member`, the kind class and `reorganization` when flagged.
    /// Data holds `name`, `first_name`, `last_name`, `preferred_name`, `semester`
    /// and `affiliations` (only the ones present), followed by the extra columns.
    pub fn into_entity(self) -> Entity<Semester> {
        let mut entity = Entity::member(self.id, self.parent, self.semester)
            .with_class(MEMBER_CLASS)
            .with_class(self.kind.class());
        if self.reorganization {
            entity = entity.with_class(REORGANIZATION_CLASS);
        }

        entity = entity
            .with_data("name", self.display_name())
            .with_data("first_name", self.first_name)
            .with_data("last_name", self.last_name);
        if let Some(preferred_name) = self.preferred_name {
            entity = entity.with_data("preferred_name", preferred_name);
        }
        if let Some(semester) = self.semester {
            entity = entity.with_data("semester", semester.to_string());
        }
        if !self.affiliations.is_empty() {
            let affiliations = self
                .affiliations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            entity = entity.with_data("affiliations", affiliations);
        }

        for (key, value) in self.extra {
            entity = entity.with_data(key, value);
        }
        entity
    }
}
