//! Lineage - Assemble big/little lineage rosters into family trees.
//!
//! Reads membership rosters, validates them into a forest of families and
//! renders the result as a Graphviz DOT document (or PDF with the `graphviz`
//! feature).

pub mod config;
pub mod export;

mod error;
mod structure;

pub use lineage_core::{color, entity, identifier, member, rank, relationship};
pub use lineage_parser::SourceFormat;

pub use error::LineageError;
pub use structure::{PLACEHOLDER_CLASS, Tree, TreeConfig, TreeError};

use log::{debug, info, trace};

use lineage_core::{
    entity::{Entity, ParentKey},
    identifier::Id,
    member::Member,
    rank::Semester,
    relationship::Relationship,
};

use config::{AppConfig, CustomEntity, CustomRelationship};
use export::Exporter;

/// Builder for parsing rosters, assembling trees and rendering them.
///
/// # Examples
///
/// ```rust
/// use lineage::{LineageBuilder, SourceFormat, config::AppConfig};
///
/// let source = "\
/// first_name,last_name,big,semester
/// Ada,Lovelace,none,Fall 2010
/// Grace,Hopper,Ada Lovelace,Spring 2011
/// ";
///
/// let builder = LineageBuilder::new(AppConfig::default());
///
/// // Parse the roster into members
/// let members = builder.parse(source, SourceFormat::Csv)
///     .expect("Failed to parse");
///
/// // Assemble the tree
/// let tree = builder.build_tree(members)
///     .expect("Failed to build tree");
///
/// // Render the tree to DOT
/// let dot = builder.render_dot(&tree)
///     .expect("Failed to render");
/// assert!(dot.starts_with("digraph"));
/// ```
#[derive(Default)]
pub struct LineageBuilder {
    config: AppConfig,
}

impl LineageBuilder {
    /// Create a new builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including tree, input and style settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a roster into members.
    ///
    /// # Arguments
    ///
    /// * `source` - Roster text
    /// * `format` - Whether `source` is CSV or JSON
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::Parse`] carrying every diagnostic and the source.
    pub fn parse(&self, source: &str, format: SourceFormat) -> Result<Vec<Member>, LineageError> {
        let parse_config = self.config.input().parse_config();
        let members = lineage_parser::parse(source, format, &parse_config)
            .map_err(|err| LineageError::new_parse_error(err, source))?;

        debug!(members = members.len(); "Roster parsed successfully");
        trace!(members:?; "Parsed members");
        Ok(members)
    }

    /// Assemble members and the configured custom entities into a tree.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::Tree`] for invalid tree settings or structural
    /// violations, and [`LineageError::Config`] for malformed custom entries.
    pub fn build_tree(&self, members: Vec<Member>) -> Result<Tree<Semester>, LineageError> {
        let tree_config = self.config.tree().validate()?;

        let custom = self.config.custom();
        let mut entities: Vec<Entity<Semester>> = members.into_iter().map(Member::into_entity).collect();
        for entry in custom.entities() {
            entities.push(self.custom_entity(entry)?);
        }
        let relationships: Vec<Relationship> =
            custom.relationships().iter().map(custom_relationship).collect();

        info!(
            entities = entities.len(),
            custom_relationships = relationships.len();
            "Assembling tree"
        );
        let tree = Tree::build(entities, relationships, tree_config)?;
        info!(
            entities = tree.len(),
            families = tree.family_sizes().len(),
            ranks = tree.ranks().len();
            "Tree assembled"
        );
        Ok(tree)
    }

    /// Render a tree as a Graphviz DOT document.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::Export`] if the style configuration is invalid.
    pub fn render_dot(&self, tree: &Tree<Semester>) -> Result<String, LineageError> {
        let mut dot = export::dot::DotBuilder::new()
            .with_style(self.config.style())
            .build()?;
        dot.export_tree(tree)?;

        info!("DOT rendered successfully");
        Ok(dot.into_string())
    }

    /// Render a tree as PDF using the Graphviz `dot` binary.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::Export`] if the style configuration is invalid
    /// or Graphviz fails.
    #[cfg(feature = "graphviz")]
    pub fn render_pdf(&self, tree: &Tree<Semester>) -> Result<Vec<u8>, LineageError> {
        let dot = export::dot::DotBuilder::new()
            .with_style(self.config.style())
            .build()?;
        let mut pdf = export::pdf::Pdf::new(dot);
        pdf.export_tree(tree)?;
        Ok(pdf.into_bytes())
    }

    fn custom_entity(&self, entry: &CustomEntity) -> Result<Entity<Semester>, LineageError> {
        let id = Id::new(entry.id());
        let rank = entry
            .rank()
            .map(lineage_parser::parse_semester)
            .transpose()
            .map_err(|err| {
                LineageError::Config(format!("custom entity `{}`: {err}", entry.id()))
            })?;

        let mut entity = if entry.is_member() {
            let marker = self.config.input().no_parent_marker();
            let parent = match entry.parent() {
                None => ParentKey::None,
                Some(parent) if parent.trim().is_empty() => ParentKey::Unknown,
                Some(parent) if parent.eq_ignore_ascii_case(marker) => ParentKey::None,
                Some(parent) => ParentKey::Id(Id::new(parent)),
            };
            Entity::member(id, parent, rank)
        } else {
            if entry.parent().is_some() {
                return Err(LineageError::Config(format!(
                    "custom entity `{}` has a parent but is not a member; use a custom relationship",
                    entry.id()
                )));
            }
            Entity::custom(id, rank)
        };

        for class in entry.classes() {
            entity = entity.with_class(class.as_str());
        }
        for (key, value) in entry.data() {
            entity = entity.with_data(key.as_str(), value.as_str());
        }
        Ok(entity)
    }
}

fn custom_relationship(entry: &CustomRelationship) -> Relationship {
    let mut relationship = Relationship::new(Id::new(entry.parent()), Id::new(entry.child()));
    for class in entry.classes() {
        relationship = relationship.with_class(class.as_str());
    }
    for (key, value) in entry.data() {
        relationship = relationship.with_data(key.as_str(), value.as_str());
    }
    relationship
}
