//! Configuration types for building and rendering lineage trees.
//!
//! All types implement [`serde::Deserialize`] so a whole configuration can be
//! loaded from a TOML file. Every section is optional.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`TreeSettings`] - Seed, rank padding and singleton pruning (`[tree]`).
//! - [`InputConfig`] - Roster column names and big markers (`[input]`).
//! - [`StyleConfig`] - DOT attributes, labels and family colors (`[style]`).
//! - [`CustomConfig`] - Hand-declared entities and relationships (`[custom]`).
//!
//! # Example
//!
//! ```
//! # use lineage::config::AppConfig;
//! let config: AppConfig = toml::from_str(r#"
//!     [tree]
//!     seed = 7
//!     rank_max_offset = 1
//!
//!     [input]
//!     chapter = "Alpha"
//! "#).unwrap();
//!
//! assert_eq!(config.tree().validate().unwrap().seed(), 7);
//! assert_eq!(config.input().parse_config().chapter(), Some("Alpha"));
//! ```

use indexmap::IndexMap;
use serde::Deserialize;

use lineage_core::color::Color;
use lineage_parser::{Columns, ParseConfig};

use crate::structure::{TreeConfig, TreeError};

/// Attribute name to value, in declaration order.
pub type Attributes = IndexMap<String, String>;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    tree: TreeSettings,

    #[serde(default)]
    input: InputConfig,

    #[serde(default)]
    style: StyleConfig,

    #[serde(default)]
    custom: CustomConfig,
}

impl AppConfig {
    /// Creates a configuration from its sections.
    pub fn new(
        tree: TreeSettings,
        input: InputConfig,
        style: StyleConfig,
        custom: CustomConfig,
    ) -> Self {
        Self {
            tree,
            input,
            style,
            custom,
        }
    }

    pub fn tree(&self) -> &TreeSettings {
        &self.tree
    }

    pub fn input(&self) -> &InputConfig {
        &self.input
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn custom(&self) -> &CustomConfig {
        &self.custom
    }

    /// Replaces the shuffle seed, e.g. from a command line flag.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.tree.seed = seed;
        self
    }
}

/// Raw `[tree]` section. Use [`TreeSettings::validate`] to get a [`TreeConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TreeSettings {
    seed: u64,
    rank_min_offset: i64,
    rank_max_offset: i64,
    remove_singletons: bool,
}

impl TreeSettings {
    /// Creates tree settings.
    ///
    /// # Arguments
    ///
    /// * `seed` - Seed of the family shuffle.
    /// * `rank_min_offset` - Blank ranks before the earliest one (`<= 0`).
    /// * `rank_max_offset` - Blank ranks after the latest one (`>= 0`).
    /// * `remove_singletons` - Drop members without parent or children.
    pub fn new(
        seed: u64,
        rank_min_offset: i64,
        rank_max_offset: i64,
        remove_singletons: bool,
    ) -> Self {
        Self {
            seed,
            rank_min_offset,
            rank_max_offset,
            remove_singletons,
        }
    }

    /// Checks the offsets and returns the engine configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Configuration`] for a positive `rank_min_offset`
    /// or a negative `rank_max_offset`.
    pub fn validate(&self) -> Result<TreeConfig, TreeError> {
        Ok(
            TreeConfig::new(self.seed, self.rank_min_offset, self.rank_max_offset)?
                .with_remove_singletons(self.remove_singletons),
        )
    }
}

/// `[input]` section: how roster columns are named and interpreted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    first_name_column: String,
    preferred_name_column: String,
    last_name_column: String,
    big_column: String,
    semester_column: String,
    affiliations_column: String,
    reorganization_column: String,
    /// Big column value marking a member without a big.
    no_parent_marker: String,
    /// Chapter whose affiliation makes a member a brother.
    chapter: Option<String>,
}

impl InputConfig {
    /// Builds the parser options for this section.
    pub fn parse_config(&self) -> ParseConfig {
        let columns = Columns {
            first_name: self.first_name_column.clone(),
            preferred_name: self.preferred_name_column.clone(),
            last_name: self.last_name_column.clone(),
            big: self.big_column.clone(),
            semester: self.semester_column.clone(),
            affiliations: self.affiliations_column.clone(),
            reorganization: self.reorganization_column.clone(),
        };
        ParseConfig::new(columns, self.no_parent_marker.clone(), self.chapter.clone())
    }

    pub fn no_parent_marker(&self) -> &str {
        &self.no_parent_marker
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        let columns = Columns::default();
        Self {
            first_name_column: columns.first_name,
            preferred_name_column: columns.preferred_name,
            last_name_column: columns.last_name,
            big_column: columns.big,
            semester_column: columns.semester,
            affiliations_column: columns.affiliations,
            reorganization_column: columns.reorganization,
            no_parent_marker: "none".to_string(),
            chapter: None,
        }
    }
}

/// `[style]` section: Graphviz attributes used by the DOT exporter.
///
/// Per-class attributes are applied in the order of the entity's classes, so
/// later classes override earlier ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    graph: Attributes,
    node: Attributes,
    edge: Attributes,
    node_classes: IndexMap<String, Attributes>,
    edge_classes: IndexMap<String, Attributes>,
    /// Label template per class; `{field}` is replaced by entity data.
    labels: IndexMap<String, String>,
    default_label: String,
    rank_node: Attributes,
    rank_edge: Attributes,
    /// Fill colors cycled through families, as CSS color strings.
    family_colors: Vec<String>,
    /// Families smaller than this are not colored.
    family_min_size: usize,
}

fn attributes<const N: usize>(pairs: [(&str, &str); N]) -> Attributes {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            graph: attributes([("rankdir", "TB"), ("nodesep", "0.3"), ("ranksep", "0.4")]),
            node: attributes([("shape", "box"), ("fontname", "Helvetica")]),
            edge: attributes([("arrowhead", "none")]),
            node_classes: IndexMap::from([
                ("candidate".to_string(), attributes([("style", "dashed")])),
                ("reorganization".to_string(), attributes([("peripheries", "2")])),
                (
                    "placeholder".to_string(),
                    attributes([("style", "dotted"), ("fontcolor", "gray40")]),
                ),
            ]),
            edge_classes: IndexMap::from([(
                "placeholder".to_string(),
                attributes([("style", "dotted")]),
            )]),
            labels: IndexMap::new(),
            default_label: "{name}".to_string(),
            rank_node: attributes([("shape", "plaintext"), ("fontname", "Helvetica-Bold")]),
            rank_edge: attributes([("style", "invis")]),
            family_colors: [
                "lightblue",
                "palegreen",
                "lightsalmon",
                "khaki",
                "plum",
                "lightcyan",
                "peachpuff",
                "thistle",
            ]
            .map(str::to_string)
            .to_vec(),
            family_min_size: 2,
        }
    }
}

impl StyleConfig {
    pub fn graph(&self) -> &Attributes {
        &self.graph
    }

    pub fn node(&self) -> &Attributes {
        &self.node
    }

    pub fn edge(&self) -> &Attributes {
        &self.edge
    }

    /// Node attributes declared for `class`.
    pub fn node_class(&self, class: &str) -> Option<&Attributes> {
        self.node_classes.get(class)
    }

    /// Edge attributes declared for `class`.
    pub fn edge_class(&self, class: &str) -> Option<&Attributes> {
        self.edge_classes.get(class)
    }

    /// Returns the label template of the first class that declares one.
    pub fn label_template<'a>(&self, classes: impl IntoIterator<Item = &'a String>) -> &str {
        classes
            .into_iter()
            .find_map(|class| self.labels.get(class))
            .unwrap_or(&self.default_label)
    }

    pub fn rank_node(&self) -> &Attributes {
        &self.rank_node
    }

    pub fn rank_edge(&self) -> &Attributes {
        &self.rank_edge
    }

    /// Parses the family palette.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first color that cannot be parsed.
    pub fn family_colors(&self) -> Result<Vec<Color>, String> {
        self.family_colors
            .iter()
            .map(|color| {
                Color::new(color).map_err(|err| format!("Invalid family color in config: {err}"))
            })
            .collect()
    }

    pub fn family_min_size(&self) -> usize {
        self.family_min_size
    }
}

/// `[custom]` section: entities and relationships that are not on the roster.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomConfig {
    entities: Vec<CustomEntity>,
    relationships: Vec<CustomRelationship>,
}

impl CustomConfig {
    pub fn entities(&self) -> &[CustomEntity] {
        &self.entities
    }

    pub fn relationships(&self) -> &[CustomRelationship] {
        &self.relationships
    }
}

/// A `[[custom.entities]]` entry.
///
/// Entities are custom landmarks unless `member` is set, in which case they
/// take part in families like roster members.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomEntity {
    id: String,
    /// Semester string such as `Fall 2010`.
    #[serde(default)]
    rank: Option<String>,
    /// Parent id for members. Absent or the no-parent marker means no parent;
    /// an empty string means the parent is unknown.
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    member: bool,
    #[serde(default)]
    classes: Vec<String>,
    #[serde(default)]
    data: IndexMap<String, String>,
}

impl CustomEntity {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rank(&self) -> Option<&str> {
        self.rank.as_deref()
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn is_member(&self) -> bool {
        self.member
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn data(&self) -> &IndexMap<String, String> {
        &self.data
    }
}

/// A `[[custom.relationships]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomRelationship {
    parent: String,
    child: String,
    #[serde(default)]
    classes: Vec<String>,
    #[serde(default)]
    data: IndexMap<String, String>,
}

impl CustomRelationship {
    pub fn parent(&self) -> &str {
        &self.parent
    }

    pub fn child(&self) -> &str {
        &self.child
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn data(&self) -> &IndexMap<String, String> {
        &self.data
    }
}
