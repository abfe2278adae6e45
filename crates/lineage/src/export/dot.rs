//! Graphviz DOT export.
//!
//! The document lays the tree out along a rank axis: one invisible chain of
//! rank nodes, and a `rank=same` group per cohort pinning each entity next to
//! its rank. Entities and edges are written in the tree's layout order so the
//! same tree and seed always produce the same text.

use std::{collections::HashMap, fmt::Write as _};

use log::{debug, trace};

use lineage_core::{color::Color, entity::Data, identifier::Id, rank::Rank};

use crate::{
    config::{Attributes, StyleConfig},
    export::{Error, Exporter},
    structure::Tree,
};

const INDENT: &str = "    ";

/// Escapes a string for use inside a double-quoted DOT string.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

fn rank_node_id(rank: &impl std::fmt::Display) -> String {
    format!("rank::{rank}")
}

/// Formats attributes as a DOT attribute list body: `a="1", b="2"`.
fn format_attributes<'a>(attributes: impl IntoIterator<Item = (&'a String, &'a String)>) -> String {
    attributes
        .into_iter()
        .map(|(key, value)| format!("{key}=\"{}\"", escape(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fills a label template.
///
/// `{field}` is replaced by the entity's data value (empty when absent) and
/// `{id}` by the entity id. `{{` and `}}` produce literal braces. An empty
/// result falls back to the id.
fn render_label(template: &str, id: Id, data: &Data) -> String {
    let mut label = String::new();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                label.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                label.push('}');
            }
            '{' => {
                let field: String = chars.by_ref().take_while(|c| *c != '}').collect();
                match field.as_str() {
                    "id" => label.push_str(&id.to_string()),
                    field => label.push_str(data.get(field).map(String::as_str).unwrap_or("")),
                }
            }
            c => label.push(c),
        }
    }

    if label.trim().is_empty() {
        id.to_string()
    } else {
        label.trim().to_string()
    }
}

/// Sets `style=filled` while keeping styles such as `dashed`.
fn add_filled_style(attributes: &mut Attributes) {
    match attributes.get_mut("style") {
        Some(style) if style.split(',').any(|part| part.trim() == "filled") => {}
        Some(style) => style.push_str(",filled"),
        None => {
            attributes.insert("style".to_string(), "filled".to_string());
        }
    }
}

/// Builder for the [`Dot`] exporter.
#[derive(Debug, Default)]
pub struct DotBuilder<'a> {
    style: Option<&'a StyleConfig>,
    name: Option<String>,
}

impl<'a> DotBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `style` instead of the default [`StyleConfig`].
    pub fn with_style(mut self, style: &'a StyleConfig) -> Self {
        self.style = Some(style);
        self
    }

    /// Names the digraph. Defaults to `lineage`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the exporter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the family palette contains an invalid color.
    pub fn build(self) -> Result<Dot, Error> {
        let style = self.style.cloned().unwrap_or_default();
        let family_colors = style.family_colors().map_err(Error::Render)?;
        Ok(Dot {
            name: self.name.unwrap_or_else(|| "lineage".to_string()),
            style,
            family_colors,
            output: String::new(),
        })
    }
}

/// Writes a tree as a Graphviz DOT document.
#[derive(Debug)]
pub struct Dot {
    name: String,
    style: StyleConfig,
    family_colors: Vec<Color>,
    output: String,
}

impl Dot {
    /// The document written by the last export.
    pub fn as_str(&self) -> &str {
        &self.output
    }

    pub fn into_string(self) -> String {
        self.output
    }

    /// Assigns palette colors to families large enough to be colored, in
    /// order of first appearance in the layout.
    fn family_fills<R: Rank>(&self, tree: &Tree<R>) -> HashMap<Id, String> {
        let mut fills = HashMap::new();
        if self.family_colors.is_empty() {
            return fills;
        }

        let sizes = tree.family_sizes();
        let mut next_color = self.family_colors.iter().cycle();
        for id in tree.entity_ids() {
            let Some(root) = tree.families().get(id) else {
                continue;
            };
            if fills.contains_key(root) || sizes.get(root).copied().unwrap_or(0) < self.style.family_min_size() {
                continue;
            }
            if let Some(color) = next_color.next() {
                fills.insert(*root, color.to_hex());
            }
        }
        debug!(colored_families = fills.len(); "Family colors assigned");
        fills
    }

    fn write_defaults(&mut self) -> Result<(), Error> {
        let out = &mut self.output;
        for (kind, attributes) in [
            ("graph", self.style.graph()),
            ("node", self.style.node()),
            ("edge", self.style.edge()),
        ] {
            if !attributes.is_empty() {
                writeln!(out, "{INDENT}{kind} [{}];", format_attributes(attributes))?;
            }
        }
        Ok(())
    }

    fn write_rank_axis<R: Rank>(&mut self, tree: &Tree<R>) -> Result<(), Error> {
        let ranks = tree.ranks();
        if ranks.is_empty() {
            return Ok(());
        }

        let out = &mut self.output;
        writeln!(out)?;
        for rank in ranks {
            let mut attributes = self.style.rank_node().clone();
            attributes.insert("label".to_string(), rank.to_string());
            writeln!(
                out,
                "{INDENT}\"{}\" [{}];",
                escape(&rank_node_id(rank)),
                format_attributes(&attributes)
            )?;
        }
        for pair in ranks.windows(2) {
            writeln!(
                out,
                "{INDENT}\"{}\" -> \"{}\" [{}];",
                escape(&rank_node_id(&pair[0])),
                escape(&rank_node_id(&pair[1])),
                format_attributes(self.style.rank_edge())
            )?;
        }

        for (rank, cohort) in tree.cohorts() {
            write!(out, "{INDENT}{{ rank=same; \"{}\";", escape(&rank_node_id(rank)))?;
            for id in cohort {
                write!(out, " \"{}\";", escape(&id.to_string()))?;
            }
            writeln!(out, " }}")?;
        }
        Ok(())
    }

    fn write_entities<R: Rank>(&mut self, tree: &Tree<R>) -> Result<(), Error> {
        let fills = self.family_fills(tree);
        let out = &mut self.output;
        writeln!(out)?;

        for entity in tree.entities() {
            let mut attributes = Attributes::new();
            for class in entity.classes() {
                if let Some(class_attributes) = self.style.node_class(class) {
                    attributes.extend(class_attributes.clone());
                }
            }

            let template = self.style.label_template(entity.classes());
            attributes.insert(
                "label".to_string(),
                render_label(template, entity.id(), entity.data()),
            );

            let root = tree.families().get(&entity.id());
            if let Some(fill) = root.and_then(|root| fills.get(root)) {
                attributes.insert("fillcolor".to_string(), fill.clone());
                add_filled_style(&mut attributes);
            }

            trace!(entity:% = entity.id(), classes:? = entity.classes(); "Writing entity");
            writeln!(
                out,
                "{INDENT}\"{}\" [{}];",
                escape(&entity.id().to_string()),
                format_attributes(&attributes)
            )?;
        }
        Ok(())
    }

    fn write_relationships<R: Rank>(&mut self, tree: &Tree<R>) -> Result<(), Error> {
        let out = &mut self.output;
        writeln!(out)?;

        for relationship in tree.relationships() {
            let mut attributes = Attributes::new();
            for class in relationship.classes() {
                if let Some(class_attributes) = self.style.edge_class(class) {
                    attributes.extend(class_attributes.clone());
                }
            }
            if let Some(label) = relationship.data().get("label") {
                attributes.insert("label".to_string(), label.clone());
            }

            write!(
                out,
                "{INDENT}\"{}\" -> \"{}\"",
                escape(&relationship.parent().to_string()),
                escape(&relationship.child().to_string())
            )?;
            if attributes.is_empty() {
                writeln!(out, ";")?;
            } else {
                writeln!(out, " [{}];", format_attributes(&attributes))?;
            }
        }
        Ok(())
    }
}

impl Exporter for Dot {
    fn export_tree<R: Rank>(&mut self, tree: &Tree<R>) -> Result<(), Error> {
        self.output.clear();
        writeln!(self.output, "digraph \"{}\" {{", escape(&self.name))?;
        self.write_defaults()?;
        self.write_rank_axis(tree)?;
        self.write_entities(tree)?;
        self.write_relationships(tree)?;
        writeln!(self.output, "}}")?;

        debug!(bytes = self.output.len(); "DOT document written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_core::entity::{Entity, ParentKey};

    use crate::structure::TreeConfig;

    fn family_tree() -> Tree<i64> {
        let entities = vec![
            Entity::member(Id::new("A"), ParentKey::None, Some(1)).with_data("name", "Ada"),
            Entity::member(Id::new("B"), ParentKey::Id(Id::new("A")), Some(2))
                .with_class("candidate")
                .with_data("name", "Bo \"B\""),
            Entity::member(Id::new("Solo"), ParentKey::None, None),
        ];
        Tree::build(entities, vec![], TreeConfig::default()).unwrap()
    }

    fn export(tree: &Tree<i64>, style: &StyleConfig) -> String {
        let mut dot = DotBuilder::new().with_style(style).build().unwrap();
        dot.export_tree(tree).unwrap();
        dot.into_string()
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"say "hi"\now"#), r#"say \"hi\"\\now"#);
        assert_eq!(escape("two\nlines"), "two\\nlines");
    }

    #[test]
    fn test_render_label() {
        let data: Data = [("name", "Ada"), ("semester", "Fall 2010")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let id = Id::new("Ada Lovelace");

        assert_eq!(render_label("{name}\n{semester}", id, &data), "Ada\nFall 2010");
        assert_eq!(render_label("{id} ({missing})", id, &data), "Ada Lovelace ()");
        assert_eq!(render_label("{{{name}}}", id, &data), "{Ada}");
        assert_eq!(render_label("{missing}", id, &data), "Ada Lovelace");
    }

    #[test]
    fn test_add_filled_style() {
        let mut attributes = Attributes::new();
        add_filled_style(&mut attributes);
        assert_eq!(attributes["style"], "filled");

        let mut attributes: Attributes = [("style".to_string(), "dashed".to_string())].into();
        add_filled_style(&mut attributes);
        assert_eq!(attributes["style"], "dashed,filled");
        add_filled_style(&mut attributes);
        assert_eq!(attributes["style"], "dashed,filled");
    }

    #[test]
    fn test_document_structure() {
        let tree = family_tree();
        let dot = export(&tree, &StyleConfig::default());

        assert!(dot.starts_with("digraph \"lineage\" {\n"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("node [shape=\"box\", fontname=\"Helvetica\"];"));
        assert!(dot.contains("\"rank::1\" -> \"rank::2\" [style=\"invis\"];"));
        assert!(dot.contains("{ rank=same; \"rank::1\"; \"A\"; }"));
        assert!(dot.contains("{ rank=same; \"rank::2\"; \"B\"; }"));
        assert!(dot.contains("\"A\" -> \"B\";"));
        assert!(dot.contains("label=\"Bo \\\"B\\\"\""));
        assert!(dot.contains("\"Solo\" [label=\"Solo\"];"));
    }

    #[test]
    fn test_family_colors_and_class_styles() {
        let tree = family_tree();
        let dot = export(&tree, &StyleConfig::default());

        let fill = Color::new("lightblue").unwrap().to_hex();
        assert!(dot.contains(&format!(
            "\"A\" [label=\"Ada\", fillcolor=\"{fill}\", style=\"filled\"];"
        )));
        assert!(dot.contains(&format!(
            "\"B\" [style=\"dashed,filled\", label=\"Bo \\\"B\\\"\", fillcolor=\"{fill}\"];"
        )));
        // Single-member families stay uncolored.
        assert!(!dot.contains("\"Solo\" [label=\"Solo\", fillcolor"));
    }

    #[test]
    fn test_export_is_deterministic() {
        let tree = family_tree();
        let style = StyleConfig::default();
        assert_eq!(export(&tree, &style), export(&tree, &style));
    }

    #[test]
    fn test_no_rank_axis_without_ranks() {
        let entities = vec![Entity::<i64>::member(Id::new("A"), ParentKey::None, None)];
        let tree = Tree::build(entities, vec![], TreeConfig::default()).unwrap();
        let dot = export(&tree, &StyleConfig::default());
        assert!(!dot.contains("rank::"));
    }
}
