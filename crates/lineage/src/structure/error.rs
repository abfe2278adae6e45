//! Errors raised while assembling a [`Tree`](super::Tree).

use thiserror::Error;

use lineage_core::identifier::Id;

/// Structural violations that prevent a tree from being built.
///
/// Every variant is fatal: a tree is either fully valid or not built at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("entity `{0}` is defined more than once")]
    DuplicateEntity(Id),

    #[error("`{child}` names `{parent}` as its parent, but there is no such entity")]
    UnknownParent { child: Id, parent: Id },

    #[error("relationship `{parent}` -> `{child}` points at `{child}`, but there is no such entity")]
    UnknownEntity { parent: Id, child: Id },

    #[error("relationship `{parent}` -> `{child}` is declared more than once")]
    DuplicateRelationship { parent: Id, child: Id },

    #[error("members form a cycle: {}", format_cycle(.0))]
    Cycle(Vec<(Id, Id)>),

    #[error("family containing `{member}` has {} roots ({}), expected exactly one", .roots.len(), format_ids(.roots))]
    FamilyRoots { member: Id, roots: Vec<Id> },

    #[error("invalid tree configuration: {0}")]
    Configuration(String),
}

fn format_cycle(edges: &[(Id, Id)]) -> String {
    let mut path: Vec<String> = edges.iter().map(|(parent, _)| parent.to_string()).collect();
    if let Some((_, last)) = edges.last() {
        path.push(last.to_string());
    }
    path.join(" -> ")
}

fn format_ids(ids: &[Id]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter()
        .map(|id| format!("`{id}`"))
        .collect::<Vec<_>>()
        .join(", ")
}
