//! Directed graph over entity ids.
//!
//! [`LineageGraph`] stores every entity as a node and every parent edge or
//! relationship as a directed edge. It answers the structural questions the
//! tree needs: weakly-connected components, cycles among members and family
//! roots. It is built once and never mutated afterwards.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use petgraph::{
    Direction,
    algo::tarjan_scc,
    graph::{DiGraph, NodeIndex},
    unionfind::UnionFind,
    visit::EdgeRef,
};

use lineage_core::identifier::Id;

#[derive(Debug, Clone, Copy)]
struct Node {
    id: Id,
    member: bool,
}

/// A weakly-connected component of the member subgraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Family {
    /// Member ids of the component, sorted.
    pub members: Vec<Id>,
    /// Members without a parent inside the component, sorted.
    pub roots: Vec<Id>,
}

#[derive(Debug, Default)]
pub(super) struct LineageGraph {
    graph: DiGraph<Node, ()>,
    indices: HashMap<Id, NodeIndex>,
}

impl LineageGraph {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub(super) fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Adds a node for `id`. `member` marks nodes that take part in cycle and
    /// family checks.
    pub(super) fn add_entity(&mut self, id: Id, member: bool) {
        debug_assert!(!self.indices.contains_key(&id), "Entity {id} added twice");
        let idx = self.graph.add_node(Node { id, member });
        self.indices.insert(id, idx);
    }

    /// Adds the edge `parent -> child`.
    ///
    /// # Panics
    /// Panics in debug builds if either endpoint has not been added.
    pub(super) fn add_edge(&mut self, parent: Id, child: Id) {
        let (Some(&source), Some(&target)) = (self.indices.get(&parent), self.indices.get(&child))
        else {
            debug_assert!(false, "Adding edge {parent} -> {child}: endpoint does not exist");
            return;
        };
        self.graph.add_edge(source, target, ());
    }

    /// Weakly-connected components of the whole graph.
    ///
    /// Ids are sorted within each component and components are sorted by
    /// their smallest id, so the result only depends on the graph's shape.
    pub(super) fn components(&self) -> Vec<Vec<Id>> {
        weak_components(&self.graph)
    }

    /// Finds a directed cycle among member nodes, as a closed edge sequence.
    ///
    /// Self-loops count as cycles of length one.
    pub(super) fn member_cycle(&self) -> Option<Vec<(Id, Id)>> {
        let members = self.member_subgraph();
        tarjan_scc(&members)
            .into_iter()
            .find(|scc| scc.len() > 1 || members.contains_edge(scc[0], scc[0]))
            .map(|scc| cycle_through(&members, &scc))
    }

    /// Weakly-connected components of the member subgraph with their roots.
    pub(super) fn member_families(&self) -> Vec<Family> {
        let members = self.member_subgraph();
        let has_parent: HashSet<Id> = members
            .edge_references()
            .map(|edge| members[edge.target()].id)
            .collect();

        weak_components(&members)
            .into_iter()
            .map(|component| {
                let roots = component
                    .iter()
                    .copied()
                    .filter(|id| !has_parent.contains(id))
                    .collect();
                Family {
                    members: component,
                    roots,
                }
            })
            .collect()
    }

    /// Subgraph induced by member nodes; edges touching other nodes are dropped.
    fn member_subgraph(&self) -> DiGraph<Node, ()> {
        self.graph
            .filter_map(|_, node| node.member.then_some(*node), |_, edge| Some(*edge))
    }
}

fn weak_components(graph: &DiGraph<Node, ()>) -> Vec<Vec<Id>> {
    let mut sets = UnionFind::<usize>::new(graph.node_count());
    for edge in graph.edge_references() {
        sets.union(edge.source().index(), edge.target().index());
    }

    let mut groups: BTreeMap<usize, Vec<Id>> = BTreeMap::new();
    for idx in graph.node_indices() {
        groups
            .entry(sets.find(idx.index()))
            .or_default()
            .push(graph[idx].id);
    }

    let mut components: Vec<Vec<Id>> = groups
        .into_values()
        .map(|mut ids| {
            ids.sort();
            ids
        })
        .collect();
    components.sort();
    components
}

/// Shortest cycle through the smallest id of a strongly-connected component.
fn cycle_through(graph: &DiGraph<Node, ()>, scc: &[NodeIndex]) -> Vec<(Id, Id)> {
    let within: HashSet<NodeIndex> = scc.iter().copied().collect();
    let Some(&start) = scc.iter().min_by_key(|idx| graph[**idx].id) else {
        return Vec::new();
    };

    let mut previous: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        let mut next: Vec<NodeIndex> = graph
            .neighbors_directed(current, Direction::Outgoing)
            .filter(|idx| within.contains(idx))
            .collect();
        next.sort_by_key(|idx| graph[*idx].id);
        next.dedup();

        for neighbor in next {
            if neighbor == start {
                let mut path = vec![current];
                let mut node = current;
                while let Some(&prev) = previous.get(&node) {
                    path.push(prev);
                    node = prev;
                }
                path.reverse();

                let mut edges: Vec<(Id, Id)> = path
                    .windows(2)
                    .map(|pair| (graph[pair[0]].id, graph[pair[1]].id))
                    .collect();
                edges.push((graph[current].id, graph[start].id));
                return edges;
            }
            if neighbor != start && !previous.contains_key(&neighbor) {
                previous.insert(neighbor, current);
                queue.push_back(neighbor);
            }
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(members: &[&str], others: &[&str], edges: &[(&str, &str)]) -> LineageGraph {
        let mut graph = LineageGraph::new();
        for id in members {
            graph.add_entity(Id::new(id), true);
        }
        for id in others {
            graph.add_entity(Id::new(id), false);
        }
        for (parent, child) in edges {
            graph.add_edge(Id::new(parent), Id::new(child));
        }
        graph
    }

    fn ids(names: &[&str]) -> Vec<Id> {
        names.iter().map(|name| Id::new(name)).collect()
    }

    #[test]
    fn test_components_sorted() {
        let graph = graph(&["d", "c", "b", "a"], &["x"], &[("c", "d"), ("x", "a"), ("b", "a")]);

        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.components(), vec![ids(&["a", "b", "x"]), ids(&["c", "d"])]);
    }

    #[test]
    fn test_no_cycle_in_forest() {
        let graph = graph(&["a", "b", "c"], &[], &[("a", "b"), ("a", "c")]);
        assert_eq!(graph.member_cycle(), None);
    }

    #[test]
    fn test_cycle_edge_sequence() {
        let graph = graph(
            &["a", "b", "c", "d"],
            &[],
            &[("d", "a"), ("a", "b"), ("b", "c"), ("c", "a")],
        );
        let cycle = graph.member_cycle().unwrap();
        assert_eq!(
            cycle,
            vec![
                (Id::new("a"), Id::new("b")),
                (Id::new("b"), Id::new("c")),
                (Id::new("c"), Id::new("a")),
            ]
        );
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let graph = graph(&["a"], &[], &[("a", "a")]);
        assert_eq!(graph.member_cycle(), Some(vec![(Id::new("a"), Id::new("a"))]));
    }

    #[test]
    fn test_cycle_through_custom_entity_ignored() {
        let graph = graph(&["a", "b"], &["x"], &[("a", "b"), ("b", "x"), ("x", "a")]);
        assert_eq!(graph.member_cycle(), None);
    }

    #[test]
    fn test_member_families() {
        let graph = graph(
            &["a", "b", "c", "x", "y"],
            &["landmark"],
            &[("a", "b"), ("b", "c"), ("x", "y"), ("landmark", "x")],
        );
        let families = graph.member_families();

        assert_eq!(families.len(), 2);
        assert_eq!(families[0].members, ids(&["a", "b", "c"]));
        assert_eq!(families[0].roots, ids(&["a"]));
        assert_eq!(families[1].members, ids(&["x", "y"]));
        assert_eq!(families[1].roots, ids(&["x"]));
    }

    #[test]
    fn test_family_with_two_roots() {
        let graph = graph(&["a", "b", "c"], &[], &[("a", "c"), ("b", "c")]);
        let families = graph.member_families();

        assert_eq!(families.len(), 1);
        assert_eq!(families[0].roots, ids(&["a", "b"]));
    }
}
