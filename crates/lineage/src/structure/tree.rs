//! The lineage tree.
//!
//! [`Tree::build`] validates a flat collection of entities and relationships
//! and turns it into an immutable forest. The derived views renderers consume
//! ([`Tree::entity_ids`], [`Tree::relationship_ids`], [`Tree::families`],
//! [`Tree::ranks`] and [`Tree::cohorts`]) are computed on first access and
//! cached.

use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    sync::OnceLock,
};

use indexmap::{IndexMap, map::Entry};
use log::{debug, info, trace};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use lineage_core::{
    entity::{Entity, ParentKey},
    identifier::Id,
    rank::{Rank, Semester},
    relationship::Relationship,
};

use super::{TreeError, graph::LineageGraph};

/// Class given to synthesized unknown-parent placeholders and their edges.
pub const PLACEHOLDER_CLASS: &str = "placeholder";

/// Validated settings of the tree engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeConfig {
    seed: u64,
    rank_min_offset: i64,
    rank_max_offset: i64,
    remove_singletons: bool,
}

impl TreeConfig {
    /// Creates a tree configuration.
    ///
    /// # Arguments
    ///
    /// * `seed` - Seed of the component shuffle in [`Tree::entity_ids`].
    /// * `rank_min_offset` - Ranks added before the earliest rank. Must be `<= 0`.
    /// * `rank_max_offset` - Ranks added after the latest rank. Must be `>= 0`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Configuration`] when an offset would drop ranks
    /// instead of padding them.
    pub fn new(seed: u64, rank_min_offset: i64, rank_max_offset: i64) -> Result<Self, TreeError> {
        if rank_min_offset > 0 {
            return Err(TreeError::Configuration(format!(
                "rank_min_offset must not be positive, got {rank_min_offset}"
            )));
        }
        if rank_max_offset < 0 {
            return Err(TreeError::Configuration(format!(
                "rank_max_offset must not be negative, got {rank_max_offset}"
            )));
        }
        Ok(Self {
            seed,
            rank_min_offset,
            rank_max_offset,
            remove_singletons: false,
        })
    }

    /// Drop members that have neither a parent nor children before building.
    pub fn with_remove_singletons(mut self, remove_singletons: bool) -> Self {
        self.remove_singletons = remove_singletons;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rank_min_offset(&self) -> i64 {
        self.rank_min_offset
    }

    pub fn rank_max_offset(&self) -> i64 {
        self.rank_max_offset
    }

    pub fn remove_singletons(&self) -> bool {
        self.remove_singletons
    }
}

/// An immutable, validated lineage forest.
///
/// # Examples
///
/// ```
/// use lineage::{Tree, TreeConfig};
/// use lineage_core::{entity::{Entity, ParentKey}, identifier::Id};
///
/// let entities = vec![
///     Entity::member(Id::new("A"), ParentKey::None, Some(1_i64)),
///     Entity::member(Id::new("B"), ParentKey::Id(Id::new("A")), Some(2)),
/// ];
/// let tree = Tree::build(entities, vec![], TreeConfig::default()).unwrap();
///
/// assert_eq!(tree.families()[&Id::new("B")], Id::new("A"));
/// assert_eq!(tree.ranks(), &[1, 2]);
/// ```
#[derive(Debug)]
pub struct Tree<R: Rank = Semester> {
    config: TreeConfig,
    entities: IndexMap<Id, Entity<R>>,
    relationships: IndexMap<(Id, Id), Relationship>,
    graph: LineageGraph,
    families: BTreeMap<Id, Id>,
    entity_ids: OnceLock<Vec<Id>>,
    relationship_ids: OnceLock<Vec<(Id, Id)>>,
    ranks: OnceLock<Vec<R>>,
    cohorts: OnceLock<BTreeMap<R, BTreeSet<Id>>>,
}

impl<R: Rank> Tree<R> {
    /// Builds and validates a tree.
    ///
    /// Members with a concrete parent key get an implicit `parent -> member`
    /// relationship. Members whose parent is [`ParentKey::Unknown`] and that
    /// have no member parent after all relationships are added get a
    /// placeholder parent named `"{member} Parent"` one rank earlier.
    ///
    /// # Errors
    ///
    /// * [`TreeError::DuplicateEntity`] - Two entities share an id, including a
    ///   placeholder colliding with an existing entity.
    /// * [`TreeError::UnknownParent`] - A parent key or relationship parent is
    ///   not an entity.
    /// * [`TreeError::UnknownEntity`] - A relationship child is not an entity.
    /// * [`TreeError::DuplicateRelationship`] - A `(parent, child)` pair is
    ///   declared twice.
    /// * [`TreeError::Cycle`] - Members form a directed cycle.
    /// * [`TreeError::FamilyRoots`] - A family has zero or several roots.
    pub fn build(
        entities: Vec<Entity<R>>,
        relationships: Vec<Relationship>,
        config: TreeConfig,
    ) -> Result<Self, TreeError> {
        info!(
            entities = entities.len(),
            relationships = relationships.len();
            "Building tree"
        );

        let mut entities = index_entities(entities)?;
        let mut edges = parent_relationships(&entities)?;
        add_relationships(&entities, &mut edges, relationships)?;

        if config.remove_singletons() {
            remove_singletons(&mut entities, &edges);
        }
        add_placeholders(&mut entities, &mut edges)?;

        let mut graph = LineageGraph::new();
        for entity in entities.values() {
            graph.add_entity(entity.id(), entity.is_member());
        }
        for (parent, child) in edges.keys() {
            graph.add_edge(*parent, *child);
        }
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count();
            "Lineage graph built"
        );

        if let Some(cycle) = graph.member_cycle() {
            return Err(TreeError::Cycle(cycle));
        }

        let mut families = BTreeMap::new();
        for family in graph.member_families() {
            if family.roots.len() != 1 {
                return Err(TreeError::FamilyRoots {
                    member: family.members[0],
                    roots: family.roots,
                });
            }
            let root = family.roots[0];
            families.extend(family.members.iter().map(|member| (*member, root)));
        }
        trace!(families:? = families; "Families resolved");

        info!(entities = entities.len(), relationships = edges.len(); "Tree built");
        Ok(Self {
            config,
            entities,
            relationships: edges,
            graph,
            families,
            entity_ids: OnceLock::new(),
            relationship_ids: OnceLock::new(),
            ranks: OnceLock::new(),
            cohorts: OnceLock::new(),
        })
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Number of entities, placeholders included.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity(&self, id: Id) -> Option<&Entity<R>> {
        self.entities.get(&id)
    }

    pub fn relationship(&self, parent: Id, child: Id) -> Option<&Relationship> {
        self.relationships.get(&(parent, child))
    }

    /// All entity ids in layout order.
    ///
    /// Weakly-connected components are sorted by their smallest id, then
    /// shuffled with a generator seeded from [`TreeConfig::seed`]. Ids are
    /// sorted within each component, so adding an unrelated component never
    /// reorders an existing one.
    pub fn entity_ids(&self) -> &[Id] {
        self.entity_ids.get_or_init(|| {
            let mut components = self.graph.components();
            let mut rng = StdRng::seed_from_u64(self.config.seed());
            components.shuffle(&mut rng);
            trace!(components = components.len(); "Components shuffled");
            components.into_iter().flatten().collect()
        })
    }

    /// Entities in [`Tree::entity_ids`] order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity<R>> {
        self.entity_ids().iter().map(|id| &self.entities[id])
    }

    /// All relationship keys, sorted by `(parent, child)`.
    pub fn relationship_ids(&self) -> &[(Id, Id)] {
        self.relationship_ids.get_or_init(|| {
            let mut ids: Vec<(Id, Id)> = self.relationships.keys().copied().collect();
            ids.sort();
            ids
        })
    }

    /// Relationships in [`Tree::relationship_ids`] order.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationship_ids()
            .iter()
            .map(|key| &self.relationships[key])
    }

    /// Maps every member to the root of its family.
    ///
    /// Custom entities are not part of any family and are absent.
    pub fn families(&self) -> &BTreeMap<Id, Id> {
        &self.families
    }

    /// Number of members per family root.
    pub fn family_sizes(&self) -> BTreeMap<Id, usize> {
        let mut sizes = BTreeMap::new();
        for root in self.families.values() {
            *sizes.entry(*root).or_default() += 1;
        }
        sizes
    }

    /// Every rank from the earliest to the latest ranked entity, padded by the
    /// configured offsets. Empty when no entity has a rank.
    pub fn ranks(&self) -> &[R] {
        self.ranks.get_or_init(|| {
            let mut indices = self
                .entities
                .values()
                .filter_map(|entity| entity.rank())
                .map(|rank| rank.to_index());
            let Some(first) = indices.next() else {
                return Vec::new();
            };
            let (min, max) = indices.fold((first, first), |(min, max), index| {
                (min.min(index), max.max(index))
            });

            let start = min + self.config.rank_min_offset();
            let end = max + self.config.rank_max_offset();
            (start..=end).map(R::from_index).collect()
        })
    }

    /// Maps every rank of [`Tree::ranks`] to the entities holding it.
    ///
    /// Padding ranks map to empty sets; unranked entities appear nowhere.
    pub fn cohorts(&self) -> &BTreeMap<R, BTreeSet<Id>> {
        self.cohorts.get_or_init(|| {
            let mut cohorts: BTreeMap<R, BTreeSet<Id>> = self
                .ranks()
                .iter()
                .map(|rank| (*rank, BTreeSet::new()))
                .collect();
            for entity in self.entities.values() {
                if let Some(rank) = entity.rank() {
                    cohorts.entry(rank).or_default().insert(entity.id());
                }
            }
            cohorts
        })
    }
}

fn index_entities<R: Rank>(entities: Vec<Entity<R>>) -> Result<IndexMap<Id, Entity<R>>, TreeError> {
    let mut indexed = IndexMap::with_capacity(entities.len());
    for entity in entities {
        match indexed.entry(entity.id()) {
            Entry::Occupied(_) => return Err(TreeError::DuplicateEntity(entity.id())),
            Entry::Vacant(slot) => {
                slot.insert(entity);
            }
        }
    }
    Ok(indexed)
}

fn parent_relationships<R: Rank>(
    entities: &IndexMap<Id, Entity<R>>,
) -> Result<IndexMap<(Id, Id), Relationship>, TreeError> {
    let mut edges = IndexMap::new();
    for entity in entities.values() {
        let Some(ParentKey::Id(parent)) = entity.parent_key() else {
            continue;
        };
        if !entities.contains_key(&parent) {
            return Err(TreeError::UnknownParent {
                child: entity.id(),
                parent,
            });
        }
        edges.insert((parent, entity.id()), Relationship::new(parent, entity.id()));
    }
    Ok(edges)
}

fn add_relationships<R: Rank>(
    entities: &IndexMap<Id, Entity<R>>,
    edges: &mut IndexMap<(Id, Id), Relationship>,
    relationships: Vec<Relationship>,
) -> Result<(), TreeError> {
    for relationship in relationships {
        let (parent, child) = relationship.key();
        if !entities.contains_key(&parent) {
            return Err(TreeError::UnknownParent { child, parent });
        }
        if !entities.contains_key(&child) {
            return Err(TreeError::UnknownEntity { parent, child });
        }
        match edges.entry((parent, child)) {
            Entry::Occupied(_) => return Err(TreeError::DuplicateRelationship { parent, child }),
            Entry::Vacant(slot) => {
                slot.insert(relationship);
            }
        }
    }
    Ok(())
}

/// Drops rootless members that no edge touches.
fn remove_singletons<R: Rank>(
    entities: &mut IndexMap<Id, Entity<R>>,
    edges: &IndexMap<(Id, Id), Relationship>,
) {
    let connected: HashSet<Id> = edges
        .keys()
        .flat_map(|(parent, child)| [*parent, *child])
        .collect();

    let before = entities.len();
    entities.retain(|id, entity| {
        let rootless = matches!(
            entity.parent_key(),
            Some(ParentKey::None | ParentKey::Unknown)
        );
        !(rootless && !connected.contains(id))
    });
    info!(removed = before - entities.len(); "Removed singleton members");
}

/// Gives every unknown-parent member without a member parent a placeholder parent.
fn add_placeholders<R: Rank>(
    entities: &mut IndexMap<Id, Entity<R>>,
    edges: &mut IndexMap<(Id, Id), Relationship>,
) -> Result<(), TreeError> {
    let with_member_parent: HashSet<Id> = edges
        .keys()
        .filter(|(parent, _)| entities.get(parent).is_some_and(Entity::is_member))
        .map(|(_, child)| *child)
        .collect();

    let orphans: Vec<(Id, Option<R>)> = entities
        .values()
        .filter(|entity| entity.parent_key() == Some(ParentKey::Unknown))
        .filter(|entity| !with_member_parent.contains(&entity.id()))
        .map(|entity| (entity.id(), entity.rank()))
        .collect();

    for (child, rank) in &orphans {
        let placeholder = Id::placeholder_parent(*child);
        let entity = Entity::member(placeholder, ParentKey::None, rank.map(|rank| rank.offset(-1)))
            .with_class(PLACEHOLDER_CLASS)
            .with_data("name", "Unknown");
        match entities.entry(placeholder) {
            Entry::Occupied(_) => return Err(TreeError::DuplicateEntity(placeholder)),
            Entry::Vacant(slot) => {
                slot.insert(entity);
            }
        }
        edges.insert(
            (placeholder, *child),
            Relationship::new(placeholder, *child).with_class(PLACEHOLDER_CLASS),
        );
    }
    debug!(placeholders = orphans.len(); "Unknown parents synthesized");
    Ok(())
}
