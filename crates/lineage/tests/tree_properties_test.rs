//! Property tests for tree assembly over randomly generated forests.

use std::collections::{BTreeSet, HashSet};

use proptest::{prelude::*, test_runner::TestCaseError};

use lineage::{
    PLACEHOLDER_CLASS, Tree, TreeConfig,
    entity::{Entity, ParentKey},
    identifier::Id,
};

/// One generated member: a parent selector and an optional rank.
///
/// Selector `0` means no parent, `1` an unknown parent, and `k >= 2` the
/// `(k - 2)`-th earlier member, so generated forests never contain cycles.
type MemberSpec = (usize, Option<i64>);

fn forest_strategy() -> impl Strategy<Value = Vec<MemberSpec>> {
    prop::collection::vec((0usize..64, prop::option::of(-5i64..15)), 1..24)
}

fn member_name(prefix: &str, idx: usize) -> Id {
    Id::new(&format!("{prefix}{idx:02}"))
}

fn entities(prefix: &str, specs: &[MemberSpec]) -> Vec<Entity<i64>> {
    specs
        .iter()
        .enumerate()
        .map(|(idx, (selector, rank))| {
            let parent = match selector % (idx + 2) {
                0 => ParentKey::None,
                1 => ParentKey::Unknown,
                k => ParentKey::Id(member_name(prefix, k - 2)),
            };
            Entity::member(member_name(prefix, idx), parent, *rank)
        })
        .collect()
}

fn build(entities: Vec<Entity<i64>>, seed: u64) -> Tree<i64> {
    let config = TreeConfig::new(seed, -1, 1).expect("valid offsets");
    Tree::build(entities, vec![], config).expect("generated forests are valid")
}

fn check_views_deterministic(specs: &[MemberSpec], seed: u64) -> Result<(), TestCaseError> {
    let first = build(entities("m", specs), seed);
    let second = build(entities("m", specs), seed);

    prop_assert_eq!(first.entity_ids(), second.entity_ids());
    prop_assert_eq!(first.entity_ids(), first.entity_ids());
    prop_assert_eq!(first.relationship_ids(), second.relationship_ids());
    prop_assert_eq!(first.families(), second.families());
    prop_assert_eq!(first.ranks(), second.ranks());
    prop_assert_eq!(first.cohorts(), second.cohorts());
    Ok(())
}

fn check_entity_ids_cover_tree(specs: &[MemberSpec], seed: u64) -> Result<(), TestCaseError> {
    let tree = build(entities("m", specs), seed);

    let ids: HashSet<Id> = tree.entity_ids().iter().copied().collect();
    prop_assert_eq!(ids.len(), tree.len());
    prop_assert_eq!(tree.entity_ids().len(), tree.len());
    for entity in tree.entities() {
        prop_assert!(ids.contains(&entity.id()));
    }

    let mut sorted = tree.relationship_ids().to_vec();
    sorted.sort();
    prop_assert_eq!(sorted.as_slice(), tree.relationship_ids());
    Ok(())
}

fn check_new_component_keeps_order(specs: &[MemberSpec], seed: u64) -> Result<(), TestCaseError> {
    let original = build(entities("m", specs), seed);

    let mut extended = entities("m", specs);
    extended.push(Entity::member(Id::new("new root"), ParentKey::None, Some(3)));
    extended.push(Entity::member(
        Id::new("new child"),
        ParentKey::Id(Id::new("new root")),
        Some(4),
    ));
    let extended = build(extended, seed);

    for root in original.family_sizes().keys() {
        let family = |tree: &Tree<i64>| -> Vec<Id> {
            tree.entity_ids()
                .iter()
                .copied()
                .filter(|id| original.families().get(id) == Some(root))
                .collect()
        };
        prop_assert_eq!(family(&original), family(&extended));
    }
    Ok(())
}

fn check_cohorts_complete(specs: &[MemberSpec]) -> Result<(), TestCaseError> {
    let tree = build(entities("m", specs), 0);

    let ranked: BTreeSet<Id> = tree
        .entities()
        .filter(|entity| entity.rank().is_some())
        .map(|entity| entity.id())
        .collect();
    let in_cohorts: BTreeSet<Id> = tree.cohorts().values().flatten().copied().collect();
    prop_assert_eq!(&ranked, &in_cohorts);

    let cohort_total: usize = tree.cohorts().values().map(BTreeSet::len).sum();
    prop_assert_eq!(cohort_total, ranked.len());

    let ranks: Vec<i64> = tree.cohorts().keys().copied().collect();
    prop_assert_eq!(ranks.as_slice(), tree.ranks());
    if let (Some(first), Some(last)) = (tree.ranks().first(), tree.ranks().last()) {
        prop_assert!(tree.cohorts()[first].is_empty());
        prop_assert!(tree.cohorts()[last].is_empty());
        prop_assert_eq!(tree.ranks().len() as i64, last - first + 1);
    }
    Ok(())
}

fn check_families_rooted(specs: &[MemberSpec]) -> Result<(), TestCaseError> {
    let tree = build(entities("m", specs), 0);

    for (member, root) in tree.families() {
        prop_assert_eq!(tree.families().get(root), Some(root));
        let root_entity = tree.entity(*root).expect("family roots are entities");
        prop_assert_eq!(root_entity.parent_key(), Some(ParentKey::None));
        if member == root {
            continue;
        }
        let entity = tree.entity(*member).expect("family members are entities");
        prop_assert!(matches!(entity.parent_key(), Some(ParentKey::Id(_) | ParentKey::Unknown)));
    }
    Ok(())
}

fn check_unknown_parents_get_placeholders(specs: &[MemberSpec]) -> Result<(), TestCaseError> {
    let members = entities("m", specs);
    let tree = build(members.clone(), 0);

    for member in members.iter().filter(|m| m.parent_key() == Some(ParentKey::Unknown)) {
        let placeholder_id = Id::placeholder_parent(member.id());
        let placeholder = tree
            .entity(placeholder_id)
            .expect("unknown parents get a placeholder");
        prop_assert!(placeholder.classes().contains(PLACEHOLDER_CLASS));
        prop_assert_eq!(placeholder.rank(), member.rank().map(|rank| rank - 1));
        prop_assert!(tree.relationship(placeholder_id, member.id()).is_some());
        prop_assert_eq!(
            tree.families().get(&member.id()),
            tree.families().get(&placeholder_id)
        );
    }
    Ok(())
}

proptest! {
    #[test]
    fn views_deterministic(specs in forest_strategy(), seed in any::<u64>()) {
        check_views_deterministic(&specs, seed)?;
    }

    #[test]
    fn entity_ids_cover_tree(specs in forest_strategy(), seed in any::<u64>()) {
        check_entity_ids_cover_tree(&specs, seed)?;
    }

    #[test]
    fn new_component_keeps_order(specs in forest_strategy(), seed in any::<u64>()) {
        check_new_component_keeps_order(&specs, seed)?;
    }

    #[test]
    fn cohorts_complete(specs in forest_strategy()) {
        check_cohorts_complete(&specs)?;
    }

    #[test]
    fn families_rooted(specs in forest_strategy()) {
        check_families_rooted(&specs)?;
    }

    #[test]
    fn unknown_parents_get_placeholders(specs in forest_strategy()) {
        check_unknown_parents_get_placeholders(&specs)?;
    }
}

#[test]
fn test_two_families() {
    let entities = vec![
        Entity::member(Id::new("A"), ParentKey::None, None),
        Entity::member(Id::new("B"), ParentKey::Id(Id::new("A")), None),
        Entity::member(Id::new("C"), ParentKey::Id(Id::new("B")), None),
        Entity::member(Id::new("X"), ParentKey::None, None),
        Entity::member(Id::new("Y"), ParentKey::Id(Id::new("X")), None),
    ];
    let tree = build(entities, 0);

    for member in ["A", "B", "C"] {
        assert_eq!(tree.families()[&Id::new(member)], Id::new("A"));
    }
    for member in ["X", "Y"] {
        assert_eq!(tree.families()[&Id::new(member)], Id::new("X"));
    }
}

#[test]
fn test_end_to_end_scenario() {
    let entities = vec![
        Entity::member(Id::new("A"), ParentKey::None, Some(1_i64)),
        Entity::member(Id::new("B"), ParentKey::Id(Id::new("A")), Some(2)),
        Entity::member(Id::new("C"), ParentKey::Id(Id::new("A")), Some(2)),
    ];
    let tree = Tree::build(entities, vec![], TreeConfig::default()).unwrap();

    let ids: Vec<String> = tree.entity_ids().iter().map(Id::to_string).collect();
    assert_eq!(ids, ["A", "B", "C"]);
    assert_eq!(
        tree.relationship_ids(),
        &[(Id::new("A"), Id::new("B")), (Id::new("A"), Id::new("C"))]
    );
    assert_eq!(tree.ranks(), &[1, 2]);
    assert_eq!(tree.cohorts()[&1].len(), 1);
    assert_eq!(tree.cohorts()[&2].len(), 2);
}

#[test]
fn test_seed_only_moves_whole_components() {
    let entities: Vec<Entity<i64>> = (0..12)
        .map(|idx| Entity::member(member_name("solo", idx), ParentKey::None, None))
        .collect();

    let orders: HashSet<Vec<Id>> = (0..8)
        .map(|seed| build(entities.clone(), seed).entity_ids().to_vec())
        .collect();
    assert!(orders.len() > 1, "different seeds should shuffle families");
}
