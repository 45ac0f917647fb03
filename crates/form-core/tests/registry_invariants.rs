//! Integration tests: structural invariants of the item registry under long
//! sequences of moves, inserts and removals.

use form_core::{Block, ContainerId, FormDocument, Item, ItemId, Section};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

/// Small deterministic generator so failures reproduce exactly.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound.max(1)
    }
}

fn sorted_ids(doc: &FormDocument) -> Vec<String> {
    let mut ids: Vec<String> = doc.questions().iter().map(|q| q.id.to_string()).collect();
    ids.sort();
    ids
}

fn two_section_form() -> FormDocument {
    let section = |name: &str, n: usize| {
        Section::new(ItemId::intern(name)).with_content(
            (0..n)
                .map(|i| Item::text(ItemId::intern(&format!("{name}_q{i}"))))
                .collect(),
        )
    };
    FormDocument::from_blocks(
        "Invariants",
        vec![
            Block::Item(Item::text(ItemId::intern("inv_top0"))),
            Block::Section(section("inv_s1", 4)),
            Block::Item(Item::text(ItemId::intern("inv_top1"))),
            Block::Section(section("inv_s2", 3)),
        ],
    )
    .unwrap()
}

#[test]
fn reorders_within_one_container_are_permutations() {
    let mut doc = two_section_form();
    let s1 = ContainerId::Section(ItemId::intern("inv_s1"));
    let before = {
        let mut ids = doc.container_ids(s1).unwrap();
        ids.sort_by_key(|id| id.to_string());
        ids
    };
    let mut rng = Lcg(7);
    for _ in 0..200 {
        let ids = doc.container_ids(s1).unwrap();
        let id = ids[rng.next(ids.len())];
        doc.move_to(id, s1, rng.next(ids.len() + 1));
        assert!(doc.index_is_consistent());
    }
    let mut after = doc.container_ids(s1).unwrap();
    after.sort_by_key(|id| id.to_string());
    assert_eq!(after, before);
}

#[test]
fn cross_container_moves_preserve_every_item() {
    let mut doc = two_section_form();
    let expected = sorted_ids(&doc);
    let containers = [
        ContainerId::Root,
        ContainerId::Section(ItemId::intern("inv_s1")),
        ContainerId::Section(ItemId::intern("inv_s2")),
    ];
    let mut rng = Lcg(42);
    for _ in 0..300 {
        let questions: Vec<ItemId> = doc.questions().iter().map(|q| q.id).collect();
        let id = questions[rng.next(questions.len())];
        let dest = containers[rng.next(containers.len())];
        let len = doc.container_len(dest).unwrap();
        let from = doc.slot_of(id).unwrap().container;
        let from_len = doc.container_len(from).unwrap();

        let moved = doc.move_to(id, dest, rng.next(len + 1));

        assert!(doc.index_is_consistent());
        if moved && from != dest {
            assert_eq!(doc.container_len(from).unwrap(), from_len - 1);
            assert_eq!(doc.container_len(dest).unwrap(), len + 1);
            assert_eq!(doc.slot_of(id).unwrap().container, dest);
        }
    }
    assert_eq!(sorted_ids(&doc), expected);
}

#[test]
fn ids_stay_unique_through_inserts_and_removals() {
    let mut doc = two_section_form();
    let mut rng = Lcg(3);
    for round in 0..100 {
        if rng.next(3) == 0 {
            let questions: Vec<ItemId> = doc.questions().iter().map(|q| q.id).collect();
            if !questions.is_empty() {
                doc.remove(questions[rng.next(questions.len())]);
            }
        } else {
            let item = Item::text(ItemId::intern(&format!("inv_new{round}")));
            doc.insert_item(ContainerId::Root, rng.next(doc.blocks().len() + 1), item);
        }
        assert!(doc.index_is_consistent());
        let ids: Vec<ItemId> = doc.questions().iter().map(|q| q.id).collect();
        let unique: HashSet<ItemId> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());
    }
}
