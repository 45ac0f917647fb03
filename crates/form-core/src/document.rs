//! The item registry: a `FormDocument` aggregate owning every block.
//!
//! All structural mutation goes through the methods here. Each one either
//! applies fully and returns `true`, or detects a no-op / invalid input and
//! returns `false` without touching anything. The id → slot index is kept in
//! step with the containers on every mutation, so lookups never rescan.

use crate::id::ItemId;
use crate::model::{Block, ContainerId, Item, Section, Slot};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Persisted shape of a document: the title and the top-level blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSource {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// The complete authored form.
#[derive(Debug, Clone, Default)]
pub struct FormDocument {
    /// Form title, sent as `formName` on submission.
    pub title: String,

    /// Top-level sequence.
    blocks: Vec<Block>,

    /// Secondary index: id → (container, position) for every item and section.
    index: HashMap<ItemId, Slot>,
}

impl FormDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from prepared blocks.
    ///
    /// # Errors
    /// Returns a message naming the first id that appears twice.
    pub fn from_blocks(title: impl Into<String>, blocks: Vec<Block>) -> Result<Self, String> {
        let mut doc = Self {
            title: title.into(),
            blocks,
            index: HashMap::new(),
        };
        doc.rebuild_index()?;
        Ok(doc)
    }

    /// Build a flat document (no sections) from items.
    ///
    /// # Errors
    /// Returns a message naming the first duplicated id.
    pub fn from_items(title: impl Into<String>, items: Vec<Item>) -> Result<Self, String> {
        Self::from_blocks(title, items.into_iter().map(Block::Item).collect())
    }

    /// Load a document from its persisted shape.
    ///
    /// # Errors
    /// Returns a message naming the first duplicated id.
    pub fn from_source(source: DocumentSource) -> Result<Self, String> {
        Self::from_blocks(source.title, source.blocks)
    }

    pub fn to_source(&self) -> DocumentSource {
        DocumentSource {
            title: self.title.clone(),
            blocks: self.blocks.clone(),
        }
    }

    fn rebuild_index(&mut self) -> Result<(), String> {
        self.index.clear();
        for (position, block) in self.blocks.iter().enumerate() {
            let slot = Slot::new(ContainerId::Root, position);
            if self.index.insert(block.id(), slot).is_some() {
                return Err(format!("duplicate id `{}`", block.id()));
            }
            if let Block::Section(section) = block {
                for (position, item) in section.content.iter().enumerate() {
                    let slot = Slot::new(ContainerId::Section(section.id), position);
                    if self.index.insert(item.id, slot).is_some() {
                        return Err(format!("duplicate id `{}`", item.id));
                    }
                }
            }
        }
        Ok(())
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn slot_of(&self, id: ItemId) -> Option<Slot> {
        self.index.get(&id).copied()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn is_section(&self, id: ItemId) -> bool {
        self.section(id).is_some()
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        let slot = self.slot_of(id)?;
        match slot.container {
            ContainerId::Root => self.blocks.get(slot.position)?.as_item(),
            ContainerId::Section(section_id) => {
                self.section(section_id)?.content.get(slot.position)
            }
        }
    }

    pub fn section(&self, id: ItemId) -> Option<&Section> {
        let slot = self.slot_of(id)?;
        match slot.container {
            ContainerId::Root => self.blocks.get(slot.position)?.as_section(),
            ContainerId::Section(_) => None,
        }
    }

    pub(crate) fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        let slot = self.slot_of(id)?;
        match slot.container {
            ContainerId::Root => match self.blocks.get_mut(slot.position)? {
                Block::Item(item) => Some(item),
                Block::Section(_) => None,
            },
            ContainerId::Section(section_id) => {
                let root = self.slot_of(section_id)?.position;
                match self.blocks.get_mut(root)? {
                    Block::Section(section) => section.content.get_mut(slot.position),
                    Block::Item(_) => None,
                }
            }
        }
    }

    pub(crate) fn section_mut(&mut self, id: ItemId) -> Option<&mut Section> {
        let slot = self.slot_of(id)?;
        if slot.container != ContainerId::Root {
            return None;
        }
        match self.blocks.get_mut(slot.position)? {
            Block::Section(section) => Some(section),
            Block::Item(_) => None,
        }
    }

    /// Whether `container` exists in this document.
    pub fn has_container(&self, container: ContainerId) -> bool {
        match container {
            ContainerId::Root => true,
            ContainerId::Section(id) => self.is_section(id),
        }
    }

    /// Number of entries directly inside `container`.
    pub fn container_len(&self, container: ContainerId) -> Option<usize> {
        match container {
            ContainerId::Root => Some(self.blocks.len()),
            ContainerId::Section(id) => self.section(id).map(|s| s.content.len()),
        }
    }

    /// Ids directly inside `container`, in order.
    pub fn container_ids(&self, container: ContainerId) -> Option<Vec<ItemId>> {
        match container {
            ContainerId::Root => Some(self.blocks.iter().map(Block::id).collect()),
            ContainerId::Section(id) => self
                .section(id)
                .map(|s| s.content.iter().map(|item| item.id).collect()),
        }
    }

    /// Id at `position` inside `container`.
    pub fn id_at(&self, container: ContainerId, position: usize) -> Option<ItemId> {
        match container {
            ContainerId::Root => self.blocks.get(position).map(Block::id),
            ContainerId::Section(id) => self.section(id)?.content.get(position).map(|i| i.id),
        }
    }

    /// All sections in top-level order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.blocks.iter().filter_map(Block::as_section)
    }

    /// Every question in respondent order: top-level items in place,
    /// section content expanded where the section sits.
    pub fn questions(&self) -> Vec<&Item> {
        let mut out = Vec::with_capacity(self.question_count());
        for block in &self.blocks {
            match block {
                Block::Item(item) => out.push(item),
                Block::Section(section) => out.extend(section.content.iter()),
            }
        }
        out
    }

    pub fn question_count(&self) -> usize {
        self.blocks.iter().map(Block::question_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    // ─── Structural mutation ─────────────────────────────────────────────

    /// Insert `item` into `container` at `index` (clamped to the end).
    ///
    /// Refused when the id is already taken or the container does not exist.
    pub fn insert_item(&mut self, container: ContainerId, index: usize, item: Item) -> bool {
        if self.contains(item.id) {
            log::debug!("insert refused: id {} already present", item.id);
            return false;
        }
        match container {
            ContainerId::Root => {
                let index = index.min(self.blocks.len());
                self.blocks.insert(index, Block::Item(item));
            }
            ContainerId::Section(section_id) => {
                let Some(section) = self.section_mut(section_id) else {
                    return false;
                };
                let index = index.min(section.content.len());
                section.content.insert(index, item);
            }
        }
        self.reindex(container);
        true
    }

    /// Append `item` to the end of `container`.
    pub fn push_item(&mut self, container: ContainerId, item: Item) -> bool {
        self.insert_item(container, usize::MAX, item)
    }

    /// Insert a section at top-level `index` (clamped to the end).
    ///
    /// Refused when the section id or any id in its content is already taken,
    /// or when the content repeats an id.
    pub fn insert_section(&mut self, index: usize, section: Section) -> bool {
        if self.contains(section.id)
            || section.content.iter().any(|item| self.contains(item.id))
        {
            log::debug!("insert refused: section {} clashes with existing ids", section.id);
            return false;
        }
        let mut seen = std::collections::HashSet::new();
        if !section.content.iter().all(|item| seen.insert(item.id))
            || seen.contains(&section.id)
        {
            return false;
        }
        let id = section.id;
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, Block::Section(section));
        self.reindex(ContainerId::Root);
        self.reindex(ContainerId::Section(id));
        true
    }

    /// Remove an item or a section (with its content). Returns what was removed.
    pub fn remove(&mut self, id: ItemId) -> Option<Block> {
        let slot = self.slot_of(id)?;
        let removed = match slot.container {
            ContainerId::Root => self.blocks.remove(slot.position),
            ContainerId::Section(section_id) => {
                let section = self.section_mut(section_id)?;
                Block::Item(section.content.remove(slot.position))
            }
        };
        self.index.remove(&id);
        if let Block::Section(section) = &removed {
            for item in &section.content {
                self.index.remove(&item.id);
            }
        }
        self.reindex(slot.container);
        log::debug!("removed {id} from {:?}", slot.container);
        Some(removed)
    }

    /// Move an item or section so it ends up at `index` inside `dest`.
    ///
    /// `index` is the final position after the move, clamped to the valid
    /// range, so dropping onto a sibling lands in that sibling's place.
    /// Sections may only move within the top level. Returns `false` when the
    /// move is refused or leaves the structure unchanged.
    pub fn move_to(&mut self, id: ItemId, dest: ContainerId, index: usize) -> bool {
        let Some(from) = self.slot_of(id) else {
            return false;
        };
        if !self.has_container(dest) {
            return false;
        }
        if self.is_section(id) && dest != ContainerId::Root {
            return false;
        }
        let Some(dest_len) = self.container_len(dest) else {
            return false;
        };
        // Removing from the same container shrinks it by one first.
        let max = if from.container == dest {
            dest_len.saturating_sub(1)
        } else {
            dest_len
        };
        let index = index.min(max);
        if from.container == dest && from.position == index {
            return false;
        }

        let block = match from.container {
            ContainerId::Root => self.blocks.remove(from.position),
            ContainerId::Section(section_id) => {
                let Some(section) = self.section_mut(section_id) else {
                    return false;
                };
                Block::Item(section.content.remove(from.position))
            }
        };
        // Section slots shift when a top-level block leaves, so the source
        // must be reindexed before the destination section is looked up.
        self.reindex(from.container);
        match (dest, block) {
            (ContainerId::Root, block) => self.blocks.insert(index, block),
            (ContainerId::Section(section_id), Block::Item(item)) => {
                match self.section_mut(section_id) {
                    Some(section) => section.content.insert(index, item),
                    None => {
                        self.restore(from, Block::Item(item));
                        return false;
                    }
                }
            }
            (ContainerId::Section(_), block @ Block::Section(_)) => {
                self.restore(from, block);
                return false;
            }
        }
        self.reindex(dest);
        log::debug!(
            "moved {id} from {:?}[{}] to {:?}[{index}]",
            from.container,
            from.position,
            dest
        );
        true
    }

    /// Put a block back where `move_to` took it from.
    fn restore(&mut self, from: Slot, block: Block) {
        match (from.container, block) {
            (ContainerId::Root, block) => self.blocks.insert(from.position, block),
            (ContainerId::Section(section_id), Block::Item(item)) => {
                if let Some(section) = self.section_mut(section_id) {
                    section.content.insert(from.position, item);
                }
            }
            // Sections only ever live at the top level.
            (ContainerId::Section(_), Block::Section(_)) => {}
        }
        self.reindex(from.container);
    }

    /// Recompute the slots of everything directly inside `container`.
    fn reindex(&mut self, container: ContainerId) {
        match container {
            ContainerId::Root => {
                for (position, block) in self.blocks.iter().enumerate() {
                    self.index.insert(block.id(), Slot::new(container, position));
                }
            }
            ContainerId::Section(section_id) => {
                let Some(root) = self.index.get(&section_id).map(|s| s.position) else {
                    return;
                };
                if let Some(Block::Section(section)) = self.blocks.get(root) {
                    for (position, item) in section.content.iter().enumerate() {
                        self.index.insert(item.id, Slot::new(container, position));
                    }
                }
            }
        }
    }

    /// Check that the index matches the containers exactly.
    ///
    /// Every mutation keeps this true; tests assert it after each step.
    pub fn index_is_consistent(&self) -> bool {
        let mut expected = 0;
        for (position, block) in self.blocks.iter().enumerate() {
            expected += 1;
            if self.index.get(&block.id()) != Some(&Slot::new(ContainerId::Root, position)) {
                return false;
            }
            if let Block::Section(section) = block {
                for (position, item) in section.content.iter().enumerate() {
                    expected += 1;
                    let slot = Slot::new(ContainerId::Section(section.id), position);
                    if self.index.get(&item.id) != Some(&slot) {
                        return false;
                    }
                }
            }
        }
        expected == self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Choice, Item};
    use pretty_assertions::assert_eq;

    fn ids(doc: &FormDocument, container: ContainerId) -> Vec<String> {
        doc.container_ids(container)
            .unwrap()
            .into_iter()
            .map(|id| id.as_str().to_owned())
            .collect()
    }

    fn sample() -> FormDocument {
        let section = Section::new(ItemId::intern("doc_s1")).with_content(vec![
            Item::text(ItemId::intern("doc_s1_a")),
            Item::text(ItemId::intern("doc_s1_b")),
        ]);
        FormDocument::from_blocks(
            "Sample",
            vec![
                Block::Item(Item::text(ItemId::intern("doc_a"))),
                Block::Item(Item::text(ItemId::intern("doc_b"))),
                Block::Section(section),
                Block::Item(Item::text(ItemId::intern("doc_c"))),
            ],
        )
        .unwrap()
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = FormDocument::from_items(
            "",
            vec![
                Item::text(ItemId::intern("dup")),
                Item::text(ItemId::intern("dup")),
            ],
        )
        .unwrap_err();
        assert!(err.contains("dup"));
    }

    #[test]
    fn questions_expand_sections_in_place() {
        let doc = sample();
        let order: Vec<&str> = doc.questions().iter().map(|q| q.id.as_str()).collect();
        assert_eq!(order, vec!["doc_a", "doc_b", "doc_s1_a", "doc_s1_b", "doc_c"]);
        assert_eq!(doc.question_count(), 5);
    }

    #[test]
    fn move_within_root_behaves_like_array_move() {
        let mut doc = sample();
        assert!(doc.move_to(ItemId::intern("doc_a"), ContainerId::Root, 2));
        assert_eq!(ids(&doc, ContainerId::Root), vec!["doc_b", "doc_s1", "doc_a", "doc_c"]);
        assert!(doc.index_is_consistent());

        // Past-the-end clamps to the last slot.
        assert!(doc.move_to(ItemId::intern("doc_b"), ContainerId::Root, 99));
        assert_eq!(ids(&doc, ContainerId::Root), vec!["doc_s1", "doc_a", "doc_c", "doc_b"]);
        assert!(doc.index_is_consistent());
    }

    #[test]
    fn move_onto_own_slot_is_noop() {
        let mut doc = sample();
        let before = ids(&doc, ContainerId::Root)
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        assert!(!doc.move_to(ItemId::intern("doc_b"), ContainerId::Root, 1));
        assert_eq!(ids(&doc, ContainerId::Root), before);
    }

    #[test]
    fn move_across_containers() {
        let mut doc = sample();
        let s1 = ContainerId::Section(ItemId::intern("doc_s1"));
        assert!(doc.move_to(ItemId::intern("doc_c"), s1, 1));
        assert_eq!(ids(&doc, s1), vec!["doc_s1_a", "doc_c", "doc_s1_b"]);
        assert_eq!(ids(&doc, ContainerId::Root), vec!["doc_a", "doc_b", "doc_s1"]);
        assert_eq!(doc.question_count(), 5);
        assert!(doc.index_is_consistent());

        assert!(doc.move_to(ItemId::intern("doc_s1_a"), ContainerId::Root, 0));
        assert_eq!(ids(&doc, ContainerId::Root), vec!["doc_s1_a", "doc_a", "doc_b", "doc_s1"]);
        assert!(doc.index_is_consistent());
    }

    #[test]
    fn sections_stay_top_level() {
        let mut doc = sample();
        let s1 = ItemId::intern("doc_s1");
        assert!(!doc.move_to(s1, ContainerId::Section(s1), 0));
        assert!(doc.move_to(s1, ContainerId::Root, 0));
        assert_eq!(doc.slot_of(s1), Some(Slot::new(ContainerId::Root, 0)));
        assert!(doc.index_is_consistent());
    }

    #[test]
    fn insert_refuses_taken_ids_and_missing_containers() {
        let mut doc = sample();
        assert!(!doc.insert_item(ContainerId::Root, 0, Item::text(ItemId::intern("doc_a"))));
        assert!(!doc.insert_item(
            ContainerId::Section(ItemId::intern("doc_nowhere")),
            0,
            Item::text(ItemId::intern("doc_new")),
        ));
        assert!(doc.insert_item(ContainerId::Root, 1, Item::text(ItemId::intern("doc_new"))));
        assert_eq!(doc.slot_of(ItemId::intern("doc_new")), Some(Slot::new(ContainerId::Root, 1)));
        assert!(doc.index_is_consistent());
    }

    #[test]
    fn remove_section_drops_content_from_index() {
        let mut doc = sample();
        let removed = doc.remove(ItemId::intern("doc_s1")).unwrap();
        assert_eq!(removed.question_count(), 2);
        assert!(!doc.contains(ItemId::intern("doc_s1_a")));
        assert_eq!(doc.question_count(), 3);
        assert!(doc.index_is_consistent());
        assert!(doc.remove(ItemId::intern("doc_s1")).is_none());
    }

    #[test]
    fn item_lookup_reaches_into_sections() {
        let mut doc = sample();
        doc.insert_item(
            ContainerId::Section(ItemId::intern("doc_s1")),
            0,
            Item::mcq(ItemId::intern("doc_pick"), vec![Choice::new("x")]),
        );
        let item = doc.item(ItemId::intern("doc_pick")).unwrap();
        assert_eq!(item.choices().len(), 1);
        assert!(doc.item(ItemId::intern("doc_s1")).is_none());
        assert!(doc.section(ItemId::intern("doc_pick")).is_none());
    }

    #[test]
    fn source_roundtrip_keeps_order_and_rejects_duplicates() {
        let doc = FormDocument::from_blocks(
            "Source",
            vec![
                Block::Item(Item::text(ItemId::intern("src_a"))),
                Block::Section(
                    Section::new(ItemId::intern("src_s"))
                        .with_content(vec![Item::text(ItemId::intern("src_b"))]),
                ),
            ],
        )
        .unwrap();
        let loaded = FormDocument::from_source(doc.to_source()).unwrap();
        assert_eq!(loaded.blocks(), doc.blocks());
        assert_eq!(
            loaded.slot_of(ItemId::intern("src_b")),
            Some(Slot::new(ContainerId::Section(ItemId::intern("src_s")), 0))
        );

        let mut source = doc.to_source();
        source
            .blocks
            .push(Block::Item(Item::text(ItemId::intern("src_b"))));
        assert_eq!(
            FormDocument::from_source(source).unwrap_err(),
            "duplicate id `src_b`"
        );
    }
}
