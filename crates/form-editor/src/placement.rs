//! Placement resolution: raw hover identifiers → drop targets.
//!
//! The host reports whatever element sits under the pointer by its id. That
//! id may name an item, a section, a container boundary zone
//! (`<container>-start` / `<container>-end`), the top-level container, or
//! the palette. Namespaces can overlap, so resolution follows a fixed order:
//!
//! 1. an item or section living in the document → its slot;
//! 2. a boundary zone of a known container → index 0 or the container length;
//! 3. the top-level container id → the end of the top-level sequence;
//! 4. the palette area → delete.
//!
//! Anything else resolves to nothing.

use form_core::{ContainerId, EditorConfig, FormDocument, ItemId, Palette, Slot};

const START_SUFFIX: &str = "-start";
const END_SUFFIX: &str = "-end";

/// Where a drop lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Land at `index` inside `container`. For new blocks this is the
    /// insertion index; for moves it is the final position.
    Place { container: ContainerId, index: usize },
    /// Over the palette: remove the dragged block.
    Delete,
}

impl DropTarget {
    pub const fn place(container: ContainerId, index: usize) -> Self {
        Self::Place { container, index }
    }

    pub fn container(self) -> Option<ContainerId> {
        match self {
            Self::Place { container, .. } => Some(container),
            Self::Delete => None,
        }
    }
}

/// Resolves hover ids against one snapshot of the document.
pub struct Resolver<'a> {
    doc: &'a FormDocument,
    palette: &'a Palette,
    root_id: &'a str,
}

impl<'a> Resolver<'a> {
    pub fn new(doc: &'a FormDocument, palette: &'a Palette, config: &'a EditorConfig) -> Self {
        Self {
            doc,
            palette,
            root_id: &config.root_id,
        }
    }

    /// Resolve a raw hover id. Never interns: unknown strings stay unknown.
    pub fn resolve(&self, raw: &str) -> Option<DropTarget> {
        if let Some(slot) = ItemId::lookup(raw).and_then(|id| self.doc.slot_of(id)) {
            return Some(DropTarget::place(slot.container, slot.position));
        }
        if let Some(target) = self.boundary(raw) {
            return Some(target);
        }
        if raw == self.root_id {
            return Some(DropTarget::place(ContainerId::Root, self.doc.blocks().len()));
        }
        if ItemId::lookup(raw).is_some_and(|id| self.palette.is_drop_zone(id)) {
            return Some(DropTarget::Delete);
        }
        None
    }

    /// `<container>-start` → index 0, `<container>-end` → container length.
    fn boundary(&self, raw: &str) -> Option<DropTarget> {
        let (base, at_end) = if let Some(base) = raw.strip_suffix(START_SUFFIX) {
            (base, false)
        } else if let Some(base) = raw.strip_suffix(END_SUFFIX) {
            (base, true)
        } else {
            return None;
        };
        let container = self.container_named(base)?;
        let index = if at_end {
            self.doc.container_len(container)?
        } else {
            0
        };
        Some(DropTarget::place(container, index))
    }

    fn container_named(&self, name: &str) -> Option<ContainerId> {
        if name == self.root_id {
            return Some(ContainerId::Root);
        }
        let id = ItemId::lookup(name)?;
        self.doc
            .is_section(id)
            .then_some(ContainerId::Section(id))
    }

    /// Map a target onto the top-level sequence, for section drops.
    ///
    /// Anything inside a section lands before that section, except the
    /// section's own end zone which lands after it when `after_end` is set.
    /// Existing sections being reordered pass `after_end = false` so the
    /// result stays a final position.
    pub fn top_level(&self, raw: &str, target: DropTarget, after_end: bool) -> Option<usize> {
        match target {
            DropTarget::Place {
                container: ContainerId::Root,
                index,
            } => Some(index),
            DropTarget::Place {
                container: ContainerId::Section(section),
                ..
            } => {
                let Slot { position, .. } = self.doc.slot_of(section)?;
                let is_end_zone = raw
                    .strip_suffix(END_SUFFIX)
                    .is_some_and(|base| base == section.as_str());
                Some(if after_end && is_end_zone {
                    position + 1
                } else {
                    position
                })
            }
            DropTarget::Delete => None,
        }
    }
}
