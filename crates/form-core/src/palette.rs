//! Palette of templates offered as drag sources.
//!
//! Templates are immutable prototypes. Dropping one into the form yields a
//! fresh block with a newly minted id; the template itself never enters the
//! document. The palette area doubles as the delete zone.

use crate::config::EditorConfig;
use crate::id::ItemId;
use crate::model::{Block, Item, QuestionKind, QuestionType, Section};

/// What a template produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Section,
    Question(QuestionType),
}

impl TemplateKind {
    pub fn name(self) -> &'static str {
        match self {
            TemplateKind::Section => "section",
            TemplateKind::Question(ty) => ty.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteTemplate {
    pub id: ItemId,
    pub kind: TemplateKind,
}

impl PaletteTemplate {
    /// Mint a fresh block from this template.
    pub fn instantiate(&self, id_prefix: &str) -> Block {
        let id = ItemId::with_prefix(id_prefix);
        match self.kind {
            TemplateKind::Section => Block::Section(Section::new(id)),
            TemplateKind::Question(ty) => Block::Item(Item::new(id, QuestionKind::empty(ty))),
        }
    }
}

/// The palette container and its templates.
#[derive(Debug, Clone)]
pub struct Palette {
    pub id: ItemId,
    start: ItemId,
    end: ItemId,
    templates: Vec<PaletteTemplate>,
}

impl Palette {
    pub fn new(config: &EditorConfig) -> Self {
        let base = config.palette_id.as_str();
        let mut kinds = Vec::with_capacity(4);
        if config.sections_enabled {
            kinds.push(TemplateKind::Section);
        }
        kinds.extend([
            TemplateKind::Question(QuestionType::Text),
            TemplateKind::Question(QuestionType::Mcq),
            TemplateKind::Question(QuestionType::Table),
        ]);
        let templates = kinds
            .into_iter()
            .map(|kind| PaletteTemplate {
                id: ItemId::intern(&format!("{base}-{}", kind.name())),
                kind,
            })
            .collect();
        Self {
            id: ItemId::intern(base),
            start: ItemId::intern(&format!("{base}-start")),
            end: ItemId::intern(&format!("{base}-end")),
            templates,
        }
    }

    pub fn templates(&self) -> &[PaletteTemplate] {
        &self.templates
    }

    pub fn template(&self, id: ItemId) -> Option<&PaletteTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Whether `id` names the palette area: the container itself, one of its
    /// boundary zones, or any template inside it.
    pub fn is_drop_zone(&self, id: ItemId) -> bool {
        id == self.id || id == self.start || id == self.end || self.template(id).is_some()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}
