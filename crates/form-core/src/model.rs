//! Core data model for questionnaire documents.
//!
//! A document is an ordered sequence of top-level blocks. A block is either a
//! question item or a section that groups items under a header. Sections hold
//! items only; they never nest. The flat model (no sections at all) is the
//! canonical shape; grouping is opt-in through `EditorConfig`.
//!
//! Question kinds are a closed sum type: each variant carries only the fields
//! that kind needs, and everything downstream (validation, export, branching)
//! matches on the variant rather than on optional-field presence.

use crate::id::ItemId;
use serde::{Deserialize, Serialize};

// ─── Question kinds ──────────────────────────────────────────────────────

/// The tag of a question kind, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Text,
    Mcq,
    Table,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::Mcq => "mcq",
            QuestionType::Table => "table",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(QuestionType::Text),
            "mcq" => Some(QuestionType::Mcq),
            "table" => Some(QuestionType::Table),
            _ => None,
        }
    }
}

/// A single answer option of a multiple-choice question.
///
/// `target` is the branching edge: choosing this option jumps to the target
/// question instead of the next one in sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ItemId>,
}

impl Choice {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target: None,
        }
    }

    pub fn branching_to(text: impl Into<String>, target: ItemId) -> Self {
        Self {
            text: text.into(),
            target: Some(target),
        }
    }
}

/// The kind of a table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnKind {
    Text,
    Mcq { choices: Vec<String> },
}

impl ColumnKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Mcq { .. } => "mcq",
        }
    }
}

/// One column of a table question. Respondents fill one cell per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ItemId,
    pub header: String,
    #[serde(flatten)]
    pub kind: ColumnKind,
}

impl Column {
    pub fn text(id: ItemId, header: impl Into<String>) -> Self {
        Self {
            id,
            header: header.into(),
            kind: ColumnKind::Text,
        }
    }

    pub fn mcq(id: ItemId, header: impl Into<String>, choices: Vec<String>) -> Self {
        Self {
            id,
            header: header.into(),
            kind: ColumnKind::Mcq { choices },
        }
    }
}

/// Kind-specific payload of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionKind {
    /// Free text. Length bounds are inclusive and counted in characters.
    #[serde(rename_all = "camelCase")]
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    /// Single choice out of an ordered list.
    Mcq { choices: Vec<Choice> },
    /// One row of cells, one cell per column.
    Table { columns: Vec<Column> },
}

impl QuestionKind {
    /// An empty payload of the given type, as produced by palette templates.
    pub fn empty(ty: QuestionType) -> Self {
        match ty {
            QuestionType::Text => QuestionKind::Text {
                min_length: None,
                max_length: None,
            },
            QuestionType::Mcq => QuestionKind::Mcq {
                choices: Vec::new(),
            },
            QuestionType::Table => QuestionKind::Table {
                columns: Vec::new(),
            },
        }
    }

    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::Text { .. } => QuestionType::Text,
            QuestionKind::Mcq { .. } => QuestionType::Mcq,
            QuestionKind::Table { .. } => QuestionType::Table,
        }
    }
}

// ─── Items & sections ────────────────────────────────────────────────────

/// A single question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(default)]
    pub prompt: String,
    pub kind: QuestionKind,
}

impl Item {
    pub fn new(id: ItemId, kind: QuestionKind) -> Self {
        Self {
            id,
            prompt: String::new(),
            kind,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn text(id: ItemId) -> Self {
        Self::new(id, QuestionKind::empty(QuestionType::Text))
    }

    pub fn mcq(id: ItemId, choices: Vec<Choice>) -> Self {
        Self::new(id, QuestionKind::Mcq { choices })
    }

    pub fn table(id: ItemId, columns: Vec<Column>) -> Self {
        Self::new(id, QuestionKind::Table { columns })
    }

    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    /// Choices of an mcq question; empty for every other kind.
    pub fn choices(&self) -> &[Choice] {
        match &self.kind {
            QuestionKind::Mcq { choices } => choices,
            _ => &[],
        }
    }
}

/// A named, ordered group of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: ItemId,
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub content: Vec<Item>,
}

impl Section {
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            header: String::new(),
            content: Vec::new(),
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn with_content(mut self, content: Vec<Item>) -> Self {
        self.content = content;
        self
    }
}

/// A top-level entry of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "block", rename_all = "lowercase")]
pub enum Block {
    Item(Item),
    Section(Section),
}

impl Block {
    pub fn id(&self) -> ItemId {
        match self {
            Block::Item(item) => item.id,
            Block::Section(section) => section.id,
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Block::Item(item) => Some(item),
            Block::Section(_) => None,
        }
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Block::Section(section) => Some(section),
            Block::Item(_) => None,
        }
    }

    /// Number of questions this block contributes to the sequence.
    pub fn question_count(&self) -> usize {
        match self {
            Block::Item(_) => 1,
            Block::Section(section) => section.content.len(),
        }
    }
}

// ─── Containers ──────────────────────────────────────────────────────────

/// An ordered container of blocks: the top-level sequence or one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerId {
    /// The document's top-level sequence (items and sections).
    Root,
    /// A section's content (items only).
    Section(ItemId),
}

/// Where an id lives: its container and position inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub container: ContainerId,
    pub position: usize,
}

impl Slot {
    pub const fn new(container: ContainerId, position: usize) -> Self {
        Self {
            container,
            position,
        }
    }
}
