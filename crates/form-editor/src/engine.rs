//! Editor engine: the authoritative document plus the interaction state
//! around it.
//!
//! Every change to the form is a `FormMutation`. Drag gestures, keyboard
//! drags and explicit authoring edits all produce mutations that are applied
//! here, so the document is only ever changed in one place.
//!
//! The engine is in one of two modes:
//!
//! - **Editing**: drag gestures and authoring edits are accepted.
//! - **Previewing**: the document is frozen and a `Preview` walks the
//!   respondent through it. Each entry and exit starts from a clean slate.

use crate::drag::{DragContext, DragController, DragSession};
use crate::input::{DragEvent, Modifiers};
use crate::keys::{KeyboardCursor, ShortcutAction, ShortcutMap, drop_zones};
use crate::preview::Preview;
use form_core::{
    AuthoredDocument, Block, Column, ColumnType, ContainerId, EditorConfig, FormDocument, Item,
    ItemId, LintDiagnostic, Palette, QuestionKind, QuestionType, Section, lint_document,
};

/// A change to the form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormMutation {
    /// Insert a new block. Sections only go at the top level.
    InsertBlock {
        container: ContainerId,
        index: usize,
        block: Box<Block>,
    },
    /// Move a block so it ends up at `index` in `container`.
    MoveBlock {
        id: ItemId,
        container: ContainerId,
        index: usize,
    },
    /// Remove a block; a section takes its content with it.
    RemoveBlock {
        id: ItemId,
    },
    SetTitle {
        title: String,
    },
    SetPrompt {
        id: ItemId,
        prompt: String,
    },
    SetSectionHeader {
        id: ItemId,
        header: String,
    },
    SetTextLimits {
        id: ItemId,
        min_length: Option<usize>,
        max_length: Option<usize>,
    },
    AddChoice {
        id: ItemId,
        text: String,
    },
    SetChoiceText {
        id: ItemId,
        index: usize,
        text: String,
    },
    RemoveChoice {
        id: ItemId,
        index: usize,
    },
    /// Point a choice at another question, or clear its target.
    SetChoiceTarget {
        id: ItemId,
        index: usize,
        target: Option<ItemId>,
    },
    /// Append a text column; the engine mints the column id.
    AddColumn {
        id: ItemId,
        header: String,
    },
    RemoveColumn {
        id: ItemId,
        column: ItemId,
    },
    SetColumnHeader {
        id: ItemId,
        column: ItemId,
        header: String,
    },
    SetColumnType {
        id: ItemId,
        column: ItemId,
        column_type: ColumnType,
    },
    AddColumnChoice {
        id: ItemId,
        column: ItemId,
        text: String,
    },
    SetColumnChoice {
        id: ItemId,
        column: ItemId,
        index: usize,
        text: String,
    },
    RemoveColumnChoice {
        id: ItemId,
        column: ItemId,
        index: usize,
    },
}

#[derive(Debug)]
pub enum Mode {
    Editing,
    Previewing(Box<Preview>),
}

pub struct FormEngine {
    /// The authored form (single source of truth).
    doc: FormDocument,
    config: EditorConfig,
    palette: Palette,
    drag: DragController,
    /// Set while a keyboard drag is in progress.
    keyboard: Option<KeyboardCursor>,
    mode: Mode,
}

impl FormEngine {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_document(FormDocument::new(), config)
    }

    pub fn with_document(doc: FormDocument, config: EditorConfig) -> Self {
        let palette = Palette::new(&config);
        Self {
            doc,
            config,
            palette,
            drag: DragController::new(),
            keyboard: None,
            mode: Mode::Editing,
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn document(&self) -> &FormDocument {
        &self.doc
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_previewing(&self) -> bool {
        matches!(self.mode, Mode::Previewing(_))
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.session()
    }

    /// Whether `raw` is the live hover target of the current drag.
    pub fn is_over(&self, raw: &str) -> bool {
        self.drag.is_over(raw)
    }

    pub fn lint(&self) -> Vec<LintDiagnostic> {
        lint_document(&self.doc)
    }

    pub fn authored_document(&self) -> AuthoredDocument {
        AuthoredDocument::from_document(&self.doc)
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Apply one mutation. Returns `true` if the document changed.
    ///
    /// Refused while previewing: the form under preview is frozen.
    pub fn apply_mutation(&mut self, mutation: FormMutation) -> bool {
        if self.is_previewing() {
            log::debug!("mutation refused while previewing: {mutation:?}");
            return false;
        }
        let sections_enabled = self.config.sections_enabled;
        let doc = &mut self.doc;
        let changed = match mutation {
            FormMutation::InsertBlock {
                container,
                index,
                block,
            } => match (*block, container) {
                (Block::Item(item), container) => doc.insert_item(container, index, item),
                (Block::Section(section), _) if !sections_enabled => {
                    log::debug!("section {} refused: sections are disabled", section.id);
                    false
                }
                (Block::Section(section), ContainerId::Root) => doc.insert_section(index, section),
                (Block::Section(section), ContainerId::Section(parent)) => {
                    log::debug!("section {} cannot nest inside {parent}", section.id);
                    false
                }
            },
            FormMutation::MoveBlock {
                id,
                container,
                index,
            } => doc.move_to(id, container, index),
            FormMutation::RemoveBlock { id } => doc.remove(id).is_some(),
            FormMutation::SetTitle { title } => {
                let changed = doc.title != title;
                doc.title = title;
                changed
            }
            FormMutation::SetPrompt { id, prompt } => doc.set_prompt(id, &prompt),
            FormMutation::SetSectionHeader { id, header } => doc.set_section_header(id, &header),
            FormMutation::SetTextLimits {
                id,
                min_length,
                max_length,
            } => doc.set_text_limits(id, min_length, max_length),
            FormMutation::AddChoice { id, text } => doc.add_choice(id, &text),
            FormMutation::SetChoiceText { id, index, text } => {
                doc.set_choice_text(id, index, &text)
            }
            FormMutation::RemoveChoice { id, index } => doc.remove_choice(id, index),
            FormMutation::SetChoiceTarget { id, index, target } => {
                doc.set_choice_target(id, index, target)
            }
            FormMutation::AddColumn { id, header } => {
                let column = Column::text(ItemId::with_prefix(&self.config.column_prefix), header);
                doc.add_column(id, column)
            }
            FormMutation::RemoveColumn { id, column } => doc.remove_column(id, column),
            FormMutation::SetColumnHeader { id, column, header } => {
                doc.set_column_header(id, column, &header)
            }
            FormMutation::SetColumnType {
                id,
                column,
                column_type,
            } => doc.set_column_type(id, column, column_type),
            FormMutation::AddColumnChoice { id, column, text } => {
                doc.add_column_choice(id, column, &text)
            }
            FormMutation::SetColumnChoice {
                id,
                column,
                index,
                text,
            } => doc.set_column_choice(id, column, index, &text),
            FormMutation::RemoveColumnChoice { id, column, index } => {
                doc.remove_column_choice(id, column, index)
            }
        };
        if changed {
            log::debug!("applied mutation; {} questions", doc.question_count());
        }
        changed
    }

    /// Apply mutations in order. Returns `true` if any changed the document.
    pub fn apply_mutations(&mut self, mutations: Vec<FormMutation>) -> bool {
        mutations
            .into_iter()
            .fold(false, |changed, m| self.apply_mutation(m) || changed)
    }

    /// Append a new question of type `ty` to `container`.
    pub fn add_item(&mut self, container: ContainerId, ty: QuestionType) -> Option<ItemId> {
        let id = ItemId::with_prefix(&self.config.id_prefix);
        let len = self.doc.container_len(container)?;
        let item = Item::new(id, QuestionKind::empty(ty));
        self.apply_mutation(FormMutation::InsertBlock {
            container,
            index: len,
            block: Box::new(Block::Item(item)),
        })
        .then_some(id)
    }

    /// Append a new empty section. `None` when sections are disabled.
    pub fn add_section(&mut self) -> Option<ItemId> {
        if !self.config.sections_enabled {
            return None;
        }
        let id = ItemId::with_prefix(&self.config.id_prefix);
        self.apply_mutation(FormMutation::InsertBlock {
            container: ContainerId::Root,
            index: self.doc.blocks().len(),
            block: Box::new(Block::Section(Section::new(id))),
        })
        .then_some(id)
    }

    // ─── Drag gestures ───────────────────────────────────────────────────

    /// Feed one drag event. Returns `true` if the document changed.
    ///
    /// Ignored while previewing.
    pub fn handle_drag(&mut self, event: &DragEvent) -> bool {
        if self.is_previewing() {
            return false;
        }
        let ctx = DragContext {
            doc: &self.doc,
            palette: &self.palette,
            config: &self.config,
        };
        let mutations = self.drag.handle(event, ctx);
        if matches!(event, DragEvent::End { .. } | DragEvent::Cancel) {
            self.keyboard = None;
        }
        self.apply_mutations(mutations)
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Handle a key press. `focused` is the id of the focused block, if any.
    ///
    /// Returns `true` if the key did something.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers, focused: Option<&str>) -> bool {
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return false;
        };
        log::trace!("key {key:?} → {action:?}");

        if self.is_previewing() {
            if action == ShortcutAction::TogglePreview {
                return self.exit_preview();
            }
            let Some(preview) = self.preview_mut() else {
                return false;
            };
            return match action {
                ShortcutAction::MoveForward => preview.next(),
                ShortcutAction::MoveBackward => preview.previous(),
                _ => false,
            };
        }

        match action {
            ShortcutAction::PickUpOrDrop => match self.keyboard.as_ref() {
                Some(cursor) => {
                    let target = cursor.current().map(str::to_owned);
                    self.handle_drag(&DragEvent::End { target });
                    true
                }
                None => self.pick_up(focused),
            },
            ShortcutAction::MoveForward | ShortcutAction::MoveBackward => {
                let forward = action == ShortcutAction::MoveForward;
                let Some(zone) = self
                    .keyboard
                    .as_mut()
                    .and_then(|cursor| cursor.step(forward))
                    .map(str::to_owned)
                else {
                    return false;
                };
                self.handle_drag(&DragEvent::over(zone));
                true
            }
            ShortcutAction::CancelDrag => {
                if !self.drag.is_active() {
                    return false;
                }
                self.handle_drag(&DragEvent::Cancel);
                true
            }
            ShortcutAction::Delete => {
                if self.drag.is_active() {
                    return false;
                }
                let Some(id) = focused.and_then(ItemId::lookup) else {
                    return false;
                };
                self.apply_mutation(FormMutation::RemoveBlock { id })
            }
            ShortcutAction::TogglePreview => self.enter_preview(),
        }
    }

    fn pick_up(&mut self, focused: Option<&str>) -> bool {
        let Some(focused) = focused else {
            return false;
        };
        self.handle_drag(&DragEvent::start(focused));
        if !self.drag.is_active() {
            return false;
        }
        let zones = drop_zones(&self.doc, &self.palette, &self.config);
        self.keyboard = Some(KeyboardCursor::new(zones, focused));
        true
    }

    // ─── Preview ─────────────────────────────────────────────────────────

    /// Switch to Previewing with fresh navigation state. Any drag in flight
    /// is abandoned. Returns `false` if already previewing.
    pub fn enter_preview(&mut self) -> bool {
        if self.is_previewing() {
            return false;
        }
        if self.drag.is_active() {
            self.handle_drag(&DragEvent::Cancel);
        }
        self.drag.reset();
        self.keyboard = None;
        log::debug!("entering preview with {} questions", self.doc.question_count());
        self.mode = Mode::Previewing(Box::new(Preview::new(&self.doc)));
        true
    }

    /// Back to Editing; navigation state and answers are discarded.
    pub fn exit_preview(&mut self) -> bool {
        if !self.is_previewing() {
            return false;
        }
        log::debug!("leaving preview");
        self.mode = Mode::Editing;
        true
    }

    pub fn toggle_preview(&mut self) -> bool {
        if self.is_previewing() {
            self.exit_preview()
        } else {
            self.enter_preview()
        }
    }

    pub fn preview(&self) -> Option<&Preview> {
        match &self.mode {
            Mode::Previewing(preview) => Some(&**preview),
            Mode::Editing => None,
        }
    }

    pub fn preview_mut(&mut self) -> Option<&mut Preview> {
        match &mut self.mode {
            Mode::Previewing(preview) => Some(&mut **preview),
            Mode::Editing => None,
        }
    }
}

impl Default for FormEngine {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use form_core::{Answer, Choice};
    use pretty_assertions::assert_eq;

    fn ids(engine: &FormEngine) -> Vec<String> {
        engine
            .document()
            .questions()
            .iter()
            .map(|q| q.id.to_string())
            .collect()
    }

    #[test]
    fn explicit_add_appends_fresh_items() {
        let mut engine = FormEngine::default();
        let a = engine.add_item(ContainerId::Root, QuestionType::Text).unwrap();
        let b = engine.add_item(ContainerId::Root, QuestionType::Mcq).unwrap();
        assert_ne!(a, b);
        assert_eq!(ids(&engine), vec![a.to_string(), b.to_string()]);
        assert_eq!(engine.document().item(b).unwrap().question_type(), QuestionType::Mcq);
    }

    #[test]
    fn sections_need_configuration() {
        let mut flat = FormEngine::default();
        assert_eq!(flat.add_section(), None);

        let mut grouped = FormEngine::new(EditorConfig::with_sections());
        let section = grouped.add_section().unwrap();
        let item = grouped
            .add_item(ContainerId::Section(section), QuestionType::Text)
            .unwrap();
        assert_eq!(
            grouped.document().slot_of(item).unwrap().container,
            ContainerId::Section(section)
        );
    }

    #[test]
    fn flat_forms_refuse_inserted_sections() {
        let mut engine = FormEngine::default();
        assert!(!engine.apply_mutation(FormMutation::InsertBlock {
            container: ContainerId::Root,
            index: 0,
            block: Box::new(Block::Section(Section::new(ItemId::intern("eng_flat_sec")))),
        }));
        assert!(engine.document().blocks().is_empty());
        assert!(!engine.document().contains(ItemId::intern("eng_flat_sec")));
    }

    #[test]
    fn sections_never_nest() {
        let mut engine = FormEngine::new(EditorConfig::with_sections());
        let outer = engine.add_section().unwrap();
        assert!(!engine.apply_mutation(FormMutation::InsertBlock {
            container: ContainerId::Section(outer),
            index: 0,
            block: Box::new(Block::Section(Section::new(ItemId::intern("eng_inner")))),
        }));
        assert_eq!(engine.document().blocks().len(), 1);
    }

    #[test]
    fn authoring_edits_route_through_mutations() {
        let mut engine = FormEngine::default();
        let q = engine.add_item(ContainerId::Root, QuestionType::Table).unwrap();
        assert!(engine.apply_mutation(FormMutation::SetTitle {
            title: "Inventory".into()
        }));
        assert!(!engine.apply_mutation(FormMutation::SetTitle {
            title: "Inventory".into()
        }));
        assert!(engine.apply_mutation(FormMutation::SetPrompt {
            id: q,
            prompt: "Stock".into()
        }));
        assert!(engine.apply_mutation(FormMutation::AddColumn {
            id: q,
            header: "Size".into()
        }));

        let column = match &engine.document().item(q).unwrap().kind {
            QuestionKind::Table { columns } => columns[0].id,
            other => panic!("expected table, got {other:?}"),
        };
        assert!(engine.apply_mutation(FormMutation::SetColumnType {
            id: q,
            column,
            column_type: ColumnType::Mcq,
        }));
        assert!(engine.apply_mutation(FormMutation::SetColumnChoice {
            id: q,
            column,
            index: 0,
            text: "S".into(),
        }));
        let exported = engine.authored_document();
        assert_eq!(exported.form_name, "Inventory");
        assert_eq!(exported.questions[0].question_text, "Stock");
    }

    #[test]
    fn preview_freezes_the_document() {
        let mut engine = FormEngine::default();
        let q = engine.add_item(ContainerId::Root, QuestionType::Text).unwrap();
        assert!(engine.enter_preview());
        assert!(!engine.enter_preview());
        assert!(!engine.apply_mutation(FormMutation::RemoveBlock { id: q }));
        assert!(!engine.handle_drag(&DragEvent::start(q.as_str())));
        assert!(engine.document().contains(q));
        assert!(engine.exit_preview());
        assert!(engine.apply_mutation(FormMutation::RemoveBlock { id: q }));
    }

    #[test]
    fn preview_resets_on_every_entry() {
        let doc = FormDocument::from_items(
            "Reset",
            vec![
                Item::mcq(ItemId::intern("eng_r1"), vec![Choice::new("only")]),
                Item::text(ItemId::intern("eng_r2")),
            ],
        )
        .unwrap();
        let mut engine = FormEngine::with_document(doc, EditorConfig::default());
        engine.enter_preview();
        let preview = engine.preview_mut().unwrap();
        preview.answer(ItemId::intern("eng_r1"), Answer::Choice(0));
        assert!(preview.next());

        engine.exit_preview();
        assert!(engine.preview().is_none());
        engine.enter_preview();
        let preview = engine.preview().unwrap();
        assert_eq!(preview.current_index(), 0);
        assert!(preview.history().is_empty());
        assert!(preview.answers().is_empty());
    }

    #[test]
    fn keys_navigate_in_preview() {
        let doc = FormDocument::from_items(
            "Keys",
            vec![
                Item::text(ItemId::intern("eng_k1")),
                Item::text(ItemId::intern("eng_k2")),
            ],
        )
        .unwrap();
        let cmd = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        let mut engine = FormEngine::with_document(doc, EditorConfig::default());
        assert!(engine.handle_key("Enter", cmd, None));
        assert!(engine.is_previewing());
        assert!(!engine.handle_key("ArrowDown", Modifiers::NONE, None));

        engine
            .preview_mut()
            .unwrap()
            .answer(ItemId::intern("eng_k1"), Answer::text("hi"));
        assert!(engine.handle_key("ArrowDown", Modifiers::NONE, None));
        assert!(engine.handle_key("ArrowUp", Modifiers::NONE, None));
        assert!(engine.handle_key("Enter", cmd, None));
        assert!(!engine.is_previewing());
    }

    #[test]
    fn delete_key_removes_focused_block() {
        let mut engine = FormEngine::default();
        let q = engine.add_item(ContainerId::Root, QuestionType::Text).unwrap();
        assert!(!engine.handle_key("Delete", Modifiers::NONE, None));
        assert!(engine.handle_key("Delete", Modifiers::NONE, Some(q.as_str())));
        assert!(engine.document().is_empty());
    }
}
