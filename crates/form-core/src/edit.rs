//! Authoring edits on question content.
//!
//! These never change structure (no id enters or leaves a container), so the
//! slot index is untouched. Each returns `true` when something changed.

use crate::document::FormDocument;
use crate::id::ItemId;
use crate::model::{Choice, Column, ColumnKind, QuestionKind};

/// Column type selector used when switching a column's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Mcq,
}

impl FormDocument {
    pub fn set_prompt(&mut self, id: ItemId, prompt: &str) -> bool {
        match self.item_mut(id) {
            Some(item) if item.prompt != prompt => {
                item.prompt = prompt.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn set_section_header(&mut self, id: ItemId, header: &str) -> bool {
        match self.section_mut(id) {
            Some(section) if section.header != header => {
                section.header = header.to_string();
                true
            }
            _ => false,
        }
    }

    /// Set the inclusive length bounds of a text question. `None` clears a bound.
    pub fn set_text_limits(
        &mut self,
        id: ItemId,
        min: Option<usize>,
        max: Option<usize>,
    ) -> bool {
        match self.item_mut(id).map(|item| &mut item.kind) {
            Some(QuestionKind::Text {
                min_length,
                max_length,
            }) => {
                let changed = *min_length != min || *max_length != max;
                *min_length = min;
                *max_length = max;
                changed
            }
            _ => false,
        }
    }

    // ─── Choices ─────────────────────────────────────────────────────────

    fn choices_mut(&mut self, id: ItemId) -> Option<&mut Vec<Choice>> {
        match &mut self.item_mut(id)?.kind {
            QuestionKind::Mcq { choices } => Some(choices),
            _ => None,
        }
    }

    pub fn add_choice(&mut self, id: ItemId, text: &str) -> bool {
        match self.choices_mut(id) {
            Some(choices) => {
                choices.push(Choice::new(text));
                true
            }
            None => false,
        }
    }

    pub fn set_choice_text(&mut self, id: ItemId, index: usize, text: &str) -> bool {
        match self.choices_mut(id).and_then(|c| c.get_mut(index)) {
            Some(choice) if choice.text != text => {
                choice.text = text.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn remove_choice(&mut self, id: ItemId, index: usize) -> bool {
        match self.choices_mut(id) {
            Some(choices) if index < choices.len() => {
                choices.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Point a choice at a target question, or clear its branch with `None`.
    ///
    /// The target must be an existing question other than the one being
    /// edited; sections are not valid targets.
    pub fn set_choice_target(&mut self, id: ItemId, index: usize, target: Option<ItemId>) -> bool {
        if let Some(target) = target
            && (target == id || self.item(target).is_none())
        {
            log::debug!("branch target {target} refused for {id}");
            return false;
        }
        match self.choices_mut(id).and_then(|c| c.get_mut(index)) {
            Some(choice) if choice.target != target => {
                choice.target = target;
                true
            }
            _ => false,
        }
    }

    // ─── Table columns ───────────────────────────────────────────────────

    fn columns_mut(&mut self, id: ItemId) -> Option<&mut Vec<Column>> {
        match &mut self.item_mut(id)?.kind {
            QuestionKind::Table { columns } => Some(columns),
            _ => None,
        }
    }

    fn column_mut(&mut self, id: ItemId, column: ItemId) -> Option<&mut Column> {
        self.columns_mut(id)?.iter_mut().find(|c| c.id == column)
    }

    /// Append a column. Refused if the column id is already used in this table.
    pub fn add_column(&mut self, id: ItemId, column: Column) -> bool {
        match self.columns_mut(id) {
            Some(columns) if columns.iter().all(|c| c.id != column.id) => {
                columns.push(column);
                true
            }
            _ => false,
        }
    }

    pub fn remove_column(&mut self, id: ItemId, column: ItemId) -> bool {
        match self.columns_mut(id) {
            Some(columns) => {
                let before = columns.len();
                columns.retain(|c| c.id != column);
                columns.len() != before
            }
            None => false,
        }
    }

    pub fn set_column_header(&mut self, id: ItemId, column: ItemId, header: &str) -> bool {
        match self.column_mut(id, column) {
            Some(col) if col.header != header => {
                col.header = header.to_string();
                true
            }
            _ => false,
        }
    }

    /// Switch a column between text and mcq. Switching to mcq seeds a single
    /// empty choice; switching to text drops the choices.
    pub fn set_column_type(&mut self, id: ItemId, column: ItemId, ty: ColumnType) -> bool {
        let Some(col) = self.column_mut(id, column) else {
            return false;
        };
        match (ty, &col.kind) {
            (ColumnType::Text, ColumnKind::Text) | (ColumnType::Mcq, ColumnKind::Mcq { .. }) => {
                false
            }
            (ColumnType::Text, _) => {
                col.kind = ColumnKind::Text;
                true
            }
            (ColumnType::Mcq, _) => {
                col.kind = ColumnKind::Mcq {
                    choices: vec![String::new()],
                };
                true
            }
        }
    }

    fn column_choices_mut(&mut self, id: ItemId, column: ItemId) -> Option<&mut Vec<String>> {
        match &mut self.column_mut(id, column)?.kind {
            ColumnKind::Mcq { choices } => Some(choices),
            ColumnKind::Text => None,
        }
    }

    pub fn add_column_choice(&mut self, id: ItemId, column: ItemId, text: &str) -> bool {
        match self.column_choices_mut(id, column) {
            Some(choices) => {
                choices.push(text.to_string());
                true
            }
            None => false,
        }
    }

    pub fn set_column_choice(
        &mut self,
        id: ItemId,
        column: ItemId,
        index: usize,
        text: &str,
    ) -> bool {
        match self
            .column_choices_mut(id, column)
            .and_then(|c| c.get_mut(index))
        {
            Some(choice) if choice.as_str() != text => {
                *choice = text.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn remove_column_choice(&mut self, id: ItemId, column: ItemId, index: usize) -> bool {
        match self.column_choices_mut(id, column) {
            Some(choices) if index < choices.len() => {
                choices.remove(index);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnKind, Item, Section};
    use crate::{Block, ContainerId};
    use pretty_assertions::assert_eq;

    fn doc() -> FormDocument {
        FormDocument::from_blocks(
            "Edits",
            vec![
                Block::Item(Item::mcq(ItemId::intern("ed_q1"), vec![Choice::new("yes")])),
                Block::Section(Section::new(ItemId::intern("ed_s")).with_content(vec![
                    Item::text(ItemId::intern("ed_q2")),
                    Item::table(ItemId::intern("ed_t"), vec![]),
                ])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn prompt_and_header_edits() {
        let mut d = doc();
        assert!(d.set_prompt(ItemId::intern("ed_q2"), "Your name?"));
        assert!(!d.set_prompt(ItemId::intern("ed_q2"), "Your name?"));
        assert_eq!(d.item(ItemId::intern("ed_q2")).unwrap().prompt, "Your name?");
        assert!(d.set_section_header(ItemId::intern("ed_s"), "About you"));
        assert!(!d.set_section_header(ItemId::intern("ed_q2"), "nope"));
    }

    #[test]
    fn choice_targets_must_name_other_questions() {
        let mut d = doc();
        let q1 = ItemId::intern("ed_q1");
        assert!(!d.set_choice_target(q1, 0, Some(q1)));
        assert!(!d.set_choice_target(q1, 0, Some(ItemId::intern("ed_s"))));
        assert!(d.set_choice_target(q1, 0, Some(ItemId::intern("ed_q2"))));
        assert_eq!(d.item(q1).unwrap().choices()[0].target, Some(ItemId::intern("ed_q2")));
        assert!(d.set_choice_target(q1, 0, None));
        assert!(!d.set_choice_target(q1, 5, None));
    }

    #[test]
    fn column_type_switch_seeds_and_drops_choices() {
        let mut d = doc();
        let t = ItemId::intern("ed_t");
        let col = ItemId::intern("ed_col");
        assert!(d.add_column(t, Column::text(col, "Colour")));
        assert!(!d.add_column(t, Column::text(col, "Again")));
        assert!(d.set_column_type(t, col, ColumnType::Mcq));
        assert!(d.add_column_choice(t, col, "red"));
        assert!(d.set_column_choice(t, col, 0, "blue"));
        let QuestionKind::Table { columns } = &d.item(t).unwrap().kind else {
            panic!("expected table");
        };
        assert_eq!(
            columns[0].kind,
            ColumnKind::Mcq {
                choices: vec!["blue".into(), "red".into()]
            }
        );
        assert!(d.set_column_type(t, col, ColumnType::Text));
        assert!(!d.add_column_choice(t, col, "green"));
        assert!(d.remove_column(t, col));
        assert!(d.index_is_consistent());
        assert_eq!(d.container_len(ContainerId::Section(ItemId::intern("ed_s"))), Some(2));
    }

    #[test]
    fn text_limits_only_apply_to_text() {
        let mut d = doc();
        assert!(d.set_text_limits(ItemId::intern("ed_q2"), Some(3), Some(5)));
        assert!(!d.set_text_limits(ItemId::intern("ed_q2"), Some(3), Some(5)));
        assert!(!d.set_text_limits(ItemId::intern("ed_q1"), Some(3), None));
    }
}
