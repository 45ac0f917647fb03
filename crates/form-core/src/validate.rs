//! Per-question answer validation.
//!
//! Pure and deterministic: the same question and answer always give the same
//! verdict, and an unanswered question is never valid.

use crate::answers::{Answer, CellAnswer};
use crate::model::{ColumnKind, Item, QuestionKind};

/// Whether `answer` satisfies `question`.
#[must_use]
pub fn is_answer_valid(question: &Item, answer: Option<&Answer>) -> bool {
    let Some(answer) = answer else {
        return false;
    };
    match (&question.kind, answer) {
        (
            QuestionKind::Text {
                min_length,
                max_length,
            },
            Answer::Text(text),
        ) => text_within_bounds(text, *min_length, *max_length),
        (QuestionKind::Mcq { choices }, Answer::Choice(index)) => *index < choices.len(),
        (QuestionKind::Table { columns }, Answer::Table(cells)) => {
            columns.iter().all(|column| match (&column.kind, cells.get(&column.id)) {
                (_, Some(CellAnswer::Text(text))) => {
                    matches!(column.kind, ColumnKind::Text) && !text.is_empty()
                }
                (ColumnKind::Mcq { choices }, Some(CellAnswer::Choice(index))) => {
                    *index < choices.len()
                }
                _ => false,
            })
        }
        // Answer shape does not match the question kind.
        _ => false,
    }
}

/// Non-empty, and within `[min, max]` characters when those are set.
fn text_within_bounds(text: &str, min: Option<usize>, max: Option<usize>) -> bool {
    if text.is_empty() {
        return false;
    }
    let len = text.chars().count();
    min.is_none_or(|min| len >= min) && max.is_none_or(|max| len <= max)
}
