//! Respondent answers collected during preview.

use crate::id::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellAnswer {
    Text(String),
    /// Index into the column's choices.
    Choice(usize),
}

/// An answer shaped per question kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Text(String),
    /// Index of the selected choice.
    Choice(usize),
    /// Cells keyed by column id.
    Table(HashMap<ItemId, CellAnswer>),
}

impl Answer {
    pub fn text(s: impl Into<String>) -> Self {
        Answer::Text(s.into())
    }

    /// The selected choice index, if this is an mcq answer.
    pub fn choice(&self) -> Option<usize> {
        match self {
            Answer::Choice(index) => Some(*index),
            _ => None,
        }
    }
}

/// Answers keyed by question id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerSet {
    answers: HashMap<ItemId, Answer>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, question: ItemId) -> Option<&Answer> {
        self.answers.get(&question)
    }

    /// Store an answer, returning the one it replaced.
    pub fn set(&mut self, question: ItemId, answer: Answer) -> Option<Answer> {
        self.answers.insert(question, answer)
    }

    pub fn remove(&mut self, question: ItemId) -> Option<Answer> {
        self.answers.remove(&question)
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &Answer)> {
        self.answers.iter()
    }
}
