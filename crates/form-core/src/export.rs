//! Outbound shapes handed to the persistence collaborator.
//!
//! These are plain serde structures; picking a wire encoding is the caller's
//! business. Ids are client-local: the collaborator assigns durable ids and
//! resolves `nextQuestionId` against the `clientId`s of the same payload.

use crate::answers::{Answer, AnswerSet, CellAnswer};
use crate::document::FormDocument;
use crate::id::ItemId;
use crate::model::{ColumnKind, Item, QuestionKind};
use serde::Serialize;

// ─── Authored document ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthoredDocument {
    pub form_name: String,
    pub questions: Vec<QuestionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub client_id: ItemId,
    pub question_text: String,
    #[serde(flatten)]
    pub body: QuestionBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "questionType", rename_all = "lowercase")]
pub enum QuestionBody {
    #[serde(rename_all = "camelCase")]
    Text {
        #[serde(skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    Mcq {
        choices: Vec<ChoiceRecord>,
        /// Set when at least one choice carries a live target.
        branching: bool,
    },
    Table { columns: Vec<ColumnRecord> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceRecord {
    pub text: String,
    pub next_question_id: Option<ItemId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnRecord {
    pub header: String,
    #[serde(rename = "type")]
    pub column_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
}

impl AuthoredDocument {
    /// Snapshot the document in respondent order.
    ///
    /// Targets that no longer name a question are emitted as `null`, so the
    /// collaborator never sees a reference it cannot resolve.
    pub fn from_document(doc: &FormDocument) -> Self {
        let questions = doc
            .questions()
            .into_iter()
            .map(|item| question_record(doc, item))
            .collect();
        Self {
            form_name: doc.title.clone(),
            questions,
        }
    }
}

fn question_record(doc: &FormDocument, item: &Item) -> QuestionRecord {
    let body = match &item.kind {
        QuestionKind::Text {
            min_length,
            max_length,
        } => QuestionBody::Text {
            min_length: *min_length,
            max_length: *max_length,
        },
        QuestionKind::Mcq { choices } => {
            let choices: Vec<ChoiceRecord> = choices
                .iter()
                .map(|choice| ChoiceRecord {
                    text: choice.text.clone(),
                    next_question_id: choice
                        .target
                        .filter(|t| *t != item.id && doc.item(*t).is_some()),
                })
                .collect();
            let branching = choices.iter().any(|c| c.next_question_id.is_some());
            QuestionBody::Mcq { choices, branching }
        }
        QuestionKind::Table { columns } => QuestionBody::Table {
            columns: columns
                .iter()
                .map(|column| ColumnRecord {
                    header: column.header.clone(),
                    column_type: column.kind.type_name(),
                    choices: match &column.kind {
                        ColumnKind::Text => None,
                        ColumnKind::Mcq { choices } => Some(choices.clone()),
                    },
                })
                .collect(),
        },
    };
    QuestionRecord {
        client_id: item.id,
        question_text: item.prompt.clone(),
        body,
    }
}

// ─── Answer submission ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: ItemId,
    #[serde(flatten)]
    pub value: AnswerValue,
}

/// Exactly one of `text`, `choiceText` or `tableData`, mirroring the
/// question type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnswerValue {
    Text(String),
    ChoiceText(String),
    /// Answered cells in column order; mcq cells carry the choice text.
    TableData(Vec<CellRecord>),
}

/// One table cell. Headers need not be unique, so cells are keyed by column id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRecord {
    pub column_id: ItemId,
    pub header: String,
    pub value: String,
}

/// Build the answer submission for the questions answered so far, in
/// respondent order. Answers whose shape does not fit their question are
/// left out.
pub fn answer_submission<'a>(
    questions: impl IntoIterator<Item = &'a Item>,
    answers: &AnswerSet,
) -> Vec<AnswerRecord> {
    questions
        .into_iter()
        .filter_map(|item| {
            let answer = answers.get(item.id)?;
            let value = answer_value(item, answer)?;
            Some(AnswerRecord {
                question_id: item.id,
                value,
            })
        })
        .collect()
}

fn answer_value(item: &Item, answer: &Answer) -> Option<AnswerValue> {
    match (&item.kind, answer) {
        (QuestionKind::Text { .. }, Answer::Text(text)) => Some(AnswerValue::Text(text.clone())),
        (QuestionKind::Mcq { choices }, Answer::Choice(index)) => choices
            .get(*index)
            .map(|c| AnswerValue::ChoiceText(c.text.clone())),
        (QuestionKind::Table { columns }, Answer::Table(cells)) => {
            let mut data = Vec::with_capacity(columns.len());
            for column in columns {
                let value = match (&column.kind, cells.get(&column.id)) {
                    (ColumnKind::Text, Some(CellAnswer::Text(text))) => text.clone(),
                    (ColumnKind::Mcq { choices }, Some(CellAnswer::Choice(index))) => {
                        choices.get(*index).cloned().unwrap_or_default()
                    }
                    _ => continue,
                };
                data.push(CellRecord {
                    column_id: column.id,
                    header: column.header.clone(),
                    value,
                });
            }
            Some(AnswerValue::TableData(data))
        }
        _ => None,
    }
}
