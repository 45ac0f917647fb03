//! Lint diagnostics for authored forms.
//!
//! Reports authoring problems without modifying the document. None of these
//! block preview; broken branch targets, for instance, simply fall back to
//! the default order at runtime.

use crate::branching::BranchGraph;
use crate::document::FormDocument;
use crate::id::ItemId;
use crate::model::{ColumnKind, QuestionKind};

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Likely a mistake, or rejected on submission.
    Warning,
    /// Informational.
    Info,
}

/// A single lint diagnostic.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    /// The item or section this refers to; `None` for form-level findings.
    pub item_id: Option<ItemId>,
    /// Human-readable message.
    pub message: String,
    /// Severity level.
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "dangling-target", "empty-prompt").
    pub rule: &'static str,
}

impl LintDiagnostic {
    fn warning(item_id: Option<ItemId>, rule: &'static str, message: String) -> Self {
        Self {
            item_id,
            message,
            severity: LintSeverity::Warning,
            rule,
        }
    }

    fn info(item_id: Option<ItemId>, rule: &'static str, message: String) -> Self {
        Self {
            item_id,
            message,
            severity: LintSeverity::Info,
            rule,
        }
    }
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all lint rules over the document and return diagnostics.
#[must_use]
pub fn lint_document(doc: &FormDocument) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_form(doc, &mut diags);
    lint_questions(doc, &mut diags);
    lint_sections(doc, &mut diags);
    lint_branching(doc, &mut diags);
    diags
}

// ─── Rules ────────────────────────────────────────────────────────────────

fn lint_form(doc: &FormDocument, diags: &mut Vec<LintDiagnostic>) {
    if doc.title.trim().is_empty() {
        diags.push(LintDiagnostic::warning(
            None,
            "empty-title",
            "The form has no title; submission requires one.".to_string(),
        ));
    }
    if doc.question_count() == 0 {
        diags.push(LintDiagnostic::warning(
            None,
            "no-questions",
            "The form has no questions.".to_string(),
        ));
    }
}

fn lint_questions(doc: &FormDocument, diags: &mut Vec<LintDiagnostic>) {
    for question in doc.questions() {
        let id = question.id;
        if question.prompt.trim().is_empty() {
            diags.push(LintDiagnostic::warning(
                Some(id),
                "empty-prompt",
                format!("Question `{id}` has no prompt text."),
            ));
        }
        match &question.kind {
            QuestionKind::Text {
                min_length: Some(min),
                max_length: Some(max),
            } if min > max => {
                diags.push(LintDiagnostic::warning(
                    Some(id),
                    "inverted-length",
                    format!("Question `{id}` needs at least {min} but at most {max} characters; no answer can pass."),
                ));
            }
            QuestionKind::Mcq { choices } if choices.is_empty() => {
                diags.push(LintDiagnostic::warning(
                    Some(id),
                    "no-choices",
                    format!("Multiple-choice question `{id}` has no choices to pick from."),
                ));
            }
            QuestionKind::Mcq { choices } => {
                for (index, choice) in choices.iter().enumerate() {
                    if let Some(target) = choice.target {
                        if target == id {
                            diags.push(LintDiagnostic::warning(
                                Some(id),
                                "self-target",
                                format!("Choice {} of `{id}` branches to its own question.", index + 1),
                            ));
                        } else if doc.item(target).is_none() {
                            diags.push(LintDiagnostic::warning(
                                Some(id),
                                "dangling-target",
                                format!(
                                    "Choice {} of `{id}` branches to `{target}`, which no longer exists; respondents will continue in order.",
                                    index + 1
                                ),
                            ));
                        }
                    }
                }
            }
            QuestionKind::Table { columns } if columns.is_empty() => {
                diags.push(LintDiagnostic::warning(
                    Some(id),
                    "no-columns",
                    format!("Table question `{id}` has no columns."),
                ));
            }
            QuestionKind::Table { columns } => {
                for column in columns {
                    if let ColumnKind::Mcq { choices } = &column.kind
                        && choices.iter().all(|c| c.trim().is_empty())
                    {
                        diags.push(LintDiagnostic::warning(
                            Some(id),
                            "no-column-choices",
                            format!("Column `{}` of `{id}` has no usable choices.", column.header),
                        ));
                    }
                }
            }
            QuestionKind::Text { .. } => {}
        }
    }
}

fn lint_sections(doc: &FormDocument, diags: &mut Vec<LintDiagnostic>) {
    for section in doc.sections() {
        if section.content.is_empty() {
            diags.push(LintDiagnostic::info(
                Some(section.id),
                "empty-section",
                format!("Section `{}` has no questions.", section.id),
            ));
        }
    }
}

fn lint_branching(doc: &FormDocument, diags: &mut Vec<LintDiagnostic>) {
    let graph = BranchGraph::build(doc.questions());
    for id in graph.unreachable() {
        diags.push(LintDiagnostic::warning(
            Some(id),
            "unreachable",
            format!("No answer path reaches question `{id}`."),
        ));
    }
    for (from, choice, to) in graph.backward_jumps() {
        diags.push(LintDiagnostic::info(
            Some(from),
            "backward-jump",
            format!(
                "Choice {} of `{from}` jumps back to `{to}`; respondents may loop.",
                choice + 1
            ),
        ));
    }
}
