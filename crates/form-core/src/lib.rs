pub mod answers;
pub mod branching;
pub mod config;
pub mod document;
pub mod edit;
pub mod export;
pub mod id;
pub mod lint;
pub mod model;
pub mod palette;
pub mod validate;

pub use answers::{Answer, AnswerSet, CellAnswer};
pub use branching::{BranchGraph, Transition};
pub use config::EditorConfig;
pub use document::{DocumentSource, FormDocument};
pub use edit::ColumnType;
pub use export::{AnswerRecord, AnswerValue, AuthoredDocument, CellRecord, answer_submission};
pub use id::ItemId;
pub use lint::{LintDiagnostic, LintSeverity, lint_document};
pub use model::*;
pub use palette::{Palette, PaletteTemplate, TemplateKind};
pub use validate::is_answer_valid;
