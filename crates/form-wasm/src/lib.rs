//! WASM bridge for Form Studio: exposes the authoring engine to JavaScript.
//!
//! Compiled via `wasm-pack build --target web` and loaded by the browser
//! authoring UI. Methods return `bool` for "did something change" and JSON
//! strings for structured data.

use form_core::{
    Answer, ColumnType, ContainerId, DocumentSource, EditorConfig, FormDocument, ItemId,
    LintSeverity, QuestionType, lint_document,
};
use form_editor::{DragEvent, FormEngine, FormMutation, Modifiers, drop_zones};
use wasm_bindgen::prelude::*;

/// The main WASM-facing form controller.
///
/// Holds the editor engine. All interaction from the page goes through
/// this struct.
#[wasm_bindgen]
pub struct FormStudio {
    engine: FormEngine,
}

#[wasm_bindgen]
impl FormStudio {
    /// Create an empty form. `sections` turns on section grouping.
    #[wasm_bindgen(constructor)]
    pub fn new(sections: bool) -> Self {
        console_error_panic_hook_setup();
        console_log_setup();

        let config = if sections {
            EditorConfig::with_sections()
        } else {
            EditorConfig::default()
        };
        Self {
            engine: FormEngine::new(config),
        }
    }

    // ─── Document ────────────────────────────────────────────────────────

    /// Replace the form with a saved document (`{"title":..,"blocks":[..]}`).
    /// Returns `false` if the JSON is malformed or repeats an id; the
    /// current form is kept in that case.
    pub fn load_json(&mut self, json: &str) -> bool {
        match parse_document(json) {
            Ok(doc) => {
                let config = self.engine.config().clone();
                self.engine = FormEngine::with_document(doc, config);
                true
            }
            Err(e) => {
                log::warn!("load_json rejected: {e}");
                false
            }
        }
    }

    /// The form in its saved shape, for `load_json`.
    pub fn document_json(&self) -> String {
        serde_json::to_string(&self.engine.document().to_source())
            .unwrap_or_else(|_| "{}".to_string())
    }

    /// The authored document handed to the persistence service.
    pub fn authored_json(&self) -> String {
        serde_json::to_string(&self.engine.authored_document())
            .unwrap_or_else(|_| "{}".to_string())
    }

    /// Lint diagnostics as a JSON array.
    pub fn lint_json(&self) -> String {
        diagnostics_json(self.engine.document())
    }

    // ─── Drag API ────────────────────────────────────────────────────────

    /// Pick up an item, section or palette template. Returns `true` if a
    /// drag session started.
    pub fn drag_start(&mut self, id: &str) -> bool {
        self.engine.handle_drag(&DragEvent::start(id));
        self.engine.drag_session().is_some()
    }

    /// Returns `true` if hovering reordered the form.
    pub fn drag_over(&mut self, target: Option<String>) -> bool {
        self.engine.handle_drag(&DragEvent::Over { target })
    }

    pub fn drag_end(&mut self, target: Option<String>) -> bool {
        self.engine.handle_drag(&DragEvent::End { target })
    }

    pub fn drag_cancel(&mut self) -> bool {
        self.engine.handle_drag(&DragEvent::Cancel)
    }

    pub fn is_dragging(&self) -> bool {
        self.engine.drag_session().is_some()
    }

    /// Whether `id` is the live hover target, for drop indicators.
    pub fn is_over(&self, id: &str) -> bool {
        self.engine.is_over(id)
    }

    /// Every drop zone id in reading order.
    pub fn drop_zones(&self) -> js_sys::Array {
        drop_zones(
            self.engine.document(),
            self.engine.palette(),
            self.engine.config(),
        )
        .into_iter()
        .map(JsValue::from)
        .collect()
    }

    // ─── Keyboard Shortcut API ───────────────────────────────────────────

    /// Handle a keyboard event. `focused` is the id of the focused block.
    /// Returns `true` if the key did something.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
        focused: Option<String>,
    ) -> bool {
        let modifiers = Modifiers {
            ctrl,
            shift,
            alt,
            meta,
        };
        self.engine.handle_key(key, modifiers, focused.as_deref())
    }

    // ─── Authoring API ───────────────────────────────────────────────────

    /// Append a question of `kind` (`text`, `mcq`, `table`) to the given
    /// section, or to the top level when `section` is absent. Returns the
    /// new id, or an empty string if nothing was added.
    pub fn add_item(&mut self, kind: &str, section: Option<String>) -> String {
        let Some(ty) = QuestionType::parse(kind) else {
            return String::new();
        };
        let container = match section.as_deref() {
            None => ContainerId::Root,
            Some(raw) => match ItemId::lookup(raw) {
                Some(id) => ContainerId::Section(id),
                None => return String::new(),
            },
        };
        self.engine
            .add_item(container, ty)
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    /// Append a section. Empty string when sections are disabled.
    pub fn add_section(&mut self) -> String {
        self.engine
            .add_section()
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.edit(id, |id| FormMutation::RemoveBlock { id })
    }

    pub fn set_title(&mut self, title: &str) -> bool {
        self.engine.apply_mutation(FormMutation::SetTitle {
            title: title.to_string(),
        })
    }

    pub fn set_prompt(&mut self, id: &str, prompt: &str) -> bool {
        let prompt = prompt.to_string();
        self.edit(id, |id| FormMutation::SetPrompt { id, prompt })
    }

    pub fn set_section_header(&mut self, id: &str, header: &str) -> bool {
        let header = header.to_string();
        self.edit(id, |id| FormMutation::SetSectionHeader { id, header })
    }

    pub fn set_text_limits(&mut self, id: &str, min: Option<u32>, max: Option<u32>) -> bool {
        self.edit(id, |id| FormMutation::SetTextLimits {
            id,
            min_length: min.map(|n| n as usize),
            max_length: max.map(|n| n as usize),
        })
    }

    pub fn add_choice(&mut self, id: &str, text: &str) -> bool {
        let text = text.to_string();
        self.edit(id, |id| FormMutation::AddChoice { id, text })
    }

    pub fn set_choice_text(&mut self, id: &str, index: usize, text: &str) -> bool {
        let text = text.to_string();
        self.edit(id, |id| FormMutation::SetChoiceText { id, index, text })
    }

    pub fn remove_choice(&mut self, id: &str, index: usize) -> bool {
        self.edit(id, |id| FormMutation::RemoveChoice { id, index })
    }

    /// Point a choice at another question; `None` clears the branch.
    pub fn set_choice_target(&mut self, id: &str, index: usize, target: Option<String>) -> bool {
        let target = match target.as_deref() {
            None => None,
            Some(raw) => match ItemId::lookup(raw) {
                Some(target) => Some(target),
                None => return false,
            },
        };
        self.edit(id, |id| FormMutation::SetChoiceTarget { id, index, target })
    }

    pub fn add_column(&mut self, id: &str, header: &str) -> bool {
        let header = header.to_string();
        self.edit(id, |id| FormMutation::AddColumn { id, header })
    }

    pub fn remove_column(&mut self, id: &str, column: &str) -> bool {
        self.edit_column(id, column, |id, column| FormMutation::RemoveColumn {
            id,
            column,
        })
    }

    pub fn set_column_header(&mut self, id: &str, column: &str, header: &str) -> bool {
        let header = header.to_string();
        self.edit_column(id, column, |id, column| FormMutation::SetColumnHeader {
            id,
            column,
            header,
        })
    }

    /// Switch a column between `text` and `mcq`.
    pub fn set_column_type(&mut self, id: &str, column: &str, kind: &str) -> bool {
        let column_type = match kind {
            "text" => ColumnType::Text,
            "mcq" => ColumnType::Mcq,
            _ => return false,
        };
        self.edit_column(id, column, |id, column| FormMutation::SetColumnType {
            id,
            column,
            column_type,
        })
    }

    pub fn add_column_choice(&mut self, id: &str, column: &str, text: &str) -> bool {
        let text = text.to_string();
        self.edit_column(id, column, |id, column| FormMutation::AddColumnChoice {
            id,
            column,
            text,
        })
    }

    pub fn set_column_choice(&mut self, id: &str, column: &str, index: usize, text: &str) -> bool {
        let text = text.to_string();
        self.edit_column(id, column, |id, column| FormMutation::SetColumnChoice {
            id,
            column,
            index,
            text,
        })
    }

    pub fn remove_column_choice(&mut self, id: &str, column: &str, index: usize) -> bool {
        self.edit_column(id, column, |id, column| {
            FormMutation::RemoveColumnChoice { id, column, index }
        })
    }

    // ─── Preview API ─────────────────────────────────────────────────────

    pub fn enter_preview(&mut self) -> bool {
        self.engine.enter_preview()
    }

    pub fn exit_preview(&mut self) -> bool {
        self.engine.exit_preview()
    }

    pub fn is_previewing(&self) -> bool {
        self.engine.is_previewing()
    }

    /// Record an answer given as JSON: `{"text":".."}`, `{"choice":1}` or
    /// `{"table":{"<column id>":{"text":".."}}}`.
    pub fn answer_json(&mut self, question: &str, json: &str) -> bool {
        let Ok(answer) = serde_json::from_str::<Answer>(json) else {
            log::warn!("answer for {question} is not valid JSON: {json}");
            return false;
        };
        self.answer(question, answer)
    }

    pub fn answer_text(&mut self, question: &str, text: &str) -> bool {
        self.answer(question, Answer::text(text))
    }

    pub fn answer_choice(&mut self, question: &str, index: usize) -> bool {
        self.answer(question, Answer::Choice(index))
    }

    pub fn next(&mut self) -> bool {
        self.engine.preview_mut().is_some_and(|p| p.next())
    }

    pub fn previous(&mut self) -> bool {
        self.engine.preview_mut().is_some_and(|p| p.previous())
    }

    pub fn can_advance(&self) -> bool {
        self.engine.preview().is_some_and(|p| p.can_advance())
    }

    pub fn can_retreat(&self) -> bool {
        self.engine.preview().is_some_and(|p| p.can_retreat())
    }

    pub fn is_submit_eligible(&self) -> bool {
        self.engine.preview().is_some_and(|p| p.is_submit_eligible())
    }

    /// Navigation state as JSON:
    /// `{"current":0,"history":[],"pending":null,"question":{..}}`.
    /// `null` outside preview.
    pub fn navigation_json(&self) -> String {
        let Some(preview) = self.engine.preview() else {
            return "null".to_string();
        };
        let state = preview.state();
        let json = serde_json::json!({
            "current": state.current,
            "history": state.history,
            "pending": state.pending,
            "question": preview.current_question(),
            "canAdvance": preview.can_advance(),
            "canRetreat": preview.can_retreat(),
            "submitEligible": preview.is_submit_eligible(),
        });
        json.to_string()
    }

    /// The answer submission, or `null` until the walk can be submitted.
    pub fn submission_json(&self) -> String {
        match self.engine.preview().and_then(|p| p.submission()) {
            Some(records) => {
                serde_json::to_string(&records).unwrap_or_else(|_| "null".to_string())
            }
            None => "null".to_string(),
        }
    }
}

impl FormStudio {
    fn apply(&mut self, mutation: FormMutation) -> bool {
        self.engine.apply_mutation(mutation)
    }

    /// Apply an edit on a block named by a raw id. Unknown ids are refused
    /// without being interned.
    fn edit(&mut self, raw: &str, make: impl FnOnce(ItemId) -> FormMutation) -> bool {
        match ItemId::lookup(raw) {
            Some(id) => self.apply(make(id)),
            None => false,
        }
    }

    fn edit_column(
        &mut self,
        raw: &str,
        column: &str,
        make: impl FnOnce(ItemId, ItemId) -> FormMutation,
    ) -> bool {
        match (ItemId::lookup(raw), ItemId::lookup(column)) {
            (Some(id), Some(column)) => self.apply(make(id, column)),
            _ => false,
        }
    }

    fn answer(&mut self, question: &str, answer: Answer) -> bool {
        let Some(id) = ItemId::lookup(question) else {
            return false;
        };
        self.engine
            .preview_mut()
            .is_some_and(|p| p.answer(id, answer))
    }
}

// ─── JSON helpers ────────────────────────────────────────────────────────

fn parse_document(json: &str) -> Result<FormDocument, String> {
    let source: DocumentSource =
        serde_json::from_str(json).map_err(|e| format!("invalid document JSON: {e}"))?;
    FormDocument::from_source(source)
}

fn diagnostics_json(doc: &FormDocument) -> String {
    let diags: Vec<serde_json::Value> = lint_document(doc)
        .into_iter()
        .map(|d| {
            serde_json::json!({
                "itemId": d.item_id,
                "message": d.message,
                "severity": match d.severity {
                    LintSeverity::Warning => "warning",
                    LintSeverity::Info => "info",
                },
                "rule": d.rule,
            })
        })
        .collect();
    serde_json::Value::Array(diags).to_string()
}

// ─── Console logging ─────────────────────────────────────────────────────

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        #[cfg(target_arch = "wasm32")]
        {
            let msg = JsValue::from(format!("[{}] {}", record.target(), record.args()));
            match record.level() {
                log::Level::Error => web_sys::console::error_1(&msg),
                log::Level::Warn => web_sys::console::warn_1(&msg),
                log::Level::Info => web_sys::console::info_1(&msg),
                log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&msg),
            }
        }
    }

    fn flush(&self) {}
}

fn console_log_setup() {
    use std::sync::Once;
    static SET_LOGGER: Once = Once::new();
    SET_LOGGER.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Warn);
        }
    });
}

/// Change console verbosity: `error`, `warn`, `info`, `debug`, `trace` or
/// `off`. Returns `false` for an unknown level.
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> bool {
    match level.parse::<log::LevelFilter>() {
        Ok(filter) => {
            log::set_max_level(filter);
            true
        }
        Err(_) => false,
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Form Studio WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone validation (no controller needed) ────────────────────────

/// Validate a saved document. Returns JSON: `{"ok":true,"diagnostics":[..]}`
/// or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate(json: &str) -> String {
    match parse_document(json) {
        Ok(doc) => format!(r#"{{"ok":true,"diagnostics":{}}}"#, diagnostics_json(&doc)),
        Err(e) => serde_json::json!({ "ok": false, "error": e }).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAVED: &str = r#"{
        "title": "Pets",
        "blocks": [
            {"block": "item", "id": "fw_pet", "prompt": "Own a pet?",
             "kind": {"type": "mcq", "choices": [
                 {"text": "yes", "target": "fw_name"},
                 {"text": "no"}
             ]}},
            {"block": "item", "id": "fw_why", "prompt": "Why not?",
             "kind": {"type": "text", "minLength": 2}},
            {"block": "item", "id": "fw_name", "prompt": "Pet name",
             "kind": {"type": "text"}}
        ]
    }"#;

    #[test]
    fn load_and_walk_a_saved_form() {
        let mut studio = FormStudio::new(false);
        assert!(studio.load_json(SAVED));
        assert!(studio.enter_preview());
        assert!(studio.answer_json("fw_pet", r#"{"choice":0}"#));
        assert!(studio.next());

        let nav: serde_json::Value = serde_json::from_str(&studio.navigation_json()).unwrap();
        assert_eq!(nav["current"], 2);
        assert_eq!(nav["history"], serde_json::json!([0]));

        assert_eq!(studio.submission_json(), "null");
        assert!(studio.answer_text("fw_name", "Rex"));
        let submission: serde_json::Value =
            serde_json::from_str(&studio.submission_json()).unwrap();
        assert_eq!(
            submission,
            serde_json::json!([
                {"questionId": "fw_pet", "choiceText": "yes"},
                {"questionId": "fw_name", "text": "Rex"}
            ])
        );
    }

    #[test]
    fn malformed_documents_are_rejected() {
        let mut studio = FormStudio::new(false);
        assert!(!studio.load_json("{not json"));
        let dup = r#"{"title":"x","blocks":[
            {"block":"item","id":"fw_dup","kind":{"type":"text"}},
            {"block":"item","id":"fw_dup","kind":{"type":"text"}}
        ]}"#;
        assert!(!studio.load_json(dup));
        let report: serde_json::Value = serde_json::from_str(&validate(dup)).unwrap();
        assert_eq!(report["ok"], false);
        assert_eq!(report["error"], "duplicate id `fw_dup`");
    }

    #[test]
    fn validate_reports_lint() {
        let report: serde_json::Value = serde_json::from_str(&validate(SAVED)).unwrap();
        assert_eq!(report["ok"], true);
        let rules: Vec<&str> = report["diagnostics"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|d| d["rule"].as_str())
            .collect();
        assert!(rules.is_empty(), "unexpected diagnostics: {rules:?}");
    }

    #[test]
    fn authoring_by_raw_ids() {
        let mut studio = FormStudio::new(false);
        let q = studio.add_item("mcq", None);
        assert!(!q.is_empty());
        assert_eq!(studio.add_item("essay", None), "");
        assert_eq!(studio.add_section(), "");
        assert!(studio.set_title("Survey"));
        assert!(studio.set_prompt(&q, "Pick one"));
        assert!(studio.add_choice(&q, "red"));
        assert!(!studio.set_prompt("fw_never_created", "x"));
        assert!(!studio.set_choice_target(&q, 0, Some("fw_never_created".into())));

        let authored: serde_json::Value = serde_json::from_str(&studio.authored_json()).unwrap();
        assert_eq!(authored["formName"], "Survey");
        assert_eq!(authored["questions"][0]["questionType"], "mcq");
        assert_eq!(authored["questions"][0]["choices"][0]["text"], "red");

        assert!(studio.drag_start(&q));
        assert!(studio.drag_end(Some("palette".into())));
        assert_eq!(studio.document_json(), r#"{"title":"Survey","blocks":[]}"#);
    }
}
