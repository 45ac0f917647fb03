//! Keyboard mapping and keyboard dragging.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s, and walks a
//! keyboard drag through the form's drop zones in reading order. The map
//! lives in Rust so the browser bridge and native hosts share it.
//!
//! - Space / Enter picks up the focused block, and drops it again
//! - Arrow keys move the hover to the neighbouring drop zone
//! - Escape cancels the drag, undoing any live reorder
//! - ⌘Enter toggles preview; in preview the arrows step through questions

use crate::input::Modifiers;
use form_core::{Block, EditorConfig, FormDocument, Palette};

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Drag ──
    PickUpOrDrop,
    MoveBackward,
    MoveForward,
    CancelDrag,

    // ── Edit ──
    /// Remove the focused block (same as dropping it on the palette).
    Delete,

    // ── Mode ──
    TogglePreview,
}

/// Resolves key events into shortcut actions.
///
/// On macOS `meta` is ⌘; elsewhere `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// `key` is the `KeyboardEvent.key` value (e.g. `"ArrowUp"`, `" "`).
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let cmd = modifiers.ctrl || modifiers.meta;

        if cmd {
            return match key {
                "Enter" => Some(ShortcutAction::TogglePreview),
                _ => None,
            };
        }
        if modifiers.alt {
            return None;
        }

        match key {
            " " | "Enter" => Some(ShortcutAction::PickUpOrDrop),
            "ArrowUp" | "ArrowLeft" => Some(ShortcutAction::MoveBackward),
            "ArrowDown" | "ArrowRight" => Some(ShortcutAction::MoveForward),
            "Escape" => Some(ShortcutAction::CancelDrag),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            _ => None,
        }
    }
}

// ─── Keyboard dragging ───────────────────────────────────────────────────

/// Every drop zone in reading order: the palette, the top-level start zone,
/// each block (sections followed by their own start zone, content and end
/// zone), then the top-level end zone.
pub fn drop_zones(doc: &FormDocument, palette: &Palette, config: &EditorConfig) -> Vec<String> {
    let root = &config.root_id;
    let mut zones = Vec::with_capacity(doc.question_count() + doc.blocks().len() * 3 + 3);
    zones.push(palette.id.to_string());
    zones.push(format!("{root}-start"));
    for block in doc.blocks() {
        zones.push(block.id().to_string());
        if let Block::Section(section) = block {
            zones.push(format!("{}-start", section.id));
            zones.extend(section.content.iter().map(|item| item.id.to_string()));
            zones.push(format!("{}-end", section.id));
        }
    }
    zones.push(format!("{root}-end"));
    zones
}

/// Hover position of a keyboard drag within a fixed list of zones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardCursor {
    zones: Vec<String>,
    position: usize,
}

impl KeyboardCursor {
    /// Start on `picked`, or on the first zone if it is not listed.
    pub fn new(zones: Vec<String>, picked: &str) -> Self {
        let position = zones.iter().position(|z| z == picked).unwrap_or(0);
        Self { zones, position }
    }

    pub fn current(&self) -> Option<&str> {
        self.zones.get(self.position).map(String::as_str)
    }

    /// Step to the neighbouring zone. `None` at either end.
    pub fn step(&mut self, forward: bool) -> Option<&str> {
        let next = if forward {
            self.position + 1
        } else {
            self.position.checked_sub(1)?
        };
        if next >= self.zones.len() {
            return None;
        }
        self.position = next;
        self.current()
    }
}
