//! Input abstraction layer.
//!
//! Normalizes pointer and keyboard drag interactions into a single
//! `DragEvent` enum consumed by the drag controller. Targets arrive as raw
//! strings from the host: item ids, container ids, `-start`/`-end` boundary
//! zones or palette ids. Resolving them is the placement module's job.

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    /// Any modifier at all.
    pub fn any(self) -> bool {
        self.ctrl || self.shift || self.alt || self.meta
    }
}

/// A normalized drag event from any input device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    /// Something was picked up: an item, a section or a palette template.
    Start { id: String },

    /// The dragged thing now hovers `target` (`None` when over nothing).
    Over { target: Option<String> },

    /// The dragged thing was released over `target`.
    End { target: Option<String> },

    /// The drag was abandoned (Escape, pointer lost).
    Cancel,
}

impl DragEvent {
    pub fn start(id: impl Into<String>) -> Self {
        Self::Start { id: id.into() }
    }

    pub fn over(target: impl Into<String>) -> Self {
        Self::Over {
            target: Some(target.into()),
        }
    }

    pub fn end(target: impl Into<String>) -> Self {
        Self::End {
            target: Some(target.into()),
        }
    }

    /// Released outside every drop zone.
    pub fn end_nowhere() -> Self {
        Self::End { target: None }
    }

    /// The raw target carried by `Over` and `End`.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Over { target } | Self::End { target } => target.as_deref(),
            _ => None,
        }
    }
}
