//! Editor configuration.

// ─── Config ───────────────────────────────────────────────────────────────

/// Configuration for the authoring engine.
///
/// Defaults describe the canonical flat model: no sections in the palette
/// and live reordering while hovering inside a list.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Offer a section template and allow grouping items. Default: **false**.
    pub sections_enabled: bool,

    /// Reorder immediately when hovering over a sibling in the same
    /// container, instead of only on drop. Default: **true**.
    pub optimistic_reorder: bool,

    /// Id of the palette container. Dropping anything here deletes it.
    /// Template ids are derived from it (`palette-text`, `palette-mcq`, ...).
    pub palette_id: String,

    /// Id of the top-level container, used for its boundary zones
    /// (`root-start`, `root-end`).
    pub root_id: String,

    /// Prefix for freshly minted item and section ids.
    pub id_prefix: String,

    /// Prefix for freshly minted table column ids.
    pub column_prefix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            sections_enabled: false,
            optimistic_reorder: true,
            palette_id: "palette".to_string(),
            root_id: "root".to_string(),
            id_prefix: "item".to_string(),
            column_prefix: "column".to_string(),
        }
    }
}

impl EditorConfig {
    /// Flat model with section grouping turned on.
    pub fn with_sections() -> Self {
        Self {
            sections_enabled: true,
            ..Self::default()
        }
    }
}
