//! Drag session controller.
//!
//! Translates one gesture (start → zero or more hovers → end or cancel) into
//! `FormMutation`s applied by the engine. The controller never touches the
//! document itself. It classifies the dragged element at start, tracks the
//! live hover target for feedback, optionally reorders siblings while
//! hovering inside the same container, and emits at most one structural
//! mutation on drop.

use crate::engine::FormMutation;
use crate::input::DragEvent;
use crate::placement::{DropTarget, Resolver};
use form_core::{
    ContainerId, EditorConfig, FormDocument, ItemId, Palette, PaletteTemplate, Slot, TemplateKind,
};

/// What kind of thing is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraggedKind {
    Section,
    Item,
    Template(PaletteTemplate),
}

/// State of the gesture in progress.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub dragged: ItemId,
    pub kind: DraggedKind,
    /// Hover id exactly as last reported by the host.
    pub hover_id: Option<String>,
    /// Last hover id that resolved, with its placement. Used on drop when
    /// the release target itself does not resolve.
    pub hover: Option<(String, DropTarget)>,
    /// Slot of the dragged block at gesture start.
    origin: Option<Slot>,
    /// Hover id whose placement was already applied by a live reorder.
    realized: Option<String>,
}

#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

/// Read-only view of the editor state a drag event is resolved against.
#[derive(Clone, Copy)]
pub struct DragContext<'a> {
    pub doc: &'a FormDocument,
    pub palette: &'a Palette,
    pub config: &'a EditorConfig,
}

impl<'a> DragContext<'a> {
    fn resolver(&self) -> Resolver<'a> {
        Resolver::new(self.doc, self.palette, self.config)
    }
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether `raw` is the element currently hovered, for drop indicators.
    pub fn is_over(&self, raw: &str) -> bool {
        self.session
            .as_ref()
            .and_then(|s| s.hover_id.as_deref())
            .is_some_and(|hover| hover == raw)
    }

    /// Handle one drag event, returning the mutations to apply.
    pub fn handle(&mut self, event: &DragEvent, ctx: DragContext<'_>) -> Vec<FormMutation> {
        match event {
            DragEvent::Start { id } => self.start(id, ctx),
            DragEvent::Over { target } => self.over(target.as_deref(), ctx),
            DragEvent::End { target } => self.end(target.as_deref(), ctx),
            DragEvent::Cancel => self.cancel(ctx),
        }
    }

    /// Forget the session without emitting anything (mode switches).
    pub fn reset(&mut self) {
        self.session = None;
    }

    fn start(&mut self, raw: &str, ctx: DragContext<'_>) -> Vec<FormMutation> {
        // A new gesture supersedes a stale one.
        let mutations = self.cancel(ctx);

        let Some(id) = ItemId::lookup(raw) else {
            log::trace!("drag start on unknown id {raw:?}; ignored");
            return mutations;
        };
        let kind = if ctx.doc.is_section(id) {
            DraggedKind::Section
        } else if ctx.doc.contains(id) {
            DraggedKind::Item
        } else if let Some(template) = ctx.palette.template(id) {
            DraggedKind::Template(*template)
        } else {
            log::trace!("drag start on {id}, which is neither in the form nor the palette");
            return mutations;
        };
        log::trace!("drag start: {id} as {kind:?}");
        self.session = Some(DragSession {
            dragged: id,
            kind,
            hover_id: None,
            hover: None,
            origin: ctx.doc.slot_of(id),
            realized: None,
        });
        mutations
    }

    fn over(&mut self, raw: Option<&str>, ctx: DragContext<'_>) -> Vec<FormMutation> {
        let Some(session) = self.session.as_mut() else {
            return vec![];
        };
        if session.hover_id.as_deref() == raw {
            return vec![];
        }
        session.hover_id = raw.map(str::to_owned);
        session.realized = None;
        let Some(raw) = raw else {
            return vec![];
        };
        let resolver = ctx.resolver();
        let Some(target) = resolver.resolve(raw) else {
            log::trace!("hover over {raw:?} resolves to nothing");
            return vec![];
        };
        log::trace!("hover {} over {raw:?} → {target:?}", session.dragged);
        session.hover = Some((raw.to_owned(), target));

        if !ctx.config.optimistic_reorder {
            return vec![];
        }
        let Some(slot) = ctx.doc.slot_of(session.dragged) else {
            return vec![];
        };
        let index = match (session.kind, target) {
            (DraggedKind::Item, DropTarget::Place { container, index })
                if container == slot.container =>
            {
                index
            }
            (
                DraggedKind::Section,
                DropTarget::Place {
                    container: ContainerId::Root,
                    index,
                },
            ) => index,
            _ => return vec![],
        };
        if lands_on(slot, slot.container, index, ctx.doc) {
            return vec![];
        }
        session.realized = Some(raw.to_owned());
        vec![FormMutation::MoveBlock {
            id: session.dragged,
            container: slot.container,
            index,
        }]
    }

    fn end(&mut self, raw: Option<&str>, ctx: DragContext<'_>) -> Vec<FormMutation> {
        let Some(session) = self.session.take() else {
            return vec![];
        };
        let Some(raw) = raw else {
            log::trace!("drag of {} released outside any zone", session.dragged);
            return vec![];
        };
        if session.realized.as_deref() == Some(raw) {
            log::trace!("drop of {} on {raw:?} already applied while hovering", session.dragged);
            return vec![];
        }
        let resolver = ctx.resolver();
        let (raw, target) = match resolver.resolve(raw) {
            Some(target) => (raw.to_owned(), target),
            None => match session.hover {
                Some(hover) => hover,
                None => {
                    log::trace!("drop on {raw:?} resolves to nothing");
                    return vec![];
                }
            },
        };
        let id = session.dragged;

        let mutation = match (session.kind, target) {
            (DraggedKind::Template(_), DropTarget::Delete) => None,
            (DraggedKind::Item | DraggedKind::Section, DropTarget::Delete) => ctx
                .doc
                .contains(id)
                .then_some(FormMutation::RemoveBlock { id }),
            (DraggedKind::Template(template), target) => {
                let placement = match template.kind {
                    TemplateKind::Section => resolver
                        .top_level(&raw, target, true)
                        .map(|index| (ContainerId::Root, index)),
                    TemplateKind::Question(_) => match target {
                        DropTarget::Place { container, index } => Some((container, index)),
                        DropTarget::Delete => None,
                    },
                };
                placement.map(|(container, index)| FormMutation::InsertBlock {
                    container,
                    index,
                    block: Box::new(template.instantiate(&ctx.config.id_prefix)),
                })
            }
            (DraggedKind::Item, DropTarget::Place { container, index }) => {
                match ctx.doc.slot_of(id) {
                    Some(slot) if !lands_on(slot, container, index, ctx.doc) => {
                        Some(FormMutation::MoveBlock {
                            id,
                            container,
                            index,
                        })
                    }
                    _ => None,
                }
            }
            (DraggedKind::Section, target) => {
                let index = resolver.top_level(&raw, target, false);
                match (ctx.doc.slot_of(id), index) {
                    (Some(slot), Some(index))
                        if !lands_on(slot, ContainerId::Root, index, ctx.doc) =>
                    {
                        Some(FormMutation::MoveBlock {
                            id,
                            container: ContainerId::Root,
                            index,
                        })
                    }
                    _ => None,
                }
            }
        };
        log::trace!("drop {id} on {raw:?} → {mutation:?}");
        mutation.into_iter().collect()
    }

    fn cancel(&mut self, ctx: DragContext<'_>) -> Vec<FormMutation> {
        let Some(session) = self.session.take() else {
            return vec![];
        };
        log::trace!("drag of {} cancelled", session.dragged);
        match (session.origin, ctx.doc.slot_of(session.dragged)) {
            (Some(origin), Some(now)) if origin != now => vec![FormMutation::MoveBlock {
                id: session.dragged,
                container: origin.container,
                index: origin.position,
            }],
            _ => vec![],
        }
    }
}

/// Whether moving a block at `slot` to `(container, index)` leaves it where
/// it is. Within one container an index past the end means "last".
fn lands_on(slot: Slot, container: ContainerId, index: usize, doc: &FormDocument) -> bool {
    if slot.container != container {
        return false;
    }
    let last = doc.container_len(container).unwrap_or(1).saturating_sub(1);
    index.min(last) == slot.position
}

#[cfg(test)]
mod tests {
    use super::*;
    use form_core::{Item, QuestionType};
    use pretty_assertions::assert_eq;

    fn doc() -> FormDocument {
        FormDocument::from_items(
            "Drag",
            vec![
                Item::text(ItemId::intern("dc_a")),
                Item::text(ItemId::intern("dc_b")),
            ],
        )
        .unwrap()
    }

    #[test]
    fn classifies_the_dragged_element() {
        let doc = doc();
        let config = EditorConfig::default();
        let palette = Palette::new(&config);
        let ctx = DragContext {
            doc: &doc,
            palette: &palette,
            config: &config,
        };
        let mut drag = DragController::new();

        drag.handle(&DragEvent::start("dc_a"), ctx);
        assert_eq!(drag.session().map(|s| s.kind), Some(DraggedKind::Item));

        drag.handle(&DragEvent::start("palette-mcq"), ctx);
        match drag.session().map(|s| s.kind) {
            Some(DraggedKind::Template(template)) => {
                assert_eq!(template.kind, TemplateKind::Question(QuestionType::Mcq));
            }
            other => panic!("expected template, got {other:?}"),
        }

        drag.handle(&DragEvent::start("dc_not_in_form"), ctx);
        assert!(!drag.is_active());
    }

    #[test]
    fn hover_feedback_without_optimistic_reorder() {
        let doc = doc();
        let config = EditorConfig {
            optimistic_reorder: false,
            ..EditorConfig::default()
        };
        let palette = Palette::new(&config);
        let ctx = DragContext {
            doc: &doc,
            palette: &palette,
            config: &config,
        };
        let mut drag = DragController::new();
        drag.handle(&DragEvent::start("dc_a"), ctx);
        assert!(drag.handle(&DragEvent::over("dc_b"), ctx).is_empty());
        assert!(drag.is_over("dc_b"));
        assert!(!drag.is_over("dc_a"));

        let mutations = drag.handle(&DragEvent::end("dc_b"), ctx);
        assert_eq!(
            mutations,
            vec![FormMutation::MoveBlock {
                id: ItemId::intern("dc_a"),
                container: ContainerId::Root,
                index: 1,
            }]
        );
        assert!(!drag.is_active());
        assert!(!drag.is_over("dc_b"));
    }

    #[test]
    fn hover_reorders_within_a_container() {
        let doc = doc();
        let config = EditorConfig::default();
        let palette = Palette::new(&config);
        let ctx = DragContext {
            doc: &doc,
            palette: &palette,
            config: &config,
        };
        let mut drag = DragController::new();
        drag.handle(&DragEvent::start("dc_a"), ctx);
        let expected = vec![FormMutation::MoveBlock {
            id: ItemId::intern("dc_a"),
            container: ContainerId::Root,
            index: 1,
        }];
        assert_eq!(drag.handle(&DragEvent::over("dc_b"), ctx), expected);
        // Same target again: nothing new.
        assert!(drag.handle(&DragEvent::over("dc_b"), ctx).is_empty());
    }

    #[test]
    fn end_without_session_is_ignored() {
        let doc = doc();
        let config = EditorConfig::default();
        let palette = Palette::new(&config);
        let ctx = DragContext {
            doc: &doc,
            palette: &palette,
            config: &config,
        };
        let mut drag = DragController::new();
        assert!(drag.handle(&DragEvent::end("dc_b"), ctx).is_empty());
        assert!(drag.handle(&DragEvent::Cancel, ctx).is_empty());
    }
}
