pub mod drag;
pub mod engine;
pub mod input;
pub mod keys;
pub mod placement;
pub mod preview;

pub use drag::{DragContext, DragController, DragSession, DraggedKind};
pub use engine::{FormEngine, FormMutation, Mode};
pub use input::{DragEvent, Modifiers};
pub use keys::{KeyboardCursor, ShortcutAction, ShortcutMap, drop_zones};
pub use placement::{DropTarget, Resolver};
pub use preview::{NavigationState, Preview};
