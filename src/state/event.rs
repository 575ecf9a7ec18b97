use super::model::InteractionMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionEvent {
    PointerDownEmpty,
    PointerDownDeleteIcon,
    PointerDownHandle,
    PointerDownObject,
    PointerMove,
    PointerUp,
    PointerLeave,
    OpenTextEditor,
    CommitText,
    DiscardText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTransition {
    pub from: InteractionMode,
    pub event: InteractionEvent,
    pub to: InteractionMode,
}

impl ModeTransition {
    pub const fn new(from: InteractionMode, event: InteractionEvent, to: InteractionMode) -> Self {
        Self { from, event, to }
    }
}
