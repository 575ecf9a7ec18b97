use super::error::{StateError, StateResult};
use super::{InteractionEvent, InteractionMode, ModeTransition};

/// Pointer/keyboard mode machine. Only transitions that change the mode are kept in history.
#[derive(Debug)]
pub struct ModeMachine {
    mode: InteractionMode,
    transition_history: Vec<ModeTransition>,
}

impl ModeMachine {
    pub fn new() -> Self {
        Self {
            mode: InteractionMode::default(),
            transition_history: Vec::new(),
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn can_transition(&self, event: InteractionEvent) -> bool {
        self.next_mode(event).is_some()
    }

    pub fn next_mode(&self, event: InteractionEvent) -> Option<InteractionMode> {
        use InteractionEvent::*;
        use InteractionMode::*;
        match (self.mode, event) {
            (Idle, PointerDownEmpty) => Some(Idle),
            (Idle, PointerDownDeleteIcon) => Some(Idle),
            (Idle, PointerDownHandle) => Some(Resizing),
            (Idle, PointerDownObject) => Some(Dragging),
            (Dragging, PointerMove) => Some(Dragging),
            (Resizing, PointerMove) => Some(Resizing),
            (Dragging | Resizing, PointerUp | PointerLeave) => Some(Idle),
            (Idle, OpenTextEditor) => Some(EditingText),
            (EditingText, CommitText | DiscardText) => Some(Idle),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: InteractionEvent) -> StateResult<InteractionMode> {
        let next = self.next_mode(event).ok_or_else(|| {
            let from = self.mode;
            tracing::warn!(?from, ?event, "invalid interaction transition requested");
            StateError::InvalidTransition { from, event }
        })?;

        if next != self.mode {
            tracing::debug!(from = ?self.mode, ?event, to = ?next, "interaction mode changed");
            self.transition_history
                .push(ModeTransition::new(self.mode, event, next));
        }
        self.mode = next;

        Ok(self.mode)
    }

    pub fn history(&self) -> &[ModeTransition] {
        &self.transition_history
    }
}

impl Default for ModeMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ModeMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InteractionMode::{:?}", self.mode)
    }
}
