#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum InteractionMode {
    #[default]
    Idle,
    Dragging,
    Resizing,
    EditingText,
}

impl InteractionMode {
    pub const fn is_gesture(self) -> bool {
        matches!(self, Self::Dragging | Self::Resizing)
    }
}
