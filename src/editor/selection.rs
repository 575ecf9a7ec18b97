use super::geometry::ResizeHandle;

/// What the pointer last picked. Object indices refer to scene paint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionTarget {
    #[default]
    None,
    Object(usize),
    Avatar,
}

impl SelectionTarget {
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    pub const fn object_index(self) -> Option<usize> {
        match self {
            Self::Object(index) => Some(index),
            Self::None | Self::Avatar => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionState {
    target: SelectionTarget,
    active_handle: Option<ResizeHandle>,
}

impl SelectionState {
    pub fn target(&self) -> SelectionTarget {
        self.target
    }

    pub fn active_handle(&self) -> Option<ResizeHandle> {
        self.active_handle
    }

    pub fn select(&mut self, target: SelectionTarget) {
        if self.target != target {
            tracing::debug!(?target, "selection changed");
        }
        self.target = target;
        self.active_handle = None;
    }

    pub fn clear(&mut self) {
        self.select(SelectionTarget::None);
    }

    pub fn set_active_handle(&mut self, handle: Option<ResizeHandle>) {
        self.active_handle = handle.filter(|_| !self.target.is_none());
    }

    /// Keeps an object index pointing at the same object after a removal.
    pub fn on_object_removed(&mut self, removed: usize) {
        match self.target {
            SelectionTarget::Object(index) if index == removed => self.clear(),
            SelectionTarget::Object(index) if index > removed => {
                self.target = SelectionTarget::Object(index - 1);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_resets_active_handle() {
        let mut selection = SelectionState::default();
        selection.select(SelectionTarget::Object(2));
        selection.set_active_handle(Some(ResizeHandle::Se));
        assert_eq!(selection.active_handle(), Some(ResizeHandle::Se));

        selection.select(SelectionTarget::Avatar);
        assert_eq!(selection.active_handle(), None);
    }

    #[test]
    fn handle_requires_a_target() {
        let mut selection = SelectionState::default();
        selection.set_active_handle(Some(ResizeHandle::Nw));
        assert_eq!(selection.active_handle(), None);
    }

    #[test]
    fn removal_clears_or_shifts_object_selection() {
        let mut selection = SelectionState::default();
        selection.select(SelectionTarget::Object(3));
        selection.on_object_removed(1);
        assert_eq!(selection.target(), SelectionTarget::Object(2));
        selection.on_object_removed(2);
        assert_eq!(selection.target(), SelectionTarget::None);
    }
}
