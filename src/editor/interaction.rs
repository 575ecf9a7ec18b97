use std::time::Duration;

use thiserror::Error;

use crate::config::EditorConfig;
use crate::geometry::{Bounds, CanvasPoint};
use crate::input::{resolve_shortcut, InputContext, ShortcutAction, ShortcutKey, ShortcutModifiers};
use crate::state::{InteractionEvent, InteractionMode, ModeMachine, StateError};

use super::geometry::{
    apply_resize, point_in_delete_icon, resize_handle_at, resized_font_size, ResizeHandle,
    TextMeasurer, IMAGE_MIN_SIZE,
};
use super::hit_test::{
    avatar_at_point, delete_icon_center, target_geometry, top_object_at_point, top_text_at_point,
};
use super::scene::{Scene, SceneError, SceneObject};
use super::selection::{SelectionState, SelectionTarget};
use super::text_edit::{TextEditClose, TextEditDraft};
use super::viewport::CoordinateMapper;

#[derive(Debug, Error)]
pub enum InteractionError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

pub type InteractionResult<T> = std::result::Result<T, InteractionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionOutcome {
    Ignored,
    Deselected,
    Selected(SelectionTarget),
    ResizeStarted(ResizeHandle),
    Deleted(SelectionTarget),
    Moved,
    Resized,
    Released,
    TextEditOpened(usize),
    TextEdited,
    TextCommitted(usize),
    TextDiscarded(usize),
    ExportRequested,
}

impl InteractionOutcome {
    pub const fn needs_redraw(self) -> bool {
        !matches!(self, Self::Ignored | Self::Released | Self::ExportRequested)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionSettings {
    pub show_delete_icon: bool,
    pub handle_size: f64,
    pub double_tap_window: Duration,
}

impl From<&EditorConfig> for InteractionSettings {
    fn from(config: &EditorConfig) -> Self {
        Self {
            show_delete_icon: config.show_delete_icon,
            handle_size: config.handle_size,
            double_tap_window: config.double_tap_window,
        }
    }
}

/// Values captured when a resize starts; every move resizes from these.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ResizeOrigin {
    Bounds(Bounds),
    Font { size: f64, baseline_y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Drag {
        target: SelectionTarget,
        offset: CanvasPoint,
    },
    Resize {
        target: SelectionTarget,
        handle: ResizeHandle,
        origin: ResizeOrigin,
    },
}

impl Gesture {
    fn target(self) -> SelectionTarget {
        match self {
            Self::Drag { target, .. } | Self::Resize { target, .. } => target,
        }
    }

    fn retarget(self, next: SelectionTarget) -> Self {
        match self {
            Self::Drag { offset, .. } => Self::Drag {
                target: next,
                offset,
            },
            Self::Resize { handle, origin, .. } => Self::Resize {
                target: next,
                handle,
                origin,
            },
        }
    }
}

/// Translates canvas-space pointer and key events into scene mutations.
#[derive(Debug)]
pub struct InteractionController {
    settings: InteractionSettings,
    machine: ModeMachine,
    selection: SelectionState,
    gesture: Option<Gesture>,
    draft: Option<TextEditDraft>,
    last_touch_release: Option<Duration>,
}

impl InteractionController {
    pub fn new(settings: InteractionSettings) -> Self {
        Self {
            settings,
            machine: ModeMachine::new(),
            selection: SelectionState::default(),
            gesture: None,
            draft: None,
            last_touch_release: None,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.machine.mode()
    }

    pub fn machine(&self) -> &ModeMachine {
        &self.machine
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    pub fn draft(&self) -> Option<&TextEditDraft> {
        self.draft.as_ref()
    }

    /// Index of the text whose glyphs the overlay currently replaces.
    pub fn editing_index(&self) -> Option<usize> {
        self.draft.as_ref().map(TextEditDraft::target)
    }

    pub fn pointer_down(
        &mut self,
        scene: &mut Scene,
        point: CanvasPoint,
        measurer: &dyn TextMeasurer,
    ) -> InteractionResult<InteractionOutcome> {
        self.settle_before_pointer_down(scene)?;

        let target = self.selection.target();
        if let Some(geometry) = target_geometry(scene, target, measurer) {
            if self.settings.show_delete_icon
                && point_in_delete_icon(point, delete_icon_center(&geometry))
            {
                self.machine.transition(InteractionEvent::PointerDownDeleteIcon)?;
                return self.delete_target(scene, target);
            }

            let handle = resize_handle_at(point, geometry.bounds, self.settings.handle_size);
            if let Some(handle) = handle {
                let origin = match target {
                    SelectionTarget::Object(index) => match scene.text(index) {
                        Some(text) => ResizeOrigin::Font {
                            size: text.size,
                            baseline_y: text.y,
                        },
                        None => ResizeOrigin::Bounds(geometry.bounds),
                    },
                    _ => ResizeOrigin::Bounds(geometry.bounds),
                };
                self.machine.transition(InteractionEvent::PointerDownHandle)?;
                self.selection.set_active_handle(Some(handle));
                self.gesture = Some(Gesture::Resize {
                    target,
                    handle,
                    origin,
                });
                tracing::debug!(?target, ?handle, "resize started");
                return Ok(InteractionOutcome::ResizeStarted(handle));
            }
        }

        let hit = if avatar_at_point(scene, point) {
            scene
                .visible_avatar()
                .map(|avatar| (SelectionTarget::Avatar, CanvasPoint::new(avatar.x, avatar.y)))
        } else {
            top_object_at_point(scene, point, measurer).and_then(|index| {
                scene
                    .object(index)
                    .map(|object| (SelectionTarget::Object(index), object.position()))
            })
        };

        match hit {
            Some((target, origin)) => {
                self.machine.transition(InteractionEvent::PointerDownObject)?;
                self.selection.select(target);
                self.gesture = Some(Gesture::Drag {
                    target,
                    offset: point.offset_from(origin),
                });
                Ok(InteractionOutcome::Selected(target))
            }
            None => {
                self.machine.transition(InteractionEvent::PointerDownEmpty)?;
                self.selection.clear();
                Ok(InteractionOutcome::Deselected)
            }
        }
    }

    /// A pointer-down closes an open editor (as a blur) and ends a gesture whose release was lost.
    fn settle_before_pointer_down(&mut self, scene: &mut Scene) -> InteractionResult<()> {
        match self.machine.mode() {
            InteractionMode::EditingText => {
                self.close_text_editor(scene, TextEditClose::Blur)?;
            }
            InteractionMode::Dragging | InteractionMode::Resizing => {
                self.finish_gesture(InteractionEvent::PointerUp)?;
            }
            InteractionMode::Idle => {}
        }
        Ok(())
    }

    pub fn pointer_move(
        &mut self,
        scene: &mut Scene,
        point: CanvasPoint,
    ) -> InteractionResult<InteractionOutcome> {
        let Some(gesture) = self.gesture else {
            return Ok(InteractionOutcome::Ignored);
        };
        self.machine.transition(InteractionEvent::PointerMove)?;

        match gesture {
            Gesture::Drag { target, offset } => {
                let position = CanvasPoint::new(point.x - offset.x, point.y - offset.y);
                match target {
                    SelectionTarget::Object(index) => {
                        scene.update(index, |object| object.with_position(position))?;
                    }
                    SelectionTarget::Avatar => {
                        scene.update_avatar(|avatar| avatar.with_position(position))?;
                    }
                    SelectionTarget::None => return Ok(InteractionOutcome::Ignored),
                }
                Ok(InteractionOutcome::Moved)
            }
            Gesture::Resize {
                target,
                handle,
                origin,
            } => {
                match (target, origin) {
                    (SelectionTarget::Object(index), ResizeOrigin::Font { size, baseline_y }) => {
                        let next = resized_font_size(handle, size, baseline_y, point.y);
                        scene.update_text(index, |text| text.with_size(next))?;
                    }
                    (SelectionTarget::Object(index), ResizeOrigin::Bounds(bounds)) => {
                        let next = apply_resize(handle, bounds, point, IMAGE_MIN_SIZE);
                        scene.update_image(index, |image| image.with_bounds(next))?;
                    }
                    (SelectionTarget::Avatar, ResizeOrigin::Bounds(bounds)) => {
                        let next = apply_resize(handle, bounds, point, IMAGE_MIN_SIZE);
                        scene.update_avatar(|avatar| avatar.with_bounds(next))?;
                    }
                    _ => return Ok(InteractionOutcome::Ignored),
                }
                Ok(InteractionOutcome::Resized)
            }
        }
    }

    pub fn pointer_up(&mut self) -> InteractionResult<InteractionOutcome> {
        self.finish_gesture(InteractionEvent::PointerUp)
    }

    pub fn pointer_leave(&mut self) -> InteractionResult<InteractionOutcome> {
        self.finish_gesture(InteractionEvent::PointerLeave)
    }

    fn finish_gesture(&mut self, event: InteractionEvent) -> InteractionResult<InteractionOutcome> {
        if self.gesture.take().is_none() {
            return Ok(InteractionOutcome::Ignored);
        }
        self.machine.transition(event)?;
        self.selection.set_active_handle(None);
        Ok(InteractionOutcome::Released)
    }

    pub fn double_click(
        &mut self,
        scene: &mut Scene,
        point: CanvasPoint,
        mapper: &CoordinateMapper,
        measurer: &dyn TextMeasurer,
    ) -> InteractionResult<InteractionOutcome> {
        if self.machine.mode() != InteractionMode::Idle {
            self.settle_before_pointer_down(scene)?;
        }
        let Some(index) = top_text_at_point(scene, point, measurer) else {
            return Ok(InteractionOutcome::Ignored);
        };
        self.open_text_editor(scene, index, mapper)
    }

    /// Ends a touch gesture; two releases closer than the double-tap window open the text editor.
    ///
    /// A release without a contact point opens the selected text instead of hit-testing.
    pub fn touch_release(
        &mut self,
        scene: &mut Scene,
        point: Option<CanvasPoint>,
        timestamp: Duration,
        mapper: &CoordinateMapper,
        measurer: &dyn TextMeasurer,
    ) -> InteractionResult<InteractionOutcome> {
        let released = self.pointer_up()?;
        let previous = self.last_touch_release.replace(timestamp);
        let is_double_tap = previous
            .and_then(|previous| timestamp.checked_sub(previous))
            .is_some_and(|delta| !delta.is_zero() && delta < self.settings.double_tap_window);
        if !is_double_tap {
            return Ok(released);
        }
        self.last_touch_release = None;
        let opened = match point {
            Some(point) => self.double_click(scene, point, mapper, measurer)?,
            None => match self.selection.target() {
                SelectionTarget::Object(index)
                    if self.machine.mode() == InteractionMode::Idle
                        && scene.text(index).is_some() =>
                {
                    self.open_text_editor(scene, index, mapper)?
                }
                _ => InteractionOutcome::Ignored,
            },
        };
        match opened {
            InteractionOutcome::Ignored => Ok(released),
            opened => Ok(opened),
        }
    }

    pub fn open_text_editor(
        &mut self,
        scene: &Scene,
        index: usize,
        mapper: &CoordinateMapper,
    ) -> InteractionResult<InteractionOutcome> {
        let text = scene.text(index).ok_or(SceneError::KindMismatch {
            index,
            expected: "text",
        })?;
        self.machine.transition(InteractionEvent::OpenTextEditor)?;
        self.selection.select(SelectionTarget::Object(index));
        let overlay = mapper.to_screen_space(CanvasPoint::new(text.x, text.y - text.size));
        self.draft = Some(TextEditDraft::new(index, text.content.clone(), overlay));
        tracing::debug!(index, "text editor opened");
        Ok(InteractionOutcome::TextEditOpened(index))
    }

    /// Keeps the overlay glued to its glyph origin after the viewport changes.
    pub fn refresh_overlay(&mut self, scene: &Scene, mapper: &CoordinateMapper) {
        if let Some(draft) = self.draft.as_mut() {
            if let Some(text) = scene.text(draft.target()) {
                let origin = CanvasPoint::new(text.x, text.y - text.size);
                draft.set_overlay(mapper.to_screen_space(origin));
            }
        }
    }

    pub fn close_text_editor(
        &mut self,
        scene: &mut Scene,
        close: TextEditClose,
    ) -> InteractionResult<InteractionOutcome> {
        let Some(draft) = self.draft.take() else {
            return Ok(InteractionOutcome::Ignored);
        };
        let index = draft.target();
        if close.commits() {
            self.machine.transition(InteractionEvent::CommitText)?;
            if draft.is_modified() {
                let content = draft.content().to_string();
                scene.update_text(index, |text| text.with_content(content))?;
            }
            tracing::debug!(index, ?close, "text edit committed");
            Ok(InteractionOutcome::TextCommitted(index))
        } else {
            self.machine.transition(InteractionEvent::DiscardText)?;
            tracing::debug!(index, "text edit discarded");
            Ok(InteractionOutcome::TextDiscarded(index))
        }
    }

    pub fn blur_text_editor(&mut self, scene: &mut Scene) -> InteractionResult<InteractionOutcome> {
        self.close_text_editor(scene, TextEditClose::Blur)
    }

    /// Replaces the whole draft buffer, as an IME or paste would.
    pub fn set_draft_content(&mut self, content: &str) -> InteractionOutcome {
        match self.draft.as_mut() {
            Some(draft) => {
                draft.set_content(content);
                InteractionOutcome::TextEdited
            }
            None => InteractionOutcome::Ignored,
        }
    }

    pub fn key_press(
        &mut self,
        scene: &mut Scene,
        key: ShortcutKey,
        modifiers: ShortcutModifiers,
    ) -> InteractionResult<InteractionOutcome> {
        let context = InputContext {
            text_editing: self.draft.is_some(),
            has_selection: !self.selection.target().is_none(),
        };
        let Some(action) = resolve_shortcut(key, modifiers, context) else {
            return Ok(InteractionOutcome::Ignored);
        };

        match action {
            ShortcutAction::TextCommit => self.close_text_editor(scene, TextEditClose::Confirm),
            ShortcutAction::TextDiscard => self.close_text_editor(scene, TextEditClose::Cancel),
            ShortcutAction::EditorDeleteSelection => self.delete_selected(scene),
            ShortcutAction::EditorClearSelection => {
                self.selection.clear();
                Ok(InteractionOutcome::Deselected)
            }
            ShortcutAction::EditorExport => Ok(InteractionOutcome::ExportRequested),
            text_action => Ok(self.edit_draft(text_action)),
        }
    }

    fn edit_draft(&mut self, action: ShortcutAction) -> InteractionOutcome {
        let Some(draft) = self.draft.as_mut() else {
            return InteractionOutcome::Ignored;
        };
        let changed = match action {
            ShortcutAction::TextInsert(c) => {
                draft.insert_char(c);
                true
            }
            ShortcutAction::TextInsertLineBreak => {
                draft.insert_newline();
                true
            }
            ShortcutAction::TextDeleteBackward => draft.delete_backward(),
            ShortcutAction::TextDeleteForward => draft.delete_forward(),
            ShortcutAction::TextCursorLeft => draft.move_cursor_left(),
            ShortcutAction::TextCursorRight => draft.move_cursor_right(),
            ShortcutAction::TextCursorUp => draft.move_cursor_up(),
            ShortcutAction::TextCursorDown => draft.move_cursor_down(),
            _ => false,
        };
        if changed {
            InteractionOutcome::TextEdited
        } else {
            InteractionOutcome::Ignored
        }
    }

    /// Removes the selected object, or hides the avatar. Selection is always cleared.
    pub fn delete_selected(&mut self, scene: &mut Scene) -> InteractionResult<InteractionOutcome> {
        if self.machine.mode() == InteractionMode::EditingText {
            return Ok(InteractionOutcome::Ignored);
        }
        let target = self.selection.target();
        self.delete_target(scene, target)
    }

    fn delete_target(
        &mut self,
        scene: &mut Scene,
        target: SelectionTarget,
    ) -> InteractionResult<InteractionOutcome> {
        if target.is_none() {
            return Ok(InteractionOutcome::Ignored);
        }
        if self.gesture.is_some() {
            self.finish_gesture(InteractionEvent::PointerUp)?;
        }
        match target {
            SelectionTarget::None => return Ok(InteractionOutcome::Ignored),
            SelectionTarget::Object(index) => {
                let removed: SceneObject = scene.remove(index)?;
                tracing::info!(index, kind = removed.kind_label(), "scene object deleted");
            }
            SelectionTarget::Avatar => {
                scene.update_avatar(|avatar| avatar.with_visible(false))?;
                tracing::info!("profile avatar hidden");
            }
        }
        self.selection.clear();
        Ok(InteractionOutcome::Deleted(target))
    }

    /// Removes an object by index from outside a pointer gesture (e.g. a toolbar button).
    pub fn remove_object(
        &mut self,
        scene: &mut Scene,
        index: usize,
    ) -> InteractionResult<InteractionOutcome> {
        if self.editing_index() == Some(index) {
            self.close_text_editor(scene, TextEditClose::Cancel)?;
        }
        scene.remove(index)?;
        self.on_object_removed(index)?;
        Ok(InteractionOutcome::Deleted(SelectionTarget::Object(index)))
    }

    /// Shifts every stored index past `removed`; a gesture on the removed object ends.
    fn on_object_removed(&mut self, removed: usize) -> InteractionResult<()> {
        if let Some(gesture) = self.gesture {
            match gesture.target() {
                SelectionTarget::Object(index) if index == removed => {
                    self.finish_gesture(InteractionEvent::PointerUp)?;
                }
                SelectionTarget::Object(index) if index > removed => {
                    self.gesture = Some(gesture.retarget(SelectionTarget::Object(index - 1)));
                }
                _ => {}
            }
        }
        self.selection.on_object_removed(removed);
        if let Some(draft) = self.draft.as_mut() {
            if draft.target() > removed {
                draft.retarget(draft.target() - 1);
            }
        }
        Ok(())
    }

    pub fn select(&mut self, target: SelectionTarget) {
        self.selection.select(target);
    }
}
