use super::EditorSession;
use crate::editor::scene::{ImageFilters, TextObject};
use crate::editor::{InteractionOutcome, SelectionTarget};
use crate::geometry::{Bounds, CanvasPoint, ClipShape, Color};
use crate::AppResult;

const MIN_EDIT_SIZE: f64 = 1.0;

impl EditorSession {
    /// Content of the text being edited goes to the draft; other texts are replaced directly.
    pub fn set_text_content(&mut self, index: usize, content: &str) -> AppResult<()> {
        if self.controller.editing_index() == Some(index) {
            self.controller.set_draft_content(content);
            return Ok(());
        }
        self.edit_text(index, |text| text.with_content(content))
    }

    pub fn set_text_family(&mut self, index: usize, family: &str) -> AppResult<()> {
        self.edit_text(index, |text| text.with_family(family))
    }

    pub fn set_text_size(&mut self, index: usize, size: f64) -> AppResult<()> {
        self.edit_text(index, |text| text.with_size(size.max(MIN_EDIT_SIZE)))
    }

    pub fn set_text_color(&mut self, index: usize, color: Color) -> AppResult<()> {
        self.edit_text(index, |text| text.with_color(color))
    }

    pub fn set_text_style(&mut self, index: usize, bold: bool, italic: bool) -> AppResult<()> {
        self.edit_text(index, |text| text.with_style(bold, italic))
    }

    /// `None` disables wrapping.
    pub fn set_text_max_width(&mut self, index: usize, max_width: Option<f64>) -> AppResult<()> {
        let max_width = max_width.filter(|width| *width > 0.0);
        self.edit_text(index, |text| text.with_max_width(max_width))
    }

    fn edit_text(
        &mut self,
        index: usize,
        next: impl FnOnce(TextObject) -> TextObject,
    ) -> AppResult<()> {
        self.scene.update_text(index, next)?;
        self.controller.refresh_overlay(&self.scene, &self.mapper);
        tracing::debug!(index, "text properties edited");
        Ok(())
    }

    /// Moves an object's anchor: top-left for images, first baseline for text.
    pub fn set_object_position(&mut self, index: usize, at: CanvasPoint) -> AppResult<()> {
        self.scene.update(index, |object| object.with_position(at))?;
        self.controller.refresh_overlay(&self.scene, &self.mapper);
        Ok(())
    }

    pub fn set_image_shape(&mut self, index: usize, shape: ClipShape) -> AppResult<()> {
        self.scene
            .update_image(index, |image| image.with_shape(shape))?;
        Ok(())
    }

    pub fn set_image_filters(&mut self, index: usize, filters: ImageFilters) -> AppResult<()> {
        self.scene
            .update_image(index, |image| image.with_filters(filters))?;
        Ok(())
    }

    /// Keeps the top-left corner in place.
    pub fn set_image_size(&mut self, index: usize, width: f64, height: f64) -> AppResult<()> {
        self.scene.update_image(index, |image| {
            let bounds = Bounds::new(
                image.x,
                image.y,
                width.max(MIN_EDIT_SIZE),
                height.max(MIN_EDIT_SIZE),
            );
            image.with_bounds(bounds)
        })?;
        Ok(())
    }

    /// Hiding the avatar also drops it from the selection.
    pub fn set_avatar_visible(&mut self, visible: bool) -> AppResult<InteractionOutcome> {
        self.scene
            .update_avatar(|avatar| avatar.with_visible(visible))?;
        if !visible && self.selection() == SelectionTarget::Avatar {
            self.controller.select(SelectionTarget::None);
            return Ok(InteractionOutcome::Deselected);
        }
        Ok(InteractionOutcome::Ignored)
    }

    pub fn set_avatar_shape(&mut self, shape: ClipShape) -> AppResult<()> {
        self.scene.update_avatar(|avatar| avatar.with_shape(shape))?;
        Ok(())
    }

    pub fn set_avatar_size(&mut self, width: f64, height: f64) -> AppResult<()> {
        self.scene.update_avatar(|avatar| {
            let bounds = Bounds::new(
                avatar.x,
                avatar.y,
                width.max(MIN_EDIT_SIZE),
                height.max(MIN_EDIT_SIZE),
            );
            avatar.with_bounds(bounds)
        })?;
        Ok(())
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.scene.set_background(color);
    }

    pub fn set_background_filters(&mut self, filters: ImageFilters) {
        self.scene.set_background_filters(filters);
    }
}
