//! Editor shell session: one scene plus everything that reads or mutates it.

mod properties;

use std::time::Duration;

use crate::config::EditorConfig;
use crate::decode::{DecodeApplied, DecodeQueue, DecodeSource, DecodeTarget};
use crate::editor::geometry::{CairoTextMeasurer, TextMeasurer};
use crate::editor::scene::{create_text, Scene, SceneError};
use crate::editor::{
    CoordinateMapper, InteractionController, InteractionOutcome, InteractionSettings, PointerInput,
    SelectionTarget, TextEditClose,
};
use crate::export::{
    export_bitmap, share_or_download, EncodedBitmap, ExportDelivery, ExportFormat, ShareTarget,
};
use crate::geometry::{CanvasPoint, ClipShape, SceneSize};
use crate::input::{ShortcutKey, ShortcutModifiers};
use crate::render::{RenderView, Renderer};
use crate::seed::{fetch_records, seed_scene, RecordSource, SeedPlan, SeedRecords};
use crate::state::InteractionMode;
use crate::storage::DownloadSink;
use crate::{AppError, AppResult};

const NEW_TEXT_AT: CanvasPoint = CanvasPoint::new(100.0, 100.0);
const NEW_IMAGE_AT: CanvasPoint = CanvasPoint::new(150.0, 150.0);

pub struct EditorSession {
    config: EditorConfig,
    scene: Scene,
    controller: InteractionController,
    mapper: CoordinateMapper,
    renderer: Renderer,
    decoder: DecodeQueue,
    measurer: Box<dyn TextMeasurer>,
    new_image_shape: ClipShape,
}

impl EditorSession {
    pub fn new(config: EditorConfig, size: SceneSize) -> Self {
        Self::with_measurer(config, size, Box::new(CairoTextMeasurer::new()))
    }

    pub fn with_measurer(
        config: EditorConfig,
        size: SceneSize,
        measurer: Box<dyn TextMeasurer>,
    ) -> Self {
        tracing::info!(
            variant = ?config.variant,
            width = size.width,
            height = size.height,
            "editor session created"
        );
        Self {
            controller: InteractionController::new(InteractionSettings::from(&config)),
            mapper: CoordinateMapper::new(size, config.max_display_width),
            renderer: Renderer::new((&config).into()),
            scene: Scene::new(size),
            decoder: DecodeQueue::new(),
            measurer,
            new_image_shape: ClipShape::default(),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn mode(&self) -> InteractionMode {
        self.controller.mode()
    }

    pub fn selection(&self) -> SelectionTarget {
        self.controller.selection().target()
    }

    /// Switches between the desktop and compact display widths.
    pub fn set_compact_viewport(&mut self, compact: bool) {
        self.set_display_width(self.config.display_width(compact));
    }

    pub fn set_display_width(&mut self, max_display_width: f64) {
        self.mapper.set_viewport(max_display_width);
        self.controller.refresh_overlay(&self.scene, &self.mapper);
    }

    pub fn set_display_origin(&mut self, x: f64, y: f64) {
        self.mapper.set_display_origin(x, y);
        self.controller.refresh_overlay(&self.scene, &self.mapper);
    }

    pub fn render_view(&self) -> RenderView {
        RenderView {
            selection: self.selection(),
            editing: self.controller.editing_index(),
            suppress_decoration: false,
        }
    }

    pub fn pointer_down(&mut self, input: &PointerInput) -> AppResult<InteractionOutcome> {
        let Some(point) = self.mapper.to_canvas_space(input) else {
            return Ok(InteractionOutcome::Ignored);
        };
        Ok(self
            .controller
            .pointer_down(&mut self.scene, point, self.measurer.as_ref())?)
    }

    pub fn pointer_move(&mut self, input: &PointerInput) -> AppResult<InteractionOutcome> {
        let Some(point) = self.mapper.to_canvas_space(input) else {
            return Ok(InteractionOutcome::Ignored);
        };
        Ok(self.controller.pointer_move(&mut self.scene, point)?)
    }

    pub fn pointer_up(&mut self) -> AppResult<InteractionOutcome> {
        Ok(self.controller.pointer_up()?)
    }

    pub fn pointer_leave(&mut self) -> AppResult<InteractionOutcome> {
        Ok(self.controller.pointer_leave()?)
    }

    pub fn double_click(&mut self, input: &PointerInput) -> AppResult<InteractionOutcome> {
        let Some(point) = self.mapper.to_canvas_space(input) else {
            return Ok(InteractionOutcome::Ignored);
        };
        Ok(self.controller.double_click(
            &mut self.scene,
            point,
            &self.mapper,
            self.measurer.as_ref(),
        )?)
    }

    /// Touch release; `timestamp` comes from the event source's monotonic clock.
    ///
    /// Release events usually carry no contact, so a missing point still counts as a tap.
    pub fn touch_end(
        &mut self,
        input: &PointerInput,
        timestamp: Duration,
    ) -> AppResult<InteractionOutcome> {
        let point = self.mapper.to_canvas_space(input);
        Ok(self.controller.touch_release(
            &mut self.scene,
            point,
            timestamp,
            &self.mapper,
            self.measurer.as_ref(),
        )?)
    }

    pub fn key_press(
        &mut self,
        key: ShortcutKey,
        modifiers: ShortcutModifiers,
    ) -> AppResult<InteractionOutcome> {
        Ok(self.controller.key_press(&mut self.scene, key, modifiers)?)
    }

    pub fn set_draft_content(&mut self, content: &str) -> InteractionOutcome {
        self.controller.set_draft_content(content)
    }

    pub fn close_text_editor(&mut self, close: TextEditClose) -> AppResult<InteractionOutcome> {
        Ok(self.controller.close_text_editor(&mut self.scene, close)?)
    }

    pub fn delete_selected(&mut self) -> AppResult<InteractionOutcome> {
        Ok(self.controller.delete_selected(&mut self.scene)?)
    }

    pub fn remove_object(&mut self, index: usize) -> AppResult<InteractionOutcome> {
        Ok(self.controller.remove_object(&mut self.scene, index)?)
    }

    /// Blurs an open text editor, as clicking any toolbar control would.
    fn settle_text_editor(&mut self) -> AppResult<()> {
        if self.controller.draft().is_some() {
            self.controller.blur_text_editor(&mut self.scene)?;
        }
        Ok(())
    }

    pub fn add_text(&mut self) -> AppResult<usize> {
        if !self.config.enabled.text {
            return Err(SceneError::KindDisabled { kind: "text" }.into());
        }
        self.settle_text_editor()?;
        let index = self
            .scene
            .push(create_text(NEW_TEXT_AT, self.config.default_font.as_str()));
        self.controller.select(SelectionTarget::Object(index));
        Ok(index)
    }

    pub fn new_image_shape(&self) -> ClipShape {
        self.new_image_shape
    }

    pub fn set_new_image_shape(&mut self, shape: ClipShape) {
        self.new_image_shape = shape;
    }

    /// Queues an upload; the image object appears once decoding completes.
    pub fn request_image(&mut self, source: DecodeSource) -> AppResult<u64> {
        if !self.config.enabled.image {
            return Err(SceneError::KindDisabled { kind: "image" }.into());
        }
        let target = DecodeTarget::Image {
            at: NEW_IMAGE_AT,
            shape: self.new_image_shape,
        };
        Ok(self.decoder.request(source, target))
    }

    pub fn request_background(&mut self, source: DecodeSource) -> u64 {
        self.decoder.request(source, DecodeTarget::Background)
    }

    pub fn request_avatar(&mut self, source: DecodeSource) -> AppResult<u64> {
        if !self.config.enabled.avatar {
            return Err(SceneError::KindDisabled { kind: "avatar" }.into());
        }
        Ok(self.decoder.request(source, DecodeTarget::Avatar))
    }

    pub fn pending_decodes(&self) -> usize {
        self.decoder.pending()
    }

    /// Applies finished decodes; a newly added image becomes the selection.
    pub fn poll_decodes(&mut self) -> Vec<DecodeApplied> {
        let applied = self.decoder.drain(&mut self.scene);
        self.select_added_image(&applied);
        applied
    }

    pub fn wait_for_decodes(&mut self, timeout: Duration) -> Vec<DecodeApplied> {
        let applied = self.decoder.wait_all(&mut self.scene, timeout);
        self.select_added_image(&applied);
        applied
    }

    fn select_added_image(&mut self, applied: &[DecodeApplied]) {
        let added = applied.iter().rev().find_map(|outcome| match outcome {
            DecodeApplied::ImageAdded(index) => Some(*index),
            _ => None,
        });
        if let Some(index) = added {
            if self.controller.mode() == InteractionMode::Idle {
                self.controller.select(SelectionTarget::Object(index));
            }
        }
    }

    /// Pre-fills the scene from records; fetch and image failures only log.
    pub fn seed_from(
        &mut self,
        source: &dyn RecordSource,
        template_id: Option<&str>,
        profile_id: Option<&str>,
    ) -> SeedPlan {
        let (template, profile) = fetch_records(source, template_id, profile_id);
        let records = SeedRecords {
            template: template.as_ref(),
            profile: profile.as_ref(),
        };
        let plan = seed_scene(&mut self.scene, records, &self.config.default_font);

        if let Some(url) = plan.background_url.as_deref() {
            match source.image_bytes(url) {
                Ok(bytes) => {
                    self.request_background(DecodeSource::Bytes(bytes));
                }
                Err(err) => tracing::warn!(url, %err, "background fetch failed"),
            }
        }
        if let Some(url) = plan.avatar_url.as_deref().filter(|_| self.config.enabled.avatar) {
            match source.image_bytes(url) {
                Ok(bytes) => {
                    self.decoder
                        .request(DecodeSource::Bytes(bytes), DecodeTarget::Avatar);
                }
                Err(err) => tracing::warn!(url, %err, "avatar fetch failed"),
            }
        }
        plan
    }

    pub fn render(&mut self, context: &gtk4::cairo::Context) -> AppResult<()> {
        let view = self.render_view();
        self.renderer
            .render(context, &self.scene, view, self.measurer.as_ref())?;
        Ok(())
    }

    pub fn render_frame(&mut self) -> AppResult<gtk4::cairo::ImageSurface> {
        let view = self.render_view();
        Ok(self
            .renderer
            .render_to_surface(&self.scene, view, self.measurer.as_ref())?)
    }

    pub fn export(&mut self, format: ExportFormat) -> AppResult<EncodedBitmap> {
        self.settle_text_editor()?;
        let view = self.render_view();
        Ok(export_bitmap(
            &mut self.renderer,
            &self.scene,
            view,
            self.measurer.as_ref(),
            format,
        )?)
    }

    pub fn share_or_download(
        &mut self,
        format: ExportFormat,
        share: Option<&dyn ShareTarget>,
        downloads: &dyn DownloadSink,
    ) -> AppResult<ExportDelivery> {
        let bitmap = self.export(format)?;
        share_or_download(&bitmap, &self.config.export_file_stem, share, downloads)
            .map_err(AppError::from)
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("variant", &self.config.variant)
            .field("objects", &self.scene.len())
            .field("mode", &self.controller.mode())
            .field("pending_decodes", &self.decoder.pending())
            .finish()
    }
}
