//! Full-redraw scene renderer over cairo image surfaces.

mod filter;
mod raster;

use std::f64::consts::{FRAC_PI_2, PI};

use gtk4::cairo::{Context, Format, ImageSurface};
use thiserror::Error;

use crate::config::{DecorationPalette, EditorConfig};
use crate::editor::geometry::{
    handle_corners, layout_text_lines, select_cairo_font, triangle_vertices, TextMeasurer,
    DELETE_ICON_RADIUS, ROUNDED_CORNER_RADIUS,
};
use crate::editor::hit_test::{delete_icon_center, target_geometry, TargetGeometry};
use crate::editor::scene::{
    ImageFilters, ImageObject, ProfileAvatar, RasterHandle, Scene, SceneObject, TextObject,
};
use crate::editor::selection::SelectionTarget;
use crate::geometry::{Bounds, CanvasPoint, ClipShape, Color};

pub use filter::apply_filters;
pub use raster::{cairo_surface_to_rgba_image, rgba_image_to_cairo_surface, SurfaceCache};

const DECORATION_LINE_WIDTH: f64 = 2.0;
const TEXT_DECORATION_INSET: f64 = 2.0;
const DELETE_GLYPH_ARM: f64 = 5.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cairo operation failed: {0}")]
    Cairo(#[from] gtk4::cairo::Error),
    #[error("surface is still borrowed: {0}")]
    SurfaceBorrow(#[from] gtk4::cairo::BorrowError),
    #[error("scene size does not fit a drawing surface")]
    InvalidSize,
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Everything besides the scene that affects one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderView {
    pub selection: SelectionTarget,
    /// Text object whose glyphs the edit overlay currently replaces.
    pub editing: Option<usize>,
    pub suppress_decoration: bool,
}

impl RenderView {
    pub fn undecorated(self) -> Self {
        Self {
            suppress_decoration: true,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecorationStyle {
    pub palette: DecorationPalette,
    pub show_delete_icon: bool,
    pub handle_size: f64,
}

impl From<&EditorConfig> for DecorationStyle {
    fn from(config: &EditorConfig) -> Self {
        Self {
            palette: config.palette,
            show_delete_icon: config.show_delete_icon,
            handle_size: config.handle_size,
        }
    }
}

#[derive(Debug)]
pub struct Renderer {
    style: DecorationStyle,
    surfaces: SurfaceCache,
}

impl Renderer {
    pub fn new(style: DecorationStyle) -> Self {
        Self {
            style,
            surfaces: SurfaceCache::default(),
        }
    }

    pub fn style(&self) -> DecorationStyle {
        self.style
    }

    /// Redraws the whole scene. Nothing outside `context` is touched apart from the surface cache.
    pub fn render(
        &mut self,
        context: &Context,
        scene: &Scene,
        view: RenderView,
        measurer: &dyn TextMeasurer,
    ) -> RenderResult<()> {
        self.surfaces.retain_variants(&live_raster_variants(scene));

        paint_background(context, scene)?;
        if let Some(raster) = scene.background_image() {
            self.draw_background_image(context, scene, raster)?;
        }

        for (index, object) in scene.objects().iter().enumerate() {
            match object {
                SceneObject::Text(text) => {
                    if view.editing != Some(index) {
                        draw_text(context, text, measurer)?;
                    }
                }
                SceneObject::Image(image) => self.draw_image(context, image)?,
            }
        }

        if let Some(avatar) = scene.visible_avatar() {
            self.draw_avatar(context, avatar)?;
        }

        if !view.suppress_decoration {
            self.draw_decoration(context, scene, view, measurer)?;
        }
        Ok(())
    }

    /// Renders one frame at the scene's backing-store size.
    pub fn render_to_surface(
        &mut self,
        scene: &Scene,
        view: RenderView,
        measurer: &dyn TextMeasurer,
    ) -> RenderResult<ImageSurface> {
        let size = scene.size();
        let width = i32::try_from(size.width).map_err(|_| RenderError::InvalidSize)?;
        let height = i32::try_from(size.height).map_err(|_| RenderError::InvalidSize)?;
        let surface = ImageSurface::create(Format::ARgb32, width.max(1), height.max(1))?;
        {
            let context = Context::new(&surface)?;
            self.render(&context, scene, view, measurer)?;
        }
        surface.flush();
        Ok(surface)
    }

    fn draw_background_image(
        &mut self,
        context: &Context,
        scene: &Scene,
        raster: &RasterHandle,
    ) -> RenderResult<()> {
        let size = scene.size();
        let placement = contain_fit(
            f64::from(size.width),
            f64::from(size.height),
            f64::from(raster.width()),
            f64::from(raster.height()),
        );
        let filters = scene.background_filters();
        let sigma = source_blur_sigma(filters, raster, placement);
        let Some(surface) = self.surfaces.filtered_surface_for(raster, filters, sigma) else {
            tracing::warn!(raster = raster.id(), "background raster could not be converted");
            return Ok(());
        };
        context.save()?;
        context.rectangle(placement.x, placement.y, placement.width, placement.height);
        context.clip();
        paint_surface_into(context, &surface, placement, raster)?;
        context.restore()?;
        Ok(())
    }

    fn draw_image(&mut self, context: &Context, image: &ImageObject) -> RenderResult<()> {
        self.draw_clipped_raster(
            context,
            &image.raster,
            image.bounds(),
            image.shape,
            image.filters,
        )
    }

    fn draw_avatar(&mut self, context: &Context, avatar: &ProfileAvatar) -> RenderResult<()> {
        self.draw_clipped_raster(
            context,
            &avatar.raster,
            avatar.bounds(),
            avatar.shape,
            ImageFilters::default(),
        )
    }

    /// Clips to the shape path, then stretches the raster to fill the bounds exactly.
    fn draw_clipped_raster(
        &mut self,
        context: &Context,
        raster: &RasterHandle,
        bounds: Bounds,
        shape: ClipShape,
        filters: ImageFilters,
    ) -> RenderResult<()> {
        if bounds.width <= 0.0 || bounds.height <= 0.0 {
            return Ok(());
        }
        let sigma = source_blur_sigma(filters, raster, bounds);
        let Some(surface) = self.surfaces.filtered_surface_for(raster, filters, sigma) else {
            tracing::warn!(raster = raster.id(), "raster could not be converted to a surface");
            return Ok(());
        };
        context.save()?;
        append_shape_path(context, shape, bounds);
        context.clip();
        paint_surface_into(context, &surface, bounds, raster)?;
        context.restore()?;
        Ok(())
    }

    fn draw_decoration(
        &self,
        context: &Context,
        scene: &Scene,
        view: RenderView,
        measurer: &dyn TextMeasurer,
    ) -> RenderResult<()> {
        if view.editing.is_some() && view.editing == view.selection.object_index() {
            return Ok(());
        }
        let Some(geometry) = target_geometry(scene, view.selection, measurer) else {
            return Ok(());
        };

        let color = if geometry.is_text {
            self.style.palette.text
        } else {
            self.style.palette.image
        };
        context.save()?;
        set_source_color(context, color);
        context.set_line_width(DECORATION_LINE_WIDTH);
        if geometry.is_text {
            let frame = geometry.bounds.inflate(TEXT_DECORATION_INSET);
            context.rectangle(frame.x, frame.y, frame.width, frame.height);
        } else {
            append_shape_path(context, geometry.shape, geometry.bounds);
        }
        context.stroke()?;
        context.restore()?;

        draw_resize_handles(context, geometry.bounds, self.style.handle_size, color)?;
        if self.style.show_delete_icon {
            draw_delete_glyph(context, &geometry, self.style.palette)?;
        }
        Ok(())
    }
}

fn live_raster_variants(scene: &Scene) -> Vec<(u64, ImageFilters)> {
    let objects = scene
        .objects()
        .iter()
        .filter_map(SceneObject::as_image)
        .map(|image| (image.raster.id(), image.filters));
    let avatar = scene
        .avatar()
        .map(|avatar| (avatar.raster.id(), ImageFilters::default()));
    let background = scene
        .background_image()
        .map(|raster| (raster.id(), scene.background_filters()));
    objects.chain(avatar).chain(background).collect()
}

/// Blur is given in canvas pixels; the raster is blurred before scaling, so convert.
fn source_blur_sigma(filters: ImageFilters, raster: &RasterHandle, target: Bounds) -> f64 {
    if filters.blur <= 0.0 || target.width <= 0.0 {
        return 0.0;
    }
    filters.blur * f64::from(raster.width().max(1)) / target.width
}

fn paint_background(context: &Context, scene: &Scene) -> RenderResult<()> {
    set_source_color(context, scene.background());
    context.paint()?;
    Ok(())
}

fn set_source_color(context: &Context, color: Color) {
    let (red, green, blue) = color.to_cairo_rgb();
    context.set_source_rgb(red, green, blue);
}

fn paint_surface_into(
    context: &Context,
    surface: &ImageSurface,
    target: Bounds,
    raster: &RasterHandle,
) -> RenderResult<()> {
    let source_width = f64::from(raster.width().max(1));
    let source_height = f64::from(raster.height().max(1));
    context.translate(target.x, target.y);
    context.scale(target.width / source_width, target.height / source_height);
    context.set_source_surface(surface, 0.0, 0.0)?;
    context.paint()?;
    Ok(())
}

/// Largest centered placement of an image inside the canvas that keeps its aspect ratio.
pub fn contain_fit(canvas_width: f64, canvas_height: f64, width: f64, height: f64) -> Bounds {
    if width <= 0.0 || height <= 0.0 {
        return Bounds::new(0.0, 0.0, 0.0, 0.0);
    }
    let scale = (canvas_width / width).min(canvas_height / height);
    let fitted_width = width * scale;
    let fitted_height = height * scale;
    Bounds::new(
        (canvas_width - fitted_width) / 2.0,
        (canvas_height - fitted_height) / 2.0,
        fitted_width,
        fitted_height,
    )
}

/// Lines of a text object with the baseline each is drawn on.
pub fn text_lines_for_render(
    text: &TextObject,
    measurer: &dyn TextMeasurer,
) -> Vec<(String, CanvasPoint)> {
    let font = text.font();
    let line_height = font.line_height();
    layout_text_lines(&text.content, &font, text.max_width, measurer)
        .into_iter()
        .enumerate()
        .map(|(index, line)| {
            let baseline = CanvasPoint::new(text.x, text.y + index as f64 * line_height);
            (line, baseline)
        })
        .collect()
}

fn draw_text(
    context: &Context,
    text: &TextObject,
    measurer: &dyn TextMeasurer,
) -> RenderResult<()> {
    context.save()?;
    select_cairo_font(context, &text.font());
    set_source_color(context, text.color);
    for (line, baseline) in text_lines_for_render(text, measurer) {
        if line.is_empty() {
            continue;
        }
        context.move_to(baseline.x, baseline.y);
        context.show_text(&line)?;
    }
    context.restore()?;
    Ok(())
}

pub fn append_shape_path(context: &Context, shape: ClipShape, bounds: Bounds) {
    match shape {
        ClipShape::Rectangle => context.rectangle(bounds.x, bounds.y, bounds.width, bounds.height),
        ClipShape::Circle => {
            let center = bounds.center();
            let radius = bounds.width.min(bounds.height) / 2.0;
            context.new_sub_path();
            context.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
            context.close_path();
        }
        ClipShape::Rounded => append_rounded_rectangle_path(context, bounds, ROUNDED_CORNER_RADIUS),
        ClipShape::Triangle => {
            let [top, bottom_right, bottom_left] = triangle_vertices(bounds);
            context.new_sub_path();
            context.move_to(top.x, top.y);
            context.line_to(bottom_right.x, bottom_right.y);
            context.line_to(bottom_left.x, bottom_left.y);
            context.close_path();
        }
    }
}

fn append_rounded_rectangle_path(context: &Context, bounds: Bounds, corner_radius: f64) {
    if bounds.width <= 0.0 || bounds.height <= 0.0 {
        return;
    }
    let radius = corner_radius.clamp(0.0, bounds.width.min(bounds.height) / 2.0);
    if radius <= 0.0 {
        context.rectangle(bounds.x, bounds.y, bounds.width, bounds.height);
        return;
    }

    let (x, y) = (bounds.x, bounds.y);
    let (right, bottom) = (bounds.right(), bounds.bottom());
    context.new_sub_path();
    context.arc(right - radius, y + radius, radius, -FRAC_PI_2, 0.0);
    context.arc(right - radius, bottom - radius, radius, 0.0, FRAC_PI_2);
    context.arc(x + radius, bottom - radius, radius, FRAC_PI_2, PI);
    context.arc(x + radius, y + radius, radius, PI, 3.0 * FRAC_PI_2);
    context.close_path();
}

fn draw_resize_handles(
    context: &Context,
    bounds: Bounds,
    handle_size: f64,
    color: Color,
) -> RenderResult<()> {
    let half = handle_size / 2.0;
    context.save()?;
    set_source_color(context, color);
    for (_, corner) in handle_corners(bounds) {
        context.rectangle(corner.x - half, corner.y - half, handle_size, handle_size);
    }
    context.fill()?;
    context.restore()?;
    Ok(())
}

fn draw_delete_glyph(
    context: &Context,
    geometry: &TargetGeometry,
    palette: DecorationPalette,
) -> RenderResult<()> {
    let center = delete_icon_center(geometry);
    context.save()?;
    context.new_sub_path();
    context.arc(center.x, center.y, DELETE_ICON_RADIUS, 0.0, 2.0 * PI);
    set_source_color(context, palette.delete_fill);
    context.fill_preserve()?;
    set_source_color(context, palette.delete_glyph);
    context.set_line_width(DECORATION_LINE_WIDTH);
    context.stroke()?;

    context.move_to(center.x - DELETE_GLYPH_ARM, center.y - DELETE_GLYPH_ARM);
    context.line_to(center.x + DELETE_GLYPH_ARM, center.y + DELETE_GLYPH_ARM);
    context.move_to(center.x + DELETE_GLYPH_ARM, center.y - DELETE_GLYPH_ARM);
    context.line_to(center.x - DELETE_GLYPH_ARM, center.y + DELETE_GLYPH_ARM);
    context.stroke()?;
    context.restore()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorVariant;
    use crate::editor::geometry::tests::FixedAdvanceMeasurer;
    use crate::editor::scene::{create_image, create_text};
    use crate::geometry::SceneSize;
    use image::{Rgba, RgbaImage};

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RasterHandle {
        RasterHandle::new(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    fn renderer(variant: EditorVariant) -> Renderer {
        Renderer::new(DecorationStyle::from(&EditorConfig::for_variant(variant)))
    }

    fn frame(renderer: &mut Renderer, scene: &Scene, view: RenderView) -> RgbaImage {
        let surface = renderer
            .render_to_surface(scene, view, &FixedAdvanceMeasurer)
            .expect("render");
        cairo_surface_to_rgba_image(surface).expect("read back")
    }

    #[test]
    fn multi_line_text_baselines_advance_by_line_height() {
        let text =
            create_text(CanvasPoint::new(100.0, 100.0), "Arial").with_content("Hello\nWorld");
        let lines = text_lines_for_render(&text, &FixedAdvanceMeasurer);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].0, "Hello");
        assert_eq!(lines[1].0, "World");
        assert!((lines[1].1.y - 148.0).abs() < 1e-9);
    }

    #[test]
    fn max_width_wraps_rendered_lines() {
        let text = create_text(CanvasPoint::new(0.0, 40.0), "Arial")
            .with_content("one two three")
            .with_max_width(Some(150.0));
        let lines = text_lines_for_render(&text, &FixedAdvanceMeasurer);
        let contents = lines.into_iter().map(|(line, _)| line).collect::<Vec<_>>();
        assert_eq!(contents, vec!["one two", "three"]);
    }

    #[test]
    fn contain_fit_centers_wide_images() {
        let placement = contain_fit(100.0, 100.0, 200.0, 100.0);
        assert_eq!(placement, Bounds::new(0.0, 25.0, 100.0, 50.0));
    }

    #[test]
    fn rendering_identical_state_twice_is_pixel_identical() {
        let mut scene = Scene::new(SceneSize::new(120, 120));
        scene.push(create_image(solid(4, 4, [10, 200, 30, 255]), CanvasPoint::new(10.0, 10.0)));
        scene.push(create_text(CanvasPoint::new(5.0, 60.0), "Arial"));
        let view = RenderView {
            selection: SelectionTarget::Object(0),
            ..RenderView::default()
        };
        let mut renderer = renderer(EditorVariant::SingleTemplate);

        let first = frame(&mut renderer, &scene, view);
        let second = frame(&mut renderer, &scene, view);
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn background_image_is_letterboxed_over_fill() {
        let mut scene = Scene::new(SceneSize::new(100, 100));
        scene.set_background_image(Some(solid(2, 1, [255, 0, 0, 255])));
        let image = frame(&mut renderer(EditorVariant::Poster), &scene, RenderView::default());

        assert_eq!(image.get_pixel(50, 10), &Rgba([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(50, 50), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn circle_images_are_clipped_to_inscribed_circle() {
        let mut scene = Scene::new(SceneSize::new(100, 100));
        scene.push(
            create_image(solid(4, 4, [0, 0, 255, 255]), CanvasPoint::new(0.0, 0.0))
                .with_bounds(Bounds::new(0.0, 0.0, 100.0, 100.0))
                .with_shape(ClipShape::Circle),
        );
        let image = frame(&mut renderer(EditorVariant::Poster), &scene, RenderView::default());

        assert_eq!(image.get_pixel(3, 3), &Rgba([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(50, 50), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn selection_decoration_draws_handles_unless_suppressed() {
        let mut scene = Scene::new(SceneSize::new(200, 200));
        scene.push(create_image(solid(4, 4, [0, 0, 0, 255]), CanvasPoint::new(50.0, 50.0)));
        let view = RenderView {
            selection: SelectionTarget::Object(0),
            ..RenderView::default()
        };
        let mut renderer = renderer(EditorVariant::Poster);

        let decorated = frame(&mut renderer, &scene, view);
        let clean = frame(&mut renderer, &scene, view.undecorated());

        assert_eq!(decorated.get_pixel(47, 47), &Rgba([0x3b, 0x82, 0xf6, 255]));
        assert_eq!(clean.get_pixel(47, 47), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn text_being_edited_is_not_drawn_or_decorated() {
        let mut scene = Scene::new(SceneSize::new(200, 100));
        let empty = frame(&mut renderer(EditorVariant::Poster), &scene, RenderView::default());

        scene.push(create_text(CanvasPoint::new(10.0, 60.0), "Arial"));
        let view = RenderView {
            selection: SelectionTarget::Object(0),
            editing: Some(0),
            suppress_decoration: false,
        };
        let editing = frame(&mut renderer(EditorVariant::Poster), &scene, view);

        assert_eq!(editing.as_raw(), empty.as_raw());
    }

    #[test]
    fn hidden_avatar_is_not_drawn() {
        let mut scene = Scene::new(SceneSize::new(200, 200));
        scene.set_avatar_raster(solid(2, 2, [255, 0, 0, 255]));
        let visible = frame(&mut renderer(EditorVariant::Poster), &scene, RenderView::default());
        assert_eq!(visible.get_pixel(130, 70), &Rgba([255, 0, 0, 255]));

        scene
            .update_avatar(|avatar| avatar.with_visible(false))
            .expect("avatar exists");
        let hidden = frame(&mut renderer(EditorVariant::Poster), &scene, RenderView::default());
        assert_eq!(hidden.get_pixel(130, 70), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn image_filters_apply_to_the_drawn_object_only() {
        let mut scene = Scene::new(SceneSize::new(400, 200));
        let dimmed = ImageFilters {
            brightness: 50.0,
            ..ImageFilters::default()
        };
        scene.push(
            create_image(solid(4, 4, [200, 100, 40, 255]), CanvasPoint::new(0.0, 0.0))
                .with_filters(dimmed),
        );
        scene.push(create_image(
            solid(4, 4, [200, 100, 40, 255]),
            CanvasPoint::new(200.0, 0.0),
        ));

        let image = frame(&mut renderer(EditorVariant::Poster), &scene, RenderView::default());

        assert_eq!(image.get_pixel(100, 100), &Rgba([100, 50, 20, 255]));
        assert_eq!(image.get_pixel(300, 100), &Rgba([200, 100, 40, 255]));
    }

    #[test]
    fn background_filters_gray_out_the_background_image() {
        let mut scene = Scene::new(SceneSize::new(100, 100));
        scene.set_background_image(Some(solid(10, 10, [255, 0, 0, 255])));
        scene.set_background_filters(ImageFilters {
            grayscale: 100.0,
            ..ImageFilters::default()
        });
        let mut renderer = renderer(EditorVariant::Poster);

        let gray = frame(&mut renderer, &scene, RenderView::default());
        let Rgba([r, g, b, _]) = *gray.get_pixel(50, 50);
        assert!(r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1, "{r} {g} {b}");

        scene.set_background_filters(ImageFilters::default());
        let plain = frame(&mut renderer, &scene, RenderView::default());
        assert_eq!(plain.get_pixel(50, 50), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn blur_is_measured_in_canvas_pixels() {
        let raster = solid(10, 10, [0, 0, 0, 255]);
        let filters = ImageFilters {
            blur: 4.0,
            ..ImageFilters::default()
        };
        let sigma = source_blur_sigma(filters, &raster, Bounds::new(0.0, 0.0, 40.0, 40.0));
        assert_eq!(sigma, 1.0);
        assert_eq!(
            source_blur_sigma(ImageFilters::default(), &raster, Bounds::new(0.0, 0.0, 40.0, 40.0)),
            0.0
        );
    }
}
