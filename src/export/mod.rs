//! Decoration-free export: render, encode, then share or download.

use std::io::Cursor;
use std::path::PathBuf;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use thiserror::Error;

use crate::editor::geometry::TextMeasurer;
use crate::editor::scene::Scene;
use crate::render::{cairo_surface_to_rgba_image, RenderError, RenderView, Renderer};
use crate::storage::{DownloadSink, StorageError};

pub const JPEG_QUALITY: u8 = 90;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to render export frame: {0}")]
    Render(#[from] RenderError),
    #[error("failed to encode {format:?} bitmap: {source}")]
    Encode {
        format: ExportFormat,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to store export: {0}")]
    Storage(#[from] StorageError),
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("no share target is available")]
    Unavailable,
    #[error("share target rejected the bitmap: {0}")]
    Rejected(String),
    #[error("share io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ShareResult<T> = std::result::Result<T, ShareError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    pub fn file_name(self, stem: &str) -> String {
        format!("{stem}.{}", self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBitmap {
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl EncodedBitmap {
    pub fn file_name(&self, stem: &str) -> String {
        self.format.file_name(stem)
    }
}

/// Native share capability for an encoded bitmap.
pub trait ShareTarget {
    fn is_available(&self) -> bool;
    fn share(&self, file_name: &str, bitmap: &EncodedBitmap) -> ShareResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportDelivery {
    Shared { file_name: String },
    Downloaded { path: PathBuf },
}

/// Renders with decoration suppressed and encodes the frame.
///
/// The caller's view is taken by value, so the live view keeps its decoration
/// once the export pass returns.
pub fn export_bitmap(
    renderer: &mut Renderer,
    scene: &Scene,
    view: RenderView,
    measurer: &dyn TextMeasurer,
    format: ExportFormat,
) -> ExportResult<EncodedBitmap> {
    let surface = renderer.render_to_surface(scene, view.undecorated(), measurer)?;
    let frame = cairo_surface_to_rgba_image(surface)?;
    let bitmap = encode_frame(&frame, format)?;
    tracing::info!(
        ?format,
        width = bitmap.width,
        height = bitmap.height,
        bytes = bitmap.bytes.len(),
        "scene exported"
    );
    Ok(bitmap)
}

pub fn encode_frame(frame: &RgbaImage, format: ExportFormat) -> ExportResult<EncodedBitmap> {
    let (width, height) = frame.dimensions();
    let mut buffer = Cursor::new(Vec::new());
    let encoded = match format {
        ExportFormat::Png => PngEncoder::new(&mut buffer).write_image(
            frame.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        ExportFormat::Jpeg => {
            let rgb = flatten_onto_white(frame);
            JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY).write_image(
                &rgb,
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
    };
    encoded.map_err(|source| ExportError::Encode { format, source })?;

    Ok(EncodedBitmap {
        format,
        width,
        height,
        bytes: buffer.into_inner(),
    })
}

fn flatten_onto_white(frame: &RgbaImage) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(frame.as_raw().len() / 4 * 3);
    for pixel in frame.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u16::from(a);
        let inverse = 255 - alpha;
        for channel in [r, g, b] {
            rgb.push(((u16::from(channel) * alpha + 255 * inverse + 127) / 255) as u8);
        }
    }
    rgb
}

/// Hands the bitmap to the share target when one is usable, otherwise downloads it.
pub fn share_or_download(
    bitmap: &EncodedBitmap,
    file_stem: &str,
    share: Option<&dyn ShareTarget>,
    downloads: &dyn DownloadSink,
) -> ExportResult<ExportDelivery> {
    let file_name = bitmap.file_name(file_stem);
    match share.filter(|target| target.is_available()) {
        Some(target) => match target.share(&file_name, bitmap) {
            Ok(()) => {
                tracing::info!(file_name, "export shared");
                return Ok(ExportDelivery::Shared { file_name });
            }
            Err(err) => {
                tracing::warn!(?err, file_name, "share failed; falling back to download");
            }
        },
        None => tracing::debug!("no share target available; downloading"),
    }
    download(bitmap, file_stem, downloads)
}

pub fn download(
    bitmap: &EncodedBitmap,
    file_stem: &str,
    downloads: &dyn DownloadSink,
) -> ExportResult<ExportDelivery> {
    let path = downloads.save_download(&bitmap.file_name(file_stem), &bitmap.bytes)?;
    Ok(ExportDelivery::Downloaded { path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EditorConfig, EditorVariant};
    use crate::editor::geometry::tests::FixedAdvanceMeasurer;
    use crate::editor::scene::{create_image, RasterHandle};
    use crate::editor::selection::SelectionTarget;
    use crate::geometry::{CanvasPoint, SceneSize};
    use crate::render::DecorationStyle;
    use image::Rgba;
    use std::cell::RefCell;

    fn selected_image_scene() -> (Scene, RenderView) {
        let mut scene = Scene::new(SceneSize::new(200, 200));
        let raster = RasterHandle::new(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])));
        scene.push(create_image(raster, CanvasPoint::new(50.0, 50.0)));
        let view = RenderView {
            selection: SelectionTarget::Object(0),
            ..RenderView::default()
        };
        (scene, view)
    }

    fn renderer() -> Renderer {
        Renderer::new(DecorationStyle::from(&EditorConfig::for_variant(EditorVariant::Logo)))
    }

    #[test]
    fn exported_png_contains_no_selection_decoration() {
        let (scene, view) = selected_image_scene();
        let mut renderer = renderer();

        let measurer = FixedAdvanceMeasurer;
        let bitmap = export_bitmap(&mut renderer, &scene, view, &measurer, ExportFormat::Png)
            .expect("export");
        let decoded = image::load_from_memory(&bitmap.bytes)
            .expect("decode png")
            .to_rgba8();
        let live = cairo_surface_to_rgba_image(
            renderer
                .render_to_surface(&scene, view, &FixedAdvanceMeasurer)
                .expect("live render"),
        )
        .expect("read live frame");

        assert_eq!((bitmap.width, bitmap.height), (200, 200));
        assert_ne!(live.get_pixel(47, 47), decoded.get_pixel(47, 47));
        assert_eq!(decoded.get_pixel(47, 47), &Rgba([255, 255, 255, 255]));
        assert_eq!(decoded.get_pixel(100, 100), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn jpeg_export_decodes_at_scene_size() {
        let (scene, view) = selected_image_scene();
        let measurer = FixedAdvanceMeasurer;
        let bitmap = export_bitmap(&mut renderer(), &scene, view, &measurer, ExportFormat::Jpeg)
            .expect("export jpeg");
        assert_eq!(bitmap.file_name("poster"), "poster.jpg");

        let decoded = image::load_from_memory_with_format(&bitmap.bytes, image::ImageFormat::Jpeg)
            .expect("decode jpeg");
        assert_eq!((decoded.width(), decoded.height()), (200, 200));
    }

    struct RecordingShare {
        available: bool,
        fail: bool,
        shared: RefCell<Vec<String>>,
    }

    impl ShareTarget for RecordingShare {
        fn is_available(&self) -> bool {
            self.available
        }

        fn share(&self, file_name: &str, _bitmap: &EncodedBitmap) -> ShareResult<()> {
            if self.fail {
                return Err(ShareError::Rejected("user cancelled".to_string()));
            }
            self.shared.borrow_mut().push(file_name.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        saved: RefCell<Vec<(String, usize)>>,
    }

    impl DownloadSink for RecordingSink {
        fn save_download(
            &self,
            file_name: &str,
            bytes: &[u8],
        ) -> crate::storage::StorageResult<PathBuf> {
            self.saved
                .borrow_mut()
                .push((file_name.to_string(), bytes.len()));
            Ok(PathBuf::from("/downloads").join(file_name))
        }
    }

    fn bitmap() -> EncodedBitmap {
        EncodedBitmap {
            format: ExportFormat::Jpeg,
            width: 1,
            height: 1,
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn available_share_target_receives_bitmap() {
        let share = RecordingShare {
            available: true,
            fail: false,
            shared: RefCell::new(Vec::new()),
        };
        let sink = RecordingSink::default();

        let delivery =
            share_or_download(&bitmap(), "poster", Some(&share), &sink).expect("deliver");

        assert_eq!(
            delivery,
            ExportDelivery::Shared {
                file_name: "poster.jpg".to_string()
            }
        );
        assert!(sink.saved.borrow().is_empty());
    }

    #[test]
    fn failing_or_missing_share_falls_back_to_download() {
        let failing = RecordingShare {
            available: true,
            fail: true,
            shared: RefCell::new(Vec::new()),
        };
        let unavailable = RecordingShare {
            available: false,
            fail: false,
            shared: RefCell::new(Vec::new()),
        };
        let sink = RecordingSink::default();

        let targets: [Option<&dyn ShareTarget>; 3] = [Some(&failing), Some(&unavailable), None];
        for share in targets {
            let delivery = share_or_download(&bitmap(), "logo", share, &sink).expect("fallback");
            assert_eq!(
                delivery,
                ExportDelivery::Downloaded {
                    path: PathBuf::from("/downloads/logo.jpg")
                }
            );
        }
        assert_eq!(sink.saved.borrow().len(), 3);
        assert!(unavailable.shared.borrow().is_empty());
    }
}
