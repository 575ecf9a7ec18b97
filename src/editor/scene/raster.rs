use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use image::RgbaImage;

use crate::geometry::{Bounds, CanvasPoint, ClipShape, SceneSize};

use super::ImageFilters;

pub const DEFAULT_IMAGE_SIZE: f64 = 200.0;
pub const DEFAULT_AVATAR_SIZE: f64 = 100.0;
const AVATAR_RIGHT_INSET: f64 = 120.0;
const AVATAR_TOP_INSET: f64 = 20.0;

static NEXT_RASTER_ID: AtomicU64 = AtomicU64::new(1);

/// Shared decoded pixels. Equality is identity of the decode, not pixel content.
#[derive(Debug, Clone)]
pub struct RasterHandle {
    id: u64,
    pixels: Arc<RgbaImage>,
}

impl RasterHandle {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            id: NEXT_RASTER_ID.fetch_add(1, Ordering::Relaxed),
            pixels: Arc::new(pixels),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

impl PartialEq for RasterHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageObject {
    pub raster: RasterHandle,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub shape: ClipShape,
    pub filters: ImageFilters,
}

impl ImageObject {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    pub fn with_bounds(self, bounds: Bounds) -> Self {
        Self {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            ..self
        }
    }

    pub fn with_position(self, at: CanvasPoint) -> Self {
        Self {
            x: at.x,
            y: at.y,
            ..self
        }
    }

    pub fn with_shape(self, shape: ClipShape) -> Self {
        Self { shape, ..self }
    }

    pub fn with_filters(self, filters: ImageFilters) -> Self {
        Self {
            filters: filters.clamped(),
            ..self
        }
    }
}

pub fn create_image(raster: RasterHandle, at: CanvasPoint) -> ImageObject {
    ImageObject {
        raster,
        x: at.x,
        y: at.y,
        width: DEFAULT_IMAGE_SIZE,
        height: DEFAULT_IMAGE_SIZE,
        shape: ClipShape::Rectangle,
        filters: ImageFilters::default(),
    }
}

/// The per-scene profile picture. Hidden rather than removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileAvatar {
    pub raster: RasterHandle,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub shape: ClipShape,
    pub visible: bool,
}

impl ProfileAvatar {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    pub fn with_bounds(self, bounds: Bounds) -> Self {
        Self {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            ..self
        }
    }

    pub fn with_position(self, at: CanvasPoint) -> Self {
        Self {
            x: at.x,
            y: at.y,
            ..self
        }
    }

    pub fn with_shape(self, shape: ClipShape) -> Self {
        Self { shape, ..self }
    }

    pub fn with_visible(self, visible: bool) -> Self {
        Self { visible, ..self }
    }

    pub fn with_raster(self, raster: RasterHandle) -> Self {
        Self { raster, ..self }
    }

    pub fn with_placement(self, placement: AvatarPlacement) -> Self {
        Self {
            x: placement.x,
            y: placement.y,
            width: placement.width,
            height: placement.height,
            visible: placement.visible,
            ..self
        }
    }
}

/// Avatar geometry known before its raster finishes decoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvatarPlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub visible: bool,
}

pub fn create_avatar(raster: RasterHandle, scene_size: SceneSize) -> ProfileAvatar {
    ProfileAvatar {
        raster,
        x: f64::from(scene_size.width) - AVATAR_RIGHT_INSET,
        y: AVATAR_TOP_INSET,
        width: DEFAULT_AVATAR_SIZE,
        height: DEFAULT_AVATAR_SIZE,
        shape: ClipShape::Circle,
        visible: true,
    }
}
