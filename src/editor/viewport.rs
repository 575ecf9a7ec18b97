use crate::geometry::{CanvasPoint, SceneSize};

/// A pointer sample in display pixels, relative to the viewport, not the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    Mouse { x: f64, y: f64 },
    /// Active touches in arrival order; only the first one is tracked.
    Touch { touches: Vec<(f64, f64)> },
}

impl PointerInput {
    pub const fn mouse(x: f64, y: f64) -> Self {
        Self::Mouse { x, y }
    }

    pub fn touch(x: f64, y: f64) -> Self {
        Self::Touch {
            touches: vec![(x, y)],
        }
    }

    fn primary(&self) -> Option<(f64, f64)> {
        match self {
            Self::Mouse { x, y } => Some((*x, *y)),
            Self::Touch { touches } => touches.first().copied(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Maps between the on-screen canvas presentation and backing-store pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    scene_size: SceneSize,
    max_display_width: f64,
    display_origin: ScreenPoint,
    scale: f64,
}

impl CoordinateMapper {
    pub fn new(scene_size: SceneSize, max_display_width: f64) -> Self {
        let mut mapper = Self {
            scene_size,
            max_display_width,
            display_origin: ScreenPoint { x: 0.0, y: 0.0 },
            scale: 1.0,
        };
        mapper.recompute();
        mapper
    }

    fn recompute(&mut self) {
        let scene_width = f64::from(self.scene_size.width.max(1));
        self.scale = if self.max_display_width > 0.0 {
            (self.max_display_width / scene_width).min(1.0)
        } else {
            1.0
        };
    }

    /// Display pixels per backing-store pixel, never above 1.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn display_size(&self) -> (f64, f64) {
        (
            f64::from(self.scene_size.width) * self.scale,
            f64::from(self.scene_size.height) * self.scale,
        )
    }

    pub fn set_viewport(&mut self, max_display_width: f64) {
        self.max_display_width = max_display_width;
        self.recompute();
        tracing::debug!(scale = self.scale, max_display_width, "viewport updated");
    }

    pub fn set_scene_size(&mut self, scene_size: SceneSize) {
        self.scene_size = scene_size;
        self.recompute();
    }

    /// Where the canvas's top-left corner sits in viewport coordinates.
    pub fn set_display_origin(&mut self, x: f64, y: f64) {
        self.display_origin = ScreenPoint { x, y };
    }

    pub fn to_canvas_space(&self, input: &PointerInput) -> Option<CanvasPoint> {
        let (x, y) = input.primary()?;
        Some(CanvasPoint::new(
            (x - self.display_origin.x) / self.scale,
            (y - self.display_origin.y) / self.scale,
        ))
    }

    pub fn to_screen_space(&self, point: CanvasPoint) -> ScreenPoint {
        ScreenPoint {
            x: point.x * self.scale + self.display_origin.x,
            y: point.y * self.scale + self.display_origin.y,
        }
    }
}
