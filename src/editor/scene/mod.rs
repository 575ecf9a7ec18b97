mod filters;
mod preset;
mod raster;
mod text;

pub use filters::ImageFilters;
pub use preset::{PresetParseError, ScenePreset, DEFAULT_PRESET, SCENE_PRESETS};
pub use raster::{
    create_avatar, create_image, AvatarPlacement, ImageObject, ProfileAvatar, RasterHandle,
    DEFAULT_AVATAR_SIZE, DEFAULT_IMAGE_SIZE,
};
pub use text::{
    create_text, TextObject, DEFAULT_FONT_FAMILY, DEFAULT_TEXT_CONTENT, DEFAULT_TEXT_SIZE,
    FONT_FAMILIES,
};

use crate::geometry::{CanvasPoint, Color, SceneSize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("scene object index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("scene object {index} is not a {expected} object")]
    KindMismatch { index: usize, expected: &'static str },
    #[error("scene has no profile avatar yet")]
    MissingAvatar,
    #[error("{kind} objects are disabled in this editor")]
    KindDisabled { kind: &'static str },
}

pub type SceneResult<T> = std::result::Result<T, SceneError>;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneObject {
    Text(TextObject),
    Image(ImageObject),
}

impl SceneObject {
    pub fn as_text(&self) -> Option<&TextObject> {
        match self {
            Self::Text(text) => Some(text),
            Self::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageObject> {
        match self {
            Self::Image(image) => Some(image),
            Self::Text(_) => None,
        }
    }

    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "image",
        }
    }

    pub fn position(&self) -> CanvasPoint {
        match self {
            Self::Text(text) => text.anchor(),
            Self::Image(image) => CanvasPoint::new(image.x, image.y),
        }
    }

    pub fn with_position(&self, at: CanvasPoint) -> SceneObject {
        match self {
            Self::Text(text) => Self::Text(text.clone().with_position(at)),
            Self::Image(image) => Self::Image(image.clone().with_position(at)),
        }
    }
}

impl From<TextObject> for SceneObject {
    fn from(text: TextObject) -> Self {
        Self::Text(text)
    }
}

impl From<ImageObject> for SceneObject {
    fn from(image: ImageObject) -> Self {
        Self::Image(image)
    }
}

/// One editable composition. Object order is paint order; later entries draw on top.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    size: SceneSize,
    background: Color,
    background_image: Option<RasterHandle>,
    background_filters: ImageFilters,
    objects: Vec<SceneObject>,
    avatar: Option<ProfileAvatar>,
    avatar_placement: Option<AvatarPlacement>,
}

impl Scene {
    pub fn new(size: SceneSize) -> Self {
        Self {
            size,
            background: Color::WHITE,
            background_image: None,
            background_filters: ImageFilters::default(),
            objects: Vec::new(),
            avatar: None,
            avatar_placement: None,
        }
    }

    pub fn from_preset(preset: ScenePreset) -> Self {
        Self::new(preset.size)
    }

    pub fn size(&self) -> SceneSize {
        self.size
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    pub fn background_image(&self) -> Option<&RasterHandle> {
        self.background_image.as_ref()
    }

    pub fn set_background_image(&mut self, raster: Option<RasterHandle>) {
        self.background_image = raster;
    }

    pub fn background_filters(&self) -> ImageFilters {
        self.background_filters
    }

    pub fn set_background_filters(&mut self, filters: ImageFilters) {
        self.background_filters = filters.clamped();
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn object(&self, index: usize) -> Option<&SceneObject> {
        self.objects.get(index)
    }

    pub fn text(&self, index: usize) -> Option<&TextObject> {
        self.object(index).and_then(SceneObject::as_text)
    }

    /// Appends on top of the paint order and returns the new index.
    pub fn push(&mut self, object: impl Into<SceneObject>) -> usize {
        let object = object.into();
        tracing::debug!(
            kind = object.kind_label(),
            index = self.objects.len(),
            "scene object added"
        );
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn replace(&mut self, index: usize, object: SceneObject) -> SceneResult<()> {
        let len = self.objects.len();
        let slot = self
            .objects
            .get_mut(index)
            .ok_or(SceneError::IndexOutOfRange { index, len })?;
        *slot = object;
        Ok(())
    }

    /// Builds a replacement from the current value and swaps it in.
    pub fn update(
        &mut self,
        index: usize,
        next: impl FnOnce(&SceneObject) -> SceneObject,
    ) -> SceneResult<()> {
        let current = self.object(index).ok_or(SceneError::IndexOutOfRange {
            index,
            len: self.objects.len(),
        })?;
        let replacement = next(current);
        self.replace(index, replacement)
    }

    pub fn update_text(
        &mut self,
        index: usize,
        next: impl FnOnce(TextObject) -> TextObject,
    ) -> SceneResult<()> {
        let text = self
            .object(index)
            .ok_or(SceneError::IndexOutOfRange {
                index,
                len: self.objects.len(),
            })?
            .as_text()
            .cloned()
            .ok_or(SceneError::KindMismatch {
                index,
                expected: "text",
            })?;
        self.replace(index, SceneObject::Text(next(text)))
    }

    pub fn update_image(
        &mut self,
        index: usize,
        next: impl FnOnce(ImageObject) -> ImageObject,
    ) -> SceneResult<()> {
        let image = self
            .object(index)
            .ok_or(SceneError::IndexOutOfRange {
                index,
                len: self.objects.len(),
            })?
            .as_image()
            .cloned()
            .ok_or(SceneError::KindMismatch {
                index,
                expected: "image",
            })?;
        self.replace(index, SceneObject::Image(next(image)))
    }

    pub fn remove(&mut self, index: usize) -> SceneResult<SceneObject> {
        let len = self.objects.len();
        if index >= len {
            return Err(SceneError::IndexOutOfRange { index, len });
        }
        let removed = self.objects.remove(index);
        tracing::debug!(kind = removed.kind_label(), index, "scene object removed");
        Ok(removed)
    }

    pub fn avatar(&self) -> Option<&ProfileAvatar> {
        self.avatar.as_ref()
    }

    pub fn visible_avatar(&self) -> Option<&ProfileAvatar> {
        self.avatar.as_ref().filter(|avatar| avatar.visible)
    }

    pub fn avatar_placement(&self) -> Option<AvatarPlacement> {
        self.avatar_placement
    }

    /// Geometry applied when the avatar is first created, and immediately if it already exists.
    pub fn set_avatar_placement(&mut self, placement: AvatarPlacement) {
        self.avatar_placement = Some(placement);
        if let Some(avatar) = self.avatar.take() {
            self.avatar = Some(avatar.with_placement(placement));
        }
    }

    /// Creates the singleton on first use; later rasters replace the pixels only.
    pub fn set_avatar_raster(&mut self, raster: RasterHandle) {
        let next = match self.avatar.take() {
            Some(avatar) => avatar.with_raster(raster),
            None => {
                let created = create_avatar(raster, self.size);
                match self.avatar_placement {
                    Some(placement) => created.with_placement(placement),
                    None => created,
                }
            }
        };
        self.avatar = Some(next);
    }

    pub fn update_avatar(
        &mut self,
        next: impl FnOnce(ProfileAvatar) -> ProfileAvatar,
    ) -> SceneResult<()> {
        let avatar = self.avatar.clone().ok_or(SceneError::MissingAvatar)?;
        self.avatar = Some(next(avatar));
        Ok(())
    }
}
