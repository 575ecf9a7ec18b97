use crate::geometry::{Bounds, CanvasPoint, ClipShape};

use super::geometry::{
    hit_test_shape, image_delete_icon_center, text_bounds, text_delete_icon_center, TextMeasurer,
};
use super::scene::{Scene, SceneObject};
use super::selection::SelectionTarget;

/// Bounds plus the outline decoration and hit tests follow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetGeometry {
    pub bounds: Bounds,
    pub shape: ClipShape,
    pub is_text: bool,
}

pub fn object_geometry(object: &SceneObject, measurer: &dyn TextMeasurer) -> TargetGeometry {
    match object {
        SceneObject::Text(text) => TargetGeometry {
            bounds: text_bounds(text, measurer),
            shape: ClipShape::Rectangle,
            is_text: true,
        },
        SceneObject::Image(image) => TargetGeometry {
            bounds: image.bounds(),
            shape: image.shape,
            is_text: false,
        },
    }
}

/// Geometry of a live selection target; a hidden avatar has none.
pub fn target_geometry(
    scene: &Scene,
    target: SelectionTarget,
    measurer: &dyn TextMeasurer,
) -> Option<TargetGeometry> {
    match target {
        SelectionTarget::None => None,
        SelectionTarget::Object(index) => scene
            .object(index)
            .map(|object| object_geometry(object, measurer)),
        SelectionTarget::Avatar => scene.visible_avatar().map(|avatar| TargetGeometry {
            bounds: avatar.bounds(),
            shape: avatar.shape,
            is_text: false,
        }),
    }
}

pub fn delete_icon_center(geometry: &TargetGeometry) -> CanvasPoint {
    if geometry.is_text {
        text_delete_icon_center(geometry.bounds)
    } else {
        image_delete_icon_center(geometry.bounds)
    }
}

pub fn point_hits_object(
    point: CanvasPoint,
    object: &SceneObject,
    measurer: &dyn TextMeasurer,
) -> bool {
    let geometry = object_geometry(object, measurer);
    hit_test_shape(geometry.shape, point, geometry.bounds)
}

/// Scene objects topmost-first.
pub fn objects_in_hit_test_order(
    scene: &Scene,
) -> impl Iterator<Item = (usize, &SceneObject)> + '_ {
    scene.objects().iter().enumerate().rev()
}

pub fn top_object_at_point(
    scene: &Scene,
    point: CanvasPoint,
    measurer: &dyn TextMeasurer,
) -> Option<usize> {
    objects_in_hit_test_order(scene)
        .find(|(_, object)| point_hits_object(point, object, measurer))
        .map(|(index, _)| index)
}

pub fn top_text_at_point(
    scene: &Scene,
    point: CanvasPoint,
    measurer: &dyn TextMeasurer,
) -> Option<usize> {
    objects_in_hit_test_order(scene)
        .filter(|(_, object)| object.as_text().is_some())
        .find(|(_, object)| point_hits_object(point, object, measurer))
        .map(|(index, _)| index)
}

pub fn avatar_at_point(scene: &Scene, point: CanvasPoint) -> bool {
    scene
        .visible_avatar()
        .is_some_and(|avatar| hit_test_shape(avatar.shape, point, avatar.bounds()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::geometry::tests::FixedAdvanceMeasurer;
    use crate::editor::scene::{create_image, create_text, RasterHandle};
    use crate::geometry::SceneSize;
    use image::RgbaImage;

    fn raster() -> RasterHandle {
        RasterHandle::new(RgbaImage::new(1, 1))
    }

    #[test]
    fn top_object_hit_test_prefers_later_paint_order() {
        let mut scene = Scene::new(SceneSize::new(800, 800));
        let below = scene.push(create_image(raster(), CanvasPoint::new(0.0, 0.0)));
        let above = scene.push(create_image(raster(), CanvasPoint::new(100.0, 100.0)));

        let measurer = FixedAdvanceMeasurer;
        let top_at = |x, y| top_object_at_point(&scene, CanvasPoint::new(x, y), &measurer);
        assert_eq!(top_at(150.0, 150.0), Some(above));
        assert_eq!(top_at(50.0, 50.0), Some(below));
        assert_eq!(top_at(700.0, 700.0), None);
    }

    #[test]
    fn text_geometry_spans_from_cap_height_to_last_line() {
        let mut scene = Scene::new(SceneSize::new(800, 800));
        let index = scene.push(
            create_text(CanvasPoint::new(100.0, 100.0), "Arial").with_content("Hello\nWorld"),
        );
        let geometry =
            target_geometry(&scene, SelectionTarget::Object(index), &FixedAdvanceMeasurer)
                .expect("text geometry");
        assert_eq!(geometry.bounds, Bounds::new(100.0, 60.0, 100.0, 96.0));
        assert_eq!(
            delete_icon_center(&geometry),
            CanvasPoint::new(215.0, 55.0)
        );
        let measurer = FixedAdvanceMeasurer;
        let text_at = |x, y| top_text_at_point(&scene, CanvasPoint::new(x, y), &measurer);
        assert_eq!(text_at(120.0, 70.0), Some(index));
        assert_eq!(text_at(120.0, 40.0), None);
    }

    #[test]
    fn hidden_avatar_has_no_geometry_and_is_not_hit() {
        let mut scene = Scene::new(SceneSize::new(800, 800));
        scene.set_avatar_raster(raster());
        assert!(avatar_at_point(&scene, CanvasPoint::new(730.0, 70.0)));

        scene
            .update_avatar(|avatar| avatar.with_visible(false))
            .expect("avatar exists");
        assert!(!avatar_at_point(&scene, CanvasPoint::new(730.0, 70.0)));
        assert!(target_geometry(&scene, SelectionTarget::Avatar, &FixedAdvanceMeasurer).is_none());
    }
}
