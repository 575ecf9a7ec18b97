//! Pre-populating a new scene from template and profile records.

mod record;
mod source;

pub use record::{
    BackgroundImageSettings, ContactField, DesignData, FieldVisibility, ImageRef,
    ProfileImageSettings, ProfileRecord, TemplateRecord, TextStyleRecord,
};
pub use source::{DirectoryRecordSource, RecordError, RecordResult, RecordSource};

use crate::editor::scene::{
    create_text, AvatarPlacement, Scene, DEFAULT_FONT_FAMILY, DEFAULT_TEXT_SIZE,
};
use crate::geometry::{CanvasPoint, Color};

const CONTACT_TEXT_SIZE: f64 = 36.0;
const CONTACT_TEXT_COLOR: Color = Color::new(0x33, 0x33, 0x33);
const CONTACT_BOTTOM_INSET: f64 = 50.0;
const MOBILE_RIGHT_INSET: f64 = 300.0;
const EMAIL_LEFT_INSET: f64 = 50.0;
const NAME_FALLBACK: (f64, f64) = (50.0, 20.0);
const MOBILE_FALLBACK: (f64, f64) = (194.0, 80.0);

/// Records available when a scene is created. Either may be missing after a failed fetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedRecords<'a> {
    pub template: Option<&'a TemplateRecord>,
    pub profile: Option<&'a ProfileRecord>,
}

/// What seeding added directly, plus the images that still need fetching and decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedPlan {
    pub texts: Vec<usize>,
    pub background_url: Option<String>,
    pub avatar_url: Option<String>,
}

pub fn seed_scene(scene: &mut Scene, records: SeedRecords<'_>, default_font: &str) -> SeedPlan {
    let mut plan = SeedPlan {
        avatar_url: records
            .profile
            .and_then(|profile| profile.profile_image.clone())
            .filter(|url| !url.is_empty()),
        ..SeedPlan::default()
    };

    match records.template {
        Some(template) => {
            seed_from_template(scene, template, records.profile, default_font, &mut plan)
        }
        None => seed_contact_defaults(scene, records.profile, &mut plan),
    }

    tracing::info!(
        texts = plan.texts.len(),
        background = plan.background_url.is_some(),
        avatar = plan.avatar_url.is_some(),
        "scene seeded"
    );
    plan
}

/// Fetches the records, treating any fetch failure as "no record".
pub fn fetch_records(
    source: &dyn RecordSource,
    template_id: Option<&str>,
    profile_id: Option<&str>,
) -> (Option<TemplateRecord>, Option<ProfileRecord>) {
    let template = template_id.and_then(|id| {
        source
            .template(id)
            .map_err(|err| tracing::warn!(id, %err, "template fetch failed; skipping prefill"))
            .ok()
    });
    let profile = profile_id.and_then(|id| {
        source
            .profile(id)
            .map_err(|err| tracing::warn!(id, %err, "profile fetch failed; skipping prefill"))
            .ok()
    });
    (template, profile)
}

fn seed_contact_defaults(scene: &mut Scene, profile: Option<&ProfileRecord>, plan: &mut SeedPlan) {
    let Some(profile) = profile else {
        return;
    };
    let size = scene.size();
    let (width, height) = (f64::from(size.width), f64::from(size.height));
    let contact = [
        (
            profile.mobile.as_deref(),
            CanvasPoint::new(width - MOBILE_RIGHT_INSET, height - CONTACT_BOTTOM_INSET),
        ),
        (
            profile.email.as_deref(),
            CanvasPoint::new(EMAIL_LEFT_INSET, height - CONTACT_BOTTOM_INSET),
        ),
    ];
    for (value, at) in contact {
        let Some(value) = value.filter(|value| !value.trim().is_empty()) else {
            continue;
        };
        let text = create_text(at, DEFAULT_FONT_FAMILY)
            .with_content(value)
            .with_size(CONTACT_TEXT_SIZE)
            .with_color(CONTACT_TEXT_COLOR);
        plan.texts.push(scene.push(text));
    }
}

fn seed_from_template(
    scene: &mut Scene,
    template: &TemplateRecord,
    profile: Option<&ProfileRecord>,
    default_font: &str,
    plan: &mut SeedPlan,
) {
    let design = &template.design_data;
    plan.background_url = design
        .bg_image
        .as_ref()
        .map(|image| image.url.clone())
        .filter(|url| !url.is_empty());
    if let Some(filters) = design.bg_image_settings.and_then(|settings| settings.filters) {
        scene.set_background_filters(filters);
    }

    if let Some(settings) = design.profile_image_settings {
        scene.set_avatar_placement(AvatarPlacement {
            x: settings.x,
            y: settings.y,
            width: settings.width,
            height: settings.height,
            visible: settings.visible,
        });
    }

    let size = scene.size();
    let (width, height) = (f64::from(size.width), f64::from(size.height));
    for field in ContactField::ALL {
        if !design.is_visible(field) {
            continue;
        }
        let Some(content) = field.value(template, profile) else {
            continue;
        };
        let position = design.field_position(field).or(match field {
            ContactField::Name => Some((NAME_FALLBACK.0, height - NAME_FALLBACK.1)),
            ContactField::Mobile => Some((width - MOBILE_FALLBACK.0, height - MOBILE_FALLBACK.1)),
            _ => None,
        });
        let Some((x, y)) = position else {
            tracing::debug!(field = field.key(), "template field has no position; skipped");
            continue;
        };

        let style = design.style(field).cloned().unwrap_or_default();
        let family = style
            .font_family
            .clone()
            .filter(|family| !family.is_empty())
            .unwrap_or_else(|| default_font.to_string());
        let color = style
            .color
            .as_deref()
            .and_then(Color::from_hex)
            .unwrap_or(Color::BLACK);
        let text = create_text(CanvasPoint::new(x, y), family)
            .with_content(content)
            .with_size(style.font_size.unwrap_or(DEFAULT_TEXT_SIZE))
            .with_color(color)
            .with_style(style.is_bold(), style.is_italic());
        plan.texts.push(scene.push(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SceneSize;

    fn profile() -> ProfileRecord {
        ProfileRecord {
            name: Some("Asha Rao".to_string()),
            mobile: Some("+91 98765 43210".to_string()),
            email: Some("asha@example.com".to_string()),
            profile_image: Some("avatars/asha.png".to_string()),
        }
    }

    #[test]
    fn without_template_profile_contact_lands_at_bottom_corners() {
        let mut scene = Scene::new(SceneSize::new(1200, 1200));
        let profile = profile();
        let plan = seed_scene(
            &mut scene,
            SeedRecords {
                template: None,
                profile: Some(&profile),
            },
            "Georgia",
        );

        assert_eq!(plan.texts, vec![0, 1]);
        assert_eq!(plan.avatar_url.as_deref(), Some("avatars/asha.png"));
        let mobile = scene.text(0).expect("mobile text");
        assert_eq!((mobile.x, mobile.y), (900.0, 1150.0));
        assert_eq!(mobile.size, 36.0);
        assert_eq!(mobile.color, Color::new(0x33, 0x33, 0x33));
        assert_eq!(mobile.family, "Arial");
        let email = scene.text(1).expect("email text");
        assert_eq!((email.x, email.y), (50.0, 1150.0));
    }

    #[test]
    fn template_fields_follow_visibility_positions_and_styles() {
        let mut scene = Scene::new(SceneSize::new(794, 1123));
        let template: TemplateRecord = serde_json::from_str(
            r##"{
                "title": "Grand Opening",
                "designData": {
                    "bgImage": {"url": "bg/opening.jpg"},
                    "bgImageSettings": {"filters": {"brightness": 80, "contrast": 100,
                                                    "saturation": 120, "grayscale": 0,
                                                    "blur": 3}},
                    "textSettings": {"titleX": 100, "titleY": 200},
                    "textStyles": {
                        "title": {"fontSize": 64, "color": "#112233", "fontFamily": "Impact",
                                  "fontWeight": 700, "fontStyle": "italic"}
                    },
                    "textVisibility": {"name": "visible", "mobile": "visible",
                                       "title": "visible", "email": "hidden"},
                    "profileImageSettings": {"x": 600, "y": 40, "width": 120, "height": 120,
                                             "visible": false}
                }
            }"##,
        )
        .expect("template");
        let profile = profile();

        let plan = seed_scene(
            &mut scene,
            SeedRecords {
                template: Some(&template),
                profile: Some(&profile),
            },
            "Georgia",
        );

        assert_eq!(plan.background_url.as_deref(), Some("bg/opening.jpg"));
        let filters = scene.background_filters();
        assert_eq!((filters.brightness, filters.saturation, filters.blur), (80.0, 120.0, 3.0));
        assert_eq!(plan.texts.len(), 3);
        let name = scene.text(0).expect("name");
        assert_eq!((name.x, name.y), (50.0, 1103.0));
        assert_eq!(name.family, "Georgia");
        let mobile = scene.text(1).expect("mobile");
        assert_eq!((mobile.x, mobile.y), (600.0, 1043.0));
        let title = scene.text(2).expect("title");
        assert_eq!(title.content, "Grand Opening");
        assert_eq!((title.size, title.family.as_str()), (64.0, "Impact"));
        assert!(title.bold && title.italic);
        assert_eq!(
            scene.avatar_placement().map(|placement| placement.visible),
            Some(false)
        );
    }

    #[test]
    fn missing_records_leave_scene_empty() {
        let mut scene = Scene::new(SceneSize::new(800, 800));
        let plan = seed_scene(&mut scene, SeedRecords::default(), "Arial");
        assert!(scene.is_empty());
        assert_eq!(plan, SeedPlan::default());
    }

    struct FailingSource;

    impl RecordSource for FailingSource {
        fn template(&self, id: &str) -> RecordResult<TemplateRecord> {
            Err(RecordError::InvalidId(id.to_string()))
        }

        fn profile(&self, id: &str) -> RecordResult<ProfileRecord> {
            Err(RecordError::InvalidId(id.to_string()))
        }

        fn image_bytes(&self, url: &str) -> RecordResult<Vec<u8>> {
            Err(RecordError::UnsupportedUrl(url.to_string()))
        }
    }

    #[test]
    fn fetch_failures_skip_prefill() {
        let (template, profile) = fetch_records(&FailingSource, Some("t"), Some("u"));
        assert!(template.is_none());
        assert!(profile.is_none());
    }
}
