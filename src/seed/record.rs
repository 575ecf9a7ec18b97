use std::collections::HashMap;

use serde::Deserialize;

use crate::editor::scene::ImageFilters;

/// A poster/logo template as served by the record service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub design_data: DesignData,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignData {
    #[serde(default)]
    pub bg_image: Option<ImageRef>,
    #[serde(default)]
    pub bg_image_settings: Option<BackgroundImageSettings>,
    /// Field positions keyed as `<field>X` / `<field>Y`.
    #[serde(default)]
    pub text_settings: HashMap<String, f64>,
    #[serde(default)]
    pub text_styles: HashMap<String, TextStyleRecord>,
    #[serde(default)]
    pub text_visibility: HashMap<String, FieldVisibility>,
    #[serde(default)]
    pub profile_image_settings: Option<ProfileImageSettings>,
}

impl DesignData {
    pub fn field_position(&self, field: ContactField) -> Option<(f64, f64)> {
        let key = field.key();
        let x = self.text_settings.get(&format!("{key}X"))?;
        let y = self.text_settings.get(&format!("{key}Y"))?;
        Some((*x, *y))
    }

    pub fn is_visible(&self, field: ContactField) -> bool {
        self.text_visibility.get(field.key()) == Some(&FieldVisibility::Visible)
    }

    pub fn style(&self, field: ContactField) -> Option<&TextStyleRecord> {
        self.text_styles.get(field.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageRef {
    pub url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct BackgroundImageSettings {
    #[serde(default)]
    pub filters: Option<ImageFilters>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldVisibility {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyleRecord {
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub font_family: Option<String>,
    /// Either a CSS keyword or a numeric weight.
    #[serde(default)]
    pub font_weight: Option<serde_json::Value>,
    #[serde(default)]
    pub font_style: Option<String>,
}

impl TextStyleRecord {
    pub fn is_bold(&self) -> bool {
        match &self.font_weight {
            Some(serde_json::Value::Number(weight)) => weight.as_f64().is_some_and(|w| w >= 600.0),
            Some(serde_json::Value::String(weight)) => {
                let weight = weight.trim().to_ascii_lowercase();
                weight == "bold"
                    || weight == "bolder"
                    || weight.parse::<f64>().is_ok_and(|w| w >= 600.0)
            }
            _ => false,
        }
    }

    pub fn is_italic(&self) -> bool {
        self.font_style
            .as_deref()
            .is_some_and(|style| style.eq_ignore_ascii_case("italic"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ProfileImageSettings {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

fn visible_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// Template fields that can become pre-filled text objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Mobile,
    Email,
    Title,
    Description,
    Tags,
}

impl ContactField {
    pub const ALL: [ContactField; 6] = [
        ContactField::Name,
        ContactField::Mobile,
        ContactField::Email,
        ContactField::Title,
        ContactField::Description,
        ContactField::Tags,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Mobile => "mobile",
            Self::Email => "email",
            Self::Title => "title",
            Self::Description => "description",
            Self::Tags => "tags",
        }
    }

    /// Value of this field drawn from the records, if any.
    pub fn value(
        self,
        template: &TemplateRecord,
        profile: Option<&ProfileRecord>,
    ) -> Option<String> {
        let value = match self {
            Self::Name => profile.and_then(|p| p.name.clone()),
            Self::Mobile => profile.and_then(|p| p.mobile.clone()),
            Self::Email => profile.and_then(|p| p.email.clone()),
            Self::Title => template.title.clone(),
            Self::Description => template.description.clone(),
            Self::Tags => Some(template.tags.join(", ")),
        };
        value.filter(|value| !value.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_record_parses_design_data() {
        let record: TemplateRecord = serde_json::from_str(
            r##"{
                "_id": "t-1",
                "title": "Diwali Sale",
                "tags": ["festive", "sale"],
                "designData": {
                    "bgImage": {"url": "backgrounds/diwali.png"},
                    "textSettings": {"nameX": 40, "nameY": 900},
                    "textStyles": {
                        "name": {"fontSize": 32, "color": "#ff0000", "fontWeight": "700"}
                    },
                    "textVisibility": {"name": "visible", "email": "hidden"},
                    "profileImageSettings": {"x": 10, "y": 20, "width": 80, "height": 90}
                }
            }"##,
        )
        .expect("template json");

        let design = &record.design_data;
        assert_eq!(record.id, "t-1");
        assert_eq!(
            design.bg_image.as_ref().map(|bg| bg.url.as_str()),
            Some("backgrounds/diwali.png")
        );
        assert_eq!(design.field_position(ContactField::Name), Some((40.0, 900.0)));
        assert!(design.is_visible(ContactField::Name));
        assert!(!design.is_visible(ContactField::Email));
        assert!(!design.is_visible(ContactField::Mobile));
        assert!(design.style(ContactField::Name).is_some_and(TextStyleRecord::is_bold));
        assert_eq!(
            design.profile_image_settings.map(|settings| settings.visible),
            Some(true)
        );
        assert_eq!(
            ContactField::Tags.value(&record, None).as_deref(),
            Some("festive, sale")
        );
    }

    #[test]
    fn font_weight_accepts_numbers_and_keywords() {
        let style = |weight: serde_json::Value| TextStyleRecord {
            font_weight: Some(weight),
            ..TextStyleRecord::default()
        };
        assert!(style(serde_json::json!(600)).is_bold());
        assert!(style(serde_json::json!("bold")).is_bold());
        assert!(!style(serde_json::json!(400)).is_bold());
        assert!(!style(serde_json::json!("normal")).is_bold());
    }
}
