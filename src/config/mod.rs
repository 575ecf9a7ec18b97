use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::editor::geometry::HANDLE_SIZE;
use crate::editor::scene::DEFAULT_FONT_FAMILY;
use crate::geometry::Color;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("neither XDG_CONFIG_HOME nor HOME is set")]
    MissingHomeDirectory,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

const APP_DIR: &str = "postercraft";
const APP_CONFIG_FILE: &str = "config.json";
const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(300);

/// The three editor surfaces share one engine and differ only in these presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EditorVariant {
    #[default]
    Poster,
    Logo,
    SingleTemplate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecorationPalette {
    pub image: Color,
    pub text: Color,
    pub delete_fill: Color,
    pub delete_glyph: Color,
}

impl DecorationPalette {
    const fn uniform(color: Color) -> Self {
        Self {
            image: color,
            text: color,
            delete_fill: Color::new(0xff, 0x44, 0x44),
            delete_glyph: Color::WHITE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnabledKinds {
    pub text: bool,
    pub image: bool,
    pub avatar: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub variant: EditorVariant,
    pub palette: DecorationPalette,
    pub show_delete_icon: bool,
    pub enabled: EnabledKinds,
    pub default_font: String,
    pub max_display_width: f64,
    pub compact_display_width: f64,
    pub handle_size: f64,
    pub double_tap_window: Duration,
    pub export_file_stem: String,
}

impl EditorConfig {
    pub fn for_variant(variant: EditorVariant) -> Self {
        let blue = Color::new(0x3b, 0x82, 0xf6);
        let (palette, show_delete_icon, avatar, compact_display_width) = match variant {
            EditorVariant::Poster => (
                DecorationPalette {
                    text: Color::new(0xef, 0x44, 0x44),
                    ..DecorationPalette::uniform(blue)
                },
                false,
                true,
                320.0,
            ),
            EditorVariant::Logo => (DecorationPalette::uniform(blue), true, false, 300.0),
            EditorVariant::SingleTemplate => (
                DecorationPalette::uniform(Color::new(0x42, 0x85, 0xf4)),
                true,
                true,
                320.0,
            ),
        };
        Self {
            variant,
            palette,
            show_delete_icon,
            enabled: EnabledKinds {
                text: true,
                image: true,
                avatar,
            },
            default_font: DEFAULT_FONT_FAMILY.to_string(),
            max_display_width: 600.0,
            compact_display_width,
            handle_size: HANDLE_SIZE,
            double_tap_window: DOUBLE_TAP_WINDOW,
            export_file_stem: "poster".to_string(),
        }
    }

    pub fn display_width(&self, compact: bool) -> f64 {
        if compact {
            self.compact_display_width
        } else {
            self.max_display_width
        }
    }

    /// Applies user overrides on top of the variant preset.
    pub fn with_overrides(mut self, overrides: &AppConfig) -> Self {
        if let Some(show) = overrides.show_delete_icon {
            self.show_delete_icon = show;
        }
        if let Some(font) = overrides.default_font.as_deref().filter(|font| !font.is_empty()) {
            self.default_font = font.to_string();
        }
        if let Some(width) = overrides.max_display_width.filter(|width| *width > 0.0) {
            self.max_display_width = width;
        }
        if let Some(stem) = overrides
            .export_file_stem
            .as_deref()
            .filter(|stem| !stem.is_empty())
        {
            self.export_file_stem = stem.to_string();
        }
        self
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::for_variant(EditorVariant::default())
    }
}

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub variant: Option<EditorVariant>,
    #[serde(default)]
    pub show_delete_icon: Option<bool>,
    #[serde(default)]
    pub default_font: Option<String>,
    #[serde(default)]
    pub max_display_width: Option<f64>,
    #[serde(default)]
    pub export_file_stem: Option<String>,
}

impl AppConfig {
    /// Resolves the editor config, letting an explicit variant win over the file's.
    pub fn editor_config(&self, variant: Option<EditorVariant>) -> EditorConfig {
        let variant = variant.or(self.variant).unwrap_or_default();
        EditorConfig::for_variant(variant).with_overrides(self)
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(err) => {
            tracing::debug!(%err, "no config directory; using defaults");
            return AppConfig::default();
        }
    };
    if !path.exists() {
        return AppConfig::default();
    }
    read_app_config(&path).unwrap_or_else(|err| {
        tracing::warn!(%err, "invalid config.json; using defaults");
        AppConfig::default()
    })
}

pub fn read_app_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "postercraft",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(
            path,
            PathBuf::from("/tmp/config-root/postercraft/config.json")
        );
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path(
            "postercraft",
            "config.json",
            None,
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(
            path,
            PathBuf::from("/tmp/home/.config/postercraft/config.json")
        );
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("postercraft", "config.json", None, None)
            .expect_err("no root directory");
        assert!(matches!(error, ConfigError::MissingHomeDirectory));
    }

    #[test]
    fn load_app_config_reads_overrides_and_tolerates_bad_json() {
        let root = std::env::temp_dir().join(format!("postercraft-config-{}", std::process::id()));
        let dir = root.join(APP_DIR);
        std::fs::create_dir_all(&dir).expect("create config dir");
        std::fs::write(
            dir.join(APP_CONFIG_FILE),
            r#"{"variant":"single-template","show_delete_icon":false,"default_font":"Georgia"}"#,
        )
        .expect("write config");

        let config = load_app_config_with(Some(&root), None);
        let editor = config.editor_config(None);
        assert_eq!(editor.variant, EditorVariant::SingleTemplate);
        assert!(!editor.show_delete_icon);
        assert_eq!(editor.default_font, "Georgia");
        assert_eq!(editor.palette.image, Color::new(0x42, 0x85, 0xf4));

        std::fs::write(dir.join(APP_CONFIG_FILE), "{not json").expect("write bad config");
        let fallback = load_app_config_with(Some(&root), None);
        assert!(fallback.variant.is_none());
        assert!(matches!(
            read_app_config(&dir.join(APP_CONFIG_FILE)),
            Err(ConfigError::Parse { .. })
        ));

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn variant_presets_differ_in_decoration_and_delete_icon() {
        let poster = EditorConfig::for_variant(EditorVariant::Poster);
        assert_eq!(poster.palette.image, Color::new(0x3b, 0x82, 0xf6));
        assert_eq!(poster.palette.text, Color::new(0xef, 0x44, 0x44));
        assert!(!poster.show_delete_icon);
        assert_eq!(poster.display_width(true), 320.0);

        let logo = EditorConfig::for_variant(EditorVariant::Logo);
        assert!(logo.show_delete_icon);
        assert!(!logo.enabled.avatar);
        assert_eq!(logo.display_width(true), 300.0);
        assert_eq!(logo.display_width(false), 600.0);
    }

    #[test]
    fn explicit_variant_wins_over_config_file() {
        let config = AppConfig {
            variant: Some(EditorVariant::Logo),
            ..Default::default()
        };
        assert_eq!(
            config.editor_config(Some(EditorVariant::Poster)).variant,
            EditorVariant::Poster
        );
        assert_eq!(config.editor_config(None).variant, EditorVariant::Logo);
    }
}
