use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::geometry::SceneSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenePreset {
    pub label: &'static str,
    pub size: SceneSize,
}

impl ScenePreset {
    const fn new(label: &'static str, width: u32, height: u32) -> Self {
        Self {
            label,
            size: SceneSize::new(width, height),
        }
    }
}

pub const SCENE_PRESETS: [ScenePreset; 8] = [
    ScenePreset::new("Square", 2400, 2400),
    ScenePreset::new("Phone story", 750, 1334),
    ScenePreset::new("Banner", 812, 312),
    ScenePreset::new("Social square", 1200, 1200),
    ScenePreset::new("Portrait post", 1080, 1350),
    ScenePreset::new("Widescreen", 1280, 720),
    ScenePreset::new("A4 print", 2480, 3507),
    ScenePreset::new("Letter", 850, 1100),
];

pub const DEFAULT_PRESET: ScenePreset = SCENE_PRESETS[0];

impl fmt::Display for ScenePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.size.width, self.size.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scene preset {0:?}; expected one of {known}", known = known_presets())]
pub struct PresetParseError(String);

fn known_presets() -> String {
    SCENE_PRESETS
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Only listed presets are accepted; scenes never take arbitrary sizes.
impl FromStr for ScenePreset {
    type Err = PresetParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        let dimensions = normalized
            .split_once(['x', '×'])
            .and_then(|(width, height)| {
                Some((width.trim().parse::<u32>().ok()?, height.trim().parse::<u32>().ok()?))
            });
        SCENE_PRESETS
            .iter()
            .copied()
            .find(|preset| match dimensions {
                Some((width, height)) => preset.size == SceneSize::new(width, height),
                None => preset.label.eq_ignore_ascii_case(value.trim()),
            })
            .ok_or_else(|| PresetParseError(value.to_string()))
    }
}
