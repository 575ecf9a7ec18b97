use serde::Deserialize;

/// CSS-style color filters. Percentages for the first four, blur radius in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageFilters {
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub grayscale: f64,
    pub blur: f64,
}

impl Default for ImageFilters {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            grayscale: 0.0,
            blur: 0.0,
        }
    }
}

impl ImageFilters {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Negative values are meaningless for every filter and become zero; grayscale caps at 100.
    pub fn clamped(self) -> Self {
        Self {
            brightness: self.brightness.max(0.0),
            contrast: self.contrast.max(0.0),
            saturation: self.saturation.max(0.0),
            grayscale: self.grayscale.clamp(0.0, 100.0),
            blur: self.blur.max(0.0),
        }
    }

    pub(crate) fn bits(&self) -> [u64; 5] {
        [
            self.brightness.to_bits(),
            self.contrast.to_bits(),
            self.saturation.to_bits(),
            self.grayscale.to_bits(),
            self.blur.to_bits(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_neutral_defaults() {
        let filters: ImageFilters =
            serde_json::from_str(r#"{"brightness": 120, "blur": 2}"#).expect("filters");
        assert_eq!(filters.brightness, 120.0);
        assert_eq!(filters.contrast, 100.0);
        assert_eq!(filters.grayscale, 0.0);
        assert_eq!(filters.blur, 2.0);
        assert!(!filters.is_identity());
        assert!(ImageFilters::default().is_identity());
    }

    #[test]
    fn clamping_rejects_negative_and_excess_values() {
        let filters = ImageFilters {
            brightness: -10.0,
            grayscale: 250.0,
            blur: -1.0,
            ..ImageFilters::default()
        }
        .clamped();
        assert_eq!((filters.brightness, filters.grayscale, filters.blur), (0.0, 100.0, 0.0));
    }
}
