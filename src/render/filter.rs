use image::{imageops, Rgba, RgbaImage};

use crate::editor::scene::ImageFilters;

/// Applies the color filters in CSS order (brightness, contrast, saturate, grayscale), then blur.
///
/// `blur_sigma` is the blur radius already converted to source pixels.
pub fn apply_filters(source: &RgbaImage, filters: ImageFilters, blur_sigma: f64) -> RgbaImage {
    let mut filtered = source.clone();
    let brightness = filters.brightness / 100.0;
    let contrast = filters.contrast / 100.0;
    let saturation = saturate_matrix(filters.saturation / 100.0);
    let grayscale = grayscale_matrix(1.0 - (filters.grayscale / 100.0).clamp(0.0, 1.0));

    for pixel in filtered.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        let mut rgb = [f64::from(r), f64::from(g), f64::from(b)].map(|channel| channel / 255.0);
        rgb = rgb.map(|channel| (channel * brightness).clamp(0.0, 1.0));
        rgb = rgb.map(|channel| ((channel - 0.5) * contrast + 0.5).clamp(0.0, 1.0));
        rgb = apply_matrix(&saturation, rgb);
        rgb = apply_matrix(&grayscale, rgb);
        let [r, g, b] = rgb.map(|channel| (channel * 255.0).round() as u8);
        *pixel = Rgba([r, g, b, a]);
    }

    if blur_sigma > 0.0 {
        filtered = imageops::blur(&filtered, blur_sigma as f32);
    }
    filtered
}

fn apply_matrix(matrix: &[[f64; 3]; 3], rgb: [f64; 3]) -> [f64; 3] {
    matrix.map(|row| {
        (row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2]).clamp(0.0, 1.0)
    })
}

fn saturate_matrix(s: f64) -> [[f64; 3]; 3] {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

/// `amount` is the share of the original color kept: 1 is untouched, 0 fully gray.
fn grayscale_matrix(amount: f64) -> [[f64; 3]; 3] {
    [
        [0.2126 + 0.7874 * amount, 0.7152 - 0.7152 * amount, 0.0722 - 0.0722 * amount],
        [0.2126 - 0.2126 * amount, 0.7152 + 0.2848 * amount, 0.0722 - 0.0722 * amount],
        [0.2126 - 0.2126 * amount, 0.7152 - 0.7152 * amount, 0.0722 + 0.9278 * amount],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(4, 4, Rgba(color))
    }

    #[test]
    fn neutral_filters_leave_pixels_untouched() {
        let source = solid([12, 200, 90, 255]);
        let filtered = apply_filters(&source, ImageFilters::default(), 0.0);
        assert_eq!(filtered, source);
    }

    #[test]
    fn brightness_scales_channels() {
        let filters = ImageFilters {
            brightness: 50.0,
            ..ImageFilters::default()
        };
        let filtered = apply_filters(&solid([200, 100, 40, 255]), filters, 0.0);
        assert_eq!(filtered.get_pixel(0, 0), &Rgba([100, 50, 20, 255]));
    }

    #[test]
    fn zero_contrast_collapses_to_mid_gray_and_keeps_alpha() {
        let filters = ImageFilters {
            contrast: 0.0,
            ..ImageFilters::default()
        };
        let filtered = apply_filters(&solid([255, 0, 30, 77]), filters, 0.0);
        assert_eq!(filtered.get_pixel(1, 1), &Rgba([128, 128, 128, 77]));
    }

    #[test]
    fn full_grayscale_and_zero_saturation_equalize_channels() {
        for filters in [
            ImageFilters {
                grayscale: 100.0,
                ..ImageFilters::default()
            },
            ImageFilters {
                saturation: 0.0,
                ..ImageFilters::default()
            },
        ] {
            let Rgba([r, g, b, _]) = *apply_filters(&solid([255, 0, 0, 255]), filters, 0.0)
                .get_pixel(0, 0);
            assert!(r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1, "{r} {g} {b}");
            assert!(r < 80);
        }
    }

    #[test]
    fn blur_spreads_a_hard_edge() {
        let mut source = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255]));
        for y in 0..16 {
            for x in 8..16 {
                source.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        let filtered = apply_filters(&source, ImageFilters::default(), 2.0);
        let Rgba([edge, ..]) = *filtered.get_pixel(7, 8);
        assert!(edge > 0 && edge < 255);
        assert_eq!(filtered.dimensions(), source.dimensions());
    }
}
