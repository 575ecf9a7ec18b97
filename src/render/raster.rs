use std::collections::{HashMap, HashSet};

use image::RgbaImage;

use crate::editor::scene::{ImageFilters, RasterHandle};

use super::filter::apply_filters;
use super::{RenderError, RenderResult};

/// Converts straight-alpha RGBA into cairo's premultiplied native-endian ARGB32.
pub fn rgba_image_to_cairo_surface(image: &RgbaImage) -> Option<gtk4::cairo::ImageSurface> {
    let width = i32::try_from(image.width()).ok()?;
    let height = i32::try_from(image.height()).ok()?;
    let mut surface =
        gtk4::cairo::ImageSurface::create(gtk4::cairo::Format::ARgb32, width, height).ok()?;
    let stride = usize::try_from(surface.stride()).ok()?;

    {
        let mut data = surface.data().ok()?;
        let image_width = usize::try_from(image.width()).ok()?;
        let src_row_len = image_width.checked_mul(4)?;
        let src = image.as_raw();

        for (row, src_row) in src.chunks_exact(src_row_len.max(1)).enumerate() {
            let dst_row_offset = row.checked_mul(stride)?;
            let dst_row_end = dst_row_offset.checked_add(src_row_len)?;
            let dst_row = data.get_mut(dst_row_offset..dst_row_end)?;

            for (src_pixel, dst_pixel) in src_row.chunks_exact(4).zip(dst_row.chunks_exact_mut(4)) {
                let [r, g, b, a] = [src_pixel[0], src_pixel[1], src_pixel[2], src_pixel[3]];
                let (r, g, b) = match a {
                    0 => (0, 0, 0),
                    255 => (r, g, b),
                    _ => (premultiply(r, a), premultiply(g, a), premultiply(b, a)),
                };
                dst_pixel.copy_from_slice(&[b, g, r, a]);
            }
        }
    }

    surface.flush();
    Some(surface)
}

/// Reads a finished surface back into straight-alpha RGBA. The surface must not be shared.
pub fn cairo_surface_to_rgba_image(
    mut surface: gtk4::cairo::ImageSurface,
) -> RenderResult<RgbaImage> {
    surface.flush();
    let width = u32::try_from(surface.width()).map_err(|_| RenderError::InvalidSize)?;
    let height = u32::try_from(surface.height()).map_err(|_| RenderError::InvalidSize)?;
    let stride = usize::try_from(surface.stride()).map_err(|_| RenderError::InvalidSize)?;
    let row_len = usize::try_from(width).map_err(|_| RenderError::InvalidSize)? * 4;

    let data = surface.data()?;
    let mut image = RgbaImage::new(width, height);
    for (row, dst_row) in image.chunks_exact_mut(row_len.max(1)).enumerate() {
        let offset = row * stride;
        let src_row = data
            .get(offset..offset + row_len)
            .ok_or(RenderError::InvalidSize)?;
        for (src_pixel, dst_pixel) in src_row.chunks_exact(4).zip(dst_row.chunks_exact_mut(4)) {
            let [b, g, r, a] = [src_pixel[0], src_pixel[1], src_pixel[2], src_pixel[3]];
            let (r, g, b) = match a {
                0 => (0, 0, 0),
                255 => (r, g, b),
                _ => (unpremultiply(r, a), unpremultiply(g, a), unpremultiply(b, a)),
            };
            dst_pixel.copy_from_slice(&[r, g, b, a]);
        }
    }
    Ok(image)
}

fn premultiply(channel: u8, alpha: u8) -> u8 {
    ((u16::from(channel) * u16::from(alpha) + 127) / 255) as u8
}

fn unpremultiply(channel: u8, alpha: u8) -> u8 {
    let alpha = u16::from(alpha);
    ((u16::from(channel) * 255 + alpha / 2) / alpha).min(255) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SurfaceKey {
    raster: u64,
    filters: [u64; 5],
    blur_sigma: u64,
}

/// Converted (and filtered) surfaces keyed by raster id and filter settings,
/// so a redraw does not re-convert or re-filter pixels.
#[derive(Default)]
pub struct SurfaceCache {
    entries: HashMap<SurfaceKey, gtk4::cairo::ImageSurface>,
}

impl SurfaceCache {
    /// `blur_sigma` is the blur radius in source pixels; it is ignored for neutral filters.
    pub fn filtered_surface_for(
        &mut self,
        raster: &RasterHandle,
        filters: ImageFilters,
        blur_sigma: f64,
    ) -> Option<gtk4::cairo::ImageSurface> {
        let blur_sigma = if filters.blur > 0.0 { blur_sigma.max(0.0) } else { 0.0 };
        let key = SurfaceKey {
            raster: raster.id(),
            filters: filters.bits(),
            blur_sigma: blur_sigma.to_bits(),
        };
        if let Some(surface) = self.entries.get(&key) {
            return Some(surface.clone());
        }
        let surface = if filters.is_identity() {
            rgba_image_to_cairo_surface(raster.pixels())?
        } else {
            tracing::debug!(raster = raster.id(), ?filters, "filtering raster");
            rgba_image_to_cairo_surface(&apply_filters(raster.pixels(), filters, blur_sigma))?
        };
        // A new blur radius for the same look replaces the stale one.
        self.entries
            .retain(|cached, _| cached.raster != key.raster || cached.filters != key.filters);
        self.entries.insert(key, surface.clone());
        Some(surface)
    }

    /// Drops surfaces whose raster or filter combination is no longer drawn.
    pub fn retain_variants(&mut self, live: &[(u64, ImageFilters)]) {
        let live = live
            .iter()
            .map(|(raster, filters)| (*raster, filters.bits()))
            .collect::<HashSet<_>>();
        self.entries
            .retain(|key, _| live.contains(&(key.raster, key.filters)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for SurfaceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}
