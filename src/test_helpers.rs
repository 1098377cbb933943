//! Shared test utilities: synthetic masters and fixture writers.

use crate::master::{LoadedMaster, MasterImage};
use image::{Rgba, RgbaImage};
use std::path::Path;

// =========================================================================
// Synthetic images
// =========================================================================

pub fn solid_rgba(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

/// A square image with a diagonal color ramp and a transparent corner, so
/// resampling and alpha handling both have something to chew on.
pub fn gradient_rgba(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        let alpha = if x < size / 4 && y < size / 4 { 0 } else { 255 };
        Rgba([
            (x * 255 / size.max(1)) as u8,
            (y * 255 / size.max(1)) as u8,
            128,
            alpha,
        ])
    })
}

/// Wrap an already-square image as a loaded raster master.
pub fn raster_master(img: RgbaImage) -> LoadedMaster {
    let dims = img.dimensions();
    LoadedMaster {
        image: MasterImage::Raster(img),
        original_dimensions: Some(dims),
    }
}

// =========================================================================
// Fixture files
// =========================================================================

pub fn write_png(path: &Path, img: &RgbaImage) {
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Write an SVG whose view box is `width × height`, filled with opaque red.
#[cfg(feature = "svg")]
pub fn write_svg(path: &Path, width: u32, height: u32) {
    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><rect x="0" y="0" width="{width}" height="{height}" fill="#ff0000"/></svg>"##
    );
    std::fs::write(path, svg).unwrap();
}
