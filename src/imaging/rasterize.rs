//! Per-size rasterization.
//!
//! | Source | Method |
//! |---|---|
//! | Raster | `image::imageops::resize` with `Lanczos3` on the squared master |
//! | Vector | resvg fit-render, then centered on a transparent square |
//!
//! Both paths are deterministic: the same master and size always produce
//! the same pixels.

use super::calculations::center_offset;
use crate::master::{MasterImage, VectorDocument};
use image::RgbaImage;
use image::imageops::FilterType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot render {size}x{size} icon: {reason}")]
    Failed { size: u32, reason: String },
}

/// Produce an RGBA bitmap of exactly `size × size` from `source`.
pub fn render(source: &MasterImage, size: u32) -> Result<RgbaImage, RenderError> {
    if size == 0 {
        return Err(RenderError::Failed {
            size,
            reason: "size must be positive".into(),
        });
    }
    match source {
        MasterImage::Raster(img) => Ok(resample(img, size)),
        MasterImage::Vector(doc) => render_vector(doc, size).map(|img| pad_square(&img, size)),
    }
}

fn resample(img: &RgbaImage, size: u32) -> RgbaImage {
    if img.dimensions() == (size, size) {
        return img.clone();
    }
    image::imageops::resize(img, size, size, FilterType::Lanczos3)
}

#[cfg(feature = "svg")]
fn render_vector(doc: &VectorDocument, size: u32) -> Result<RgbaImage, RenderError> {
    super::svg::render_fit(doc, size).ok_or_else(|| RenderError::Failed {
        size,
        reason: format!("cannot allocate canvas for {}", doc.path.display()),
    })
}

#[cfg(not(feature = "svg"))]
fn render_vector(doc: &VectorDocument, size: u32) -> Result<RgbaImage, RenderError> {
    Err(RenderError::Failed {
        size,
        reason: format!("SVG rendering unavailable for {}", doc.path.display()),
    })
}

/// Center `img` on a transparent `size × size` canvas.
fn pad_square(img: &RgbaImage, size: u32) -> RgbaImage {
    if img.dimensions() == (size, size) {
        return img.clone();
    }
    let (x, y) = center_offset(img.dimensions(), size);
    let mut canvas = RgbaImage::new(size, size);
    image::imageops::replace(&mut canvas, img, x as i64, y as i64);
    canvas
}
