//! Vector rendering through resvg.
//!
//! Documents are scaled to fit a `size × size` box with their aspect ratio
//! kept. Padding to a square happens in the caller.

use super::calculations::fit_dimensions;
use crate::master::VectorDocument;
use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};

/// Render `doc` so its longer side is exactly `size` pixels.
///
/// Returns `None` if a pixmap of the computed size cannot be allocated.
pub fn render_fit(doc: &VectorDocument, size: u32) -> Option<RgbaImage> {
    let (width, height) = fit_dimensions((doc.width, doc.height), size);
    let sx = width as f32 / doc.width;
    let sy = height as f32 / doc.height;

    let mut pixmap = Pixmap::new(width, height)?;
    resvg::render(&doc.tree, Transform::from_scale(sx, sy), &mut pixmap.as_mut());
    Some(pixmap_to_rgba(&pixmap))
}

/// tiny-skia stores premultiplied alpha; `image` expects straight alpha.
fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    RgbaImage::from_fn(pixmap.width(), pixmap.height(), |x, y| {
        pixmap
            .pixel(x, y)
            .map(|p| {
                let c = p.demultiply();
                Rgba([c.red(), c.green(), c.blue(), c.alpha()])
            })
            .unwrap_or(Rgba([0, 0, 0, 0]))
    })
}
