//! Pure geometry for icon rendering.
//!
//! All functions here are pure and testable without any I/O or images.

use crate::catalog::TargetSpec;

/// Top-left offset that centers a `(width, height)` image on a square
/// canvas of `edge` pixels.
///
/// Offsets are floored, so an odd leftover pixel goes to the right/bottom.
///
/// # Examples
/// ```
/// # use iconforge::imaging::calculations::center_offset;
/// assert_eq!(center_offset((800, 600), 800), (0, 100));
/// assert_eq!(center_offset((50, 101), 101), (25, 0));
/// ```
pub fn center_offset(dims: (u32, u32), edge: u32) -> (u32, u32) {
    let (w, h) = dims;
    (edge.saturating_sub(w) / 2, edge.saturating_sub(h) / 2)
}

/// Pixel dimensions for fitting a `(width, height)` view box inside a
/// `size × size` box, preserving aspect ratio.
///
/// The longer side becomes exactly `size`; the shorter one is rounded and
/// never drops below 1 pixel.
pub fn fit_dimensions(view_box: (f32, f32), size: u32) -> (u32, u32) {
    let (w, h) = view_box;
    let longer = w.max(h);
    if longer <= 0.0 {
        return (size, size);
    }
    let scale = size as f64 / longer as f64;
    let fit = |side: f32| ((side as f64 * scale).round() as u32).clamp(1, size);
    if w >= h {
        (size, fit(h))
    } else {
        (fit(w), size)
    }
}

/// Largest pixel size requested by any target. `None` for an empty list.
pub fn largest_size(targets: &[TargetSpec]) -> Option<u32> {
    targets.iter().map(|t| t.pixel_size).max()
}
