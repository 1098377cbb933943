//! Opacity enforcement for platforms that reject transparent icons.

use image::{Rgb, RgbImage, RgbaImage};

/// Composite `img` over a solid `background`, using its own alpha as the
/// blend mask. The result has no alpha channel.
pub fn strip_alpha(img: &RgbaImage, background: Rgb<u8>) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let px = img.get_pixel(x, y);
        let a = px[3] as u32;
        let blend = |fg: u8, bg: u8| ((fg as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8;
        Rgb([
            blend(px[0], background[0]),
            blend(px[1], background[1]),
            blend(px[2], background[2]),
        ])
    })
}

/// The default composite color.
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
