//! Filesystem icon writer: PNG files and multi-frame ICO containers.
//!
//! Everything is pure Rust and statically linked.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Single icon → PNG | `image::codecs::png::PngEncoder` (RGBA8 or RGB8) |
//! | Container → ICO | `image::codecs::ico::IcoEncoder`, one PNG-compressed `IcoFrame` per size |
//! | Parent directories | `std::fs::create_dir_all` (tolerates concurrent creation) |
//!
//! Encoder settings are fixed, so identical bitmaps always produce
//! byte-identical files.

use super::writer::{Bitmap, Frame, IconWriter, WriteError, sorted_frames};
use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes icons to the local filesystem.
pub struct FsIconWriter;

impl FsIconWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FsIconWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn io_failure(path: &Path, source: std::io::Error) -> WriteError {
    WriteError::WriteFailure {
        path: path.to_path_buf(),
        source,
    }
}

fn image_failure(path: &Path, err: ImageError) -> WriteError {
    match err {
        ImageError::IoError(source) => io_failure(path, source),
        other => WriteError::Encode {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

/// Create `path`'s parent directory if it is missing.
///
/// `create_dir_all` treats a directory that appeared concurrently as success,
/// so workers racing on a shared parent do not fail.
fn ensure_parent(path: &Path) -> Result<(), WriteError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| io_failure(path, e))
        }
        _ => Ok(()),
    }
}

fn create(path: &Path) -> Result<BufWriter<File>, WriteError> {
    ensure_parent(path)?;
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| io_failure(path, e))
}

/// Encode a bitmap as PNG bytes into `writer`.
fn encode_png<W: Write>(writer: W, bitmap: &Bitmap) -> Result<(), ImageError> {
    let (w, h) = bitmap.dimensions();
    let encoder = PngEncoder::new(writer);
    match bitmap {
        Bitmap::Rgba(img) => encoder.write_image(img.as_raw(), w, h, ExtendedColorType::Rgba8),
        Bitmap::Rgb(img) => encoder.write_image(img.as_raw(), w, h, ExtendedColorType::Rgb8),
    }
}

impl IconWriter for FsIconWriter {
    fn write_single(&self, path: &Path, bitmap: &Bitmap) -> Result<(), WriteError> {
        let mut out = create(path)?;
        encode_png(&mut out, bitmap).map_err(|e| image_failure(path, e))?;
        out.flush().map_err(|e| io_failure(path, e))
    }

    fn write_container(&self, path: &Path, frames: &[Frame]) -> Result<(), WriteError> {
        if frames.is_empty() {
            return Err(WriteError::Encode {
                path: path.to_path_buf(),
                reason: "container needs at least one frame".into(),
            });
        }

        let ico_frames = sorted_frames(frames)
            .into_iter()
            .map(|frame| {
                let (w, h) = frame.bitmap.dimensions();
                let (raw, color) = match &frame.bitmap {
                    Bitmap::Rgba(img) => (img.as_raw(), ExtendedColorType::Rgba8),
                    Bitmap::Rgb(img) => (img.as_raw(), ExtendedColorType::Rgb8),
                };
                IcoFrame::as_png(raw, w, h, color)
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| image_failure(path, e))?;

        let mut out = create(path)?;
        IcoEncoder::new(&mut out)
            .encode_images(&ico_frames)
            .map_err(|e| image_failure(path, e))?;
        out.flush().map_err(|e| io_failure(path, e))
    }
}

/// Frame sizes recorded in an ICO directory, in stored order.
///
/// A stored width of 0 means 256 pixels.
pub fn ico_frame_sizes(data: &[u8]) -> Option<Vec<u32>> {
    let header = data.get(..6)?;
    if header[0..4] != [0, 0, 1, 0] {
        return None;
    }
    let count = u16::from_le_bytes([header[4], header[5]]) as usize;
    (0..count)
        .map(|i| {
            let entry = data.get(6 + i * 16..6 + (i + 1) * 16)?;
            Some(if entry[0] == 0 { 256 } else { entry[0] as u32 })
        })
        .collect()
}
