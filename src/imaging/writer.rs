//! Icon writer trait and shared types.
//!
//! The [`IconWriter`] trait is the seam between orchestration and disk. It has
//! two modes: one bitmap to one file, and several frames to one container.
//! The production implementation is
//! [`FsIconWriter`](super::fs_writer::FsIconWriter); tests swap in a recording
//! mock so the pipeline can be exercised without encoding anything.

use image::{RgbImage, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to write {path}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {path}: {reason}")]
    Encode { path: PathBuf, reason: String },
}

/// A rendered icon, with or without an alpha channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Bitmap {
    Rgba(RgbaImage),
    /// Produced by opacity enforcement.
    Rgb(RgbImage),
}

impl Bitmap {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Bitmap::Rgba(img) => img.dimensions(),
            Bitmap::Rgb(img) => img.dimensions(),
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, Bitmap::Rgba(_))
    }
}

/// One frame of a multi-frame container.
///
/// Frames of opaque targets are [`Bitmap::Rgb`] and are stored without alpha.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub size: u32,
    pub bitmap: Bitmap,
}

/// Persists rendered icons.
///
/// Implementations must be `Sync`: targets are written from rayon workers.
pub trait IconWriter: Sync {
    /// Write one bitmap to `path`, creating parent directories as needed.
    fn write_single(&self, path: &Path, bitmap: &Bitmap) -> Result<(), WriteError>;

    /// Write all `frames` into one container at `path`.
    ///
    /// Frames are stored smallest first; the first frame is the primary one.
    fn write_container(&self, path: &Path, frames: &[Frame]) -> Result<(), WriteError>;
}

/// Frames ordered by ascending size, stable for equal sizes.
pub fn sorted_frames(frames: &[Frame]) -> Vec<&Frame> {
    let mut sorted: Vec<&Frame> = frames.iter().collect();
    sorted.sort_by_key(|f| f.size);
    sorted
}
