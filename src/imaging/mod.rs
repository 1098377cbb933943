//! Icon pixel work in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Resample** | `image::imageops::resize` (Lanczos3) |
//! | **Vector render** | `resvg` (feature `svg`) |
//! | **Opacity** | alpha composite onto a solid background |
//! | **Write PNG / ICO** | `image` PNG + ICO encoders |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for centering and fit math (unit testable)
//! - **Rasterize**: exact `size × size` bitmaps from a master
//! - **Opaque**: alpha stripping for platforms that reject transparency
//! - **Writer**: [`IconWriter`] trait + [`FsIconWriter`]

pub mod calculations;
pub mod fs_writer;
pub mod opaque;
pub mod rasterize;
#[cfg(feature = "svg")]
pub mod svg;
pub mod writer;

pub use fs_writer::FsIconWriter;
pub use opaque::strip_alpha;
pub use rasterize::{RenderError, render};
pub use writer::{Bitmap, Frame, IconWriter, WriteError};
