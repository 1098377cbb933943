//! # iconforge
//!
//! Turns one master image into every icon file a multi-platform app build
//! needs: Android launcher densities, the iOS and macOS appiconsets, web
//! favicons and maskable PWA icons, store listings, and the multi-resolution
//! Windows `.ico`.
//!
//! # Pipeline
//!
//! ```text
//! master.png / master.svg
//!   → load + square-pad        (master)
//!   → resolve platforms        (catalog)
//!   → render each size         (imaging::rasterize)
//!   → strip alpha if required  (imaging::opaque)
//!   → write PNG / ICO          (imaging::fs_writer)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Platform enum, static size/path tables, `TargetSpec` |
//! | [`master`] | Master image loading, capability probe, square normalization |
//! | [`imaging`] | Resampling, vector rendering, opacity, PNG/ICO writing |
//! | [`generate`] | Orchestration: advisories, parallel render/write, report |
//! | [`config`] | Optional `iconforge.toml` in the project root |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Closed Platform Set
//!
//! Platforms are an enum, not a registry. Each variant owns its size table
//! and builds its targets from the project root with no I/O, so the full set
//! of output paths is known (and validated) before a single pixel is
//! rendered.
//!
//! ## Deterministic Output
//!
//! Raster masters are resampled with Lanczos3 and encoded with fixed PNG
//! settings. Running twice over the same master yields byte-identical files,
//! so generated icons can be committed without churn.
//!
//! ## Opacity as Target Data
//!
//! Whether an icon may carry alpha is a flag on its [`catalog::TargetSpec`],
//! set by the platform that owns it. The pipeline never looks paths up in a
//! side table.
//!
//! ## Vector Support Is a Build Feature
//!
//! SVG rendering (resvg) sits behind the default `svg` feature. The
//! capability is probed once at startup and an SVG master is rejected before
//! any work if it is missing.

pub mod catalog;
pub mod config;
pub mod generate;
pub mod imaging;
pub mod master;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
