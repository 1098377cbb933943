//! Master image loading and square normalization.
//!
//! A [`MasterImage`] is built once per run and only read afterwards, so it is
//! shared by reference across rayon workers. Raster masters are decoded to
//! RGBA up front and padded to a square; vector masters are parsed but never
//! rasterized here; each target size renders them fresh.
//!
//! Vector support is a compile-time capability (the `svg` feature). It is
//! probed once via [`Capabilities::probe`] and checked while loading, so a
//! missing capability fails before any target is touched.

use crate::imaging::calculations::center_offset;
use image::{ImageReader, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MasterError {
    #[error("cannot read master image {path}: {reason}")]
    UnreadableMaster { path: PathBuf, reason: String },
    #[error("{path} needs {capability} support, which this build does not include")]
    MissingOptionalCapability {
        path: PathBuf,
        capability: &'static str,
    },
}

/// Optional rendering capabilities available in this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub vector: bool,
}

impl Capabilities {
    pub fn probe() -> Self {
        Self {
            vector: cfg!(feature = "svg"),
        }
    }
}

/// A parsed vector document with its intrinsic view box size.
#[derive(Clone)]
pub struct VectorDocument {
    pub path: PathBuf,
    pub width: f32,
    pub height: f32,
    #[cfg(feature = "svg")]
    pub(crate) tree: std::sync::Arc<resvg::usvg::Tree>,
}

impl std::fmt::Debug for VectorDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorDocument")
            .field("path", &self.path)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum MasterImage {
    Raster(RgbaImage),
    Vector(VectorDocument),
}

impl MasterImage {
    pub fn is_vector(&self) -> bool {
        matches!(self, MasterImage::Vector(_))
    }

    /// Native edge length in pixels. `None` for vector documents.
    pub fn native_size(&self) -> Option<u32> {
        match self {
            MasterImage::Raster(img) => Some(img.width().max(img.height())),
            MasterImage::Vector(_) => None,
        }
    }
}

/// Result of loading: the master plus the dimensions it had on disk.
#[derive(Debug, Clone)]
pub struct LoadedMaster {
    pub image: MasterImage,
    /// `(width, height)` before normalization. `None` for vector documents.
    pub original_dimensions: Option<(u32, u32)>,
}

impl LoadedMaster {
    pub fn was_padded(&self) -> bool {
        self.original_dimensions.is_some_and(|(w, h)| w != h)
    }
}

fn is_vector_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg") || e.eq_ignore_ascii_case("svgz"))
}

/// Load the master image at `path`.
///
/// Raster images are decoded (format sniffed from content) and squared with
/// [`normalize_square`]. `.svg`/`.svgz` files are parsed into a
/// [`VectorDocument`] when `caps.vector` is set and rejected otherwise.
pub fn load(path: &Path, caps: Capabilities) -> Result<LoadedMaster, MasterError> {
    let unreadable = |reason: String| MasterError::UnreadableMaster {
        path: path.to_path_buf(),
        reason,
    };

    if !path.is_file() {
        return Err(unreadable("file not found".into()));
    }

    if is_vector_path(path) {
        if !caps.vector {
            return Err(MasterError::MissingOptionalCapability {
                path: path.to_path_buf(),
                capability: "SVG rendering",
            });
        }
        let doc = load_vector(path)?;
        return Ok(LoadedMaster {
            image: MasterImage::Vector(doc),
            original_dimensions: None,
        });
    }

    let decoded = ImageReader::open(path)
        .map_err(|e| unreadable(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| unreadable(e.to_string()))?
        .decode()
        .map_err(|e| unreadable(e.to_string()))?
        .to_rgba8();

    let dims = decoded.dimensions();
    Ok(LoadedMaster {
        image: MasterImage::Raster(normalize_square(decoded)),
        original_dimensions: Some(dims),
    })
}

/// Parse an SVG master.
///
/// Text is shaped against the system fonts and relative `<image>` hrefs
/// resolve next to the master file.
#[cfg(feature = "svg")]
fn load_vector(path: &Path) -> Result<VectorDocument, MasterError> {
    use resvg::usvg::{Options, Tree};

    let data = std::fs::read(path).map_err(|e| MasterError::UnreadableMaster {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut options = Options {
        resources_dir: path.parent().map(Path::to_path_buf),
        ..Options::default()
    };
    options.fontdb_mut().load_system_fonts();
    let tree = Tree::from_data(&data, &options).map_err(|e| {
        MasterError::UnreadableMaster {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;
    let size = tree.size();
    Ok(VectorDocument {
        path: path.to_path_buf(),
        width: size.width(),
        height: size.height(),
        tree: std::sync::Arc::new(tree),
    })
}

#[cfg(not(feature = "svg"))]
fn load_vector(path: &Path) -> Result<VectorDocument, MasterError> {
    Err(MasterError::MissingOptionalCapability {
        path: path.to_path_buf(),
        capability: "SVG rendering",
    })
}

/// Pad `img` to a square with fully transparent pixels, original centered.
///
/// Offsets are floored: an 800×600 image lands at `(0, 100)` on an 800×800
/// canvas. Square input is returned as-is.
pub fn normalize_square(img: RgbaImage) -> RgbaImage {
    let (w, h) = img.dimensions();
    if w == h {
        return img;
    }
    let edge = w.max(h);
    let (x, y) = center_offset((w, h), edge);
    let mut canvas = RgbaImage::new(edge, edge);
    image::imageops::replace(&mut canvas, &img, x as i64, y as i64);
    canvas
}
