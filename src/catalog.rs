//! Platform target catalog.
//!
//! Every platform the tool knows about is a variant of [`Platform`]. Each
//! variant owns a static size/path table and a builder that resolves it
//! against a project root into an ordered list of [`TargetSpec`]s. Building
//! targets is a pure function: no filesystem access, no global state.
//!
//! ## Platforms
//!
//! | Platform | Default | Container | Files |
//! |---|---|---|---|
//! | `android` | yes | single | 15 (`ic_launcher`, `_round`, `_foreground` × 5 densities) |
//! | `ios` | yes | single | 15 (opaque) |
//! | `macos` | yes | single | 7 |
//! | `linux` | yes | single | 1 |
//! | `web` | yes | single | 5 |
//! | `windows` | yes | multi-frame `.ico` | 1 (14 frames) |
//! | `store` | yes | single | 2 (App Store listing opaque) |
//! | `watchos` | opt-in | single | 11 (opaque) |
//! | `ios-legacy` | opt-in | single | 6 (opaque) |
//!
//! Adding a platform means adding a variant, its table, and an arm in
//! [`Platform::build_targets`].

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown platform '{0}' (expected one of: {known})", known = Platform::names().join(", "))]
pub struct UnknownPlatform(pub String);

/// One concrete output request: a path and the exact pixel size required there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    pub output_path: PathBuf,
    pub pixel_size: u32,
    pub platform: Platform,
    /// Written without an alpha channel.
    pub requires_opaque: bool,
}

/// How a platform's targets land on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// One file per target.
    Single,
    /// All targets are frames of one container file.
    MultiFrame,
}

/// Static description of a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformEntry {
    pub name: &'static str,
    pub container_kind: ContainerKind,
    /// Container file, relative to the project root. `None` for single-file platforms.
    pub container_path: Option<&'static str>,
    pub default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    Android,
    Ios,
    Macos,
    Linux,
    Web,
    Windows,
    Store,
    Watchos,
    IosLegacy,
}

// =============================================================================
// Size tables
// =============================================================================

const ANDROID_RES: &str = "android/app/src/main/res";

/// `(density directory, launcher size)`. The foreground layer is 1.5× larger.
const ANDROID_DENSITIES: &[(&str, u32)] = &[
    ("mipmap-mdpi", 48),
    ("mipmap-hdpi", 72),
    ("mipmap-xhdpi", 96),
    ("mipmap-xxhdpi", 144),
    ("mipmap-xxxhdpi", 192),
];

const IOS_APPICONSET: &str = "ios/Runner/Assets.xcassets/AppIcon.appiconset";

/// `(point size label, scale)` from the Xcode AppIcon template.
const IOS_ICONS: &[(&str, u32)] = &[
    ("20x20", 1),
    ("20x20", 2),
    ("20x20", 3),
    ("29x29", 1),
    ("29x29", 2),
    ("29x29", 3),
    ("40x40", 1),
    ("40x40", 2),
    ("40x40", 3),
    ("60x60", 2),
    ("60x60", 3),
    ("76x76", 1),
    ("76x76", 2),
    ("83.5x83.5", 2),
    ("1024x1024", 1),
];

const IOS_LEGACY_ICONS: &[(&str, u32)] = &[
    ("50x50", 1),
    ("50x50", 2),
    ("57x57", 1),
    ("57x57", 2),
    ("72x72", 1),
    ("72x72", 2),
];

const WATCHOS_APPICONSET: &str = "ios/WatchApp/Assets.xcassets/AppIcon.appiconset";

const WATCHOS_ICONS: &[(&str, u32)] = &[
    ("24x24", 2),
    ("27.5x27.5", 2),
    ("29x29", 2),
    ("40x40", 2),
    ("29x29", 3),
    ("44x44", 2),
    ("50x50", 2),
    ("86x86", 2),
    ("98x98", 2),
    ("108x108", 2),
    ("1024x1024", 1),
];

const MACOS_APPICONSET: &str = "macos/Runner/Assets.xcassets/AppIcon.appiconset";
const MACOS_SIZES: &[u32] = &[16, 32, 64, 128, 256, 512, 1024];

const LINUX_ICON: (&str, u32) = ("linux/flutter/app_icon.png", 256);

const WEB_ICONS: &[(&str, u32)] = &[
    ("web/favicon.png", 32),
    ("web/icons/Icon-192.png", 192),
    ("web/icons/Icon-512.png", 512),
    ("web/icons/Icon-maskable-192.png", 192),
    ("web/icons/Icon-maskable-512.png", 512),
];

const WINDOWS_ICO: &str = "windows/runner/resources/app_icon.ico";
const WINDOWS_ICO_SIZES: &[u32] = &[16, 20, 24, 30, 32, 36, 40, 48, 60, 64, 72, 80, 96, 256];

/// `(file, size, requires_opaque)`.
const STORE_ICONS: &[(&str, u32, bool)] = &[
    ("appstore.png", 1024, true),
    ("playstore.png", 512, false),
];

// =============================================================================
// Platform
// =============================================================================

impl Platform {
    /// Every platform in catalog order.
    pub fn all() -> &'static [Platform] {
        &[
            Platform::Android,
            Platform::Ios,
            Platform::Macos,
            Platform::Linux,
            Platform::Web,
            Platform::Windows,
            Platform::Store,
            Platform::Watchos,
            Platform::IosLegacy,
        ]
    }

    /// Platforms generated when none are requested.
    pub fn defaults() -> Vec<Platform> {
        Self::all().iter().copied().filter(|p| p.entry().default).collect()
    }

    /// Platforms generated only when named explicitly.
    pub fn opt_in() -> Vec<Platform> {
        Self::all().iter().copied().filter(|p| !p.entry().default).collect()
    }

    pub fn names() -> Vec<&'static str> {
        Self::all().iter().map(|p| p.name()).collect()
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }

    pub fn entry(self) -> PlatformEntry {
        let single = |name, default| PlatformEntry {
            name,
            container_kind: ContainerKind::Single,
            container_path: None,
            default,
        };
        match self {
            Platform::Android => single("android", true),
            Platform::Ios => single("ios", true),
            Platform::Macos => single("macos", true),
            Platform::Linux => single("linux", true),
            Platform::Web => single("web", true),
            Platform::Windows => PlatformEntry {
                name: "windows",
                container_kind: ContainerKind::MultiFrame,
                container_path: Some(WINDOWS_ICO),
                default: true,
            },
            Platform::Store => single("store", true),
            Platform::Watchos => single("watchos", false),
            Platform::IosLegacy => single("ios-legacy", false),
        }
    }

    /// Whether every target of this platform is written without alpha.
    pub fn requires_opaque(self) -> bool {
        matches!(
            self,
            Platform::Ios | Platform::Watchos | Platform::IosLegacy
        )
    }

    /// Resolve this platform's table against `project_root`.
    ///
    /// For multi-frame platforms every spec shares the container path and
    /// there is one spec per frame, in ascending size order.
    pub fn build_targets(self, project_root: &Path) -> Vec<TargetSpec> {
        let opaque = self.requires_opaque();
        let spec = |path: PathBuf, size: u32| TargetSpec {
            output_path: path,
            pixel_size: size,
            platform: self,
            requires_opaque: opaque,
        };

        match self {
            Platform::Android => {
                let res = project_root.join(ANDROID_RES);
                let mut targets = Vec::with_capacity(ANDROID_DENSITIES.len() * 3);
                for &(density, size) in ANDROID_DENSITIES {
                    let dir = res.join(density);
                    targets.push(spec(dir.join("ic_launcher.png"), size));
                    targets.push(spec(dir.join("ic_launcher_round.png"), size));
                    targets.push(spec(dir.join("ic_launcher_foreground.png"), size * 3 / 2));
                }
                targets
            }
            Platform::Ios => apple_set(&project_root.join(IOS_APPICONSET), "Icon-App", IOS_ICONS)
                .map(|(path, size)| spec(path, size))
                .collect(),
            Platform::IosLegacy => {
                apple_set(&project_root.join(IOS_APPICONSET), "Icon-App", IOS_LEGACY_ICONS)
                    .map(|(path, size)| spec(path, size))
                    .collect()
            }
            Platform::Watchos => {
                apple_set(&project_root.join(WATCHOS_APPICONSET), "Icon-Watch", WATCHOS_ICONS)
                    .map(|(path, size)| spec(path, size))
                    .collect()
            }
            Platform::Macos => {
                let dir = project_root.join(MACOS_APPICONSET);
                MACOS_SIZES
                    .iter()
                    .map(|&size| spec(dir.join(format!("app_icon_{size}.png")), size))
                    .collect()
            }
            Platform::Linux => vec![spec(project_root.join(LINUX_ICON.0), LINUX_ICON.1)],
            Platform::Web => WEB_ICONS
                .iter()
                .map(|&(path, size)| spec(project_root.join(path), size))
                .collect(),
            Platform::Windows => {
                let path = project_root.join(WINDOWS_ICO);
                let mut sizes = WINDOWS_ICO_SIZES.to_vec();
                sizes.sort_unstable();
                sizes.into_iter().map(|size| spec(path.clone(), size)).collect()
            }
            Platform::Store => STORE_ICONS
                .iter()
                .map(|&(path, size, opaque)| TargetSpec {
                    output_path: project_root.join(path),
                    pixel_size: size,
                    platform: self,
                    requires_opaque: opaque,
                })
                .collect(),
        }
    }

    /// Number of files this platform writes (containers count once).
    pub fn file_count(self) -> usize {
        match self.entry().container_kind {
            ContainerKind::MultiFrame => 1,
            ContainerKind::Single => self.build_targets(Path::new("")).len(),
        }
    }
}

/// Expand an Apple appiconset table into `(path, pixel size)` pairs.
///
/// The pixel size is the point size times the scale, rounded down
/// (`83.5x83.5@2x` → 167).
fn apple_set<'a>(
    dir: &'a Path,
    prefix: &'a str,
    table: &'a [(&'a str, u32)],
) -> impl Iterator<Item = (PathBuf, u32)> + 'a {
    table.iter().map(move |&(points, scale)| {
        let edge: f64 = points
            .split('x')
            .next()
            .and_then(|p| p.parse().ok())
            .unwrap_or(0.0);
        let size = (edge * scale as f64) as u32;
        (dir.join(format!("{prefix}-{points}@{scale}x.png")), size)
    })
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownPlatform(wanted.to_string()))
    }
}

/// Parse a list of platform names, dropping duplicates but keeping first-seen order.
pub fn parse_platforms<S: AsRef<str>>(names: &[S]) -> Result<Vec<Platform>, UnknownPlatform> {
    let mut platforms = Vec::with_capacity(names.len());
    for name in names {
        let platform: Platform = name.as_ref().parse()?;
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }
    Ok(platforms)
}

/// Collect targets for several platforms into one list.
pub fn build_all_targets(platforms: &[Platform], project_root: &Path) -> Vec<TargetSpec> {
    platforms
        .iter()
        .flat_map(|p| p.build_targets(project_root))
        .collect()
}
