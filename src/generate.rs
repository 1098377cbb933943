//! Icon generation pipeline.
//!
//! Drives the whole run: platform selection, the upscaling check, per-size
//! rendering, opacity enforcement, and writing. Single-file targets are
//! grouped by pixel size and each group is handled by one rayon task;
//! multi-frame platforms render their frames in parallel and are written as
//! one container at the end.
//!
//! ## Shared sizes
//!
//! Several catalog targets share a pixel size on different paths (iOS
//! `20x20@2x` and `40x40@1x` are both 40 px, web `Icon-192` and
//! `Icon-maskable-192` both 192 px). They are treated as fan-out: one render,
//! one write per path. Nothing is de-duplicated.
//!
//! ## Failure
//!
//! The first render or write error aborts the run. Files written before the
//! error stay on disk; rerunning regenerates a consistent set.

use crate::catalog::{ContainerKind, Platform, TargetSpec, UnknownPlatform, parse_platforms};
use crate::config::ConfigError;
use crate::imaging::calculations::largest_size;
use crate::imaging::{Bitmap, Frame, IconWriter, RenderError, WriteError, render, strip_alpha};
use crate::master::{Capabilities, LoadedMaster, MasterError, MasterImage};
use image::Rgb;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    UnknownPlatform(#[from] UnknownPlatform),
    #[error(transparent)]
    Master(#[from] MasterError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Non-fatal conditions reported to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// The raster master was padded to a square.
    NonSquare { width: u32, height: u32 },
    /// The raster master is smaller than the largest requested icon.
    Upscaling { source: u32, largest: u32 },
}

/// One file actually written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenIcon {
    pub path: PathBuf,
    /// Pixel size; the largest frame for containers.
    pub size: u32,
    pub platform: Platform,
    /// Frame sizes, ascending. Empty for single-file icons.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<u32>,
}

/// Everything a run produced, for reporting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub platforms: Vec<Platform>,
    pub written: Vec<WrittenIcon>,
    pub advisories: Vec<Advisory>,
}

impl GenerationReport {
    pub fn count(&self) -> usize {
        self.written.len()
    }
}

/// Progress reported while the pipeline runs.
#[derive(Debug, Clone)]
pub enum GenerateEvent {
    Advisory(Advisory),
    Written(WrittenIcon),
}

/// Knobs that are not part of the catalog.
#[derive(Debug, Clone, Copy)]
pub struct GenerateOptions {
    /// Composite color for `requires_opaque` targets.
    pub background: Rgb<u8>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            background: crate::imaging::opaque::WHITE,
        }
    }
}

/// Resolve requested platform names, falling back to `defaults` when none were given.
///
/// Every name is validated before anything else happens.
pub fn resolve_platforms<S: AsRef<str>>(
    requested: Option<&[S]>,
    defaults: &[Platform],
) -> Result<Vec<Platform>, UnknownPlatform> {
    match requested {
        Some(names) if !names.is_empty() => parse_platforms(names),
        _ => Ok(defaults.to_vec()),
    }
}

/// Check the master against the targets and collect advisories.
///
/// Vector masters never trigger the upscaling advisory.
pub fn advisories_for(master: &LoadedMaster, targets: &[TargetSpec]) -> Vec<Advisory> {
    let mut advisories = Vec::new();
    if let Some((width, height)) = master.original_dimensions.filter(|_| master.was_padded()) {
        advisories.push(Advisory::NonSquare { width, height });
    }
    if let (MasterImage::Raster(img), Some(largest)) = (&master.image, largest_size(targets)) {
        if img.width() < largest {
            advisories.push(Advisory::Upscaling {
                source: img.width(),
                largest,
            });
        }
    }
    advisories
}

/// Load the master, resolve platforms, and generate every icon.
///
/// Fails before touching any output if a platform name is unknown, the
/// master is unreadable, or the master needs a capability this build lacks.
pub fn run<S: AsRef<str>>(
    master_path: &Path,
    project_root: &Path,
    requested: Option<&[S]>,
    default_platforms: &[Platform],
    options: &GenerateOptions,
    writer: &impl IconWriter,
    events: Option<Sender<GenerateEvent>>,
) -> Result<GenerationReport, GenerateError> {
    let platforms = resolve_platforms(requested, default_platforms)?;
    let master = crate::master::load(master_path, Capabilities::probe())?;
    generate(&master, project_root, &platforms, options, writer, events)
}

/// Generate all icons for `platforms` from an already-loaded master.
pub fn generate(
    master: &LoadedMaster,
    project_root: &Path,
    platforms: &[Platform],
    options: &GenerateOptions,
    writer: &impl IconWriter,
    events: Option<Sender<GenerateEvent>>,
) -> Result<GenerationReport, GenerateError> {
    let emit = |event: GenerateEvent| {
        if let Some(tx) = &events {
            // A closed receiver only means nobody is listening.
            let _ = tx.send(event);
        }
    };

    let mut singles: Vec<TargetSpec> = Vec::new();
    let mut containers: Vec<(Platform, Vec<TargetSpec>)> = Vec::new();
    for &platform in platforms {
        let targets = platform.build_targets(project_root);
        match platform.entry().container_kind {
            ContainerKind::Single => singles.extend(targets),
            ContainerKind::MultiFrame => containers.push((platform, targets)),
        }
    }

    let all_targets: Vec<TargetSpec> = singles
        .iter()
        .chain(containers.iter().flat_map(|(_, t)| t.iter()))
        .cloned()
        .collect();
    let advisories = advisories_for(master, &all_targets);
    for advisory in &advisories {
        warn!(?advisory, "master image advisory");
        emit(GenerateEvent::Advisory(advisory.clone()));
    }

    let mut by_size: BTreeMap<u32, Vec<&TargetSpec>> = BTreeMap::new();
    for target in &singles {
        by_size.entry(target.pixel_size).or_default().push(target);
    }

    let groups: Vec<(u32, Vec<&TargetSpec>)> = by_size.into_iter().collect();
    let written_groups = groups
        .par_iter()
        .map(|(size, targets)| {
            let written = write_size_group(&master.image, *size, targets, options, writer)?;
            for icon in &written {
                emit(GenerateEvent::Written(icon.clone()));
            }
            Ok(written)
        })
        .collect::<Result<Vec<_>, GenerateError>>()?;

    let mut written: Vec<WrittenIcon> = written_groups.into_iter().flatten().collect();

    for (platform, frames) in &containers {
        if let Some(icon) = write_container(&master.image, *platform, project_root, frames, options, writer)? {
            emit(GenerateEvent::Written(icon.clone()));
            written.push(icon);
        }
    }

    Ok(GenerationReport {
        platforms: platforms.to_vec(),
        written,
        advisories,
    })
}

/// Render `size` once and write it to every target in the group.
fn write_size_group(
    source: &MasterImage,
    size: u32,
    targets: &[&TargetSpec],
    options: &GenerateOptions,
    writer: &impl IconWriter,
) -> Result<Vec<WrittenIcon>, GenerateError> {
    let rgba = render(source, size)?;
    let mut opaque: Option<Bitmap> = None;
    let transparent = Bitmap::Rgba(rgba);

    let mut written = Vec::with_capacity(targets.len());
    for target in targets {
        let bitmap: &Bitmap = if target.requires_opaque {
            &*opaque.get_or_insert_with(|| match &transparent {
                Bitmap::Rgba(img) => Bitmap::Rgb(strip_alpha(img, options.background)),
                other => other.clone(),
            })
        } else {
            &transparent
        };
        writer.write_single(&target.output_path, bitmap)?;
        debug!(
            size,
            opaque = target.requires_opaque,
            path = %target.output_path.display(),
            "wrote icon"
        );
        written.push(WrittenIcon {
            path: target.output_path.clone(),
            size,
            platform: target.platform,
            frames: Vec::new(),
        });
    }
    Ok(written)
}

/// Render one frame per target and write them as a single container.
///
/// The file lands at the platform's catalog container path.
fn write_container(
    source: &MasterImage,
    platform: Platform,
    project_root: &Path,
    targets: &[TargetSpec],
    options: &GenerateOptions,
    writer: &impl IconWriter,
) -> Result<Option<WrittenIcon>, GenerateError> {
    let Some(container) = platform.entry().container_path else {
        return Ok(None);
    };
    if targets.is_empty() {
        return Ok(None);
    }
    let path = project_root.join(container);

    let mut frames = targets
        .par_iter()
        .map(|target| {
            let image = render(source, target.pixel_size)?;
            let bitmap = if target.requires_opaque {
                Bitmap::Rgb(strip_alpha(&image, options.background))
            } else {
                Bitmap::Rgba(image)
            };
            Ok(Frame {
                size: target.pixel_size,
                bitmap,
            })
        })
        .collect::<Result<Vec<_>, GenerateError>>()?;
    frames.sort_by_key(|f| f.size);

    writer.write_container(&path, &frames)?;
    let sizes: Vec<u32> = frames.iter().map(|f| f.size).collect();
    debug!(%platform, frames = ?sizes, path = %path.display(), "wrote container");

    Ok(Some(WrittenIcon {
        path,
        size: sizes.last().copied().unwrap_or(0),
        platform,
        frames: sizes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::writer::tests::{MockWriter, RecordedWrite};
    use crate::test_helpers::{gradient_rgba, raster_master};

    fn ops_for(
        platforms: &[Platform],
        master: &LoadedMaster,
    ) -> (GenerationReport, Vec<RecordedWrite>) {
        let writer = MockWriter::new();
        let report = generate(
            master,
            Path::new("/proj"),
            platforms,
            &GenerateOptions::default(),
            &writer,
            None,
        )
        .unwrap();
        (report, writer.get_operations())
    }

    #[test]
    fn file_count_matches_catalog() {
        let master = raster_master(gradient_rgba(64));
        let platforms = Platform::defaults();
        let (report, ops) = ops_for(&platforms, &master);

        let expected: usize = platforms.iter().map(|p| p.file_count()).sum();
        assert_eq!(report.count(), expected);
        assert_eq!(ops.len(), expected);
        assert!(
            report
                .advisories
                .iter()
                .any(|a| matches!(a, Advisory::Upscaling { source: 64, largest: 1024 }))
        );
    }

    #[test]
    fn singles_are_written_in_ascending_size_order() {
        let master = raster_master(gradient_rgba(64));
        let (report, _) = ops_for(&[Platform::Macos, Platform::Web], &master);
        let sizes: Vec<u32> = report.written.iter().map(|w| w.size).collect();
        let mut sorted = sizes.clone();
        sorted.sort_unstable();
        assert_eq!(sizes, sorted);
    }

    #[test]
    fn opaque_targets_lose_alpha() {
        let master = raster_master(gradient_rgba(64));
        let (_, ops) = ops_for(&[Platform::Ios, Platform::Store], &master);
        for op in ops {
            let RecordedWrite::Single { path, has_alpha, .. } = op else {
                panic!("unexpected container");
            };
            let opaque = path.starts_with("/proj/ios") || path.ends_with("appstore.png");
            assert_eq!(has_alpha, !opaque, "{}", path.display());
        }
    }

    #[test]
    fn container_is_one_write_with_ascending_frames() {
        let master = raster_master(gradient_rgba(64));
        let (report, ops) = ops_for(&[Platform::Windows], &master);
        assert_eq!(ops.len(), 1);
        assert_eq!(
            ops[0],
            RecordedWrite::Container {
                path: PathBuf::from("/proj/windows/runner/resources/app_icon.ico"),
                sizes: vec![16, 20, 24, 30, 32, 36, 40, 48, 60, 64, 72, 80, 96, 256],
                has_alpha: true,
            }
        );
        assert_eq!(report.written[0].size, 256);
        assert_eq!(report.written[0].frames[0], 16);
    }

    #[test]
    fn opaque_container_frames_lose_alpha() {
        let master = raster_master(gradient_rgba(64));
        let root = Path::new("/proj");
        let targets: Vec<TargetSpec> = Platform::Windows
            .build_targets(root)
            .into_iter()
            .map(|t| TargetSpec {
                requires_opaque: true,
                ..t
            })
            .collect();
        let writer = MockWriter::new();

        let icon = write_container(
            &master.image,
            Platform::Windows,
            root,
            &targets,
            &GenerateOptions::default(),
            &writer,
        )
        .unwrap()
        .unwrap();

        assert_eq!(icon.frames.len(), targets.len());
        assert!(matches!(
            &writer.get_operations()[0],
            RecordedWrite::Container { has_alpha: false, .. }
        ));
    }

    #[test]
    fn container_path_comes_from_catalog_entry() {
        let master = raster_master(gradient_rgba(16));
        let root = Path::new("/proj");
        // Frame paths are irrelevant to where the container lands.
        let targets: Vec<TargetSpec> = Platform::Windows
            .build_targets(root)
            .into_iter()
            .map(|t| TargetSpec {
                output_path: PathBuf::from("/elsewhere/frame.png"),
                ..t
            })
            .collect();
        let writer = MockWriter::new();

        let icon = write_container(
            &master.image,
            Platform::Windows,
            root,
            &targets,
            &GenerateOptions::default(),
            &writer,
        )
        .unwrap()
        .unwrap();

        assert_eq!(icon.path, root.join("windows/runner/resources/app_icon.ico"));
    }

    #[test]
    fn single_file_platform_has_no_container() {
        let master = raster_master(gradient_rgba(16));
        let root = Path::new("/proj");
        let writer = MockWriter::new();
        let result = write_container(
            &master.image,
            Platform::Linux,
            root,
            &Platform::Linux.build_targets(root),
            &GenerateOptions::default(),
            &writer,
        )
        .unwrap();
        assert!(result.is_none());
        assert!(writer.get_operations().is_empty());
    }

    #[test]
    fn shared_sizes_fan_out() {
        let master = raster_master(gradient_rgba(64));
        let (_, ops) = ops_for(&[Platform::Web], &master);
        let at_192 = ops
            .iter()
            .filter(|op| matches!(op, RecordedWrite::Single { size: 192, .. }))
            .count();
        assert_eq!(at_192, 2);
    }

    #[test]
    fn upscaling_advisory_for_small_raster() {
        let master = raster_master(gradient_rgba(64));
        let (report, _) = ops_for(&[Platform::Linux], &master);
        assert_eq!(
            report.advisories,
            vec![Advisory::Upscaling {
                source: 64,
                largest: 256
            }]
        );
    }

    #[test]
    fn no_upscaling_advisory_when_source_is_large_enough() {
        let master = raster_master(gradient_rgba(256));
        let (report, _) = ops_for(&[Platform::Linux, Platform::Windows], &master);
        assert!(report.advisories.is_empty());
    }

    #[test]
    fn non_square_master_reports_padding() {
        let master = LoadedMaster {
            image: MasterImage::Raster(gradient_rgba(300)),
            original_dimensions: Some((300, 200)),
        };
        let advisories = advisories_for(&master, &Platform::Linux.build_targets(Path::new("/p")));
        assert_eq!(
            advisories,
            vec![Advisory::NonSquare {
                width: 300,
                height: 200
            }]
        );
    }

    #[test]
    fn write_failure_aborts_run() {
        let master = raster_master(gradient_rgba(32));
        let writer = MockWriter::failing_on("/proj/linux/flutter/app_icon.png");
        let result = generate(
            &master,
            Path::new("/proj"),
            &[Platform::Linux],
            &GenerateOptions::default(),
            &writer,
            None,
        );
        assert!(matches!(
            result,
            Err(GenerateError::Write(WriteError::WriteFailure { .. }))
        ));
    }

    #[test]
    fn container_failure_aborts_run() {
        let master = raster_master(gradient_rgba(32));
        let writer = MockWriter::failing_on("/proj/windows/runner/resources/app_icon.ico");
        let result = generate(
            &master,
            Path::new("/proj"),
            &[Platform::Windows],
            &GenerateOptions::default(),
            &writer,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn events_stream_advisories_and_writes() {
        let master = raster_master(gradient_rgba(16));
        let writer = MockWriter::new();
        let (tx, rx) = std::sync::mpsc::channel();
        let report = generate(
            &master,
            Path::new("/proj"),
            &[Platform::Web],
            &GenerateOptions::default(),
            &writer,
            Some(tx),
        )
        .unwrap();

        let events: Vec<GenerateEvent> = rx.iter().collect();
        let advisories = events
            .iter()
            .filter(|e| matches!(e, GenerateEvent::Advisory(_)))
            .count();
        let writes = events
            .iter()
            .filter(|e| matches!(e, GenerateEvent::Written(_)))
            .count();
        assert_eq!(advisories, 1);
        assert_eq!(writes, report.count());
    }

    #[test]
    fn resolve_platforms_defaults_and_validates() {
        let defaults = Platform::defaults();
        assert_eq!(resolve_platforms::<&str>(None, &defaults).unwrap(), defaults);
        assert_eq!(resolve_platforms::<&str>(Some(&[][..]), &defaults).unwrap(), defaults);
        assert_eq!(
            resolve_platforms(Some(&["watchos"][..]), &defaults).unwrap(),
            vec![Platform::Watchos]
        );
        assert!(resolve_platforms(Some(&["bogus"][..]), &defaults).is_err());
    }

    #[test]
    fn run_rejects_unknown_platform_before_loading_master() {
        // The master does not exist; the platform error must win.
        let result = run(
            Path::new("/nonexistent.png"),
            Path::new("/proj"),
            Some(&["bogus"][..]),
            &Platform::defaults(),
            &GenerateOptions::default(),
            &MockWriter::new(),
            None,
        );
        assert!(matches!(result, Err(GenerateError::UnknownPlatform(_))));
    }

    #[test]
    fn run_rejects_unreadable_master_before_writing() {
        let writer = MockWriter::new();
        let result = run::<&str>(
            Path::new("/nonexistent.png"),
            Path::new("/proj"),
            None,
            &Platform::defaults(),
            &GenerateOptions::default(),
            &writer,
            None,
        );
        assert!(matches!(
            result,
            Err(GenerateError::Master(MasterError::UnreadableMaster { .. }))
        ));
        assert!(writer.get_operations().is_empty());
    }

    #[test]
    fn report_serializes_for_json_output() {
        let master = raster_master(gradient_rgba(64));
        let (report, _) = ops_for(&[Platform::Linux, Platform::Windows], &master);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["platforms"], serde_json::json!(["linux", "windows"]));
        assert_eq!(json["advisories"][0]["kind"], "upscaling");
        assert_eq!(json["advisories"][0]["largest"], 256);
        assert_eq!(json["written"][0]["size"], 256);
        assert!(json["written"][0].get("frames").is_none());
        assert_eq!(json["written"][1]["frames"][0], 16);
    }

    #[cfg(feature = "svg")]
    #[test]
    fn vector_master_never_warns_about_upscaling() {
        use crate::master::{Capabilities, load};
        use crate::test_helpers::write_svg;

        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("icon.svg");
        write_svg(&path, 8, 8);
        let master = load(&path, Capabilities::probe()).unwrap();

        let (report, _) = ops_for(&[Platform::Store], &master);
        assert!(report.advisories.is_empty());
        assert_eq!(report.count(), 2);
    }
}
