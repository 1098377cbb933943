//! CLI output formatting.
//!
//! Each display has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ```text
//! [WARN] Master icon is 64px, but the largest target is 1024px. Upscaling may reduce quality.
//! [OK] 16x16 -> macos/Runner/Assets.xcassets/AppIcon.appiconset/app_icon_16.png
//! [OK] 48x48 -> android/app/src/main/res/mipmap-mdpi/ic_launcher.png
//! ...
//! [OK] 16-256 (14 frames) -> windows/runner/resources/app_icon.ico
//!
//! Generated 46 files for 7 platforms (android, ios, macos, linux, web, windows, store)
//! ```

use crate::catalog::{ContainerKind, Platform};
use crate::generate::{Advisory, GenerateEvent, GenerationReport, WrittenIcon};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Display `path` relative to `root` when it lives under it.
fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

pub fn format_advisory(advisory: &Advisory) -> String {
    match advisory {
        Advisory::NonSquare { width, height } => format!(
            "[WARN] Master icon is not square ({width}x{height}). It was padded to a square with transparency."
        ),
        Advisory::Upscaling { source, largest } => format!(
            "[WARN] Master icon is {source}px, but the largest target is {largest}px. Upscaling may reduce quality."
        ),
    }
}

pub fn format_written(icon: &WrittenIcon, root: &Path) -> String {
    let path = relative(&icon.path, root);
    match (icon.frames.first(), icon.frames.last()) {
        (Some(first), Some(last)) => format!(
            "[OK] {first}-{last} ({} frames) -> {path}",
            icon.frames.len()
        ),
        _ => format!("[OK] {size}x{size} -> {path}", size = icon.size),
    }
}

/// Format a single progress event as display lines.
pub fn format_event(event: &GenerateEvent, root: &Path) -> Vec<String> {
    match event {
        GenerateEvent::Advisory(advisory) => vec![format_advisory(advisory)],
        GenerateEvent::Written(icon) => vec![format_written(icon, root)],
    }
}

/// Final summary: file count and platforms processed.
pub fn format_summary(report: &GenerationReport) -> Vec<String> {
    let names: Vec<&str> = report.platforms.iter().map(|p| p.name()).collect();
    let files = if report.count() == 1 { "file" } else { "files" };
    let platforms = if names.len() == 1 { "platform" } else { "platforms" };
    vec![
        String::new(),
        format!(
            "Generated {} {} for {} {} ({})",
            report.count(),
            files,
            names.len(),
            platforms,
            names.join(", ")
        ),
    ]
}

/// Catalog listing for the `platforms` command.
///
/// ```text
/// android (default)
///     15 files, 48-288px
/// windows (default)
///     1 file, 14 frames 16-256px
/// watchos (opt-in)
///     11 files, 48-1024px, opaque
/// ```
pub fn format_platform_list() -> Vec<String> {
    let mut lines = Vec::new();
    for &platform in Platform::all() {
        let entry = platform.entry();
        let targets = platform.build_targets(Path::new(""));
        let min = targets.iter().map(|t| t.pixel_size).min().unwrap_or(0);
        let max = targets.iter().map(|t| t.pixel_size).max().unwrap_or(0);
        let kind = if entry.default { "default" } else { "opt-in" };
        lines.push(format!("{} ({})", entry.name, kind));

        let mut detail = match entry.container_kind {
            ContainerKind::MultiFrame => {
                format!("1 file, {} frames {min}-{max}px", targets.len())
            }
            ContainerKind::Single => {
                let n = platform.file_count();
                let files = if n == 1 { "file" } else { "files" };
                if min == max {
                    format!("{n} {files}, {max}px")
                } else {
                    format!("{n} {files}, {min}-{max}px")
                }
            }
        };
        if platform.requires_opaque() {
            detail.push_str(", opaque");
        }
        lines.push(format!("{}{}", indent(1), detail));
    }
    lines
}

pub fn print_event(event: &GenerateEvent, root: &Path) {
    for line in format_event(event, root) {
        println!("{}", line);
    }
}

pub fn print_summary(report: &GenerationReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}

pub fn print_platform_list() {
    for line in format_platform_list() {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn icon(path: &str, size: u32) -> WrittenIcon {
        WrittenIcon {
            path: PathBuf::from(path),
            size,
            platform: Platform::Web,
            frames: Vec::new(),
        }
    }

    #[test]
    fn written_line_is_relative_to_root() {
        let line = format_written(&icon("/proj/web/favicon.png", 32), Path::new("/proj"));
        assert_eq!(line, "[OK] 32x32 -> web/favicon.png");
    }

    #[test]
    fn written_line_outside_root_keeps_full_path() {
        let line = format_written(&icon("/elsewhere/a.png", 16), Path::new("/proj"));
        assert_eq!(line, "[OK] 16x16 -> /elsewhere/a.png");
    }

    #[test]
    fn container_line_shows_frame_range() {
        let ico = WrittenIcon {
            path: PathBuf::from("/proj/windows/runner/resources/app_icon.ico"),
            size: 256,
            platform: Platform::Windows,
            frames: vec![16, 32, 256],
        };
        assert_eq!(
            format_written(&ico, Path::new("/proj")),
            "[OK] 16-256 (3 frames) -> windows/runner/resources/app_icon.ico"
        );
    }

    #[test]
    fn advisory_lines() {
        assert!(
            format_advisory(&Advisory::Upscaling {
                source: 64,
                largest: 1024
            })
            .starts_with("[WARN] Master icon is 64px")
        );
        assert!(
            format_advisory(&Advisory::NonSquare {
                width: 800,
                height: 600
            })
            .contains("800x600")
        );
    }

    #[test]
    fn summary_counts_files_and_platforms() {
        let report = GenerationReport {
            platforms: vec![Platform::Web, Platform::Linux],
            written: vec![icon("/p/a.png", 32), icon("/p/b.png", 64)],
            advisories: vec![],
        };
        let lines = format_summary(&report);
        assert_eq!(lines.last().unwrap(), "Generated 2 files for 2 platforms (web, linux)");
    }

    #[test]
    fn summary_singular() {
        let report = GenerationReport {
            platforms: vec![Platform::Linux],
            written: vec![icon("/p/a.png", 256)],
            advisories: vec![],
        };
        assert_eq!(
            format_summary(&report).last().unwrap(),
            "Generated 1 file for 1 platform (linux)"
        );
    }

    #[test]
    fn platform_list_covers_catalog() {
        let lines = format_platform_list();
        assert_eq!(lines.len(), Platform::all().len() * 2);
        assert_eq!(lines[0], "android (default)");
        assert_eq!(lines[1], "    15 files, 48-288px");
        assert!(lines.contains(&"windows (default)".to_string()));
        assert!(lines.contains(&"    1 file, 14 frames 16-256px".to_string()));
        assert!(lines.contains(&"watchos (opt-in)".to_string()));
        assert!(lines.contains(&"    1 file, 256px".to_string()));
    }
}
