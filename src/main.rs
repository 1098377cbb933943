use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use iconforge::catalog::Platform;
use iconforge::generate::{GenerateError, GenerateOptions, GenerationReport};
use iconforge::imaging::FsIconWriter;
use iconforge::{config, generate, output};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "iconforge")]
#[command(version)]
#[command(about = "Generate every platform icon from one master image")]
#[command(long_about = "\
Generate every platform icon from one master image

Reads a master image (PNG, JPEG, WebP, TIFF, BMP, or SVG) and writes the
launcher, app store, web and desktop icons a multi-platform project needs,
under the given project root:

  android/app/src/main/res/mipmap-*/ic_launcher{,_round,_foreground}.png
  ios/Runner/Assets.xcassets/AppIcon.appiconset/Icon-App-*.png
  macos/Runner/Assets.xcassets/AppIcon.appiconset/app_icon_*.png
  linux/flutter/app_icon.png
  web/favicon.png, web/icons/Icon-*.png
  windows/runner/resources/app_icon.ico   (16-256, multi-frame)
  appstore.png, playstore.png

Use a square master of at least 1024x1024. Non-square masters are padded
with transparency; smaller masters are upscaled with a warning.

Run 'iconforge platforms' to list every platform, including opt-in sets.")]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    generate: GenerateArgs,

    /// Increase diagnostic logging on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Master image
    #[arg(required = true)]
    master: Option<PathBuf>,

    /// Project root; all icon paths are resolved under it
    #[arg(required = true)]
    project_root: Option<PathBuf>,

    /// Comma-separated platforms (default: iconforge.toml, else the default set)
    #[arg(long, value_delimiter = ',', value_parser = parse_platform)]
    platform: Vec<Platform>,

    /// Also write the list of generated files as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// List every platform with its file count and sizes
    Platforms,
    /// Print a stock iconforge.toml with all options documented
    GenConfig,
}

fn parse_platform(s: &str) -> Result<Platform, iconforge::catalog::UnknownPlatform> {
    s.parse()
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Command::Platforms) => {
            output::print_platform_list();
            ExitCode::SUCCESS
        }
        Some(Command::GenConfig) => {
            print!("{}", config::stock_config_toml());
            ExitCode::SUCCESS
        }
        None => match run_generate(&cli.generate) {
            Ok(()) => ExitCode::SUCCESS,
            Err(GenerateError::UnknownPlatform(e)) => {
                Cli::command().error(ErrorKind::InvalidValue, e).exit()
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run_generate(args: &GenerateArgs) -> Result<(), GenerateError> {
    // clap enforces both positionals when no subcommand is given.
    let (Some(master), Some(project_root)) = (&args.master, &args.project_root) else {
        Cli::command()
            .error(ErrorKind::MissingRequiredArgument, "missing master image or project root")
            .exit()
    };

    let site_config = config::load_config(project_root)?;
    let default_platforms = site_config.default_platforms()?;
    init_thread_pool(&site_config.processing);

    let requested: Vec<&str> = args.platform.iter().map(|p| p.name()).collect();
    let options = GenerateOptions {
        background: site_config.background(),
    };

    let (tx, rx) = std::sync::mpsc::channel();
    let root = project_root.clone();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_event(&event, &root);
        }
    });
    let result = generate::run(
        master,
        project_root,
        Some(requested.as_slice()),
        &default_platforms,
        &options,
        &FsIconWriter::new(),
        Some(tx),
    );
    if printer.join().is_err() {
        tracing::warn!("progress printer panicked");
    }
    let report = result?;

    if let Some(path) = &args.report {
        write_report(&report, path)?;
    }
    output::print_summary(&report);
    Ok(())
}

fn write_report(report: &GenerationReport, path: &Path) -> Result<(), GenerateError> {
    let io_err = |source: std::io::Error| iconforge::imaging::WriteError::WriteFailure {
        path: path.to_path_buf(),
        source,
    };
    let json = serde_json::to_string_pretty(report).map_err(|e| io_err(e.into()))?;
    std::fs::write(path, json).map_err(io_err)?;
    Ok(())
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the `-v` level.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The config can lower the count, never raise it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
