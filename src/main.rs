use clap::{Parser, Subcommand};
use squarecrop::config::{self, CropConfig};
use squarecrop::pivot::{HorizontalPivot, VerticalPivot};
use squarecrop::process::{self, ProcessOptions};
use squarecrop::{output, scan};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that walk the source directory.
#[derive(clap::Args, Clone)]
struct WalkArgs {
    /// Descend into subdirectories (overrides `scan.recursive`)
    #[arg(long)]
    recursive: bool,
}

#[derive(Parser)]
#[command(name = "squarecrop")]
#[command(about = "Crop a directory of images to squares")]
#[command(long_about = "\
Crop a directory of images to squares

The shorter side of every image is kept whole; the longer side is cut down
to match. Which part of the longer side survives is chosen by a pivot code
at the end of the filename, after the last underscore:

  beach_lt.jpg     left / top
  city_rb.png      right / bottom
  dog_c.webp       center / (default)
  portrait.jpg     (default) / (default)

  1st character: l = left,  c = center, r = right
  2nd character: t = top,   c = center, b = bottom

Missing or unknown codes fall back to the default pivot, center/center
unless config.toml or --horizontal/--vertical say otherwise. Cropped files
keep their name and are written under the output directory.

Supported formats: bmp, gif, jpg/jpeg, png, tiff, webp.

Run 'squarecrop gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding the images (and an optional config.toml)
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Directory cropped images are written to
    #[arg(long, default_value = "output", global = true)]
    output: PathBuf,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List images and the anchor each one will be cropped around
    Scan {
        /// Print the scan manifest as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        walk: WalkArgs,
    },
    /// Crop every image to a square
    Crop {
        /// Default horizontal pivot: left, center, right (or l, c, r)
        #[arg(long)]
        horizontal: Option<HorizontalPivot>,
        /// Default vertical pivot: top, center, bottom (or t, c, b)
        #[arg(long)]
        vertical: Option<VerticalPivot>,
        /// JPEG quality, 1-100
        #[arg(long)]
        quality: Option<u32>,
        #[command(flatten)]
        walk: WalkArgs,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Scan { json, walk } => {
            let mut config = config::load_config(&cli.source)?;
            config.scan.recursive |= walk.recursive;
            let options = scan::ScanOptions {
                recursive: config.scan.recursive,
                exclude: vec![cli.output.clone()],
            };
            let manifest = scan::scan(&cli.source, &options)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&manifest)?);
            } else {
                output::print_scan_output(&manifest, config.default_anchor());
            }
        }
        Command::Crop {
            horizontal,
            vertical,
            quality,
            walk,
        } => {
            let mut config = config::load_config(&cli.source)?;
            if let Some(h) = horizontal {
                config.pivot.horizontal = h;
            }
            if let Some(v) = vertical {
                config.pivot.vertical = v;
            }
            if let Some(q) = quality {
                config.output.quality = q;
            }
            config.scan.recursive |= walk.recursive;
            config.validate()?;

            init_thread_pool(&config);
            let options = ProcessOptions::from_config(&config);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = process::process(&cli.source, &cli.output, &options, Some(tx))?;
            printer
                .join()
                .map_err(|_| "output printer thread panicked")?;
            output::print_summary(&result);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Send diagnostics to stderr. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(config: &CropConfig) {
    let threads = config::effective_threads(&config.processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
