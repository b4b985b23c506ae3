use capture_normalize::imaging::{ImageBackend, Orientation, RustBackend, plan_normalization};
use capture_normalize::{config, output, pipeline};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "capture-normalize")]
#[command(about = "Normalize freshly captured photos in place")]
#[command(long_about = "\
Normalize freshly captured photos in place

Each file is decoded, rotated upright according to its EXIF orientation,
center-cropped to a fixed aspect ratio, resampled to a fixed size, and
re-encoded over the original path.

If any step fails the file is left exactly as it was and is still reported
as the result: a post-processing problem never costs you the photo.

Defaults (override in capture-normalize.toml):
  crop 3:4 → 1000x1334, WebP quality 100, Lanczos3 resampling

Run 'capture-normalize gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = defaults)
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize capture files (or every image under a directory) in place
    Normalize {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Print outcomes as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the crop the pipeline would apply to a capture of this size
    Plan {
        width: u32,
        height: u32,
        /// Raw EXIF orientation value (1, 3, 6, 8; others = upright)
        #[arg(long, default_value_t = 1)]
        orientation: u32,
    },
    /// Print a capture's stored dimensions and orientation
    Identify { path: PathBuf },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Normalize { paths, json } => {
            let normalize_config = config::load_config(&cli.config)?;
            init_thread_pool(&normalize_config.processing);
            let files = pipeline::collect_inputs(&paths)?;
            let backend = RustBackend::new();

            if json {
                let outcomes = pipeline::normalize_batch(&backend, &files, &normalize_config, None);
                println!("{}", serde_json::to_string_pretty(&outcomes)?);
            } else {
                let (tx, rx) = std::sync::mpsc::channel();
                let printer = std::thread::spawn(move || {
                    for event in rx {
                        output::print_lines(&output::format_event(&event));
                    }
                });
                let outcomes =
                    pipeline::normalize_batch(&backend, &files, &normalize_config, Some(tx));
                printer.join().ok();
                println!("{}", output::format_summary(&outcomes));
            }
        }
        Command::Plan {
            width,
            height,
            orientation,
        } => {
            let normalize_config = config::load_config(&cli.config)?;
            let plan = plan_normalization(
                (width, height),
                Orientation::from_exif(orientation),
                &normalize_config.crop_config(),
            )?;
            output::print_lines(&output::format_plan(&plan));
        }
        Command::Identify { path } => {
            let identity = RustBackend::new().identify(&path)?;
            output::print_lines(&output::format_identity(&path, &identity));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
