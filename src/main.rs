use clap::{Parser, Subcommand};
use gallery_sync::{config, output, sync};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "gallery-sync")]
#[command(about = "Sync a photo folder into a gallery manifest")]
#[command(long_about = "\
Sync a photo folder into a gallery manifest

Copies every photo and video from the source folder into the serving
directory and rewrites the JSON manifest the gallery page reads. Captions,
dates, rotations and placeholder colors edited by hand in the manifest are
kept from run to run; files removed from the source drop out.

Layout (defaults):

  photo/                          # Source: direct children only
  ├── beach.jpg                   # .jpg .jpeg .png .webp .gif .avif
  └── clip.mp4                    # .mp4 .mov .webm .m4v
  public/assets/gallery/          # Byte-identical copies
  public/data/gallery.json        # Manifest (hand-editable)

Aspect (square / portrait / landscape) is read from PNG, JPEG and WebP
headers; other formats get a random aspect. Videos are always landscape.

Run 'gallery-sync gen-config' to generate a documented gallery-sync.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./gallery-sync.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Source directory to scan
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Directory media files are copied into
    #[arg(long, global = true)]
    dest: Option<PathBuf>,

    /// Manifest file to read and rewrite
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Seed for ordering and default styling (reproducible output)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Increase log detail on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Copy media and rewrite the manifest (default)
    Sync,
    /// Dry run: show the manifest that would be written
    Check,
    /// Print a stock gallery-sync.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let command = cli.command.unwrap_or(Command::Sync);
    if let Command::GenConfig = command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = resolve_config(&cli)?;
    init_thread_pool(&config.processing);

    let options = sync::SyncOptions::from_config(&config);
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let outcome = match command {
        Command::Check => sync::plan(&options, &mut rng)?,
        _ => sync::sync(&options, &mut rng)?,
    };
    output::print_sync_output(&outcome);

    Ok(())
}

/// Load the config file and apply CLI path overrides.
fn resolve_config(cli: &Cli) -> Result<config::SyncConfig, config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_required_config(path)?,
        None => config::load_config(Path::new(config::CONFIG_FILENAME))?,
    };
    if let Some(source) = &cli.source {
        config.source = source.clone();
    }
    if let Some(dest) = &cli.dest {
        config.dest = dest.clone();
    }
    if let Some(manifest) = &cli.manifest {
        config.manifest = manifest.clone();
    }
    Ok(config)
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` is honored for other targets; this crate's level comes from
/// the `-v` count.
fn init_tracing(verbosity: u8) -> Result<(), Box<dyn Error>> {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(format!("gallery_sync={level}").parse()?);
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Never exceeds the available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
