//! filmstock - render photos as framed analog-film prints

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod analyzer;
mod commands;
mod config;
mod image_loader;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "filmstock")]
#[command(author, version, about = "Render photos as framed analog-film prints")]
#[command(long_about = "
Renders a photo into an instant-print frame with a simulated film look.

Examples:
  filmstock render photo.jpg -o print.png --filter warm
  filmstock render photo.jpg -o print.png --analysis response.json
  filmstock render photo.jpg -o print.png --filter cool --seed 7
  filmstock geometry 1000 800
  filmstock profiles > filmstock.json
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a photo as a framed print
    #[command(visible_alias = "r")]
    Render(RenderArgs),

    /// Print the frame layout for a photo size
    #[command(visible_alias = "g")]
    Geometry(GeometryArgs),

    /// Print the default render configuration as JSON
    Profiles,
}

#[derive(Args)]
struct RenderArgs {
    /// Input photo
    input: PathBuf,

    /// Output print (format from extension)
    #[arg(short, long)]
    output: PathBuf,

    /// Film look: none, warm, cool. Suggested by analysis when omitted
    #[arg(short, long)]
    filter: Option<String>,

    /// Saved analysis-service response (JSON) used when --filter is omitted
    #[arg(short, long)]
    analysis: Option<PathBuf>,

    /// Seed for grain and paper texture (random when omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Render config file (overrides FILMSTOCK_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct GeometryArgs {
    /// Photo width in pixels
    width: u32,

    /// Photo height in pixels
    height: u32,

    /// Render config file (overrides FILMSTOCK_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn init_tracing(app: &AppConfig, verbose: bool) {
    let fallback = if verbose { "debug" } else { app.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let app = AppConfig::from_env();
    init_tracing(&app, cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Render(args) => commands::render::run(args, &app),
        Commands::Geometry(args) => commands::geometry::run(args, &app),
        Commands::Profiles => commands::profiles::run(),
    }
}
