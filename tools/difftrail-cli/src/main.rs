//! difftrail CLI: build motion trails from image sequences.
//!
//! Usage:
//!   difftrail blend <INPUTS>...    Blend images (files or directories) into one trail
//!   difftrail replay <INPUTS>...   Feed images through the live capture path
//!   difftrail inspect <INPUTS>...  Show what a blend of these inputs would cost
//!   difftrail modes                List blend modes
//!   difftrail config               Show or initialize configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use difftrail_blend::BlendMode;
use difftrail_ingest::CaptureRegion;

mod commands;

#[derive(Parser)]
#[command(
    name = "difftrail",
    about = "Accumulate per-pixel change across frames into a motion trail",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Blend an image sequence into a single trail image
    Blend {
        /// Image files and/or directories, in sequence order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        blend: commands::BlendArgs,

        /// Output image path (default: trail-<timestamp>.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay images through the periodic capture path and live buffer
    Replay {
        /// Image files and/or directories, in sequence order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        blend: commands::BlendArgs,

        /// Grab interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Crop every frame to X,Y,WIDTH,HEIGHT before buffering
        #[arg(long)]
        region: Option<CaptureRegion>,

        /// Live buffer size in frames
        #[arg(long)]
        capacity: Option<usize>,

        /// Maximum trail recomputations per second
        #[arg(long)]
        recompute_hz: Option<u32>,

        /// Number of frames to capture (loops the input when larger)
        #[arg(long)]
        frames: Option<u64>,

        /// Output image path (default: trail-<timestamp>.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load inputs and report sizes, skipped files and blend cost
    Inspect {
        /// Image files and/or directories, in sequence order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// List blend modes
    Modes,

    /// Show the effective configuration
    Config {
        /// Write the defaults to the standard config location
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = difftrail_common::AppConfig::load();

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    difftrail_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Blend {
            inputs,
            blend,
            output,
            json,
        } => commands::blend::run(&config, inputs, blend, output, json),
        Commands::Replay {
            inputs,
            blend,
            interval_ms,
            region,
            capacity,
            recompute_hz,
            frames,
            output,
        } => {
            commands::replay::run(
                &config,
                inputs,
                blend,
                commands::replay::ReplayOptions {
                    interval_ms,
                    region,
                    capacity,
                    recompute_hz,
                    frames,
                },
                output,
            )
            .await
        }
        Commands::Inspect { inputs } => commands::inspect::run(inputs),
        Commands::Modes => {
            print_modes();
            Ok(())
        }
        Commands::Config { init } => commands::config::run(&config, init),
    }
}

fn print_modes() {
    println!("Blend modes:");
    for mode in BlendMode::ALL {
        let threshold = if mode.uses_threshold() {
            ""
        } else {
            " (ignores threshold)"
        };
        println!(
            "  {}  {:<24} {}{}",
            mode.index(),
            mode.name(),
            mode.description(),
            threshold
        );
    }
}
