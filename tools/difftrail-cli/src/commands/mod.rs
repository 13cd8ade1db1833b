pub mod blend;
pub mod config;
pub mod inspect;
pub mod replay;

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use difftrail_blend::{BlendConfig, BlendMode, BlendOutcome, BlendStatus, Frame, Threshold};
use difftrail_common::AppConfig;
use difftrail_ingest::files::{expand_inputs, load_frames};

/// Blend options shared by `blend` and `replay`. Unset values fall back to
/// the config file, then to built-in defaults.
#[derive(Args, Debug, Clone)]
pub struct BlendArgs {
    /// Blend mode: index 0-4 or name (see `difftrail modes`)
    #[arg(short, long)]
    pub mode: Option<BlendMode>,

    /// Change threshold 0-255 (5 = very sensitive, 30+ = large changes only)
    #[arg(short, long)]
    pub threshold: Option<u8>,

    /// Refuse to blend more than this many pixel comparisons
    #[arg(long)]
    pub max_pixel_ops: Option<u64>,
}

impl BlendArgs {
    pub fn resolve(&self, config: &AppConfig) -> anyhow::Result<BlendConfig> {
        let mode = match self.mode {
            Some(mode) => mode,
            None => config
                .blend
                .mode
                .parse::<BlendMode>()
                .with_context(|| "invalid blend.mode in config file")?,
        };
        Ok(BlendConfig {
            mode,
            threshold: Threshold::new(self.threshold.unwrap_or(config.blend.threshold)),
            pixel_budget: self.max_pixel_ops.or(config.blend.pixel_budget),
        })
    }
}

/// Expand and decode inputs, reporting skipped files.
pub fn load_inputs(inputs: &[PathBuf]) -> anyhow::Result<Vec<Frame>> {
    let paths = expand_inputs(inputs).context("Failed to read inputs")?;
    let report = load_frames(&paths);
    println!(
        "  Loaded {} of {} images",
        report.frames.len(),
        paths.len()
    );
    for skipped in &report.skipped {
        println!("  [SKIP] {}: {}", skipped.path.display(), skipped.reason);
    }
    Ok(report.frames)
}

/// Save the trail if there is one; returns the path written.
pub fn write_output(
    outcome: &BlendOutcome,
    output: Option<PathBuf>,
) -> anyhow::Result<Option<PathBuf>> {
    let Some(frame) = outcome.frame.as_ref() else {
        return Ok(None);
    };
    let path = output.unwrap_or_else(|| {
        PathBuf::from(difftrail_ingest::output::default_output_name(
            &chrono::Local::now(),
        ))
    });
    difftrail_ingest::save_frame(frame, &path)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    Ok(Some(path))
}

pub fn describe_status(status: &BlendStatus) -> String {
    match status {
        BlendStatus::Empty => "no frames to blend".to_string(),
        BlendStatus::SingleFrame => "only one frame, nothing to compare".to_string(),
        BlendStatus::DimensionMismatch {
            index,
            expected,
            found,
        } => format!(
            "frame {index} is {}x{} but frame 0 is {}x{}; trail left black",
            found.0, found.1, expected.0, expected.1
        ),
        BlendStatus::BudgetExceeded { pixel_ops, budget } => format!(
            "{pixel_ops} pixel comparisons exceed the budget of {budget}; trail left black"
        ),
        BlendStatus::Completed => "completed".to_string(),
    }
}
