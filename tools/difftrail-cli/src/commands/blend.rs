use std::path::PathBuf;
use std::time::Instant;

use difftrail_blend::{BlendCost, BlendEngine};
use difftrail_common::AppConfig;

use super::{describe_status, load_inputs, write_output, BlendArgs};

pub fn run(
    config: &AppConfig,
    inputs: Vec<PathBuf>,
    args: BlendArgs,
    output: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let blend_config = args.resolve(config)?;
    if !json {
        println!("Blending with mode '{}'", blend_config.mode);
    }

    let frames = load_inputs(&inputs)?;
    let cost = BlendCost::of(&frames);
    let engine = BlendEngine::new(blend_config);

    let started = Instant::now();
    let outcome = engine.blend(&frames);
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let written = write_output(&outcome, output)?;

    if json {
        let summary = serde_json::json!({
            "config": blend_config,
            "frames": frames.len(),
            "cost": cost,
            "outcome": outcome.status,
            "pairs_processed": outcome.pairs_processed,
            "flagged_pixels": outcome.flagged_pixels(),
            "elapsed_ms": elapsed_ms,
            "output": written,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("  Status: {}", describe_status(&outcome.status));
    println!(
        "  Pairs: {}/{} ({} pixel comparisons, {} ms)",
        outcome.pairs_processed, cost.pairs, cost.pixel_ops, elapsed_ms
    );
    println!("  Changed pixels: {}", outcome.flagged_pixels());
    match written {
        Some(path) => println!("  Trail saved to {}", path.display()),
        None => println!("  Nothing to save"),
    }
    Ok(())
}
