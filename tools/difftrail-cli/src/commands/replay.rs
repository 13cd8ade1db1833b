use std::path::PathBuf;
use std::time::Duration;

use difftrail_blend::BlendEngine;
use difftrail_common::AppConfig;
use difftrail_ingest::{
    BackendChain, CaptureLoop, CaptureLoopConfig, CaptureRegion, LiveTrail, SequenceBackend,
};

use super::{describe_status, load_inputs, write_output, BlendArgs};

/// Capture-side overrides; unset fields come from `capture` in the config.
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    pub interval_ms: Option<u64>,
    pub region: Option<CaptureRegion>,
    pub capacity: Option<usize>,
    pub recompute_hz: Option<u32>,
    pub frames: Option<u64>,
}

pub async fn run(
    config: &AppConfig,
    inputs: Vec<PathBuf>,
    args: BlendArgs,
    options: ReplayOptions,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let blend_config = args.resolve(config)?;
    let capacity = options.capacity.unwrap_or(config.capture.buffer_capacity);
    let recompute_hz = options.recompute_hz.unwrap_or(config.capture.recompute_hz);
    let interval_ms = options.interval_ms.unwrap_or(config.capture.interval_ms);

    println!(
        "Replaying with mode '{}' (buffer {}, {} Hz recompute, {} ms interval)",
        blend_config.mode, capacity, recompute_hz, interval_ms
    );

    let frames = load_inputs(&inputs)?;
    if frames.is_empty() {
        anyhow::bail!("no decodable images in the given inputs");
    }

    let chain = BackendChain::new()
        .with(Box::new(SequenceBackend::new(frames).looping(options.frames.is_some())));
    let backend = chain.select().await?;

    let mut capture = CaptureLoop::new(
        backend,
        CaptureLoopConfig {
            interval: Duration::from_millis(interval_ms),
            region: options.region,
            max_frames: options.frames,
        },
    );

    let control = capture.control();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, finishing trail");
            control.stop();
        }
    });

    let mut live = LiveTrail::new(BlendEngine::new(blend_config), capacity, recompute_hz);
    let stats = capture
        .run(
            |frame| {
                if let Some(outcome) = live.on_frame(frame) {
                    tracing::debug!(
                        flagged = outcome.flagged_pixels(),
                        pairs = outcome.pairs_processed,
                        "Trail updated"
                    );
                }
            },
            |e| tracing::debug!("Skipped frame: {}", e),
        )
        .await?;

    let recomputes = live.recomputes();
    let outcome = live.finish();

    println!(
        "  Captured {} frames ({} errors), {} live recomputes",
        stats.frames, stats.errors, recomputes
    );
    println!("  Status: {}", describe_status(&outcome.status));
    println!("  Changed pixels: {}", outcome.flagged_pixels());
    match write_output(&outcome, output)? {
        Some(path) => println!("  Trail saved to {}", path.display()),
        None => println!("  Nothing to save"),
    }
    Ok(())
}
