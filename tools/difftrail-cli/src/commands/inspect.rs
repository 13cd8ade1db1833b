use std::path::PathBuf;

use difftrail_blend::BlendCost;

use super::load_inputs;

pub fn run(inputs: Vec<PathBuf>) -> anyhow::Result<()> {
    println!("Inspecting inputs");
    let frames = load_inputs(&inputs)?;

    let Some(first) = frames.first() else {
        println!("  No frames");
        return Ok(());
    };

    let (width, height) = first.dimensions();
    println!("  Frame size: {width}x{height}");

    let mismatched: Vec<_> = frames
        .iter()
        .enumerate()
        .filter(|(_, f)| f.dimensions() != (width, height))
        .collect();
    for (index, frame) in &mismatched {
        let (w, h) = frame.dimensions();
        println!("  [WARN] frame {index} is {w}x{h}");
    }
    if !mismatched.is_empty() {
        println!("  Blending these frames would leave the trail black");
    }

    let cost = BlendCost::of(&frames);
    println!(
        "  Cost: {} pairs x {} pixels = {} pixel comparisons",
        cost.pairs, cost.pixels_per_pair, cost.pixel_ops
    );
    Ok(())
}
