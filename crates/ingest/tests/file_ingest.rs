use std::path::{Path, PathBuf};

use difftrail_blend::{BlendEngine, BlendMode, BlendStatus, Rgba, Threshold};
use difftrail_ingest::files::{collect_image_paths, expand_inputs, load_frames};
use difftrail_ingest::{save_frame, FrameBuffer};

fn write_png(dir: &Path, name: &str, moving_x: u32) -> PathBuf {
    let img = image::RgbImage::from_fn(6, 4, |x, _| {
        if x == moving_x {
            image::Rgb([220, 30, 30])
        } else {
            image::Rgb([20, 20, 20])
        }
    });
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

#[test]
fn directory_scan_sorts_and_filters() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "b.png", 1);
    write_png(dir.path(), "a.png", 0);
    std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

    let paths = collect_image_paths(dir.path()).unwrap();
    let names: Vec<_> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.png", "b.png"]);
}

#[test]
fn undecodable_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_png(dir.path(), "00.png", 0);
    let broken = dir.path().join("01.png");
    std::fs::write(&broken, b"\x89PNG but truncated").unwrap();
    let last = write_png(dir.path(), "02.png", 3);
    let missing = dir.path().join("gone.png");

    let report = load_frames([&first, &broken, &missing, &last]);
    assert_eq!(report.frames.len(), 2);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].path, broken);
    assert_eq!(report.skipped[1].path, missing);
    assert_eq!(report.frames[0].pixel(0, 0), Rgba::opaque(220, 30, 30));
}

#[test]
fn explicit_files_with_unsupported_extensions_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "00.png", 0);
    let tiff = dir.path().join("01.tiff");
    image::RgbImage::from_pixel(2, 2, image::Rgb([9, 9, 9]))
        .save(&tiff)
        .unwrap();

    let report = load_frames([&png, &tiff]);
    assert_eq!(report.frames.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, tiff);
    assert!(report.skipped[0].reason.contains("not a supported image"));

    let expanded = expand_inputs(&[tiff.clone()]).unwrap();
    assert_eq!(expanded, vec![tiff.clone()]);
    assert!(load_frames(&expanded).is_empty());
}

#[test]
fn load_blend_save_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    for x in 0..4 {
        write_png(dir.path(), &format!("frame_{x:02}.png"), x);
    }

    let paths = expand_inputs(&[dir.path().to_path_buf()]).unwrap();
    let report = load_frames(&paths);
    assert_eq!(report.frames.len(), 4);

    let mut buffer = FrameBuffer::default();
    buffer.replace(report.frames);
    let engine = BlendEngine::with_mode(BlendMode::ThresholdMaxDiff, Threshold::new(30));
    let outcome = buffer.recompute(&engine);
    assert_eq!(outcome.status, BlendStatus::Completed);
    // Columns 0..=3 each changed when the red bar moved on or off them.
    assert_eq!(outcome.flagged_pixels(), 4 * 4);

    let out = dir.path().join("out").join("trail.png");
    save_frame(outcome.frame.as_ref().unwrap(), &out).unwrap();
    let saved = image::open(&out).unwrap().to_rgba8();
    assert_eq!(saved.get_pixel(0, 0).0, [255, 255, 255, 255]);
    assert_eq!(saved.get_pixel(5, 3).0, [0, 0, 0, 255]);
}
