use difftrail_blend::{blend, BlendEngine, BlendMode, BlendStatus, Frame, Rgba, Threshold};

const GREY: Rgba = Rgba::opaque(10, 10, 10);

/// 2x2, three frames. Pixel (0,0) goes 0 -> 50 -> 0; the rest stay at 10.
fn pulse_sequence() -> Vec<Frame> {
    [0u8, 50, 0]
        .into_iter()
        .map(|v| {
            Frame::from_fn(2, 2, |x, y| {
                if (x, y) == (0, 0) {
                    Rgba::opaque(v, v, v)
                } else {
                    GREY
                }
            })
        })
        .collect()
}

#[test]
fn threshold_max_diff_flags_pulse_and_keeps_it() {
    let frames = pulse_sequence();
    let engine = BlendEngine::with_mode(BlendMode::ThresholdMaxDiff, Threshold::new(10));

    let after_first_pair = engine.blend(&frames[..2]).into_frame().unwrap();
    assert_eq!(after_first_pair.pixel(0, 0), Rgba::WHITE);

    let outcome = engine.blend(&frames);
    assert_eq!(outcome.status, BlendStatus::Completed);
    assert_eq!(outcome.pairs_processed, 2);
    let trail = outcome.frame.unwrap();
    assert_eq!(trail.pixel(0, 0), Rgba::WHITE);
    for (x, y) in [(1, 0), (0, 1), (1, 1)] {
        assert_eq!(trail.pixel(x, y), Rgba::BLACK, "({x}, {y})");
    }
}

#[test]
fn high_threshold_leaves_pulse_black() {
    let frames = pulse_sequence();
    for mode in [
        BlendMode::ThresholdMaxDiff,
        BlendMode::GrayscaleThreshold,
        BlendMode::FastApproxColorTrail,
    ] {
        let trail = blend(&frames, mode, Threshold::new(60)).unwrap();
        assert_eq!(trail, Frame::filled(2, 2, Rgba::BLACK), "{mode}");
    }
}

#[test]
fn every_threshold_mode_sees_a_grey_pulse() {
    let frames = pulse_sequence();
    for mode in [
        BlendMode::ThresholdMaxDiff,
        BlendMode::GrayscaleThreshold,
        BlendMode::FastApproxColorTrail,
    ] {
        let outcome = BlendEngine::with_mode(mode, Threshold::new(49)).blend(&frames);
        assert_eq!(outcome.flagged_pixels(), 1, "{mode}");
        assert!(outcome.mask.contains(0, 0), "{mode}");
    }
}

#[test]
fn max_diff_modes_record_pulse_amplitude() {
    let frames = pulse_sequence();
    for mode in [BlendMode::RawMaxDiff, BlendMode::OptimizedMaxDiff] {
        let trail = blend(&frames, mode, Threshold::DEFAULT).unwrap();
        assert_eq!(trail.pixel(0, 0), Rgba::opaque(50, 50, 50), "{mode}");
        assert_eq!(trail.pixel(1, 1), Rgba::BLACK, "{mode}");
    }
}

#[test]
fn color_trail_writes_frame_color_on_exceedance() {
    let mover = Rgba::new(200, 40, 90, 180);
    let background = Frame::filled(3, 1, GREY);
    let moved = Frame::from_fn(3, 1, |x, _| if x == 1 { mover } else { GREY });
    let frames = vec![background.clone(), moved.clone(), moved];

    let trail = blend(&frames, BlendMode::FastApproxColorTrail, Threshold::new(15)).unwrap();
    assert_eq!(trail.pixel(1, 0), mover);
    assert_eq!(trail.pixel(0, 0), Rgba::BLACK);
    assert_eq!(trail.pixel(2, 0), Rgba::BLACK);
}

#[test]
fn color_trail_keeps_color_of_latest_exceedance() {
    let first = Rgba::new(200, 40, 90, 180); // approx luma 110
    let second = Rgba::opaque(20, 20, 220); // approx luma 86
    let drift = Rgba::opaque(25, 20, 220); // approx luma 88
    let at = |color: Rgba| Frame::from_fn(3, 1, |x, _| if x == 1 { color } else { GREY });
    let frames = vec![Frame::filled(3, 1, GREY), at(first), at(second), at(drift)];

    let engine = BlendEngine::with_mode(BlendMode::FastApproxColorTrail, Threshold::new(15));
    let after_first = engine.blend(&frames[..2]).into_frame().unwrap();
    assert_eq!(after_first.pixel(1, 0), first);

    // The second jump exceeds again and rewrites; the small drift does not.
    let outcome = engine.blend(&frames);
    assert_eq!(outcome.frame.as_ref().unwrap().pixel(1, 0), second);
    assert_eq!(outcome.flagged_pixels(), 1);
}

#[test]
fn binary_modes_output_only_black_or_white() {
    let frames: Vec<Frame> = (0..4u8)
        .map(|i| Frame::from_fn(4, 4, |x, y| Rgba::opaque(x as u8 * 60 + i * 7, y as u8 * 30, i * 40)))
        .collect();
    for mode in [BlendMode::ThresholdMaxDiff, BlendMode::GrayscaleThreshold] {
        let trail = blend(&frames, mode, Threshold::new(20)).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                let px = trail.pixel(x, y);
                assert!(px == Rgba::BLACK || px == Rgba::WHITE, "{mode} {px:?}");
            }
        }
    }
}

#[test]
fn single_frame_gives_sized_black_canvas() {
    let frames = vec![Frame::filled(5, 3, Rgba::WHITE)];
    for mode in BlendMode::ALL {
        let outcome = BlendEngine::with_mode(mode, Threshold::new(0)).blend(&frames);
        assert_eq!(outcome.status, BlendStatus::SingleFrame);
        assert!(outcome.is_complete());
        assert_eq!(outcome.frame.unwrap(), Frame::filled(5, 3, Rgba::BLACK));
    }
}

#[test]
fn result_matches_first_frame_size() {
    let frames = vec![
        Frame::filled(7, 2, GREY),
        Frame::filled(7, 2, Rgba::WHITE),
    ];
    for mode in BlendMode::ALL {
        let trail = blend(&frames, mode, Threshold::DEFAULT).unwrap();
        assert_eq!(trail.dimensions(), (7, 2), "{mode}");
    }
}

#[test]
fn inputs_are_left_untouched() {
    let frames = pulse_sequence();
    let before = frames.clone();
    for mode in BlendMode::ALL {
        let _ = blend(&frames, mode, Threshold::new(0));
    }
    assert_eq!(frames, before);
}
