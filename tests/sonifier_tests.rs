//! Audio verification for the column sonifier

use std::f32::consts::TAU;

use photophone::raster::GrayRaster;
use photophone::sonifier::{ColumnSonifier, SonifierParams};
use photophone::test_utils::{calculate_rms, dominant_frequency, left_channel};

const SAMPLE_RATE: f32 = 44100.0;
const BLOCK: usize = 512;

/// Image with a single bright pixel, black everywhere else.
fn single_pixel_image(width: usize, height: usize, x: usize, y: usize) -> GrayRaster {
    let mut img = GrayRaster::new(width, height);
    img.set(x, y, 255);
    img
}

#[test]
fn silent_column_produces_a_silent_block() {
    let mut sonifier = ColumnSonifier::new(SAMPLE_RATE, BLOCK);
    let img = GrayRaster::new(4, 4);
    let mut out = vec![1.0f32; BLOCK * 2]; // prefilled garbage must be cleared
    sonifier.render_column(&img, 2, &mut out);
    assert!(out.iter().all(|&s| s == 0.0));
}

#[test]
fn empty_image_produces_silence_of_the_requested_size() {
    let mut sonifier = ColumnSonifier::new(SAMPLE_RATE, BLOCK);
    let img = GrayRaster::new(0, 0);
    let mut out = vec![0.5f32; 300];
    sonifier.render_column(&img, 10, &mut out);
    assert!(out.iter().all(|&s| s == 0.0));
}

#[test]
fn column_index_is_clamped_into_the_image() {
    let mut sonifier = ColumnSonifier::new(SAMPLE_RATE, BLOCK);
    let img = single_pixel_image(8, 8, 7, 0);
    let mut out = vec![0.0f32; BLOCK * 2];
    // Way out of range on the right: clamps to column 7, which is bright.
    sonifier.render_column(&img, 500, &mut out);
    assert!(calculate_rms(&out) > 0.01);

    let mut sonifier = ColumnSonifier::new(SAMPLE_RATE, BLOCK);
    let img = single_pixel_image(8, 8, 0, 0);
    sonifier.render_column(&img, -3, &mut out);
    assert!(calculate_rms(&out) > 0.01);
}

#[test]
fn oscillator_phase_is_continuous_across_blocks() {
    let mut sonifier = ColumnSonifier::new(SAMPLE_RATE, BLOCK);
    let img = single_pixel_image(4, 8, 2, 0);

    let mut first = vec![0.0f32; BLOCK * 2];
    let mut second = vec![0.0f32; BLOCK * 2];
    sonifier.render_column(&img, 2, &mut first);
    sonifier.render_column(&img, 2, &mut second);

    let freq = sonifier.frequency_from_row(0, 8);
    let phase_inc = (freq / SAMPLE_RATE) * TAU;
    let volume = sonifier.params().volume;

    let mono: Vec<f32> = left_channel(&first)
        .into_iter()
        .chain(left_channel(&second))
        .collect();
    for (k, &sample) in mono.iter().enumerate() {
        let expected = ((k as f64 * phase_inc as f64).sin() as f32) * volume;
        assert!(
            (sample - expected).abs() < 5e-3,
            "discontinuity at sample {k}: got {sample}, expected {expected}"
        );
    }
}

#[test]
fn resizing_the_bank_preserves_surviving_phases() {
    let mut sonifier = ColumnSonifier::new(SAMPLE_RATE, BLOCK);
    let small = single_pixel_image(4, 8, 2, 0);
    let tall = single_pixel_image(4, 16, 2, 0);

    let mut first = vec![0.0f32; BLOCK * 2];
    let mut second = vec![0.0f32; BLOCK * 2];
    sonifier.render_column(&small, 2, &mut first);
    // Height changes 8 -> 16; row 0 still maps to the top of the scale, so
    // its oscillator must keep running without a phase jump.
    sonifier.render_column(&tall, 2, &mut second);

    let freq = sonifier.frequency_from_row(0, 8);
    assert_eq!(freq, sonifier.frequency_from_row(0, 16));
    let phase_inc = (freq / SAMPLE_RATE) * TAU;
    let volume = sonifier.params().volume;

    let mono: Vec<f32> = left_channel(&first)
        .into_iter()
        .chain(left_channel(&second))
        .collect();
    for (k, &sample) in mono.iter().enumerate() {
        let expected = ((k as f64 * phase_inc as f64).sin() as f32) * volume;
        assert!(
            (sample - expected).abs() < 5e-3,
            "phase reset detected at sample {k}"
        );
    }
}

#[test]
fn frequency_never_increases_down_the_image() {
    let sonifier = ColumnSonifier::new(SAMPLE_RATE, BLOCK);
    for height in [2usize, 8, 30, 100] {
        let mut previous = f32::INFINITY;
        for y in 0..height {
            let freq = sonifier.frequency_from_row(y, height);
            assert!(
                freq <= previous,
                "row {y}/{height}: {freq} Hz above previous {previous} Hz"
            );
            previous = freq;
        }
    }
}

#[test]
fn frequencies_stay_inside_the_configured_bounds() {
    let mut sonifier = ColumnSonifier::new(SAMPLE_RATE, BLOCK);
    sonifier.set_params(SonifierParams {
        volume: 0.5,
        min_freq: 250.0,
        max_freq: 3000.0,
    });
    for y in 0..64 {
        let freq = sonifier.frequency_from_row(y, 64);
        assert!((250.0..=3000.0).contains(&freq), "row {y}: {freq} Hz");
    }
    assert_eq!(sonifier.frequency_from_row(0, 64), 3000.0);
    assert_eq!(sonifier.frequency_from_row(63, 64), 250.0);
}

#[test]
fn bright_top_row_renders_the_documented_pitch() {
    // Scenario: one maximally-bright pixel at row 0 of an 8-row image with
    // the 100..4000 Hz bounds; the top of the scale maps to 4000 Hz exactly.
    let mut sonifier = ColumnSonifier::new(SAMPLE_RATE, BLOCK);
    sonifier.set_params(SonifierParams {
        volume: 0.5,
        min_freq: 100.0,
        max_freq: 4000.0,
    });
    let img = single_pixel_image(8, 8, 3, 0);

    let expected = sonifier.frequency_from_row(0, 8);
    assert!((expected - 4000.0).abs() < 1e-2);

    let mut mono = Vec::new();
    let mut out = vec![0.0f32; BLOCK * 2];
    for _ in 0..16 {
        sonifier.render_column(&img, 3, &mut out);
        mono.extend(left_channel(&out));
    }

    let detected = dominant_frequency(&mono, SAMPLE_RATE);
    let resolution = SAMPLE_RATE / mono.len() as f32;
    assert!(
        (detected - expected).abs() < 3.0 * resolution,
        "expected ~{expected} Hz, detected {detected} Hz"
    );
}

#[test]
fn chord_is_normalized_by_active_row_count() {
    // A fully bright column must stay well inside [-1, 1] thanks to the
    // 1/sqrt(n) normalization.
    let mut sonifier = ColumnSonifier::new(SAMPLE_RATE, BLOCK);
    sonifier.set_params(SonifierParams {
        volume: 1.0,
        ..SonifierParams::default()
    });
    let mut img = GrayRaster::new(2, 64);
    img.fill(255);

    let mut out = vec![0.0f32; BLOCK * 2];
    sonifier.render_column(&img, 0, &mut out);
    let peak = out.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    assert!(peak > 0.0);
    assert!(peak <= 64.0f32.sqrt(), "normalization missing: peak {peak}");
}

#[test]
fn stereo_channels_carry_the_same_signal() {
    let mut sonifier = ColumnSonifier::new(SAMPLE_RATE, BLOCK);
    let img = single_pixel_image(4, 8, 1, 4);
    let mut out = vec![0.0f32; BLOCK * 2];
    sonifier.render_column(&img, 1, &mut out);
    for frame in out.chunks_exact(2) {
        assert_eq!(frame[0], frame[1]);
    }
}
