//! Property tests for the edge-magnitude pipeline

use photophone::image_pipeline::{GradientPipeline, PipelineParams};
use photophone::raster::RgbRaster;
use rand::{Rng, SeedableRng};

fn full_scale_params() -> PipelineParams {
    PipelineParams {
        scale_factor: 1.0,
        ..PipelineParams::default()
    }
}

fn random_source(width: usize, height: usize, seed: u64) -> RgbRaster {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut rgb = RgbRaster::new(width, height);
    for y in 0..height {
        for x in 0..width {
            rgb.set_rgb(x, y, rng.gen(), rng.gen(), rng.gen());
        }
    }
    rgb
}

#[test]
fn border_pixels_are_always_zero() {
    for seed in 0..4 {
        let mut pipeline = GradientPipeline::new(full_scale_params());
        pipeline.set_source(random_source(17, 11, seed));
        pipeline.set_params(2.3, -0.4, 4.0);
        pipeline.process();

        let snapshot = pipeline.edges().load_full();
        let (w, h) = (snapshot.image.width(), snapshot.image.height());
        for x in 0..w {
            assert_eq!(snapshot.image.get(x, 0), 0);
            assert_eq!(snapshot.image.get(x, h - 1), 0);
        }
        for y in 0..h {
            assert_eq!(snapshot.image.get(0, y), 0);
            assert_eq!(snapshot.image.get(w - 1, y), 0);
        }
    }
}

#[test]
fn process_is_idempotent_for_unchanged_inputs() {
    let mut pipeline = GradientPipeline::new(full_scale_params());
    pipeline.set_source(random_source(24, 24, 7));
    pipeline.process();
    let first = pipeline.edges().load_full();
    let generation = pipeline.generation();

    pipeline.process();
    let second = pipeline.edges().load_full();

    assert_eq!(pipeline.generation(), generation);
    assert_eq!(first.image, second.image);
}

#[test]
fn reprocessing_after_a_param_change_is_deterministic() {
    let source = random_source(24, 24, 9);

    let mut a = GradientPipeline::new(full_scale_params());
    a.set_source(source.clone());
    a.set_params(1.7, 0.2, 2.0);
    a.process();

    let mut b = GradientPipeline::new(full_scale_params());
    b.set_source(source);
    // Detour through different params, then land on the same set.
    b.set_params(0.5, -0.8, 4.5);
    b.process();
    b.set_params(1.7, 0.2, 2.0);
    b.process();

    assert_eq!(
        a.edges().load_full().image,
        b.edges().load_full().image,
        "same source + params must produce identical output"
    );
}

#[test]
fn stronger_sobel_never_darkens_a_pixel() {
    let source = random_source(20, 20, 3);

    let mut weak = GradientPipeline::new(full_scale_params());
    weak.set_source(source.clone());
    weak.set_params(1.0, 0.0, 1.0);
    weak.process();

    let mut strong = GradientPipeline::new(full_scale_params());
    strong.set_source(source);
    strong.set_params(1.0, 0.0, 2.5);
    strong.process();

    let weak_img = weak.edges().load_full();
    let strong_img = strong.edges().load_full();
    for (w, s) in weak_img.image.data().iter().zip(strong_img.image.data()) {
        assert!(s >= w, "sobel strength must be monotone: {s} < {w}");
    }
}

#[test]
fn all_black_image_yields_all_zero_edges() {
    // Scenario: 4x4 black image at native scale with neutral adjustments.
    let mut pipeline = GradientPipeline::new(full_scale_params());
    pipeline.set_source(RgbRaster::new(4, 4));
    pipeline.set_params(1.0, 0.0, 1.0);
    pipeline.process();

    let snapshot = pipeline.edges().load_full();
    assert_eq!(snapshot.image.width(), 4);
    assert_eq!(snapshot.image.height(), 4);
    assert!(snapshot.image.data().iter().all(|&p| p == 0));
}

#[test]
fn generation_counts_every_successful_process() {
    let mut pipeline = GradientPipeline::new(full_scale_params());
    assert_eq!(pipeline.generation(), 0);

    pipeline.process(); // no source: no-op
    assert_eq!(pipeline.generation(), 0);

    pipeline.set_source(random_source(8, 8, 1));
    pipeline.process();
    assert_eq!(pipeline.generation(), 1);

    pipeline.set_source(random_source(8, 8, 2));
    pipeline.process();
    assert_eq!(pipeline.generation(), 2);

    let snapshot = pipeline.edges().load_full();
    assert_eq!(snapshot.generation, 2, "snapshot carries its generation");
}

#[test]
fn exposure_saturation_flattens_edges() {
    // Blowing the exposure out pushes every pixel to white, so the
    // gradient (and the edge image) collapses to zero.
    let mut pipeline = GradientPipeline::new(full_scale_params());
    pipeline.set_source(random_source(16, 16, 5));
    pipeline.set_params(1.0, 1.0, 1.0);
    pipeline.process();

    let snapshot = pipeline.edges().load_full();
    assert!(snapshot.image.data().iter().all(|&p| p == 0));
}
