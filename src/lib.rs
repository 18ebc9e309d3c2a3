//! # Photophone - Image-to-Audio Scanning Instrument
//!
//! Photophone turns a still or captured image into real-time audio. A
//! scanning playhead sweeps across an edge-detected version of the image,
//! and the pixel column under the playhead is played as a chord of sine
//! oscillators: each bright pixel is one oscillator, with its vertical
//! position mapped to a quantized musical scale. Physical knobs and buttons
//! (debounced, with hysteresis and a post-reset latch) tune the processing
//! and synthesis parameters live.
//!
//! ## Architecture
//!
//! - **Main tick** (`engine::Engine`): polls the control surface, feeds the
//!   image pipeline and the playhead, and publishes the processed edge
//!   image plus the current column through lock-free swaps.
//! - **Audio callback** (`engine::AudioRenderer`): exclusively owns the
//!   sonifier and renders one stereo block per callback from whatever
//!   snapshot is currently published. No locks anywhere on the audio path.
//!
//! ## Quick Start
//!
//! ```rust
//! use photophone::image_pipeline::{GradientPipeline, PipelineParams};
//! use photophone::raster::RgbRaster;
//! use photophone::sonifier::ColumnSonifier;
//!
//! // Process an image into an edge map
//! let mut pipeline = GradientPipeline::new(PipelineParams {
//!     scale_factor: 1.0,
//!     ..PipelineParams::default()
//! });
//! pipeline.set_source(RgbRaster::new(64, 64));
//! pipeline.process();
//!
//! // Sonify one column of it
//! let snapshot = pipeline.edges().load_full();
//! let mut sonifier = ColumnSonifier::new(44100.0, 512);
//! let mut block = vec![0.0f32; 512 * 2]; // interleaved stereo
//! sonifier.render_column(&snapshot.image, 32, &mut block);
//! ```

pub mod audio;
pub mod conditioner;
pub mod config;
pub mod controls;
pub mod engine;
pub mod image_pipeline;
pub mod playhead;
pub mod raster;
pub mod render;
pub mod sonifier;
pub mod sources;
pub mod test_utils;
