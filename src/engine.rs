//! Main-tick orchestration and the real-time audio half
//!
//! `Engine` runs on the application tick: it polls the control surface,
//! feeds the pipeline and playhead, and publishes everything the audio
//! callback needs. `AudioRenderer` is the audio callback's exclusive half;
//! the two communicate only through lock-free swaps and one atomic.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use crate::config::InstrumentConfig;
use crate::controls::ControlSurface;
use crate::image_pipeline::{EdgeHandle, GradientPipeline, PipelineParams};
use crate::playhead::{CoverTransform, Playhead};
use crate::sonifier::{ColumnSonifier, SonifierParams};
use crate::sources::{FrameSource, RawAdc, RawGpio};

/// Main-thread side of the instrument.
pub struct Engine {
    pipeline: GradientPipeline,
    playhead: Playhead,
    paused: bool,
    last_speed_control: f32,
    controls: ControlSurface,
    synth_params: Arc<ArcSwap<SonifierParams>>,
    column: Arc<AtomicU32>,
}

/// Audio-callback side: owns the sonifier and reads published state only.
pub struct AudioRenderer {
    edges: EdgeHandle,
    synth_params: Arc<ArcSwap<SonifierParams>>,
    column: Arc<AtomicU32>,
    sonifier: ColumnSonifier,
}

impl Engine {
    pub fn new(config: &InstrumentConfig) -> (Engine, AudioRenderer) {
        let pipeline = GradientPipeline::new(PipelineParams {
            scale_factor: config.processing.scale_factor,
            contrast: config.processing.contrast,
            exposure: config.processing.exposure,
            sobel_strength: config.processing.sobel_strength,
        });
        let synth_params = Arc::new(ArcSwap::from_pointee(SonifierParams::default()));
        let column = Arc::new(AtomicU32::new(0));

        let renderer = AudioRenderer {
            edges: pipeline.edges(),
            synth_params: Arc::clone(&synth_params),
            column: Arc::clone(&column),
            sonifier: ColumnSonifier::new(
                config.audio.sample_rate as f32,
                config.audio.block_size,
            ),
        };
        let engine = Engine {
            pipeline,
            playhead: Playhead::new(config.playhead.speed),
            paused: false,
            last_speed_control: ControlSurface::default_speed(),
            controls: ControlSurface::new(config.controls.clone()),
            synth_params,
            column,
        };
        (engine, renderer)
    }

    /// Pull a frame from the source and make it the pipeline input.
    pub fn capture(&mut self, frames: &mut dyn FrameSource) {
        if let Some(rgb) = frames.grab_frame() {
            info!(width = rgb.width(), height = rgb.height(), "captured frame");
            self.pipeline.set_source(rgb);
        }
    }

    /// One application tick.
    pub fn tick(
        &mut self,
        now_ms: u64,
        dt: f32,
        window_w: f32,
        window_h: f32,
        frames: &mut dyn FrameSource,
        adc: &mut dyn RawAdc,
        gpio: &mut dyn RawGpio,
    ) {
        let frame = self.controls.poll(now_ms, adc, gpio);

        if frame.capture_pressed {
            self.capture(frames);
        }
        if frame.run_toggled {
            self.paused = !self.paused;
            self.playhead.toggle_run();
            info!(running = self.playhead.is_running(), "playhead toggled");
        }

        self.pipeline
            .set_params(frame.contrast, frame.exposure, frame.sobel_strength);
        let params = SonifierParams {
            volume: frame.volume,
            min_freq: frame.min_freq,
            max_freq: frame.max_freq,
        };
        if **self.synth_params.load() != params {
            self.synth_params.store(Arc::new(params));
        }
        // The speed knob only drives the playhead when it moves, and only
        // while running; a programmatic speed survives until the physical
        // knob actually changes, and while paused the saved speed waits for
        // the next toggle.
        if frame.playhead_speed != self.last_speed_control {
            self.last_speed_control = frame.playhead_speed;
            if !self.paused {
                self.playhead.set_speed(frame.playhead_speed);
            }
        }

        self.pipeline.process();

        let position = self.playhead.advance(dt, window_w);
        let (img_w, img_h) = self.pipeline.dimensions();
        let cover = CoverTransform::new(window_w, window_h, img_w, img_h);
        let column = cover.screen_x_to_image_x(position, img_w);
        self.column.store(column as u32, Ordering::Relaxed);
    }

    pub fn playhead(&self) -> &Playhead {
        &self.playhead
    }

    pub fn playhead_mut(&mut self) -> &mut Playhead {
        &mut self.playhead
    }

    pub fn pipeline(&self) -> &GradientPipeline {
        &self.pipeline
    }

    /// Column currently under the playhead, in image coordinates.
    pub fn column(&self) -> u32 {
        self.column.load(Ordering::Relaxed)
    }
}

impl AudioRenderer {
    /// Render one stereo block. Real-time safe: loads the published
    /// snapshot and parameters, no locks, no steady-state allocation.
    pub fn render(&mut self, out: &mut [f32]) {
        let snapshot = self.edges.load();
        let params = **self.synth_params.load();
        self.sonifier.set_params(params);
        let column = self.column.load(Ordering::Relaxed) as i32;
        self.sonifier.render_column(&snapshot.image, column, out);
    }

    /// Reconfigure after the audio device reports its actual stream shape.
    pub fn configure(&mut self, sample_rate: f32, block_size: usize) {
        self.sonifier.configure(sample_rate, block_size);
    }
}
