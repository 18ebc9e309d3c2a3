//! Photophone CLI - scan an image as live audio or render a sweep to WAV

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tracing::info;

use photophone::audio::AudioOutput;
use photophone::config::InstrumentConfig;
use photophone::engine::Engine;
use photophone::image_pipeline::{GradientPipeline, PipelineParams};
use photophone::render::{RenderConfig, Renderer};
use photophone::sonifier::SonifierParams;
use photophone::sources::{FrameSource, ImageFileSource, NullAdc, NullGpio};

#[derive(Parser)]
#[command(name = "photophone")]
#[command(about = "Image-to-audio scanning instrument", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an image and play it through the default audio output
    Play {
        /// Image file to scan
        image: PathBuf,

        /// Playhead speed in screen pixels per second
        #[arg(short, long)]
        speed: Option<f32>,

        /// Virtual screen width the playhead sweeps across
        #[arg(long, default_value = "1280")]
        width: f32,

        /// Virtual screen height used for the cover transform
        #[arg(long, default_value = "800")]
        height: f32,

        /// Stop after this many seconds (default: run until interrupted)
        #[arg(short, long)]
        duration: Option<f32>,
    },

    /// Render one full sweep of an image to a WAV file
    Render {
        /// Image file to scan
        image: PathBuf,

        /// Output WAV file path
        output: PathBuf,

        /// Sweep duration in seconds
        #[arg(short, long, default_value = "8.0")]
        duration: f32,

        /// Sample rate in Hz
        #[arg(short, long, default_value = "44100")]
        sample_rate: u32,

        /// Output volume 0.0-1.0
        #[arg(short, long, default_value = "0.5")]
        volume: f32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = InstrumentConfig::load_or_default(cli.config.as_deref());

    match cli.command {
        Commands::Play {
            image,
            speed,
            width,
            height,
            duration,
        } => play(&config, &image, speed, width, height, duration),
        Commands::Render {
            image,
            output,
            duration,
            sample_rate,
            volume,
        } => render(&config, &image, &output, duration, sample_rate, volume),
    }
}

fn play(
    config: &InstrumentConfig,
    image: &PathBuf,
    speed: Option<f32>,
    width: f32,
    height: f32,
    duration: Option<f32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut frames = ImageFileSource::load(image)?;
    let (mut engine, renderer) = Engine::new(config);

    // Seed the pipeline directly; the capture button does this on hardware.
    engine.capture(&mut frames);
    if let Some(speed) = speed {
        engine.playhead_mut().set_speed(speed);
    }

    let _audio = AudioOutput::start(renderer)?;

    let mut adc = NullAdc;
    let mut gpio = NullGpio;
    let start = Instant::now();
    let mut last_tick = start;

    info!("scanning; press Ctrl-C to stop");
    loop {
        std::thread::sleep(Duration::from_millis(16));
        let now = Instant::now();
        let dt = now.duration_since(last_tick).as_secs_f32();
        last_tick = now;

        engine.tick(
            start.elapsed().as_millis() as u64,
            dt,
            width,
            height,
            &mut frames,
            &mut adc,
            &mut gpio,
        );

        if let Some(limit) = duration {
            if start.elapsed().as_secs_f32() >= limit {
                break;
            }
        }
    }
    Ok(())
}

fn render(
    config: &InstrumentConfig,
    image: &PathBuf,
    output: &PathBuf,
    duration: f32,
    sample_rate: u32,
    volume: f32,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut frames = ImageFileSource::load(image)?;
    let mut pipeline = GradientPipeline::new(PipelineParams {
        scale_factor: config.processing.scale_factor,
        contrast: config.processing.contrast,
        exposure: config.processing.exposure,
        sobel_strength: config.processing.sobel_strength,
    });
    if let Some(frame) = frames.grab_frame() {
        pipeline.set_source(frame);
    }
    pipeline.process();
    let snapshot = pipeline.edges().load_full();

    let renderer = Renderer::new(RenderConfig {
        sample_rate,
        block_size: config.audio.block_size,
        sweep_seconds: duration,
        params: SonifierParams {
            volume,
            ..SonifierParams::default()
        },
    });
    let stats = renderer.render_sweep(&snapshot.image, output)?;
    info!(
        "wrote {} ({:.1}s, peak {:.3})",
        output.display(),
        stats.seconds,
        stats.peak
    );
    Ok(())
}
