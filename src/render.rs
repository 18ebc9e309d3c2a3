//! Offline rendering: sweep the playhead across an edge image and write the
//! result to a WAV file

use std::path::Path;

use tracing::info;

use crate::raster::GrayRaster;
use crate::sonifier::{ColumnSonifier, SonifierParams};

/// Configuration for rendering a sweep.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Block size for processing
    pub block_size: usize,
    /// Duration of one left-to-right sweep in seconds
    pub sweep_seconds: f32,
    /// Synthesis parameters for the sweep
    pub params: SonifierParams,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            block_size: 512,
            sweep_seconds: 8.0,
            params: SonifierParams::default(),
        }
    }
}

/// Statistics from a completed render.
#[derive(Debug, Clone, Copy)]
pub struct RenderStats {
    pub blocks: usize,
    pub seconds: f32,
    pub peak: f32,
}

pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render one full sweep over `image` to a 16-bit stereo WAV file.
    pub fn render_sweep(&self, image: &GrayRaster, output_path: &Path) -> Result<RenderStats, String> {
        let sample_rate = self.config.sample_rate;
        let block_size = self.config.block_size.max(1);

        let mut sonifier = ColumnSonifier::new(sample_rate as f32, block_size);
        sonifier.set_params(self.config.params);

        let spec = hound::WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(output_path, spec)
            .map_err(|e| format!("Failed to create {}: {}", output_path.display(), e))?;

        let total_blocks = ((self.config.sweep_seconds * sample_rate as f32)
            / block_size as f32)
            .ceil()
            .max(1.0) as usize;
        let mut block = vec![0.0f32; block_size * 2];
        let mut peak = 0.0f32;

        for i in 0..total_blocks {
            let progress = i as f32 / total_blocks as f32;
            let column = (progress * image.width() as f32) as i32;
            sonifier.render_column(image, column, &mut block);
            for &sample in &block {
                peak = peak.max(sample.abs());
                let quantized = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                writer
                    .write_sample(quantized)
                    .map_err(|e| format!("Failed to write sample: {}", e))?;
            }
        }

        writer
            .finalize()
            .map_err(|e| format!("Failed to finalize WAV: {}", e))?;

        let stats = RenderStats {
            blocks: total_blocks,
            seconds: total_blocks as f32 * block_size as f32 / sample_rate as f32,
            peak,
        };
        info!(
            path = %output_path.display(),
            blocks = stats.blocks,
            seconds = stats.seconds,
            peak = stats.peak,
            "rendered sweep"
        );
        Ok(stats)
    }
}
