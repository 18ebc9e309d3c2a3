//! Column sonification: one vertical strip of an edge image becomes a chord
//! of sine oscillators
//!
//! Mapping:
//! - each bright pixel in the column becomes a sine oscillator
//! - vertical position -> pitch (top high, bottom low), quantized to a
//!   repeating 6-note scale across 4 octaves
//!
//! Every row keeps its own phase accumulator across render calls, so an
//! oscillator that stays active is continuous across block boundaries.

use std::f32::consts::TAU;

use crate::raster::GrayRaster;

/// Semitone offsets of the repeating scale (minor-ish hexatonic).
const SCALE: [u32; 6] = [0, 3, 5, 7, 10, 12];
const SCALE_OCTAVES: u32 = 4;

/// Frequency extremes the quantized scale itself can produce (C3..C7).
/// Row pitches are remapped from this range into the user's bounds.
const SCALE_LOW_HZ: f32 = 130.8128;
const SCALE_HIGH_HZ: f32 = 2093.0045;

/// Rows at or below this normalized brightness stay silent. Strictly
/// greater-than: exactly-borderline pixels are excluded.
const BRIGHTNESS_THRESHOLD: f32 = 0.1;

/// Synthesis parameters; a pure value update taking effect on the next
/// render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SonifierParams {
    pub volume: f32,
    pub min_freq: f32,
    pub max_freq: f32,
}

impl Default for SonifierParams {
    fn default() -> Self {
        Self {
            volume: 0.5,
            min_freq: 100.0,
            max_freq: 4000.0,
        }
    }
}

/// Renders one image column per audio block as a sum of sine oscillators.
pub struct ColumnSonifier {
    sample_rate: f32,
    params: SonifierParams,
    phases: Vec<f32>,
    scratch: Vec<f32>,
}

impl ColumnSonifier {
    pub fn new(sample_rate: f32, block_size: usize) -> Self {
        Self {
            sample_rate,
            params: SonifierParams::default(),
            phases: Vec::new(),
            scratch: vec![0.0; block_size],
        }
    }

    /// Reconfigure for a new stream. Presizes the scratch buffer so the
    /// steady-state render path does not allocate.
    pub fn configure(&mut self, sample_rate: f32, block_size: usize) {
        self.sample_rate = sample_rate;
        self.scratch.resize(block_size, 0.0);
    }

    pub fn set_params(&mut self, params: SonifierParams) {
        self.params = params;
    }

    pub fn params(&self) -> SonifierParams {
        self.params
    }

    /// Render the column at `column_x` into `out` (interleaved stereo).
    /// Outputs silence when the image is empty. `column_x` is clamped to the
    /// image width.
    pub fn render_column(&mut self, image: &GrayRaster, column_x: i32, out: &mut [f32]) {
        let frames = out.len() / 2;
        if image.is_empty() {
            out.fill(0.0);
            return;
        }

        let width = image.width();
        let height = image.height();
        let column = (column_x.max(0) as usize).min(width - 1);

        self.ensure_bank(height);
        if self.scratch.len() != frames {
            self.scratch.resize(frames, 0.0);
        }
        self.scratch.fill(0.0);

        let mut active_rows = 0u32;
        for y in 0..height {
            let brightness = image.get(column, y) as f32 / 255.0;
            if brightness > BRIGHTNESS_THRESHOLD {
                active_rows += 1;
                self.accumulate_row(y, height, brightness);
            }
        }

        // Constant-power approximation: keeps perceived loudness stable as
        // the number of sounding rows changes.
        if active_rows > 0 {
            let normalization = 1.0 / (active_rows as f32).sqrt();
            for s in &mut self.scratch {
                *s *= normalization;
            }
        }

        for (i, frame) in out.chunks_exact_mut(2).enumerate() {
            let sample = self.scratch[i];
            frame[0] = sample;
            frame[1] = sample;
        }
    }

    /// One phase accumulator per image row. `Vec::resize` keeps the phases
    /// of surviving rows; a reset here would click on every height change.
    fn ensure_bank(&mut self, height: usize) {
        if self.phases.len() != height {
            self.phases.resize(height, 0.0);
        }
    }

    /// Add the oscillator for row `y` into the scratch buffer, advancing its
    /// phase at audio rate.
    fn accumulate_row(&mut self, y: usize, height: usize, brightness: f32) {
        let freq = self.frequency_from_row(y, height);
        let phase_inc = (freq / self.sample_rate) * TAU;
        let gain = brightness * self.params.volume;
        let mut phase = self.phases[y];
        for s in &mut self.scratch {
            *s += phase.sin() * gain;
            phase += phase_inc;
            if phase >= TAU {
                phase -= TAU;
            }
        }
        self.phases[y] = phase;
    }

    /// Map a row index to a frequency in Hz. Top rows map high, bottom rows
    /// low; pitches snap to the scale, then the scale's own extremes are
    /// remapped into [min_freq, max_freq] so the ordering survives any
    /// user-chosen bounds.
    pub fn frequency_from_row(&self, y: usize, height: usize) -> f32 {
        let t = if height > 1 {
            1.0 - y as f32 / (height - 1) as f32
        } else {
            1.0
        };

        let total_notes = SCALE.len() as u32 * SCALE_OCTAVES;
        let note_index = (t * (total_notes - 1) as f32).round() as u32;
        let octave = note_index / SCALE.len() as u32;
        let semitone = SCALE[note_index as usize % SCALE.len()];

        let midi_note = (48 + 12 * octave + semitone) as f32; // C3 base
        let base_freq = 440.0 * 2.0_f32.powf((midi_note - 69.0) / 12.0);
        remap_clamped(
            base_freq,
            SCALE_LOW_HZ,
            SCALE_HIGH_HZ,
            self.params.min_freq,
            self.params.max_freq,
        )
    }
}

fn remap_clamped(v: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let t = (v - in_min) / (in_max - in_min);
    (out_min + t * (out_max - out_min)).clamp(out_min.min(out_max), out_min.max(out_max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_extremes_hit_the_configured_bounds() {
        let sonifier = ColumnSonifier::new(44100.0, 512);
        let top = sonifier.frequency_from_row(0, 8);
        let bottom = sonifier.frequency_from_row(7, 8);
        assert!((top - 4000.0).abs() < 1e-2, "top row maps to max_freq, got {top}");
        assert!((bottom - 100.0).abs() < 1e-2, "bottom row maps to min_freq, got {bottom}");
    }

    #[test]
    fn single_row_image_is_treated_as_top() {
        let sonifier = ColumnSonifier::new(44100.0, 512);
        assert_eq!(
            sonifier.frequency_from_row(0, 1),
            sonifier.frequency_from_row(0, 2)
        );
    }

    #[test]
    fn borderline_brightness_stays_silent() {
        // 0.1 * 255 = 25.5, so 25 is below threshold; 26 crosses it.
        let mut sonifier = ColumnSonifier::new(44100.0, 64);
        let mut out = vec![0.0f32; 128];

        let quiet = GrayRaster::from_raw(1, 1, vec![25]).unwrap();
        sonifier.render_column(&quiet, 0, &mut out);
        assert!(out.iter().all(|&s| s == 0.0));

        let audible = GrayRaster::from_raw(1, 1, vec![26]).unwrap();
        sonifier.render_column(&audible, 0, &mut out);
        assert!(out.iter().any(|&s| s != 0.0));
    }
}
