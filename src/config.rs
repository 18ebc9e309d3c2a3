//! Instrument configuration loaded from TOML
//!
//! Every section falls back to the reference defaults, so a partial (or
//! absent) file is always usable.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::conditioner;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    pub audio: AudioConfig,
    pub processing: ProcessingConfig,
    pub playhead: PlayheadConfig,
    pub controls: ControlsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub block_size: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            block_size: 512,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub scale_factor: f32,
    pub contrast: f32,
    pub exposure: f32,
    pub sobel_strength: f32,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            scale_factor: 0.25,
            contrast: 1.0,
            exposure: 0.0,
            sobel_strength: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayheadConfig {
    /// Initial speed in screen pixels per second.
    pub speed: f32,
}

impl Default for PlayheadConfig {
    fn default() -> Self {
        Self { speed: 120.0 }
    }
}

/// Timing constants and channel/line assignments for the control surface.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub knob_read_period_ms: u64,
    pub knob_debounce_ms: u64,
    pub latch_deadband: i32,
    pub button_read_period_ms: u64,
    pub button_debounce_ms: u64,
    pub line_read_period_ms: u64,
    pub line_debounce_ms: u64,
    pub capture_press_raw: i32,
    pub capture_release_raw: i32,
    pub channels: ChannelMap,
    pub run_line: u32,
    pub reset_line: u32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            knob_read_period_ms: conditioner::KNOB_READ_PERIOD_MS,
            knob_debounce_ms: conditioner::KNOB_DEBOUNCE_MS,
            latch_deadband: conditioner::KNOB_LATCH_DEADBAND,
            button_read_period_ms: conditioner::BUTTON_READ_PERIOD_MS,
            button_debounce_ms: conditioner::BUTTON_DEBOUNCE_MS,
            line_read_period_ms: conditioner::LINE_READ_PERIOD_MS,
            line_debounce_ms: conditioner::LINE_DEBOUNCE_MS,
            capture_press_raw: conditioner::PRESS_RAW_DEFAULT,
            capture_release_raw: conditioner::RELEASE_RAW_DEFAULT,
            channels: ChannelMap::default(),
            run_line: 17,
            reset_line: 27,
        }
    }
}

/// MCP3008 channel assignment, one channel per control.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChannelMap {
    pub contrast: u8,
    pub exposure: u8,
    pub sobel_strength: u8,
    pub playhead_speed: u8,
    pub volume: u8,
    pub min_freq: u8,
    pub max_freq: u8,
    pub capture: u8,
}

impl Default for ChannelMap {
    fn default() -> Self {
        Self {
            contrast: 0,
            exposure: 1,
            sobel_strength: 2,
            playhead_speed: 3,
            volume: 4,
            min_freq: 5,
            max_freq: 6,
            capture: 7,
        }
    }
}

impl InstrumentConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        toml::from_str(&text).map_err(|e| format!("Failed to parse config {}: {}", path.display(), e))
    }

    /// Load a config file if given, falling back to defaults on a missing
    /// path or parse failure.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::load(p).unwrap_or_else(|e| {
                warn!("{e}; using default configuration");
                Self::default()
            }),
            None => Self::default(),
        }
    }
}
