//! The instrument's physical control surface
//!
//! Seven knobs, one analog capture button and two GPIO switches, each
//! wrapped in its own conditioner. `poll` runs once per tick and returns
//! the mapped values plus the one-shot edges that fired.

use crate::conditioner::{
    AnalogButton, AnalogKnob, BinaryDecoder, Conditioner, ContinuousDecoder, DigitalLine,
    KnobMapping, ThresholdDecoder,
};
use crate::config::ControlsConfig;
use crate::sources::{RawAdc, RawGpio};

// Mappings mirror the reference front panel ranges.
const CONTRAST_MAP: KnobMapping = KnobMapping { min: 0.2, step: 0.05, max: 3.0, default: 1.0 };
const EXPOSURE_MAP: KnobMapping = KnobMapping { min: -1.0, step: 0.02, max: 1.0, default: 0.0 };
const SOBEL_MAP: KnobMapping = KnobMapping { min: 0.1, step: 0.05, max: 5.0, default: 1.0 };
const SPEED_MAP: KnobMapping = KnobMapping { min: -600.0, step: 10.0, max: 600.0, default: 120.0 };
const VOLUME_MAP: KnobMapping = KnobMapping { min: 0.0, step: 0.01, max: 1.0, default: 0.5 };
const MIN_FREQ_MAP: KnobMapping = KnobMapping { min: 20.0, step: 5.0, max: 1000.0, default: 100.0 };
const MAX_FREQ_MAP: KnobMapping = KnobMapping { min: 1000.0, step: 25.0, max: 10000.0, default: 4000.0 };

/// Snapshot of every control after one poll pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlFrame {
    pub contrast: f32,
    pub exposure: f32,
    pub sobel_strength: f32,
    pub playhead_speed: f32,
    pub volume: f32,
    pub min_freq: f32,
    pub max_freq: f32,
    pub capture_pressed: bool,
    pub run_toggled: bool,
    pub reset_pressed: bool,
}

pub struct ControlSurface {
    contrast: AnalogKnob,
    exposure: AnalogKnob,
    sobel_strength: AnalogKnob,
    playhead_speed: AnalogKnob,
    volume: AnalogKnob,
    min_freq: AnalogKnob,
    max_freq: AnalogKnob,
    capture: AnalogButton,
    run_toggle: DigitalLine,
    param_reset: DigitalLine,
    cfg: ControlsConfig,
}

impl ControlSurface {
    /// Resting value of the speed knob (its mapping default).
    pub fn default_speed() -> f32 {
        SPEED_MAP.default
    }

    pub fn new(cfg: ControlsConfig) -> Self {
        let knob = |mapping: KnobMapping| {
            Conditioner::new(
                ContinuousDecoder::new(mapping, cfg.latch_deadband),
                cfg.knob_read_period_ms,
                cfg.knob_debounce_ms,
            )
        };
        let line = || {
            Conditioner::new(
                BinaryDecoder::default(),
                cfg.line_read_period_ms,
                cfg.line_debounce_ms,
            )
        };
        Self {
            contrast: knob(CONTRAST_MAP),
            exposure: knob(EXPOSURE_MAP),
            sobel_strength: knob(SOBEL_MAP),
            playhead_speed: knob(SPEED_MAP),
            volume: knob(VOLUME_MAP),
            min_freq: knob(MIN_FREQ_MAP),
            max_freq: knob(MAX_FREQ_MAP),
            capture: Conditioner::new(
                ThresholdDecoder::new(cfg.capture_press_raw, cfg.capture_release_raw),
                cfg.button_read_period_ms,
                cfg.button_debounce_ms,
            ),
            run_toggle: line(),
            param_reset: line(),
            cfg,
        }
    }

    /// Poll every conditioner and collect values and edges.
    ///
    /// Switches are polled before the knobs so a reset edge freezes the
    /// knobs within the same tick.
    pub fn poll(
        &mut self,
        now_ms: u64,
        adc: &mut dyn RawAdc,
        gpio: &mut dyn RawGpio,
    ) -> ControlFrame {
        let run_line = self.cfg.run_line;
        let reset_line = self.cfg.reset_line;
        self.run_toggle.poll(now_ms, || line_raw(gpio, run_line));
        self.param_reset.poll(now_ms, || line_raw(gpio, reset_line));

        let reset_pressed = self.param_reset.take_pressed();
        self.param_reset.take_released();
        if reset_pressed {
            self.latch_all_knobs();
        }

        let ch = self.cfg.channels.clone();
        self.contrast.poll(now_ms, || adc.read_channel(ch.contrast));
        self.exposure.poll(now_ms, || adc.read_channel(ch.exposure));
        self.sobel_strength
            .poll(now_ms, || adc.read_channel(ch.sobel_strength));
        self.playhead_speed
            .poll(now_ms, || adc.read_channel(ch.playhead_speed));
        self.volume.poll(now_ms, || adc.read_channel(ch.volume));
        self.min_freq.poll(now_ms, || adc.read_channel(ch.min_freq));
        self.max_freq.poll(now_ms, || adc.read_channel(ch.max_freq));
        self.capture.poll(now_ms, || adc.read_channel(ch.capture));

        let run_toggled = self.run_toggle.take_pressed();
        self.run_toggle.take_released();
        let capture_pressed = self.capture.take_pressed();
        self.capture.take_released();

        ControlFrame {
            contrast: self.contrast.value(),
            exposure: self.exposure.value(),
            sobel_strength: self.sobel_strength.value(),
            playhead_speed: self.playhead_speed.value(),
            volume: self.volume.value(),
            min_freq: self.min_freq.value(),
            max_freq: self.max_freq.value(),
            capture_pressed,
            run_toggled,
            reset_pressed,
        }
    }

    /// Re-latch every knob at its default; each stays frozen until it
    /// physically moves past the deadband.
    fn latch_all_knobs(&mut self) {
        self.contrast.reset();
        self.exposure.reset();
        self.sobel_strength.reset();
        self.playhead_speed.reset();
        self.volume.reset();
        self.min_freq.reset();
        self.max_freq.reset();
    }
}

fn line_raw(gpio: &mut dyn RawGpio, line: u32) -> i32 {
    match gpio.read_line(line) {
        Some(true) => 1,
        Some(false) => 0,
        None => -1,
    }
}
