//! Debounced conditioning for physical controls
//!
//! One generic state machine covers every control: a decoder turns the raw
//! sample into a logical value, and a shared debounce stage commits that
//! value once it has been stable long enough, emitting one-shot edges on
//! commit. Knobs, analog buttons and digital lines differ only in their
//! decoder.
//!
//! Each conditioner rate-limits its own sampling, so hardware polling
//! frequency is independent of the application tick rate.

/// Default polling/debounce constants. Overridable through `config`.
pub const KNOB_READ_PERIOD_MS: u64 = 200;
pub const KNOB_DEBOUNCE_MS: u64 = 0;
pub const KNOB_LATCH_DEADBAND: i32 = 8;
pub const BUTTON_READ_PERIOD_MS: u64 = 20;
pub const BUTTON_DEBOUNCE_MS: u64 = 30;
pub const LINE_READ_PERIOD_MS: u64 = 10;
pub const LINE_DEBOUNCE_MS: u64 = 30;
pub const PRESS_RAW_DEFAULT: i32 = 700;
pub const RELEASE_RAW_DEFAULT: i32 = 600;

/// Turns one raw sample into a logical value.
///
/// `raw` is 0..1023 for ADC channels, 0/1 for digital lines, and -1 when the
/// read failed or has not happened yet.
pub trait ValueDecoder {
    type Output: Copy + PartialEq + PartialOrd;

    fn decode(&mut self, raw: i32) -> Self::Output;

    /// Value the conditioner starts from (and returns to on a knob reset).
    fn initial(&self) -> Self::Output;
}

/// Generic debounced conditioner around a [`ValueDecoder`].
pub struct Conditioner<D: ValueDecoder> {
    decoder: D,
    read_period_ms: u64,
    debounce_ms: u64,
    has_read: bool,
    last_read_ms: u64,
    last_raw: i32,
    candidate: D::Output,
    candidate_since_ms: u64,
    committed: D::Output,
    pressed_edge: bool,
    released_edge: bool,
}

impl<D: ValueDecoder> Conditioner<D> {
    pub fn new(decoder: D, read_period_ms: u64, debounce_ms: u64) -> Self {
        let initial = decoder.initial();
        Self {
            decoder,
            read_period_ms,
            debounce_ms,
            has_read: false,
            last_read_ms: 0,
            last_raw: -1,
            candidate: initial,
            candidate_since_ms: 0,
            committed: initial,
            pressed_edge: false,
            released_edge: false,
        }
    }

    /// Poll once. `read` is only invoked when the read period has elapsed.
    ///
    /// A changed candidate restarts the candidacy timer; the commit happens
    /// on a later poll once the candidate has been stable for the debounce
    /// interval. A rising commit sets the pressed edge, a falling commit the
    /// released edge.
    pub fn poll<F: FnOnce() -> i32>(&mut self, now_ms: u64, read: F) {
        if self.has_read
            && self.read_period_ms > 0
            && now_ms.saturating_sub(self.last_read_ms) < self.read_period_ms
        {
            return;
        }
        self.has_read = true;
        self.last_read_ms = now_ms;
        self.last_raw = read();

        let desired = self.decoder.decode(self.last_raw);
        if desired != self.candidate {
            self.candidate = desired;
            self.candidate_since_ms = now_ms;
        }

        if self.committed != self.candidate
            && (self.debounce_ms == 0
                || now_ms.saturating_sub(self.candidate_since_ms) >= self.debounce_ms)
        {
            let rising = self.candidate > self.committed;
            self.committed = self.candidate;
            if rising {
                self.pressed_edge = true;
            } else {
                self.released_edge = true;
            }
        }
    }

    /// Committed (debounced) value.
    pub fn value(&self) -> D::Output {
        self.committed
    }

    /// Latest raw sample (-1 if never read).
    pub fn raw(&self) -> i32 {
        self.last_raw
    }

    /// One-shot rising edge, cleared on read.
    pub fn take_pressed(&mut self) -> bool {
        std::mem::take(&mut self.pressed_edge)
    }

    /// One-shot falling edge, cleared on read.
    pub fn take_released(&mut self) -> bool {
        std::mem::take(&mut self.released_edge)
    }
}

// === Continuous decoder (knob) ===

/// Linear raw->value mapping with optional step quantization.
#[derive(Debug, Clone, Copy)]
pub struct KnobMapping {
    pub min: f32,
    pub step: f32,
    pub max: f32,
    pub default: f32,
}

impl KnobMapping {
    pub fn new(min: f32, step: f32, max: f32, default: f32) -> Self {
        Self {
            min,
            step,
            max,
            default,
        }
    }

    /// Map a valid raw sample (0..1023) into [min, max], snapped to the
    /// nearest multiple of `step` from `min` (step <= 0 disables snapping).
    pub fn apply(&self, raw: i32) -> f32 {
        let t = (raw as f32 / 1023.0).clamp(0.0, 1.0);
        let mut v = self.min + t * (self.max - self.min);
        if self.step > 0.0 {
            v = self.min + ((v - self.min) / self.step).round() * self.step;
        }
        v.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy)]
enum Latch {
    Live,
    Latched { recorded_raw: i32 },
}

/// Decoder for potentiometers: linear mapping plus the post-reset latch.
///
/// After `latch_at`, the mapped value stays frozen at the default until the
/// raw reading moves more than `deadband` counts away from the recorded
/// position; the latched->live transition is one-way per reset cycle.
pub struct ContinuousDecoder {
    mapping: KnobMapping,
    deadband: i32,
    latch: Latch,
}

impl ContinuousDecoder {
    pub fn new(mapping: KnobMapping, deadband: i32) -> Self {
        Self {
            mapping,
            deadband,
            latch: Latch::Live,
        }
    }

    fn latch_at(&mut self, recorded_raw: i32) {
        self.latch = Latch::Latched { recorded_raw };
    }
}

impl ValueDecoder for ContinuousDecoder {
    type Output = f32;

    fn decode(&mut self, raw: i32) -> f32 {
        if raw < 0 {
            return self.mapping.default;
        }
        if let Latch::Latched { recorded_raw } = self.latch {
            if (raw - recorded_raw).abs() > self.deadband {
                self.latch = Latch::Live;
            } else {
                return self.mapping.default;
            }
        }
        self.mapping.apply(raw)
    }

    fn initial(&self) -> f32 {
        self.mapping.default
    }
}

// === Threshold decoder (analog button) ===

/// Schmitt trigger over a raw ADC value: pressed when raw >= press_raw,
/// released when raw <= release_raw; readings inside the band keep the
/// current state.
pub struct ThresholdDecoder {
    press_raw: i32,
    release_raw: i32,
    desired: bool,
}

impl ThresholdDecoder {
    pub fn new(press_raw: i32, release_raw: i32) -> Self {
        Self {
            press_raw,
            release_raw,
            desired: false,
        }
    }
}

impl ValueDecoder for ThresholdDecoder {
    type Output = bool;

    fn decode(&mut self, raw: i32) -> bool {
        if raw >= 0 {
            if !self.desired && raw >= self.press_raw {
                self.desired = true;
            } else if self.desired && raw <= self.release_raw {
                self.desired = false;
            }
        }
        self.desired
    }

    fn initial(&self) -> bool {
        false
    }
}

// === Binary decoder (digital line) ===

/// Decoder for lines that already read as pressed/not-pressed.
#[derive(Default)]
pub struct BinaryDecoder {
    desired: bool,
}

impl ValueDecoder for BinaryDecoder {
    type Output = bool;

    fn decode(&mut self, raw: i32) -> bool {
        if raw >= 0 {
            self.desired = raw != 0;
        }
        self.desired
    }

    fn initial(&self) -> bool {
        false
    }
}

// === Specializations ===

/// One potentiometer on an ADC channel.
pub type AnalogKnob = Conditioner<ContinuousDecoder>;

/// One momentary switch read through an ADC channel.
pub type AnalogButton = Conditioner<ThresholdDecoder>;

/// One momentary switch on a digital GPIO line.
pub type DigitalLine = Conditioner<BinaryDecoder>;

impl AnalogKnob {
    pub fn knob(mapping: KnobMapping, deadband: i32) -> Self {
        Conditioner::new(
            ContinuousDecoder::new(mapping, deadband),
            KNOB_READ_PERIOD_MS,
            KNOB_DEBOUNCE_MS,
        )
    }

    /// Record the current raw position and freeze the mapped value at the
    /// default until the physical control moves past the deadband.
    pub fn reset(&mut self) {
        self.decoder.latch_at(self.last_raw);
        let initial = self.decoder.initial();
        self.candidate = initial;
        self.committed = initial;
    }
}

impl AnalogButton {
    pub fn button(press_raw: i32, release_raw: i32) -> Self {
        Conditioner::new(
            ThresholdDecoder::new(press_raw, release_raw),
            BUTTON_READ_PERIOD_MS,
            BUTTON_DEBOUNCE_MS,
        )
    }

    pub fn is_pressed(&self) -> bool {
        self.committed
    }
}

impl DigitalLine {
    pub fn line() -> Self {
        Conditioner::new(
            BinaryDecoder::default(),
            LINE_READ_PERIOD_MS,
            LINE_DEBOUNCE_MS,
        )
    }

    pub fn is_pressed(&self) -> bool {
        self.committed
    }
}
