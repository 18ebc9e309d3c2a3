//! Test utilities for audio verification

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Compare two audio buffers with a tolerance
pub fn compare_audio(actual: &[f32], expected: &[f32], tolerance: f32) -> bool {
    if actual.len() != expected.len() {
        return false;
    }

    for (a, e) in actual.iter().zip(expected.iter()) {
        if (a - e).abs() > tolerance {
            return false;
        }
    }

    true
}

/// Calculate RMS energy of an audio buffer
pub fn calculate_rms(audio: &[f32]) -> f32 {
    if audio.is_empty() {
        return 0.0;
    }
    let sum: f32 = audio.iter().map(|x| x * x).sum();
    (sum / audio.len() as f32).sqrt()
}

/// Extract the left channel of an interleaved stereo buffer
pub fn left_channel(interleaved: &[f32]) -> Vec<f32> {
    interleaved.iter().step_by(2).copied().collect()
}

/// Locate the dominant frequency of a mono buffer via an FFT peak
/// (Hann-windowed). Resolution is `sample_rate / audio.len()` Hz.
pub fn dominant_frequency(audio: &[f32], sample_rate: f32) -> f32 {
    let n = audio.len();
    if n < 2 {
        return 0.0;
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);

    let mut buffer: Vec<Complex<f32>> = audio
        .iter()
        .enumerate()
        .map(|(i, &sample)| {
            let window =
                0.5 - 0.5 * (std::f32::consts::TAU * i as f32 / n as f32).cos();
            Complex::new(sample * window, 0.0)
        })
        .collect();
    fft.process(&mut buffer);

    let mut best_bin = 0;
    let mut best_magnitude = 0.0f32;
    for (bin, value) in buffer.iter().enumerate().take(n / 2).skip(1) {
        let magnitude = value.norm();
        if magnitude > best_magnitude {
            best_magnitude = magnitude;
            best_bin = bin;
        }
    }

    best_bin as f32 * sample_rate / n as f32
}
