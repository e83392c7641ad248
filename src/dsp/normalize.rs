//! Normalizer & Quantizer
//!
//! Peak-normalizes the mixed buffer into [-1, 1] and maps it onto signed
//! 16-bit PCM.

use log::warn;

use crate::engine::buffer::PCM16_FULL_SCALE;
use crate::engine::{QuantizedBuffer, SampleBuffer};
use crate::error::TonebedError;

/// A peak-normalized buffer and the peak it was divided by
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    buffer: SampleBuffer,
    peak: f64,
}

impl Normalized {
    /// The normalized samples, all within [-1, 1]
    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    /// Peak absolute value of the input before normalization
    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// Whether the input had no usable peak (silent or overflowed)
    pub fn is_degenerate(&self) -> bool {
        is_degenerate_peak(self.peak)
    }

    /// The recoverable diagnostic for a degenerate input, if any
    pub fn diagnostic(&self) -> Option<TonebedError> {
        self.is_degenerate().then_some(TonebedError::DegenerateSignal)
    }
}

fn is_degenerate_peak(peak: f64) -> bool {
    peak == 0.0 || !peak.is_finite()
}

/// Divide every sample by the peak absolute value
///
/// A zero or non-finite peak yields an all-zero buffer and a warning
/// instead of dividing by it.
pub fn normalize(mixed: &SampleBuffer) -> Normalized {
    let peak = mixed.peak();

    if is_degenerate_peak(peak) {
        warn!("{} (peak {})", TonebedError::DegenerateSignal, peak);
        return Normalized {
            buffer: SampleBuffer::silence(mixed.len()),
            peak,
        };
    }

    let buffer = mixed
        .samples()
        .iter()
        .map(|sample| sample / peak)
        .collect::<Vec<f64>>()
        .into();

    Normalized { buffer, peak }
}

/// Map a normalized sample to 16-bit PCM
///
/// `round(sample * 32767)`, clamped to the i16 range.
#[inline]
pub fn quantize_sample(sample: f64) -> i16 {
    (sample * PCM16_FULL_SCALE)
        .round()
        .clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

/// Quantize a normalized buffer
pub fn quantize(normalized: &SampleBuffer, sample_rate: u32) -> QuantizedBuffer {
    let samples = normalized
        .samples()
        .iter()
        .map(|&sample| quantize_sample(sample))
        .collect();

    QuantizedBuffer::new(samples, sample_rate)
}
