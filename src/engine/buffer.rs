//! Sample Buffers
//!
//! Real-valued layer/mix buffers, the terminal 16-bit quantized buffer, and
//! the analysis helpers used for logging and normalization.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TonebedError};

// ============================================================================
// Constants
// ============================================================================

/// Largest positive 16-bit PCM sample, the full-scale quantization factor
pub const PCM16_FULL_SCALE: f64 = 32767.0;

/// Bit depth of the quantized output
pub const OUTPUT_BIT_DEPTH: u16 = 16;

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert linear amplitude to decibels
///
/// # Returns
/// Value in decibels. Returns -f64::INFINITY for zero input.
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    if linear <= 0.0 {
        f64::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

// ============================================================================
// Channel Layout
// ============================================================================

/// Output channel configuration
///
/// The synthesized signal is mono; stereo output duplicates it into both
/// channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLayout {
    /// Single channel (mono)
    #[default]
    Mono,
    /// Two identical channels
    Stereo,
}

impl ChannelLayout {
    /// Returns the number of channels for this layout
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Create a ChannelLayout from a channel count
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }
}

// ============================================================================
// Sample Buffer
// ============================================================================

/// An owned sequence of real-valued samples
///
/// Each generator returns one of these, either full length or scoped to a
/// sub-range of the time base. The Mixer only ever reads them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleBuffer {
    samples: Vec<f64>,
}

impl SampleBuffer {
    /// Create a buffer of `len` silent samples
    pub fn silence(len: usize) -> Self {
        Self {
            samples: vec![0.0; len],
        }
    }

    /// Wrap existing sample data
    pub fn from_samples(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    /// Number of samples
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Read-only view of the samples
    #[inline]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Mutable view of the samples
    #[inline]
    pub fn samples_mut(&mut self) -> &mut [f64] {
        &mut self.samples
    }

    /// Consume the buffer, returning the raw samples
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    /// Additively accumulate `other` into this buffer starting at `offset`
    ///
    /// # Errors
    /// * `BufferLengthMismatch` - If `other` would extend past the end of
    ///   this buffer
    pub fn add_at(&mut self, offset: usize, other: &SampleBuffer) -> Result<()> {
        let end = offset + other.len();
        if end > self.len() {
            return Err(TonebedError::BufferLengthMismatch {
                layer: "accumulation".to_string(),
                expected: self.len(),
                actual: end,
            });
        }

        for (dst, src) in self.samples[offset..end].iter_mut().zip(other.samples()) {
            *dst += *src;
        }

        Ok(())
    }

    /// Largest absolute sample value (0.0 for an empty buffer)
    pub fn peak(&self) -> f64 {
        self.samples.iter().map(|s| s.abs()).fold(0.0_f64, f64::max)
    }

    /// Mean sample value (0.0 for an empty buffer)
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Population variance of the samples (0.0 for an empty buffer)
    pub fn variance(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        self.samples
            .iter()
            .map(|s| (s - mean) * (s - mean))
            .sum::<f64>()
            / self.samples.len() as f64
    }

    /// Root mean square level (0.0 for an empty buffer)
    pub fn rms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_squares: f64 = self.samples.iter().map(|s| s * s).sum();
        (sum_squares / self.samples.len() as f64).sqrt()
    }

    /// RMS level in dB. Returns -f64::INFINITY for empty or silent buffers.
    pub fn rms_db(&self) -> f64 {
        linear_to_db(self.rms())
    }
}

impl From<Vec<f64>> for SampleBuffer {
    fn from(samples: Vec<f64>) -> Self {
        Self::from_samples(samples)
    }
}

// ============================================================================
// Quantized Buffer
// ============================================================================

/// Terminal 16-bit signed PCM buffer of a synthesis run
///
/// Write-once: built by the quantizer, then only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizedBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl QuantizedBuffer {
    pub(crate) fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// The quantized samples
    #[inline]
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
