//! Time Base
//!
//! Maps a duration and sample rate onto the discrete sample index domain
//! shared by every layer generator.

use crate::error::{Result, TonebedError};

/// Longest run in samples: a 16-bit stereo WAV data chunk is capped at
/// `u32::MAX` bytes, four bytes per frame
pub const MAX_TOTAL_SAMPLES: usize = (u32::MAX / 4) as usize;

/// Discrete time domain of one synthesis run
///
/// Immutable once constructed; generators borrow it read-only.
///
/// # Example
/// ```
/// use tonebed::engine::TimeBase;
///
/// let time_base = TimeBase::new(44100, 1.5).unwrap();
/// assert_eq!(time_base.total_samples(), 66150);
/// assert_eq!(time_base.sample_index_at(0.5), 22050);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBase {
    sample_rate: u32,
    duration_secs: f64,
    total_samples: usize,
}

impl TimeBase {
    /// Create a time base for `duration_secs` seconds at `sample_rate` Hz
    ///
    /// # Errors
    /// * `InvalidParameter` - If the sample rate is zero, the duration is
    ///   not a positive finite number, or the run exceeds [`MAX_TOTAL_SAMPLES`]
    pub fn new(sample_rate: u32, duration_secs: f64) -> Result<Self> {
        if sample_rate == 0 {
            return Err(TonebedError::invalid(
                "sample_rate",
                "must be a positive number of samples per second",
            ));
        }
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(TonebedError::invalid(
                "duration_secs",
                format!("must be positive and finite, got {}", duration_secs),
            ));
        }

        let total_samples = (sample_rate as f64 * duration_secs).round();
        if total_samples > MAX_TOTAL_SAMPLES as f64 {
            return Err(TonebedError::invalid(
                "duration_secs",
                format!(
                    "{}s at {} Hz needs {} samples, more than the {} a WAV file can hold",
                    duration_secs, sample_rate, total_samples, MAX_TOTAL_SAMPLES
                ),
            ));
        }
        let total_samples = total_samples as usize;

        Ok(Self {
            sample_rate,
            duration_secs,
            total_samples,
        })
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Number of samples in the full-length buffer
    #[inline]
    pub fn total_samples(&self) -> usize {
        self.total_samples
    }

    /// Sample index of a point in time, clamped to `[0, total_samples]`
    pub fn sample_index_at(&self, seconds: f64) -> usize {
        self.samples_for(seconds).min(self.total_samples)
    }

    /// Number of samples spanned by `seconds`, without clamping to the run length
    ///
    /// Negative and NaN inputs map to zero.
    pub fn samples_for(&self, seconds: f64) -> usize {
        let samples = (seconds * self.sample_rate as f64).round();
        if samples > 0.0 {
            samples as usize
        } else {
            0
        }
    }

    /// Time in seconds of a sample index
    #[inline]
    pub fn seconds_at(&self, index: usize) -> f64 {
        index as f64 / self.sample_rate as f64
    }
}
