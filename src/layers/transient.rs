//! Transient Generator
//!
//! The percussive layer: a short exponentially decaying tone fired at a
//! regular beat interval.
//!
//! Each realized beat writes only inside its own window
//! `[onset, onset + window)`, where `onset = sample_index_at(b / beats_per_second)`
//! and `window = round(transient_duration_secs * sample_rate)`. A beat whose
//! window would run past the end of the time base is not realized, and no
//! later beat is considered, so the layer is silent after the last beat
//! that fits.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::engine::{SampleBuffer, TimeBase};
use crate::error::{Result, TonebedError};
use crate::layers::oscillator::{validate_amplitude, validate_frequency};
use crate::layers::LayerGenerator;

/// Default envelope decay constant in 1/s
pub const DEFAULT_DECAY_PER_SECOND: f64 = 10.0;

/// Timing and tone of the percussive layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeatSchedule {
    /// Beat onsets per second, starting at t = 0
    pub beats_per_second: f64,
    /// Length of each transient in seconds
    pub transient_duration_secs: f64,
    /// Frequency of the transient tone in Hz
    pub tone_frequency_hz: f64,
    /// Decay constant `k` of `exp(-k·τ)`, in 1/s
    #[serde(default = "default_decay")]
    pub decay_per_second: f64,
}

fn default_decay() -> f64 {
    DEFAULT_DECAY_PER_SECOND
}

impl BeatSchedule {
    /// Create a beat schedule with the default decay
    pub fn new(beats_per_second: f64, transient_duration_secs: f64, tone_frequency_hz: f64) -> Self {
        Self {
            beats_per_second,
            transient_duration_secs,
            tone_frequency_hz,
            decay_per_second: DEFAULT_DECAY_PER_SECOND,
        }
    }

    /// Set the envelope decay constant
    pub fn with_decay(mut self, decay_per_second: f64) -> Self {
        self.decay_per_second = decay_per_second;
        self
    }

    /// Validate every field
    ///
    /// # Errors
    /// * `InvalidParameter` - For non-positive rates, durations or frequencies,
    ///   or a negative decay
    pub fn validate(&self) -> Result<()> {
        if !self.beats_per_second.is_finite() || self.beats_per_second <= 0.0 {
            return Err(TonebedError::invalid(
                "kick.beats_per_second",
                format!("must be positive, got {}", self.beats_per_second),
            ));
        }
        if !self.transient_duration_secs.is_finite() || self.transient_duration_secs <= 0.0 {
            return Err(TonebedError::invalid(
                "kick.transient_duration_secs",
                format!("must be positive, got {}", self.transient_duration_secs),
            ));
        }
        validate_frequency("kick.tone_frequency_hz", self.tone_frequency_hz)?;
        if !self.decay_per_second.is_finite() || self.decay_per_second < 0.0 {
            return Err(TonebedError::invalid(
                "kick.decay_per_second",
                format!("must be non-negative, got {}", self.decay_per_second),
            ));
        }
        Ok(())
    }

    /// Window length of one transient in samples
    pub fn window_samples(&self, time_base: &TimeBase) -> usize {
        time_base.samples_for(self.transient_duration_secs)
    }

    /// Onset sample indices of every beat that fits entirely in the time base
    pub fn onsets(&self, time_base: &TimeBase) -> Vec<usize> {
        let window = self.window_samples(time_base);
        let total = time_base.total_samples();

        let mut onsets = Vec::new();
        for beat in 0_u64.. {
            let beat_time = beat as f64 / self.beats_per_second;
            if beat_time > time_base.duration_secs() {
                break;
            }
            let onset = time_base.sample_index_at(beat_time);
            if onset.saturating_add(window) > total {
                break;
            }
            onsets.push(onset);
        }
        onsets
    }
}

/// The percussive layer: a [`BeatSchedule`] played at a fixed amplitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransientLayer {
    schedule: BeatSchedule,
    amplitude: f64,
}

impl TransientLayer {
    /// Create a transient layer
    ///
    /// # Errors
    /// * `InvalidParameter` - If the schedule or amplitude is invalid
    pub fn new(schedule: BeatSchedule, amplitude: f64) -> Result<Self> {
        schedule.validate()?;
        validate_amplitude("kick.amplitude", amplitude)?;
        Ok(Self {
            schedule,
            amplitude,
        })
    }

    /// The beat schedule driving this layer
    pub fn schedule(&self) -> &BeatSchedule {
        &self.schedule
    }

    /// One transient: `amplitude · sin(2π f τ) · exp(-k τ)` for τ in the window
    fn transient(&self, time_base: &TimeBase) -> SampleBuffer {
        let sample_rate = time_base.sample_rate() as f64;
        let frequency = self.schedule.tone_frequency_hz;
        let decay = self.schedule.decay_per_second;

        (0..self.schedule.window_samples(time_base))
            .map(|n| {
                let tau = n as f64 / sample_rate;
                self.amplitude * (TAU * frequency * tau).sin() * (-decay * tau).exp()
            })
            .collect::<Vec<f64>>()
            .into()
    }
}

impl LayerGenerator for TransientLayer {
    fn name(&self) -> &'static str {
        "kick"
    }

    fn render(&self, time_base: &TimeBase) -> Result<SampleBuffer> {
        let mut output = SampleBuffer::silence(time_base.total_samples());
        let transient = self.transient(time_base);

        for onset in self.schedule.onsets(time_base) {
            output.add_at(onset, &transient)?;
        }

        Ok(output)
    }
}
