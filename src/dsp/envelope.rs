//! Envelope Shaper
//!
//! Per-sample gain curve with a linear fade-in, a linear fade-out and unity
//! gain in between.
//!
//! Both ramps are inclusive: the fade-in runs 0 → 1 over its first
//! `fade_in` samples and the fade-out runs 1 → 0 over the last `fade_out`
//! samples, so the first and last samples of a faded run are exactly zero.
//! When the two regions overlap the gain at each sample is the smaller of
//! the two ramps, which keeps it inside [0, 1].

use log::warn;
use serde::{Deserialize, Serialize};

use crate::engine::TimeBase;
use crate::error::{Result, TonebedError};

/// What to do when fade-in and fade-out regions overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeOverlap {
    /// Take the minimum of both ramps
    #[default]
    Minimum,
    /// Reject the score with `InvalidParameter`
    Reject,
}

/// Fade-in/fade-out description of the master envelope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeCurve {
    /// Fade-in length in seconds
    pub fade_in_secs: f64,
    /// Fade-out length in seconds
    pub fade_out_secs: f64,
    /// Overlap resolution policy
    #[serde(default)]
    pub overlap: FadeOverlap,
}

impl Default for EnvelopeCurve {
    fn default() -> Self {
        Self::none()
    }
}

impl EnvelopeCurve {
    /// Create an envelope with the default overlap policy
    pub fn new(fade_in_secs: f64, fade_out_secs: f64) -> Self {
        Self {
            fade_in_secs,
            fade_out_secs,
            overlap: FadeOverlap::default(),
        }
    }

    /// Unity gain everywhere
    pub fn none() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Set the overlap policy
    pub fn with_overlap(mut self, overlap: FadeOverlap) -> Self {
        self.overlap = overlap;
        self
    }

    /// Validate the fades against a run length
    ///
    /// # Errors
    /// * `InvalidParameter` - For negative or non-finite fades, or overlapping
    ///   fades under [`FadeOverlap::Reject`]
    pub fn validate(&self, duration_secs: f64) -> Result<()> {
        for (parameter, value) in [
            ("envelope.fade_in_secs", self.fade_in_secs),
            ("envelope.fade_out_secs", self.fade_out_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TonebedError::invalid(
                    parameter,
                    format!("must be non-negative and finite, got {}", value),
                ));
            }
        }

        if self.overlap == FadeOverlap::Reject
            && self.fade_in_secs + self.fade_out_secs > duration_secs
        {
            return Err(TonebedError::invalid(
                "envelope",
                format!(
                    "fade in ({}s) and fade out ({}s) overlap in a {}s run",
                    self.fade_in_secs, self.fade_out_secs, duration_secs
                ),
            ));
        }

        Ok(())
    }

    /// Build the per-sample gain curve over the time base
    pub fn gain_curve(&self, time_base: &TimeBase) -> Result<GainCurve> {
        self.validate(time_base.duration_secs())?;

        let total = time_base.total_samples();
        let fade_in = time_base.samples_for(self.fade_in_secs).min(total);
        let fade_out = time_base.samples_for(self.fade_out_secs).min(total);

        if fade_in + fade_out > total {
            if self.overlap == FadeOverlap::Reject {
                return Err(TonebedError::invalid(
                    "envelope",
                    format!(
                        "fade regions of {} and {} samples overlap in {} samples",
                        fade_in, fade_out, total
                    ),
                ));
            }
            warn!(
                "Fade in ({} samples) and fade out ({} samples) overlap in {} samples; using the minimum of both ramps",
                fade_in, fade_out, total
            );
        }

        let fade_out_start = total - fade_out;
        let gains = (0..total)
            .map(|n| {
                let rising = if n < fade_in {
                    ramp(n, fade_in)
                } else {
                    1.0
                };
                let falling = if n >= fade_out_start {
                    ramp(total - 1 - n, fade_out)
                } else {
                    1.0
                };
                rising.min(falling)
            })
            .collect();

        Ok(GainCurve { gains })
    }
}

/// Position `k` on an inclusive 0 → 1 ramp of `len` samples
fn ramp(k: usize, len: usize) -> f64 {
    if len <= 1 {
        0.0
    } else {
        k as f64 / (len - 1) as f64
    }
}

/// Per-sample multiplicative gain, one value per time base sample
#[derive(Debug, Clone, PartialEq)]
pub struct GainCurve {
    gains: Vec<f64>,
}

impl GainCurve {
    /// Unity gain over `len` samples
    pub fn unity(len: usize) -> Self {
        Self {
            gains: vec![1.0; len],
        }
    }

    /// The gain values
    #[inline]
    pub fn gains(&self) -> &[f64] {
        &self.gains
    }

    /// Number of samples
    #[inline]
    pub fn len(&self) -> usize {
        self.gains.len()
    }

    /// Whether the curve is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gains.is_empty()
    }
}
