//! Layer Generators
//!
//! Each layer is generated independently into its own buffer:
//! - Bass: continuous sine tone
//! - Kick: periodic decaying transients
//! - Melody: chord segments with hard cuts
//! - Noise: broadband Gaussian noise
//!
//! Generators only read the shared [`TimeBase`], so they can run on
//! separate threads and are joined before mixing.

mod noise;
mod oscillator;
mod segment;
mod transient;

pub use noise::{generate_noise, NoiseLayer};
pub use oscillator::{generate_sine, ToneLayer};
pub use segment::{ChordSegment, SegmentSequencer};
pub use transient::{BeatSchedule, TransientLayer, DEFAULT_DECAY_PER_SECOND};

use crate::engine::{SampleBuffer, TimeBase};
use crate::error::Result;

/// Base trait for all layer generators
///
/// A generator is a pure function of its own parameters and the time base
/// (noise excepted when unseeded). It returns an owned buffer of exactly
/// `time_base.total_samples()` samples.
pub trait LayerGenerator: Send + Sync {
    /// Layer identifier used in logs and errors
    fn name(&self) -> &'static str;

    /// Generate the full-length layer buffer
    fn render(&self, time_base: &TimeBase) -> Result<SampleBuffer>;
}
