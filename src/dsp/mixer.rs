//! Mixer
//!
//! Sums layer buffers sample-wise into a new owned buffer and applies the
//! master gain curve. Inputs are only borrowed.

use log::debug;

use crate::dsp::envelope::GainCurve;
use crate::engine::SampleBuffer;
use crate::error::{Result, TonebedError};

/// A named layer buffer handed to the mixer
#[derive(Debug, Clone, Copy)]
pub struct MixInput<'a> {
    /// Layer name, reported on length mismatches
    pub name: &'a str,
    /// The layer samples
    pub buffer: &'a SampleBuffer,
}

impl<'a> MixInput<'a> {
    pub fn new(name: &'a str, buffer: &'a SampleBuffer) -> Self {
        Self { name, buffer }
    }
}

/// Sum every input and multiply by the gain curve
///
/// `mixed[n] = (Σ layer[n]) * gain[n]`. With no inputs the result is
/// silence of the gain curve's length.
///
/// # Errors
/// * `BufferLengthMismatch` - If any input's length differs from the gain
///   curve's length
pub fn mix(inputs: &[MixInput<'_>], gain: &GainCurve) -> Result<SampleBuffer> {
    let expected = gain.len();

    for input in inputs {
        if input.buffer.len() != expected {
            return Err(TonebedError::BufferLengthMismatch {
                layer: input.name.to_string(),
                expected,
                actual: input.buffer.len(),
            });
        }
    }

    let mut mixed = SampleBuffer::silence(expected);
    for input in inputs {
        mixed.add_at(0, input.buffer)?;
    }

    for (sample, g) in mixed.samples_mut().iter_mut().zip(gain.gains()) {
        *sample *= g;
    }

    debug!(
        "Mixed {} layers over {} samples, peak {:.4}",
        inputs.len(),
        expected,
        mixed.peak()
    );

    Ok(mixed)
}
