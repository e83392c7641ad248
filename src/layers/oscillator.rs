//! Sine Oscillator
//!
//! Closed-form sine generation over an arbitrary sub-range of the time base,
//! and the continuous tone layer built on it.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::engine::{SampleBuffer, TimeBase};
use crate::error::{Result, TonebedError};
use crate::layers::LayerGenerator;

/// Generate `length` samples of a sine wave starting at absolute sample `start_index`
///
/// `sample[n] = amplitude * sin(2π * frequency_hz * (start_index + n) / sample_rate)`
///
/// Phase is taken from the absolute index, so a scoped buffer lines up
/// exactly with a full-length one over the same range.
pub fn generate_sine(
    time_base: &TimeBase,
    frequency_hz: f64,
    amplitude: f64,
    start_index: usize,
    length: usize,
) -> SampleBuffer {
    let sample_rate = time_base.sample_rate() as f64;

    (start_index..start_index + length)
        .map(|index| amplitude * (TAU * frequency_hz * index as f64 / sample_rate).sin())
        .collect::<Vec<f64>>()
        .into()
}

/// Check that a frequency is a usable positive finite value
pub(crate) fn validate_frequency(parameter: &str, frequency_hz: f64) -> Result<()> {
    if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
        return Err(TonebedError::invalid(
            parameter,
            format!("frequency must be positive and finite, got {}", frequency_hz),
        ));
    }
    Ok(())
}

/// Check that an amplitude is finite and not negative
pub(crate) fn validate_amplitude(parameter: &str, amplitude: f64) -> Result<()> {
    if !amplitude.is_finite() || amplitude < 0.0 {
        return Err(TonebedError::invalid(
            parameter,
            format!("amplitude must be non-negative and finite, got {}", amplitude),
        ));
    }
    Ok(())
}

/// A continuous sine tone spanning the whole run (the bass line)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneLayer {
    /// Tone frequency in Hz
    pub frequency_hz: f64,
    /// Peak amplitude
    pub amplitude: f64,
}

impl ToneLayer {
    /// Create a tone layer
    ///
    /// # Errors
    /// * `InvalidParameter` - For a non-positive frequency or negative amplitude
    pub fn new(frequency_hz: f64, amplitude: f64) -> Result<Self> {
        validate_frequency("bass.frequency_hz", frequency_hz)?;
        validate_amplitude("bass.amplitude", amplitude)?;
        Ok(Self {
            frequency_hz,
            amplitude,
        })
    }
}

impl LayerGenerator for ToneLayer {
    fn name(&self) -> &'static str {
        "bass"
    }

    fn render(&self, time_base: &TimeBase) -> Result<SampleBuffer> {
        Ok(generate_sine(
            time_base,
            self.frequency_hz,
            self.amplitude,
            0,
            time_base.total_samples(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sine_matches_closed_form() {
        let time_base = TimeBase::new(44100, 1.0).unwrap();
        let buffer = generate_sine(&time_base, 55.0, 0.5, 0, 44100);

        assert_eq!(buffer.len(), 44100);
        for (n, &sample) in buffer.samples().iter().enumerate() {
            let expected = 0.5 * (TAU * 55.0 * n as f64 / 44100.0).sin();
            assert_abs_diff_eq!(sample, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_scoped_sine_lines_up_with_full_length() {
        let time_base = TimeBase::new(8000, 1.0).unwrap();
        let full = generate_sine(&time_base, 440.0, 1.0, 0, 8000);
        let scoped = generate_sine(&time_base, 440.0, 1.0, 3000, 500);

        assert_eq!(scoped.len(), 500);
        assert_eq!(scoped.samples(), &full.samples()[3000..3500]);
    }

    #[test]
    fn test_quarter_period_reaches_amplitude() {
        // 441 Hz at 44.1 kHz has exactly 100 samples per period
        let time_base = TimeBase::new(44100, 0.01).unwrap();
        let buffer = generate_sine(&time_base, 441.0, 0.25, 0, 441);

        assert_abs_diff_eq!(buffer.samples()[25], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(buffer.samples()[75], -0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(buffer.peak(), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_length_is_empty() {
        let time_base = TimeBase::new(8000, 1.0).unwrap();
        assert!(generate_sine(&time_base, 100.0, 1.0, 42, 0).is_empty());
    }

    #[test]
    fn test_tone_layer_is_full_length() {
        let time_base = TimeBase::new(22050, 0.5).unwrap();
        let layer = ToneLayer::new(55.0, 0.15).unwrap();

        let buffer = layer.render(&time_base).unwrap();
        assert_eq!(buffer.len(), time_base.total_samples());
        assert!(buffer.peak() <= 0.15);
    }

    #[test]
    fn test_tone_layer_validation() {
        assert!(ToneLayer::new(0.0, 0.5).is_err());
        assert!(ToneLayer::new(-55.0, 0.5).is_err());
        assert!(ToneLayer::new(55.0, -0.5).is_err());
        assert!(ToneLayer::new(55.0, f64::NAN).is_err());
        assert!(ToneLayer::new(55.0, 0.0).is_ok());
    }
}
