//! Noise Generator
//!
//! Broadband Gaussian noise (zero mean, unit variance before scaling).
//! Unseeded runs draw their seed from the thread RNG and are not
//! reproducible; seeded runs are bit-identical.

use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::engine::{SampleBuffer, TimeBase};
use crate::error::Result;
use crate::layers::oscillator::validate_amplitude;
use crate::layers::LayerGenerator;

/// Generate `length` samples of Gaussian noise scaled by `amplitude`
///
/// Samples are produced in Box–Muller pairs from a PCG-64 stream.
pub fn generate_noise(amplitude: f64, length: usize, seed: Option<u64>) -> SampleBuffer {
    let mut rng = match seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_rng(&mut rand::rng()),
    };

    let mut samples = Vec::with_capacity(length);
    while samples.len() < length {
        let (a, b) = standard_normal_pair(&mut rng);
        samples.push(amplitude * a);
        if samples.len() < length {
            samples.push(amplitude * b);
        }
    }

    samples.into()
}

/// Two independent standard normal deviates
fn standard_normal_pair<R: Rng>(rng: &mut R) -> (f64, f64) {
    // (0, 1] keeps ln() finite
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();

    let radius = (-2.0 * u1.ln()).sqrt();
    let angle = TAU * u2;
    (radius * angle.cos(), radius * angle.sin())
}

/// The noise layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseLayer {
    amplitude: f64,
    seed: Option<u64>,
}

impl NoiseLayer {
    /// Create a noise layer; `seed` makes the output reproducible
    pub fn new(amplitude: f64, seed: Option<u64>) -> Result<Self> {
        validate_amplitude("noise.amplitude", amplitude)?;
        Ok(Self { amplitude, seed })
    }

    /// The seed in use, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl LayerGenerator for NoiseLayer {
    fn name(&self) -> &'static str {
        "noise"
    }

    fn render(&self, time_base: &TimeBase) -> Result<SampleBuffer> {
        Ok(generate_noise(
            self.amplitude,
            time_base.total_samples(),
            self.seed,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_is_exact_for_odd_counts() {
        assert_eq!(generate_noise(1.0, 0, Some(1)).len(), 0);
        assert_eq!(generate_noise(1.0, 1, Some(1)).len(), 1);
        assert_eq!(generate_noise(1.0, 4411, Some(1)).len(), 4411);
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let a = generate_noise(0.5, 1000, Some(42));
        let b = generate_noise(0.5, 1000, Some(42));
        let c = generate_noise(0.5, 1000, Some(43));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_statistics_unit_amplitude() {
        let noise = generate_noise(1.0, 200_000, Some(7));

        // Standard error of the mean is ~0.0022 at this length
        assert!(noise.mean().abs() < 0.02, "mean {}", noise.mean());
        assert!(
            (noise.variance() - 1.0).abs() < 0.03,
            "variance {}",
            noise.variance()
        );
    }

    #[test]
    fn test_statistics_scale_with_amplitude() {
        let noise = generate_noise(0.015, 100_000, None);

        assert!(noise.mean().abs() < 0.015 * 0.05);
        let std_dev = noise.variance().sqrt();
        assert!((std_dev - 0.015).abs() < 0.015 * 0.05, "std dev {}", std_dev);
    }

    #[test]
    fn test_zero_amplitude_is_silent() {
        let noise = generate_noise(0.0, 100, None);
        assert_eq!(noise.peak(), 0.0);
    }

    #[test]
    fn test_layer_is_full_length() {
        let time_base = TimeBase::new(8000, 0.25).unwrap();
        let layer = NoiseLayer::new(0.1, Some(3)).unwrap();
        assert_eq!(layer.render(&time_base).unwrap().len(), 2000);
        assert!(NoiseLayer::new(-0.1, None).is_err());
    }
}
