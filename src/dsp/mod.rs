//! Mix-bus processing
//!
//! Everything that happens after the layers are generated:
//! Envelope Shaper → Mixer → Normalizer & Quantizer.

pub mod envelope;
pub mod mixer;
pub mod normalize;

pub use envelope::{EnvelopeCurve, FadeOverlap, GainCurve};
pub use mixer::{mix, MixInput};
pub use normalize::{normalize, quantize, quantize_sample, Normalized};
