//! Synthesis orchestration
//!
//! One explicit entry point takes a [`Score`] and returns the quantized
//! track; a second one also writes it to disk. Nothing runs at import time
//! and nothing is shared between runs.

use std::path::{Path, PathBuf};

use log::{debug, info};
use rayon::prelude::*;

use crate::dsp::{mix, normalize, quantize, MixInput};
use crate::engine::{file_checksum, write_wav, QuantizedBuffer, SampleBuffer, TimeBase, WaveformInfo};
use crate::error::{Result, TonebedError};
use crate::layers::LayerGenerator;
use crate::score::Score;

/// Run-time options that are not part of the musical score
///
/// The default is unseeded, single-threaded rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Noise seed; overrides the score's own seed
    pub seed: Option<u64>,
    /// Generate layers on the rayon thread pool
    pub parallel: bool,
}

impl RenderOptions {
    /// Sequential, seeded rendering
    pub fn deterministic(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            parallel: false,
        }
    }

    /// Generate layers on the rayon thread pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// One generated layer
#[derive(Debug, Clone)]
pub struct RenderedLayer {
    /// Layer name
    pub name: &'static str,
    /// Full-length layer buffer
    pub buffer: SampleBuffer,
}

/// Result of a synthesis run
#[derive(Debug)]
pub struct Rendering {
    /// Final 16-bit samples
    pub quantized: QuantizedBuffer,
    /// Peak of the mixed buffer before normalization
    pub peak: f64,
    /// Peak of every layer, in generation order
    pub layer_peaks: Vec<(&'static str, f64)>,
    /// Number of kick transients that fit in the run
    pub transient_onsets: usize,
    /// Recoverable conditions met during the run
    pub diagnostics: Vec<TonebedError>,
}

/// Summary of a rendered file
#[derive(Debug)]
pub struct RenderReport {
    /// Output path
    pub path: PathBuf,
    /// Header of the written file
    pub info: WaveformInfo,
    /// SHA-256 of the written file
    pub checksum: String,
    /// Peak of the mixed buffer before normalization
    pub peak: f64,
    /// Recoverable conditions met during the run
    pub diagnostics: Vec<TonebedError>,
}

/// Generate every layer of a score into its own buffer
///
/// Layers are independent, so with `parallel` set they run concurrently and
/// are joined before returning.
///
/// # Errors
/// * `BufferLengthMismatch` - If a generator returns the wrong length
pub fn render_layers(
    layers: &[Box<dyn LayerGenerator>],
    time_base: &TimeBase,
    parallel: bool,
) -> Result<Vec<RenderedLayer>> {
    let render_one = |layer: &Box<dyn LayerGenerator>| -> Result<RenderedLayer> {
        let buffer = layer.render(time_base)?;
        if buffer.len() != time_base.total_samples() {
            return Err(TonebedError::BufferLengthMismatch {
                layer: layer.name().to_string(),
                expected: time_base.total_samples(),
                actual: buffer.len(),
            });
        }
        debug!(
            "  ✓ {} ({} samples, peak {:.4}, rms {:.1} dB)",
            layer.name(),
            buffer.len(),
            buffer.peak(),
            buffer.rms_db()
        );
        Ok(RenderedLayer {
            name: layer.name(),
            buffer,
        })
    };

    if parallel {
        layers.par_iter().map(render_one).collect()
    } else {
        layers.iter().map(render_one).collect()
    }
}

/// Synthesize a score into a quantized buffer
///
/// Time base → layers → mixer with envelope → normalizer → quantizer.
/// All parameters are validated before any audio is generated.
///
/// # Errors
/// * `InvalidParameter` - If the score is invalid
/// * `BufferLengthMismatch` - On an internal length invariant violation
pub fn synthesize(score: &Score, options: &RenderOptions) -> Result<Rendering> {
    let time_base = score.time_base()?;
    let gain = score.envelope.gain_curve(&time_base)?;
    let layers = score.layers(options.seed)?;

    info!(
        "Synthesizing {:.1}s at {} Hz ({} samples, {} layers, volume {:.0}%)",
        time_base.duration_secs(),
        time_base.sample_rate(),
        time_base.total_samples(),
        layers.len(),
        score.master_volume * 100.0
    );

    let rendered = render_layers(&layers, &time_base, options.parallel)?;

    let inputs: Vec<MixInput<'_>> = rendered
        .iter()
        .map(|layer| MixInput::new(layer.name, &layer.buffer))
        .collect();
    let mixed = mix(&inputs, &gain)?;

    let normalized = normalize(&mixed);
    let quantized = quantize(normalized.buffer(), time_base.sample_rate());

    let transient_onsets = score
        .kick
        .as_ref()
        .map(|kick| kick.schedule.onsets(&time_base).len())
        .unwrap_or(0);

    info!(
        "Synthesized {} samples (peak before normalization {:.4})",
        quantized.len(),
        normalized.peak()
    );

    Ok(Rendering {
        quantized,
        peak: normalized.peak(),
        layer_peaks: rendered
            .iter()
            .map(|layer| (layer.name, layer.buffer.peak()))
            .collect(),
        transient_onsets,
        diagnostics: normalized.diagnostic().into_iter().collect(),
    })
}

/// Synthesize a score and write it as a WAV file
pub fn render_to_file(score: &Score, options: &RenderOptions, path: &Path) -> Result<RenderReport> {
    let rendering = synthesize(score, options)?;
    let info = write_wav(&rendering.quantized, score.channels, path)?;
    let checksum = file_checksum(path)?;

    Ok(RenderReport {
        path: path.to_path_buf(),
        info,
        checksum,
        peak: rendering.peak,
        diagnostics: rendering.diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::ToneLayer;
    use crate::score::{BassPart, MelodyPart, NoisePart};

    /// Returns a buffer one sample short
    struct ShortLayer;

    impl LayerGenerator for ShortLayer {
        fn name(&self) -> &'static str {
            "short"
        }

        fn render(&self, time_base: &TimeBase) -> Result<SampleBuffer> {
            Ok(SampleBuffer::silence(time_base.total_samples() - 1))
        }
    }

    #[test]
    fn test_render_layers_rejects_wrong_length() {
        let time_base = TimeBase::new(1000, 1.0).unwrap();
        let layers: Vec<Box<dyn LayerGenerator>> = vec![
            Box::new(ToneLayer::new(50.0, 1.0).unwrap()),
            Box::new(ShortLayer),
        ];

        for parallel in [false, true] {
            match render_layers(&layers, &time_base, parallel).unwrap_err() {
                TonebedError::BufferLengthMismatch { layer, .. } => assert_eq!(layer, "short"),
                other => panic!("Expected BufferLengthMismatch, got: {:?}", other),
            }
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut score = Score::default();
        score.duration_secs = 2.0;
        score.sample_rate = 8000;

        let parallel = synthesize(
            &score,
            &RenderOptions::deterministic(11).with_parallel(true),
        )
        .unwrap();
        let sequential = synthesize(&score, &RenderOptions::deterministic(11)).unwrap();

        assert_eq!(parallel.quantized, sequential.quantized);
        assert_eq!(parallel.layer_peaks, sequential.layer_peaks);
    }

    #[test]
    fn test_silent_score_is_degenerate_but_succeeds() {
        let score = Score::silent(0.5, 8000);
        let rendering = synthesize(&score, &RenderOptions::default()).unwrap();

        assert_eq!(rendering.quantized.len(), 4000);
        assert!(rendering.quantized.samples().iter().all(|&s| s == 0));
        assert_eq!(rendering.peak, 0.0);
        assert_eq!(rendering.diagnostics.len(), 1);
        assert!(rendering.diagnostics[0].is_recoverable());
    }

    #[test]
    fn test_layer_order_and_onsets() {
        let mut score = Score::default();
        score.duration_secs = 3.0;
        score.sample_rate = 8000;
        score.noise = Some(NoisePart {
            level: 0.05,
            seed: Some(5),
        });

        let rendering = synthesize(&score, &RenderOptions::default()).unwrap();
        let names: Vec<&str> = rendering.layer_peaks.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["bass", "kick", "melody", "noise"]);
        // 2 beats/s over 3 s, the beat at t = 3.0 does not fit
        assert_eq!(rendering.transient_onsets, 6);
        assert!(rendering.diagnostics.is_empty());
    }

    #[test]
    fn test_default_options_render_sequentially() {
        let options = RenderOptions::default();
        assert!(!options.parallel);
        assert_eq!(options.seed, None);
    }

    #[test]
    fn test_overflowing_mix_is_degenerate() {
        // Three crests of f64::MAX land on sample 250 and sum past the f64 range
        let mut score = Score::silent(1.0, 1000);
        score.master_volume = f64::MAX;
        score.bass = Some(BassPart {
            frequency_hz: 1.0,
            level: 1.0,
        });
        score.melody = Some(MelodyPart {
            chords: vec![vec![1.0, 1.0]],
            level: 1.0,
        });

        let rendering = synthesize(&score, &RenderOptions::default()).unwrap();
        assert_eq!(rendering.peak, f64::INFINITY);
        assert!(rendering.quantized.samples().iter().all(|&s| s == 0));
        assert_eq!(rendering.diagnostics.len(), 1);
        assert!(rendering.diagnostics[0].is_recoverable());
    }

    #[test]
    fn test_overlong_score_fails_before_rendering() {
        let score = Score::silent(1e15, 44100);
        assert!(score.validate().is_err());
        let err = synthesize(&score, &RenderOptions::default()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
    }

    #[test]
    fn test_invalid_score_fails_before_rendering() {
        let mut score = Score::silent(1.0, 8000);
        score.bass = Some(BassPart {
            frequency_hz: -1.0,
            level: 1.0,
        });
        let err = synthesize(&score, &RenderOptions::default()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
    }
}
