//! Declarative Score
//!
//! Every musical parameter of a synthesis run, loadable from JSON. Layer
//! amplitudes are `master_volume * level`; a missing layer is skipped.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dsp::EnvelopeCurve;
use crate::engine::{ChannelLayout, TimeBase};
use crate::error::{Result, TonebedError};
use crate::layers::{
    BeatSchedule, LayerGenerator, NoiseLayer, SegmentSequencer, ToneLayer, TransientLayer,
};

/// Continuous bass tone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BassPart {
    /// Tone frequency in Hz
    pub frequency_hz: f64,
    /// Level relative to the master volume
    pub level: f64,
}

/// Periodic kick transients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KickPart {
    #[serde(flatten)]
    pub schedule: BeatSchedule,
    /// Level relative to the master volume
    pub level: f64,
}

/// Chord progression split evenly over the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MelodyPart {
    /// One frequency set (Hz) per segment, in order
    pub chords: Vec<Vec<f64>>,
    /// Per-note level relative to the master volume
    pub level: f64,
}

/// Broadband noise bed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoisePart {
    /// Level relative to the master volume
    pub level: f64,
    /// Fixed seed for reproducible noise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// A complete synthesis score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Track length in seconds
    pub duration_secs: f64,
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Master amplitude scale applied to every layer level
    pub master_volume: f64,
    /// Output channel layout
    #[serde(default)]
    pub channels: ChannelLayout,
    #[serde(default)]
    pub bass: Option<BassPart>,
    #[serde(default)]
    pub kick: Option<KickPart>,
    #[serde(default)]
    pub melody: Option<MelodyPart>,
    #[serde(default)]
    pub noise: Option<NoisePart>,
    /// Master fade-in/fade-out
    #[serde(default)]
    pub envelope: EnvelopeCurve,
}

impl Default for Score {
    /// The reference background track: 93 seconds of bass, kick, an
    /// A–C–D major progression and a light noise bed.
    fn default() -> Self {
        Self {
            duration_secs: 93.0,
            sample_rate: 44100,
            master_volume: 0.3,
            channels: ChannelLayout::Mono,
            bass: Some(BassPart {
                frequency_hz: 55.0,
                level: 0.5,
            }),
            kick: Some(KickPart {
                schedule: BeatSchedule::new(2.0, 0.1, 60.0),
                level: 0.8,
            }),
            melody: Some(MelodyPart {
                chords: vec![
                    vec![440.0, 554.37, 659.25],
                    vec![523.25, 659.25, 783.99],
                    vec![587.33, 739.99, 880.0],
                ],
                level: 0.2,
            }),
            noise: Some(NoisePart {
                level: 0.05,
                seed: None,
            }),
            envelope: EnvelopeCurve::new(2.0, 3.0),
        }
    }
}

impl Score {
    /// A score with no layers and no fades
    pub fn silent(duration_secs: f64, sample_rate: u32) -> Self {
        Self {
            duration_secs,
            sample_rate,
            master_volume: 1.0,
            channels: ChannelLayout::Mono,
            bass: None,
            kick: None,
            melody: None,
            noise: None,
            envelope: EnvelopeCurve::none(),
        }
    }

    /// Parse a score from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a score from a JSON file
    ///
    /// # Errors
    /// * `FileNotFound` - If the file does not exist
    /// * `Serialization` - If the file is not a valid score
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TonebedError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the score as pretty JSON
    pub fn write_json_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// The time base of this score
    pub fn time_base(&self) -> Result<TimeBase> {
        TimeBase::new(self.sample_rate, self.duration_secs)
    }

    /// Check every parameter without generating any audio
    pub fn validate(&self) -> Result<()> {
        self.time_base()?;
        self.envelope.validate(self.duration_secs)?;
        self.layers(None).map(|_| ())
    }

    /// Effective amplitude of a layer level
    fn amplitude(&self, level: f64) -> f64 {
        self.master_volume * level
    }

    /// Build the layer generators of this score
    ///
    /// `seed_override` replaces the noise layer's own seed when set.
    ///
    /// # Errors
    /// * `InvalidParameter` - For any out-of-range parameter, including a
    ///   melody with no chords
    pub fn layers(&self, seed_override: Option<u64>) -> Result<Vec<Box<dyn LayerGenerator>>> {
        if !self.master_volume.is_finite() || self.master_volume < 0.0 {
            return Err(TonebedError::invalid(
                "master_volume",
                format!("must be non-negative and finite, got {}", self.master_volume),
            ));
        }

        let mut layers: Vec<Box<dyn LayerGenerator>> = Vec::new();

        if let Some(bass) = &self.bass {
            layers.push(Box::new(ToneLayer::new(
                bass.frequency_hz,
                self.amplitude(bass.level),
            )?));
        }
        if let Some(kick) = &self.kick {
            layers.push(Box::new(TransientLayer::new(
                kick.schedule,
                self.amplitude(kick.level),
            )?));
        }
        if let Some(melody) = &self.melody {
            layers.push(Box::new(SegmentSequencer::equal_segments(
                &melody.chords,
                self.duration_secs,
                self.amplitude(melody.level),
            )?));
        }
        if let Some(noise) = &self.noise {
            layers.push(Box::new(NoiseLayer::new(
                self.amplitude(noise.level),
                seed_override.or(noise.seed),
            )?));
        }

        Ok(layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_reference_track() {
        let score = Score::default();
        assert_eq!(score.duration_secs, 93.0);
        assert_eq!(score.sample_rate, 44100);
        assert_eq!(score.time_base().unwrap().total_samples(), 4_101_300);
        assert!(score.validate().is_ok());

        let names: Vec<&str> = score.layers(None).unwrap().iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["bass", "kick", "melody", "noise"]);
    }

    #[test]
    fn test_json_round_trip() {
        let score = Score::default();
        let json = score.to_json_pretty().unwrap();
        let parsed = Score::from_json_str(&json).unwrap();
        assert_eq!(parsed, score);
    }

    #[test]
    fn test_minimal_json_has_no_layers() {
        let score =
            Score::from_json_str(r#"{"duration_secs": 2.0, "sample_rate": 8000, "master_volume": 1.0}"#)
                .unwrap();
        assert_eq!(score, Score::silent(2.0, 8000));
        assert!(score.layers(None).unwrap().is_empty());
    }

    #[test]
    fn test_kick_schedule_is_flattened() {
        let score = Score::from_json_str(
            r#"{
                "duration_secs": 1.0,
                "sample_rate": 8000,
                "master_volume": 0.5,
                "channels": "stereo",
                "kick": {
                    "beats_per_second": 4.0,
                    "transient_duration_secs": 0.05,
                    "tone_frequency_hz": 80.0,
                    "level": 1.0
                }
            }"#,
        )
        .unwrap();

        let kick = score.kick.unwrap();
        assert_eq!(kick.schedule.beats_per_second, 4.0);
        assert_eq!(kick.schedule.decay_per_second, 10.0);
        assert_eq!(score.channels, ChannelLayout::Stereo);
    }

    #[test]
    fn test_empty_melody_is_rejected() {
        let mut score = Score::silent(1.0, 8000);
        score.melody = Some(MelodyPart {
            chords: vec![],
            level: 0.2,
        });

        let err = score.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut score = Score::default();
        score.master_volume = -0.1;
        assert!(score.validate().is_err());

        let mut score = Score::default();
        score.sample_rate = 0;
        assert!(score.validate().is_err());

        let mut score = Score::default();
        score.bass = Some(BassPart {
            frequency_hz: 0.0,
            level: 0.5,
        });
        assert!(score.validate().is_err());

        let mut score = Score::default();
        score.envelope = EnvelopeCurve::new(-2.0, 3.0);
        assert!(score.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Score::from_json_file(Path::new("/nonexistent/score.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn test_malformed_json() {
        let err = Score::from_json_str("{ not json").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
