//! Segment Sequencer
//!
//! The melody layer: the run is split into contiguous chord segments and
//! each segment sounds its chord only inside its own sample range.
//! Boundaries are hard cuts; the sample at a boundary index belongs to the
//! later segment.

use serde::{Deserialize, Serialize};

use crate::engine::{SampleBuffer, TimeBase};
use crate::error::{Result, TonebedError};
use crate::layers::oscillator::{generate_sine, validate_amplitude, validate_frequency};
use crate::layers::LayerGenerator;

/// Tolerance when checking that segment edges meet
const BOUNDARY_EPSILON_SECS: f64 = 1e-9;

/// A time interval during which a fixed set of tones plays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordSegment {
    /// Segment start in seconds
    pub start_secs: f64,
    /// Segment end in seconds (exclusive)
    pub end_secs: f64,
    /// Simultaneous tone frequencies in Hz
    pub frequencies: Vec<f64>,
}

impl ChordSegment {
    /// Split `[0, duration_secs)` into one equal-length segment per chord
    ///
    /// # Errors
    /// * `InvalidParameter` - If `chords` is empty
    pub fn partition(chords: &[Vec<f64>], duration_secs: f64) -> Result<Vec<ChordSegment>> {
        if chords.is_empty() {
            return Err(TonebedError::invalid(
                "melody.chords",
                "at least one chord is required",
            ));
        }

        let count = chords.len() as f64;
        let segments = chords
            .iter()
            .enumerate()
            .map(|(i, frequencies)| ChordSegment {
                start_secs: duration_secs * i as f64 / count,
                end_secs: if i + 1 == chords.len() {
                    duration_secs
                } else {
                    duration_secs * (i + 1) as f64 / count
                },
                frequencies: frequencies.clone(),
            })
            .collect();

        Ok(segments)
    }

    /// Check that segments are contiguous and span exactly `[0, duration_secs]`
    ///
    /// # Errors
    /// * `InvalidParameter` - For an empty list, a gap or overlap between
    ///   neighbours, a reversed segment, or an invalid frequency
    pub fn validate_all(segments: &[ChordSegment], duration_secs: f64) -> Result<()> {
        let (first, last) = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(TonebedError::invalid(
                    "melody.segments",
                    "at least one segment is required",
                ))
            }
        };

        if first.start_secs.abs() > BOUNDARY_EPSILON_SECS {
            return Err(TonebedError::invalid(
                "melody.segments",
                format!("first segment starts at {}s instead of 0", first.start_secs),
            ));
        }
        if (last.end_secs - duration_secs).abs() > BOUNDARY_EPSILON_SECS {
            return Err(TonebedError::invalid(
                "melody.segments",
                format!(
                    "last segment ends at {}s instead of {}s",
                    last.end_secs, duration_secs
                ),
            ));
        }

        for (i, segment) in segments.iter().enumerate() {
            if segment.end_secs < segment.start_secs {
                return Err(TonebedError::invalid(
                    "melody.segments",
                    format!("segment {} ends before it starts", i),
                ));
            }
            for &frequency in &segment.frequencies {
                validate_frequency("melody.frequencies", frequency)?;
            }
        }

        for (i, pair) in segments.windows(2).enumerate() {
            if (pair[0].end_secs - pair[1].start_secs).abs() > BOUNDARY_EPSILON_SECS {
                return Err(TonebedError::invalid(
                    "melody.segments",
                    format!(
                        "segment {} ends at {}s but segment {} starts at {}s",
                        i,
                        pair[0].end_secs,
                        i + 1,
                        pair[1].start_secs
                    ),
                ));
            }
        }

        Ok(())
    }
}

/// The melody layer: contiguous chord segments at a fixed per-note amplitude
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSequencer {
    segments: Vec<ChordSegment>,
    note_amplitude: f64,
}

impl SegmentSequencer {
    /// Build a sequencer with one equal-length segment per chord
    pub fn equal_segments(
        chords: &[Vec<f64>],
        duration_secs: f64,
        note_amplitude: f64,
    ) -> Result<Self> {
        let segments = ChordSegment::partition(chords, duration_secs)?;
        Self::from_segments(segments, duration_secs, note_amplitude)
    }

    /// Build a sequencer from explicitly timed segments
    ///
    /// # Errors
    /// * `InvalidParameter` - If the segments are not contiguous over
    ///   `[0, duration_secs]` or the amplitude is invalid
    pub fn from_segments(
        segments: Vec<ChordSegment>,
        duration_secs: f64,
        note_amplitude: f64,
    ) -> Result<Self> {
        ChordSegment::validate_all(&segments, duration_secs)?;
        validate_amplitude("melody.amplitude", note_amplitude)?;
        Ok(Self {
            segments,
            note_amplitude,
        })
    }

    /// The segments, in time order
    pub fn segments(&self) -> &[ChordSegment] {
        &self.segments
    }

    /// Sample ranges `[start, end)` of every segment
    ///
    /// Ranges are contiguous; the last one always ends at `total_samples`.
    pub fn sample_ranges(&self, time_base: &TimeBase) -> Vec<(usize, usize)> {
        let starts: Vec<usize> = self
            .segments
            .iter()
            .map(|segment| time_base.sample_index_at(segment.start_secs))
            .collect();

        starts
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let end = starts
                    .get(i + 1)
                    .copied()
                    .unwrap_or_else(|| time_base.total_samples());
                (start, end.max(start))
            })
            .collect()
    }
}

impl LayerGenerator for SegmentSequencer {
    fn name(&self) -> &'static str {
        "melody"
    }

    fn render(&self, time_base: &TimeBase) -> Result<SampleBuffer> {
        let mut output = SampleBuffer::silence(time_base.total_samples());

        for (segment, (start, end)) in self.segments.iter().zip(self.sample_ranges(time_base)) {
            for &frequency in &segment.frequencies {
                let note =
                    generate_sine(time_base, frequency, self.note_amplitude, start, end - start);
                output.add_at(start, &note)?;
            }
        }

        Ok(output)
    }
}
