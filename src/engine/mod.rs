//! Audio Engine Module
//!
//! Shared plumbing for every synthesis run:
//! - Time base (duration ↔ sample index mapping)
//! - Sample buffers and analysis helpers
//! - WAV file I/O

pub mod buffer;
pub mod io;
pub mod timebase;

pub use buffer::{linear_to_db, ChannelLayout, QuantizedBuffer, SampleBuffer};
pub use io::{file_checksum, probe_wav, read_pcm16, write_wav, WaveformInfo};
pub use timebase::{TimeBase, MAX_TOTAL_SAMPLES};
