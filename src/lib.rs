//! Tonebed - Procedural Background-Track Synthesizer
//!
//! Tonebed renders a fixed-length track from closed-form signal generators
//! driven by a small declarative [`Score`]. No recorded samples are used.
//!
//! # Pipeline
//!
//! - Time base: duration and sample rate → sample index domain
//! - Layers: bass tone, kick transients, chord segments, noise
//! - Mix bus: sum, master fade envelope, peak normalization
//! - Output: 16-bit PCM quantization and WAV writing
//!
//! ```no_run
//! use std::path::Path;
//! use tonebed::{render_to_file, RenderOptions, Score};
//!
//! let report = render_to_file(
//!     &Score::default(),
//!     &RenderOptions::default(),
//!     Path::new("background-music.wav"),
//! )?;
//! println!("{} frames", report.info.num_frames);
//! # Ok::<(), tonebed::TonebedError>(())
//! ```

pub mod cli;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod layers;
pub mod render;
pub mod score;

pub use error::{Result, TonebedError};
pub use render::{render_to_file, synthesize, RenderOptions, RenderReport, Rendering};
pub use score::Score;
