//! CLI Module
//!
//! Command-line interface for the Tonebed synthesizer.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default location of the rendered track
pub const DEFAULT_OUTPUT: &str = "demo-videos/background-music.wav";

/// Tonebed - procedural background-track synthesizer
#[derive(Parser, Debug)]
#[command(name = "tonebed")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synthesize a track and write it as a WAV file
    #[command(name = "render")]
    Render(RenderArgs),

    /// Print the default score as JSON
    #[command(name = "score")]
    Score {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the header and checksum of a WAV file
    #[command(name = "inspect")]
    Inspect {
        /// Path to the WAV file
        path: PathBuf,
    },
}

/// Arguments of the `render` command
#[derive(clap::Args, Debug, Clone)]
pub struct RenderArgs {
    /// Score file (JSON); the built-in score is used when omitted
    #[arg(short, long)]
    pub score: Option<PathBuf>,

    /// Output WAV path
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Seed for the noise layer
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the track duration in seconds
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Override the sample rate in Hz
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Write two identical channels instead of one
    #[arg(long)]
    pub stereo: bool,

    /// Generate layers concurrently on a thread pool
    #[arg(long)]
    pub parallel: bool,
}
