//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::{info, warn};

use crate::cli::RenderArgs;
use crate::engine::{file_checksum, probe_wav, ChannelLayout};
use crate::error::Result;
use crate::render::{render_to_file, RenderOptions};
use crate::score::Score;

/// Build the score for a render: file or default, then command-line overrides.
pub fn resolve_score(args: &RenderArgs) -> Result<Score> {
    let mut score = match &args.score {
        Some(path) => {
            info!("Loading score: {}", path.display());
            Score::from_json_file(path)?
        }
        None => Score::default(),
    };

    if let Some(duration) = args.duration {
        score.duration_secs = duration;
    }
    if let Some(sample_rate) = args.sample_rate {
        score.sample_rate = sample_rate;
    }
    if args.stereo {
        score.channels = ChannelLayout::Stereo;
    }

    score.validate()?;
    Ok(score)
}

/// Synthesize a track and write it to disk.
pub fn render(args: &RenderArgs) -> Result<()> {
    let score = resolve_score(args)?;
    let options = RenderOptions {
        seed: args.seed,
        parallel: args.parallel,
    };

    println!("Generating background track...");
    println!("Duration: {}s", score.duration_secs);
    println!("Volume: {:.0}%", score.master_volume * 100.0);

    let report = render_to_file(&score, &options, &args.output)?;

    for diagnostic in &report.diagnostics {
        warn!("{}", diagnostic);
        for suggestion in diagnostic.recovery_suggestions() {
            println!("  hint: {}", suggestion);
        }
    }

    println!();
    println!("Track written: {}", report.path.display());
    println!(
        "Samples: {} @ {} Hz, {} ch",
        report.info.num_frames, report.info.sample_rate, report.info.channels
    );
    println!("Peak before normalization: {:.4}", report.peak);
    println!("File size: {:.1} MB", report.info.size_mb());
    println!("SHA-256: {}", report.checksum);

    Ok(())
}

/// Print or save the default score.
pub fn print_score(output: Option<&Path>) -> Result<()> {
    let score = Score::default();

    match output {
        Some(path) => {
            score.write_json_file(path)?;
            println!("Score written: {}", path.display());
        }
        None => println!("{}", score.to_json_pretty()?),
    }

    Ok(())
}

/// Print the header of a WAV file as a downstream consumer sees it.
pub fn inspect(path: &Path) -> Result<()> {
    info!("Inspecting: {}", path.display());

    let info = probe_wav(path)?;
    let checksum = file_checksum(path)?;

    println!("File: {}", path.display());
    println!("Sample rate: {} Hz", info.sample_rate);
    println!("Channels: {}", info.channels);
    println!("Bit depth: {}", info.bits_per_sample);
    println!("Frames: {}", info.num_frames);
    println!("Duration: {:.3}s", info.duration_secs);
    println!("Size: {:.1} MB", info.size_mb());
    println!("SHA-256: {}", checksum);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::DEFAULT_OUTPUT;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn args() -> RenderArgs {
        RenderArgs {
            score: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            seed: None,
            duration: None,
            sample_rate: None,
            stereo: false,
            parallel: false,
        }
    }

    #[test]
    fn test_resolve_score_applies_overrides() {
        let mut args = args();
        args.duration = Some(4.0);
        args.sample_rate = Some(22050);
        args.stereo = true;

        let score = resolve_score(&args).unwrap();
        assert_eq!(score.duration_secs, 4.0);
        assert_eq!(score.sample_rate, 22050);
        assert_eq!(score.channels, ChannelLayout::Stereo);
        assert_eq!(score.bass, Score::default().bass);
    }

    #[test]
    fn test_resolve_score_rejects_bad_override() {
        for duration in [0.0, 1e15] {
            let mut args = args();
            args.duration = Some(duration);
            assert!(resolve_score(&args).is_err());
        }
    }

    #[test]
    fn test_resolve_score_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("score.json");
        print_score(Some(&path)).unwrap();

        let mut args = args();
        args.score = Some(path);
        assert_eq!(resolve_score(&args).unwrap(), Score::default());
    }

    #[test]
    fn test_render_and_inspect() {
        let dir = tempdir().unwrap();
        let mut args = args();
        args.output = dir.path().join("out").join("track.wav");
        args.duration = Some(0.5);
        args.sample_rate = Some(8000);
        args.seed = Some(1);
        args.parallel = true;

        render(&args).unwrap();
        assert!(args.output.exists());
        inspect(&args.output).unwrap();
    }
}
