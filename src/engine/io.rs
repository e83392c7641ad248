//! Waveform file I/O for Tonebed
//!
//! Writes quantized buffers as 16-bit PCM WAV files and reads headers back
//! the way a downstream consumer (e.g. a video compositor) would.

use std::fs;
use std::io::Read;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::info;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::engine::buffer::{ChannelLayout, QuantizedBuffer, OUTPUT_BIT_DEPTH};
use crate::error::{Result, TonebedError};

/// Header information of a WAV file on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformInfo {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Bits per sample
    pub bits_per_sample: u16,
    /// Samples per channel
    pub num_frames: u64,
    /// Duration in seconds
    pub duration_secs: f64,
    /// File size in bytes
    pub size_bytes: u64,
}

impl WaveformInfo {
    /// File size in megabytes
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Write a quantized buffer to a WAV file
///
/// Stereo output duplicates the mono signal into both channels. Parent
/// directories are created as needed.
///
/// # Returns
/// The header information of the written file, as [`probe_wav`] reads it.
pub fn write_wav(
    buffer: &QuantizedBuffer,
    layout: ChannelLayout,
    path: &Path,
) -> Result<WaveformInfo> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let spec = WavSpec {
        channels: layout.num_channels() as u16,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: OUTPUT_BIT_DEPTH,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in buffer.samples() {
        for _ in 0..layout.num_channels() {
            writer.write_sample(sample)?;
        }
    }
    writer.finalize()?;

    let info = probe_wav(path)?;
    info!(
        "Wrote {} ({} frames, {} ch, {:.1} MB)",
        path.display(),
        info.num_frames,
        info.channels,
        info.size_mb()
    );

    Ok(info)
}

/// Read the header of a WAV file
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not a valid WAV file
pub fn probe_wav(path: &Path) -> Result<WaveformInfo> {
    if !path.exists() {
        return Err(TonebedError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let reader = WavReader::open(path).map_err(|e| TonebedError::InvalidAudio {
        reason: format!("Failed to open WAV file: {}", e),
    })?;

    let spec = reader.spec();
    let num_frames = reader.duration() as u64;
    let size_bytes = fs::metadata(path)?.len();

    Ok(WaveformInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs: num_frames as f64 / spec.sample_rate as f64,
        size_bytes,
    })
}

/// Read every 16-bit sample of a WAV file, interleaved
///
/// # Errors
/// * `UnsupportedFormat` - If the file is not 16-bit integer PCM
pub fn read_pcm16(path: &Path) -> Result<Vec<i16>> {
    let info = probe_wav(path)?;
    if info.bits_per_sample != OUTPUT_BIT_DEPTH {
        return Err(TonebedError::UnsupportedFormat {
            format: format!("{}-bit audio (only 16-bit PCM is read)", info.bits_per_sample),
        });
    }

    let mut reader = WavReader::open(path)?;
    if reader.spec().sample_format != SampleFormat::Int {
        return Err(TonebedError::UnsupportedFormat {
            format: "floating point audio".to_string(),
        });
    }

    reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<i16>, _>>()
        .map_err(|e| TonebedError::InvalidAudio {
            reason: format!("Failed to read 16-bit samples: {}", e),
        })
}

/// Calculate the SHA-256 checksum of a file as lower-case hex
pub fn file_checksum(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn ramp(len: usize, sample_rate: u32) -> QuantizedBuffer {
        let samples = (0..len).map(|i| (i as i16).wrapping_mul(7)).collect();
        QuantizedBuffer::new(samples, sample_rate)
    }

    #[test]
    fn test_write_mono_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        let buffer = ramp(4410, 44100);

        let info = write_wav(&buffer, ChannelLayout::Mono, &path).unwrap();

        assert_eq!(info.sample_rate, 44100);
        assert_eq!(info.channels, 1);
        assert_eq!(info.bits_per_sample, 16);
        assert_eq!(info.num_frames, 4410);
        assert!((info.duration_secs - 0.1).abs() < 1e-9);
        assert!(info.size_bytes > 2 * 4410);
        assert_eq!(read_pcm16(&path).unwrap(), buffer.samples().to_vec());
    }

    #[test]
    fn test_write_stereo_duplicates_channels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let buffer = ramp(100, 8000);

        let info = write_wav(&buffer, ChannelLayout::Stereo, &path).unwrap();
        assert_eq!(info.channels, 2);
        assert_eq!(info.num_frames, 100);

        let interleaved = read_pcm16(&path).unwrap();
        assert_eq!(interleaved.len(), 200);
        for (frame, &expected) in interleaved.chunks_exact(2).zip(buffer.samples()) {
            assert_eq!(frame, &[expected, expected]);
        }
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("out.wav");

        write_wav(&ramp(10, 8000), ChannelLayout::Mono, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_probe_nonexistent_file() {
        match probe_wav(Path::new("/nonexistent/path/audio.wav")).unwrap_err() {
            TonebedError::FileNotFound { path } => assert!(path.contains("nonexistent")),
            other => panic!("Expected FileNotFound error, got: {:?}", other),
        }
    }

    #[test]
    fn test_probe_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        fs::write(&path, b"definitely not a riff header").unwrap();

        let err = probe_wav(&path).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_AUDIO");
    }

    #[test]
    fn test_checksum_is_stable_and_content_sensitive() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        let c = dir.path().join("c.wav");

        write_wav(&ramp(64, 8000), ChannelLayout::Mono, &a).unwrap();
        write_wav(&ramp(64, 8000), ChannelLayout::Mono, &b).unwrap();
        write_wav(&ramp(65, 8000), ChannelLayout::Mono, &c).unwrap();

        let sum_a = file_checksum(&a).unwrap();
        assert_eq!(sum_a.len(), 64);
        assert_eq!(sum_a, file_checksum(&b).unwrap());
        assert_ne!(sum_a, file_checksum(&c).unwrap());
    }
}
