//! Error handling for Tonebed
//!
//! Every failure a synthesis run can report, plus recovery hints for the CLI.

use thiserror::Error;

/// Result type alias for Tonebed operations
pub type Result<T> = std::result::Result<T, TonebedError>;

/// Main error type for Tonebed operations
#[derive(Error, Debug)]
pub enum TonebedError {
    // Score Errors
    #[error("Invalid parameter `{parameter}`: {reason}")]
    InvalidParameter { parameter: String, reason: String },

    // Mixing Errors
    #[error("Buffer length mismatch in layer '{layer}': expected {expected} samples, got {actual}")]
    BufferLengthMismatch {
        layer: String,
        expected: usize,
        actual: usize,
    },

    #[error("Degenerate signal: mixed buffer has no usable peak amplitude, output is silent")]
    DegenerateSignal,

    // File Errors
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio { reason: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TonebedError {
    /// Shorthand for building an [`TonebedError::InvalidParameter`]
    pub fn invalid(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        TonebedError::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            TonebedError::InvalidParameter { .. } => "INVALID_PARAMETER",
            TonebedError::BufferLengthMismatch { .. } => "BUFFER_LENGTH_MISMATCH",
            TonebedError::DegenerateSignal => "DEGENERATE_SIGNAL",
            TonebedError::FileNotFound { .. } => "FILE_NOT_FOUND",
            TonebedError::InvalidAudio { .. } => "INVALID_AUDIO",
            TonebedError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            TonebedError::Io(_) => "IO_ERROR",
            TonebedError::Wav(_) => "WAV_ERROR",
            TonebedError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    ///
    /// A recoverable error still yields a file; everything else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TonebedError::DegenerateSignal)
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TonebedError::InvalidParameter { .. } => vec![
                "Check the score values: rates, durations and frequencies must be positive",
                "Run 'tonebed-cli score' to print a known-good score",
            ],
            TonebedError::BufferLengthMismatch { .. } => vec![
                "This is an internal error, please report it with the score used",
            ],
            TonebedError::DegenerateSignal => vec![
                "Every layer is silent or disabled",
                "Raise master_volume or a layer level above zero",
                "Lower master_volume if the layers sum past the floating point range",
            ],
            TonebedError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            TonebedError::InvalidAudio { .. } => vec![
                "The file is not a well-formed WAV file",
                "Re-render the track with 'tonebed-cli render'",
            ],
            TonebedError::UnsupportedFormat { .. } => vec![
                "Only 16-bit PCM WAV output is produced",
            ],
            TonebedError::Serialization(_) => vec![
                "The score file is not valid JSON for this version",
                "Compare it against 'tonebed-cli score' output",
            ],
            _ => vec![],
        }
    }
}
