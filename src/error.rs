//! Unified error types for cuegrid
//!
//! Error strategy:
//! - Tag reading (embedded cues): never surfaces. Every failure is logged and
//!   treated as "no cue points from this source".
//! - Audio decoding (analysis): fatal for that file, reported with the path
//!   and the underlying cause. Batch mode skips the file and continues.
//! - Output / configuration: fatal, abort the batch.

use std::path::PathBuf;
use thiserror::Error;

/// Supported audio formats for helpful error messages
pub const SUPPORTED_FORMATS: &str = "MP3, WAV, FLAC, AIFF, M4A/AAC";

/// Top-level error type for cuegrid operations
#[derive(Debug, Error)]
pub enum CuegridError {
    // =========================================================================
    // Recoverable errors - skip file, continue batch
    // =========================================================================
    #[error("Failed to decode audio file '{path}': {reason}\n  Supported formats: {SUPPORTED_FORMATS}\n  Tip: If the file plays in other apps, it may be corrupted or use an unsupported codec")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Unsupported audio format for '{path}': {format}\n  Supported formats: {SUPPORTED_FORMATS}")]
    UnsupportedFormat { path: PathBuf, format: String },

    #[error("Analysis failed for '{path}': {reason}")]
    AnalysisError { path: PathBuf, reason: String },

    #[error("File not found: '{0}'\n  Tip: Check the path exists and is accessible")]
    FileNotFound(PathBuf),

    // =========================================================================
    // Fatal errors - abort entire batch
    // =========================================================================
    #[error("Cannot write output to '{path}': {reason}\n  Tip: Check write permissions for the output directory")]
    OutputError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for cuegrid operations
pub type Result<T> = std::result::Result<T, CuegridError>;

impl CuegridError {
    /// Returns true if this error is recoverable (should skip file, continue batch)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CuegridError::DecodeError { .. }
                | CuegridError::UnsupportedFormat { .. }
                | CuegridError::AnalysisError { .. }
                | CuegridError::FileNotFound(_)
        )
    }

    /// Create a decode error with context about the issue
    pub fn decode_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        CuegridError::DecodeError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an output error, checking for common issues
    pub fn output_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!("Permission denied. Check that you have write access to {}", path.display())
            }
            std::io::ErrorKind::NotFound => {
                format!(
                    "Directory does not exist: {}",
                    path.parent().map(|p| p.display().to_string()).unwrap_or_default()
                )
            }
            _ => err.to_string(),
        };
        CuegridError::OutputError { path, reason }
    }
}

/// Errors raised while reading tag containers
///
/// These never leave the cue extractor: the dispatcher logs them and carries
/// on with whatever other sources produced.
#[derive(Debug, Error)]
pub enum TagReadError {
    #[error("tag container unreadable: {0}")]
    Lofty(#[from] lofty::error::LoftyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error about which file was being processed
    fn with_file_context(self, path: &std::path::Path) -> Result<T>;
}

impl<T, E: std::fmt::Display> ErrorContext<T> for std::result::Result<T, E> {
    fn with_file_context(self, path: &std::path::Path) -> Result<T> {
        self.map_err(|e| CuegridError::AnalysisError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
