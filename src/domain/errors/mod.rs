// Domain errors - Error types for the domain layer

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Bad user input, caught before any external tool runs
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{reason}")]
pub struct ValidationError {
    pub reason: String,
}

impl ValidationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The error every unparseable time string produces
    pub fn malformed_time() -> Self {
        Self::new("malformed time")
    }
}

/// Why a download did not yield a media file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadErrorKind {
    /// The downloader is missing, exited non-zero or timed out
    ProcessFailed,
    /// The downloader reported success but no media file appeared
    NoFileProduced,
}

impl fmt::Display for DownloadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadErrorKind::ProcessFailed => write!(f, "download process failed"),
            DownloadErrorKind::NoFileProduced => write!(f, "no media file produced"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {message}")]
pub struct DownloadError {
    pub kind: DownloadErrorKind,
    pub message: String,
}

impl DownloadError {
    pub fn process_failed(message: impl Into<String>) -> Self {
        Self {
            kind: DownloadErrorKind::ProcessFailed,
            message: message.into(),
        }
    }

    pub fn no_file_produced(message: impl Into<String>) -> Self {
        Self {
            kind: DownloadErrorKind::NoFileProduced,
            message: message.into(),
        }
    }
}

/// Why a trim did not yield a derived file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimErrorKind {
    /// The requested range does not fit the source
    RangeOutOfBounds,
    /// The media engine failed to produce the output
    EncodeFailed,
}

impl fmt::Display for TrimErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrimErrorKind::RangeOutOfBounds => write!(f, "range out of bounds"),
            TrimErrorKind::EncodeFailed => write!(f, "encode failed"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {message}")]
pub struct TrimError {
    pub kind: TrimErrorKind,
    pub message: String,
}

impl TrimError {
    pub fn out_of_bounds(message: impl Into<String>) -> Self {
        Self {
            kind: TrimErrorKind::RangeOutOfBounds,
            message: message.into(),
        }
    }

    pub fn encode_failed(message: impl Into<String>) -> Self {
        Self {
            kind: TrimErrorKind::EncodeFailed,
            message: message.into(),
        }
    }
}

/// Filesystem bookkeeping failure inside a work area
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}: {}", .path.display())]
pub struct StorageError {
    pub path: PathBuf,
    pub message: String,
}

impl StorageError {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn from_io(path: impl Into<PathBuf>, action: &str, err: std::io::Error) -> Self {
        Self::new(path, format!("failed to {}: {}", action, err))
    }
}

/// Failure of an external command-line tool
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("{tool} not found, is it installed and on PATH?")]
    NotFound { tool: String },

    #[error("{tool} exited with {}: {stderr}", code.map(|c| c.to_string()).unwrap_or_else(|| "a signal".to_string()))]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{tool} timed out after {secs} seconds")]
    TimedOut { tool: String, secs: u64 },

    #[error("{tool} could not be run: {message}")]
    Io { tool: String, message: String },

    #[error("{tool} produced unreadable output: {message}")]
    BadOutput { tool: String, message: String },
}

/// Top-level error surfaced by the pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("download failed ({0})")]
    Download(#[from] DownloadError),

    #[error("trim failed ({0})")]
    Trim(#[from] TrimError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl DomainError {
    /// Whether the error came from user input rather than a tool or the filesystem
    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation(_))
    }
}
