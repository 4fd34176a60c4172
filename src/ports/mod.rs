// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for the external fetch-by-URL tool
#[async_trait]
pub trait FetchPort: Send + Sync {
    /// Download `request` into `dest_dir`. Success only means the tool
    /// exited cleanly; the produced file name is not known in advance.
    async fn fetch(&self, request: &DownloadRequest, dest_dir: &Path) -> Result<(), ToolError>;
}

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    async fn probe_media(&self, file_path: &Path) -> Result<MediaProbe, ToolError>;
}

/// Everything the media engine needs for one cut
#[derive(Debug, Clone, PartialEq)]
pub struct TrimJob {
    pub source: PathBuf,
    pub range: TimeRange,
    pub output: PathBuf,
    pub settings: TrimSettings,
}

/// Port for the external media-editing engine
#[async_trait]
pub trait TrimPort: Send + Sync {
    /// Re-encode `job.range` of `job.source` into `job.output`
    async fn trim(&self, job: &TrimJob) -> Result<(), ToolError>;
}

/// Port for work area bookkeeping; the only component that touches the
/// filesystem outside of the external tools
#[async_trait]
pub trait StoragePort: Send + Sync {
    /// Create a fresh, uniquely named work area
    async fn create_work_area(&self) -> Result<WorkArea, StorageError>;

    /// Media files directly inside the work area, in listing order
    async fn list_media(
        &self,
        area: &WorkArea,
        formats: &[MediaFormat],
    ) -> Result<Vec<MediaFile>, StorageError>;

    /// Re-resolve a handle against the current contents of the work area
    async fn resolve(&self, area: &WorkArea, media: &MediaFile) -> Result<MediaFile, StorageError>;

    /// Deterministic output path for a trim of `source`
    async fn derived_path(
        &self,
        source: &MediaFile,
        suffix: &str,
        naming: DerivedNaming,
    ) -> Result<PathBuf, StorageError>;

    /// Where a producer writes before the output becomes visible
    fn staging_path(&self, target: &Path) -> PathBuf;

    /// Make a staged file visible under its final name
    async fn commit(&self, staging: &Path, target: &Path) -> Result<MediaFile, StorageError>;

    /// Drop a staged file that will never be committed
    async fn discard(&self, staging: &Path) -> Result<(), StorageError>;

    /// Copy a media file out of the work area
    async fn export(&self, media: &MediaFile, dest: &Path) -> Result<u64, StorageError>;

    /// Load a media file as bytes
    async fn read_bytes(&self, media: &MediaFile) -> Result<Vec<u8>, StorageError>;

    /// Remove every file in the work area, then the work area itself
    async fn clear(&self, area: &WorkArea) -> Result<(), StorageError>;
}

/// Port for logging and observability
#[async_trait]
pub trait LogPort: Send + Sync {
    async fn info(&self, message: &str);

    async fn warn(&self, message: &str);

    async fn error(&self, message: &str);

    async fn debug(&self, message: &str);

    /// Log a message with key/value context
    async fn log_event(&self, event: &LogEvent);
}

/// Log event with structured data
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
    pub context: Vec<(&'static str, String)>,
}

impl LogEvent {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level_str: &str) -> Result<Self, DomainError> {
        match level_str.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(DomainError::Config(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
