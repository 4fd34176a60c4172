// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;

/// File name offered to the user for the derived clip
pub const DERIVED_DOWNLOAD_NAME: &str = "cropped_video.mp4";

/// MIME type of the derived clip
pub const DERIVED_MIME_TYPE: &str = "video/mp4";

/// Time position in seconds with fractional precision
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeSpec {
    seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    /// Parse a user-entered time.
    ///
    /// Accepted shapes are `"minutes:seconds"` (either part may be
    /// fractional), raw seconds (`"90"`, `"12.5"`) and the empty string,
    /// which means the start of the media. Anything else, including
    /// negative or non-finite numbers, is a malformed time.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self::from_seconds(0.0));
        }

        let seconds = match trimmed.split_once(':') {
            Some((minutes, seconds)) => {
                let minutes = parse_component(minutes)?;
                let seconds = parse_component(seconds)?;
                minutes * 60.0 + seconds
            }
            None => parse_component(trimmed)?,
        };

        Ok(Self::from_seconds(seconds))
    }

    /// Human readable form, e.g. `2 minutes 22 seconds`.
    ///
    /// Seconds are truncated, so this does not round-trip fractional input.
    pub fn format_display(&self) -> String {
        let total = self.seconds.max(0.0);
        let minutes = (total / 60.0) as u64;
        let seconds = (total % 60.0) as u64;
        format!("{} minutes {} seconds", minutes, seconds)
    }
}

fn parse_component(part: &str) -> Result<f64, ValidationError> {
    let part = part.trim();
    // f64::from_str accepts "inf", "NaN" and a leading '+'
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(ValidationError::malformed_time());
    }
    let value: f64 = part.parse().map_err(|_| ValidationError::malformed_time())?;
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::malformed_time());
    }
    Ok(value)
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_display())
    }
}

/// Half-open `[start, end)` interval inside a media file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    start: TimeSpec,
    end: TimeSpec,
}

impl TimeRange {
    /// Create a range; `end` must be strictly after `start`
    pub fn new(start: TimeSpec, end: TimeSpec) -> Result<Self, ValidationError> {
        if !start.seconds.is_finite() || !end.seconds.is_finite() {
            return Err(ValidationError::malformed_time());
        }
        if start.seconds < 0.0 {
            return Err(ValidationError::new("start time cannot be negative"));
        }
        if end.seconds <= start.seconds {
            return Err(ValidationError::new(
                "end time must be greater than start time",
            ));
        }
        Ok(Self { start, end })
    }

    /// Parse both ends from user text
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::new(TimeSpec::parse(start)?, TimeSpec::parse(end)?)
    }

    pub fn start(&self) -> TimeSpec {
        self.start
    }

    pub fn end(&self) -> TimeSpec {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end.seconds - self.start.seconds
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s..{:.3}s", self.start.seconds, self.end.seconds)
    }
}

/// Container formats the work area recognises as media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaFormat {
    Mp4,
    Mkv,
    Webm,
}

impl MediaFormat {
    pub const ALL: [MediaFormat; 3] = [MediaFormat::Mp4, MediaFormat::Mkv, MediaFormat::Webm];

    pub fn extension(&self) -> &'static str {
        match self {
            MediaFormat::Mp4 => "mp4",
            MediaFormat::Mkv => "mkv",
            MediaFormat::Webm => "webm",
        }
    }

    /// Match an extension case-insensitively
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(ext))
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Handle to a fully written media file inside a work area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub format: MediaFormat,
}

impl MediaFile {
    /// Returns `None` when the extension is not a recognised media format
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let format = MediaFormat::from_path(&path)?;
        Some(Self { path, format })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "media".to_string())
    }
}

impl fmt::Display for MediaFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Exclusively owned temporary directory of one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkArea {
    path: PathBuf,
}

impl WorkArea {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, media: &MediaFile) -> bool {
        media.path.parent() == Some(self.path.as_path())
    }
}

/// Maximum-resolution preference passed to the downloader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityTier {
    #[default]
    Best,
    P2160,
    P720,
    P480,
    P360,
}

impl QualityTier {
    pub const ALL: [QualityTier; 5] = [
        QualityTier::Best,
        QualityTier::P2160,
        QualityTier::P720,
        QualityTier::P480,
        QualityTier::P360,
    ];

    /// Video height cap, `None` for no cap
    pub fn max_height(&self) -> Option<u32> {
        match self {
            QualityTier::Best => None,
            QualityTier::P2160 => Some(2160),
            QualityTier::P720 => Some(720),
            QualityTier::P480 => Some(480),
            QualityTier::P360 => Some(360),
        }
    }

    /// Parse `best`, `720`, `720p` and friends, case-insensitive
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let lowered = text.trim().to_lowercase();
        let normalized = lowered.strip_suffix('p').unwrap_or(&lowered);
        match normalized {
            "best" => Ok(QualityTier::Best),
            "2160" | "4k" => Ok(QualityTier::P2160),
            "720" => Ok(QualityTier::P720),
            "480" => Ok(QualityTier::P480),
            "360" => Ok(QualityTier::P360),
            _ => Err(ValidationError::new(format!(
                "unknown quality '{}', expected one of best, 2160p, 720p, 480p, 360p",
                text
            ))),
        }
    }
}

impl FromStr for QualityTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max_height() {
            Some(height) => write!(f, "{}p", height),
            None => write!(f, "best"),
        }
    }
}

/// Validated download request
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub url: url::Url,
    pub quality: QualityTier,
}

impl DownloadRequest {
    /// Validate a user-supplied URL; only http(s) is accepted
    pub fn new(url: &str, quality: QualityTier) -> Result<Self, ValidationError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ValidationError::new("please enter a video URL"));
        }
        let parsed = url::Url::parse(url)
            .map_err(|e| ValidationError::new(format!("invalid URL '{}': {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ValidationError::new(format!(
                "unsupported URL scheme '{}', expected http or https",
                parsed.scheme()
            )));
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(ValidationError::new(format!("URL has no host: {}", url)));
        }
        Ok(Self {
            url: parsed,
            quality,
        })
    }
}

/// What to do when a crop ends past the end of the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangePolicy {
    #[default]
    Clamp,
    Reject,
}

/// Naming of derived outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DerivedNaming {
    /// Same path on every run, replacing the previous output
    #[default]
    Overwrite,
    /// First free `_<n>` variant of the deterministic path
    Unique,
}

/// Fixed codec policy of the trimmer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimSettings {
    pub video_codec: String,
    pub audio_codec: String,
    pub preset: String,
    pub crf: u8,
    pub range_policy: RangePolicy,
    pub derived_suffix: String,
}

impl Default for TrimSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "medium".to_string(),
            crf: 23,
            range_policy: RangePolicy::Clamp,
            derived_suffix: "cropped".to_string(),
        }
    }
}

/// Derived clip ready to be handed to the user as a byte stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedDownload {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// What ffprobe could tell about a media file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaProbe {
    pub duration: Option<f64>,
    pub container: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
}
