// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::LogLevel;

/// Config files tried in order when no explicit path is given
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["fetchclip.toml", "config/fetchclip.toml"];

/// External tool locations
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ytdlp: PathBuf,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    /// Per-invocation limit in seconds, 0 disables it
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp: PathBuf::from("yt-dlp"),
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            timeout_secs: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub default_quality: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            default_quality: QualityTier::Best.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Parent of all work areas, the system temp dir when unset
    pub work_root: Option<PathBuf>,
    /// Pick a fresh `_<n>` name instead of overwriting the previous crop
    pub unique_derived_names: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Whole application configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tools: ToolsConfig,
    pub download: DownloadConfig,
    pub trim: TrimSettings,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn timeout(&self) -> Option<Duration> {
        match self.tools.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn default_quality(&self) -> Result<QualityTier, DomainError> {
        QualityTier::parse(&self.download.default_quality)
            .map_err(|e| DomainError::Config(format!("download.default_quality: {}", e)))
    }

    pub fn log_level(&self) -> Result<LogLevel, DomainError> {
        LogLevel::parse(&self.logging.level)
    }

    pub fn work_root(&self) -> PathBuf {
        self.storage
            .work_root
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    pub fn derived_naming(&self) -> DerivedNaming {
        if self.storage.unique_derived_names {
            DerivedNaming::Unique
        } else {
            DerivedNaming::Overwrite
        }
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<(), DomainError> {
        self.log_level()?;
        self.default_quality()?;

        if self.trim.crf > 51 {
            return Err(DomainError::Config(format!(
                "trim.crf must be between 0 and 51, got {}",
                self.trim.crf
            )));
        }

        let suffix = &self.trim.derived_suffix;
        if suffix.is_empty() || suffix.contains(['/', '\\', '.']) {
            return Err(DomainError::Config(format!(
                "trim.derived_suffix must be a plain name, got '{}'",
                suffix
            )));
        }

        for (key, value) in [
            ("trim.video_codec", &self.trim.video_codec),
            ("trim.audio_codec", &self.trim.audio_codec),
            ("trim.preset", &self.trim.preset),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::Config(format!("{} cannot be empty", key)));
            }
        }

        Ok(())
    }
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn parse_str(content: &str) -> Result<AppConfig, DomainError> {
        toml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))
    }

    pub fn load_file(path: &Path) -> Result<AppConfig, DomainError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse_str(&content)
    }

    /// First existing default config file, if any
    pub fn discover() -> Option<PathBuf> {
        DEFAULT_CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.is_file())
    }

    /// Apply `FETCHCLIP_*` overrides; returns the names of the applied variables
    pub fn apply_env_overrides<F>(
        config: &mut AppConfig,
        lookup: F,
    ) -> Result<Vec<&'static str>, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = Vec::new();
        let mut take = |name: &'static str| {
            let value = lookup(name).filter(|v| !v.trim().is_empty());
            if value.is_some() {
                applied.push(name);
            }
            value
        };

        if let Some(v) = take("FETCHCLIP_YTDLP") {
            config.tools.ytdlp = PathBuf::from(v);
        }
        if let Some(v) = take("FETCHCLIP_FFMPEG") {
            config.tools.ffmpeg = PathBuf::from(v);
        }
        if let Some(v) = take("FETCHCLIP_FFPROBE") {
            config.tools.ffprobe = PathBuf::from(v);
        }
        if let Some(v) = take("FETCHCLIP_TIMEOUT_SECS") {
            config.tools.timeout_secs = parse_env("FETCHCLIP_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = take("FETCHCLIP_DEFAULT_QUALITY") {
            config.download.default_quality = v;
        }
        if let Some(v) = take("FETCHCLIP_WORK_ROOT") {
            config.storage.work_root = Some(PathBuf::from(v));
        }
        if let Some(v) = take("FETCHCLIP_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Some(v) = take("FETCHCLIP_LOG_JSON") {
            config.logging.json = parse_env("FETCHCLIP_LOG_JSON", &v)?;
        }
        if let Some(v) = take("FETCHCLIP_RANGE_POLICY") {
            config.trim.range_policy = match v.trim().to_lowercase().as_str() {
                "clamp" => RangePolicy::Clamp,
                "reject" => RangePolicy::Reject,
                other => {
                    return Err(DomainError::Config(format!(
                        "FETCHCLIP_RANGE_POLICY must be clamp or reject, got '{}'",
                        other
                    )))
                }
            };
        }
        if let Some(v) = take("FETCHCLIP_CRF") {
            config.trim.crf = parse_env("FETCHCLIP_CRF", &v)?;
        }

        Ok(applied)
    }
}

fn parse_env<T>(name: &str, value: &str) -> Result<T, DomainError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| DomainError::Config(format!("Invalid value for {}: {}", name, e)))
}
