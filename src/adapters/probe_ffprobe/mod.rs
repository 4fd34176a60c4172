//! FFprobe adapter for media file probing
//!
//! This module provides FFprobe-based media file analysis capabilities.

use std::ffi::OsStr;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::adapters::command_runner::ToolRunner;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    runner: ToolRunner,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(runner: ToolRunner) -> Self {
        Self { runner }
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    streams: Option<Vec<FfprobeStream>>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    duration: Option<String>,
}

/// Interpret `ffprobe -print_format json -show_format -show_streams` output
pub fn parse_probe_output(json: &str) -> Result<MediaProbe, serde_json::Error> {
    let parsed: FfprobeOutput = serde_json::from_str(json)?;
    let streams = parsed.streams.unwrap_or_default();

    let format_duration = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(parse_seconds);
    // Some containers (e.g. webm from live streams) only carry stream durations
    let stream_duration = streams
        .iter()
        .filter_map(|s| s.duration.as_deref().and_then(parse_seconds))
        .fold(None, |max: Option<f64>, d| Some(max.map_or(d, |m| m.max(d))));

    let codec_of = |kind: &str| {
        streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(kind))
            .and_then(|s| s.codec_name.clone())
    };

    Ok(MediaProbe {
        duration: format_duration.or(stream_duration),
        container: parsed
            .format
            .as_ref()
            .and_then(|f| f.format_name.as_deref())
            .map(|name| name.split(',').next().unwrap_or(name).to_string()),
        video_codec: codec_of("video"),
        audio_codec: codec_of("audio"),
    })
}

fn parse_seconds(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe_media(&self, file_path: &Path) -> Result<MediaProbe, ToolError> {
        let output = self
            .runner
            .run([
                OsStr::new("-v"),
                OsStr::new("error"),
                OsStr::new("-print_format"),
                OsStr::new("json"),
                OsStr::new("-show_format"),
                OsStr::new("-show_streams"),
                file_path.as_os_str(),
            ])
            .await?;

        let probe = parse_probe_output(&output.stdout).map_err(|e| ToolError::BadOutput {
            tool: self.runner.name().to_string(),
            message: e.to_string(),
        })?;
        debug!(
            "Probed {}: duration {:?}, container {:?}",
            file_path.display(),
            probe.duration,
            probe.container
        );
        Ok(probe)
    }
}
