//! FFmpeg execution adapter
//!
//! Cuts a range out of a source file by re-encoding it, so cut points are
//! frame-accurate regardless of where the source keyframes are.

use std::ffi::OsString;

use async_trait::async_trait;
use tracing::info;

use crate::adapters::command_runner::ToolRunner;
use crate::domain::errors::*;
use crate::ports::*;

/// FFmpeg-based execution adapter
pub struct FFmpegAdapter {
    runner: ToolRunner,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter
    pub fn new(runner: ToolRunner) -> Self {
        Self { runner }
    }

    /// Argument vector for one re-encoding cut.
    ///
    /// The output is always muxed as mp4 because the staging name carries
    /// no usable extension.
    pub fn build_args(job: &TrimJob) -> Vec<OsString> {
        let settings = &job.settings;
        vec![
            "-nostdin".into(),
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
            "-ss".into(),
            format!("{:.3}", job.range.start().as_seconds()).into(),
            "-i".into(),
            job.source.as_os_str().to_owned(),
            "-t".into(),
            format!("{:.3}", job.range.duration()).into(),
            "-map".into(),
            "0:v:0?".into(),
            "-map".into(),
            "0:a:0?".into(),
            "-c:v".into(),
            settings.video_codec.as_str().into(),
            "-preset".into(),
            settings.preset.as_str().into(),
            "-crf".into(),
            settings.crf.to_string().into(),
            "-c:a".into(),
            settings.audio_codec.as_str().into(),
            "-movflags".into(),
            "+faststart".into(),
            "-f".into(),
            "mp4".into(),
            job.output.as_os_str().to_owned(),
        ]
    }
}

#[async_trait]
impl TrimPort for FFmpegAdapter {
    async fn trim(&self, job: &TrimJob) -> Result<(), ToolError> {
        info!(
            source = %job.source.display(),
            range = %job.range,
            "Re-encoding clip with {}/{}",
            job.settings.video_codec,
            job.settings.audio_codec
        );
        self.runner.run(Self::build_args(job)).await?;
        Ok(())
    }
}
