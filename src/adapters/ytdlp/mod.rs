//! yt-dlp download adapter
//!
//! Downloads one video into a given directory. The output name comes from
//! the remote title, so callers have to scan the directory afterwards.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::adapters::command_runner::ToolRunner;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::FormatSelector;
use crate::ports::*;

/// Output template relative to the `-P` directory
const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// yt-dlp based fetch adapter
pub struct YtDlpAdapter {
    runner: ToolRunner,
    ffmpeg_location: Option<PathBuf>,
}

impl YtDlpAdapter {
    pub fn new(runner: ToolRunner) -> Self {
        Self {
            runner,
            ffmpeg_location: None,
        }
    }

    /// Point yt-dlp at a specific ffmpeg for merging separate tracks
    pub fn with_ffmpeg_location(mut self, ffmpeg: Option<PathBuf>) -> Self {
        self.ffmpeg_location = ffmpeg;
        self
    }

    /// Argument vector for one download
    pub fn build_args(&self, request: &DownloadRequest, dest_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--no-playlist".into(),
            "--no-progress".into(),
            "-f".into(),
            FormatSelector::for_tier(request.quality).into(),
            "-P".into(),
            dest_dir.as_os_str().to_owned(),
            "-o".into(),
            OUTPUT_TEMPLATE.into(),
        ];

        if let Some(ffmpeg) = &self.ffmpeg_location {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.as_os_str().to_owned());
        }

        // "--" keeps a URL starting with '-' from being read as an option
        args.push("--".into());
        args.push(request.url.as_str().into());
        args
    }
}

#[async_trait]
impl FetchPort for YtDlpAdapter {
    async fn fetch(&self, request: &DownloadRequest, dest_dir: &Path) -> Result<(), ToolError> {
        info!(
            url = %request.url,
            quality = %request.quality,
            "Downloading into {}",
            dest_dir.display()
        );
        self.runner.run(self.build_args(request, dest_dir)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_as_strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_build_args_for_capped_tier() {
        let adapter = YtDlpAdapter::new(ToolRunner::new("yt-dlp"));
        let request = DownloadRequest::new("https://example.com/v1", QualityTier::P720).unwrap();
        let args = args_as_strings(&adapter.build_args(&request, Path::new("/tmp/work")));

        assert_eq!(
            args,
            vec![
                "--no-playlist",
                "--no-progress",
                "-f",
                "bestvideo[height<=720]+bestaudio/best",
                "-P",
                "/tmp/work",
                "-o",
                "%(title)s.%(ext)s",
                "--",
                "https://example.com/v1",
            ]
        );
    }

    #[test]
    fn test_build_args_with_ffmpeg_location() {
        let adapter = YtDlpAdapter::new(ToolRunner::new("yt-dlp"))
            .with_ffmpeg_location(Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")));
        let request = DownloadRequest::new("https://example.com/v1", QualityTier::Best).unwrap();
        let args = args_as_strings(&adapter.build_args(&request, Path::new("/tmp/work")));

        let pos = args.iter().position(|a| a == "--ffmpeg-location").unwrap();
        assert_eq!(args[pos + 1], "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(args[3], "bestvideo+bestaudio/best");
        assert_eq!(args.last().unwrap(), "https://example.com/v1");
    }

    #[test]
    fn test_url_is_a_single_trailing_argument() {
        let adapter = YtDlpAdapter::new(ToolRunner::new("yt-dlp"));
        let request =
            DownloadRequest::new("https://example.com/watch?v=1&list=2;rm -rf", QualityTier::P480).unwrap();
        let args = args_as_strings(&adapter.build_args(&request, Path::new("/tmp/work")));

        assert_eq!(args[args.len() - 2], "--");
        assert_eq!(args.last().unwrap(), request.url.as_str());
    }
}
