//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::domain::model::QualityTier;

/// Arguments for the clip command
#[derive(Args, Debug)]
pub struct ClipArgs {
    /// Video page URL (http or https)
    #[arg(short, long)]
    pub url: String,

    /// Maximum quality: best, 2160, 720, 480 or 360
    #[arg(short, long)]
    pub quality: Option<QualityTier>,

    /// Start time (m:s or seconds, empty for the beginning)
    #[arg(short, long, default_value = "")]
    pub start: String,

    /// End time (m:s or seconds)
    #[arg(short, long)]
    pub end: String,

    /// Where to save the clip
    #[arg(short, long, default_value = "cropped_video.mp4")]
    pub output: PathBuf,

    /// Do not overwrite an earlier clip inside the work area
    #[arg(long)]
    pub unique: bool,
}

/// Arguments for the session command
#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Quality used when `download` is given no quality
    #[arg(short, long)]
    pub quality: Option<QualityTier>,
}

/// Arguments for the time command
#[derive(Args, Debug)]
pub struct TimeArgs {
    /// Values to parse, e.g. 2:22, 90, 1:30.5
    #[arg(required = true, allow_hyphen_values = true)]
    pub values: Vec<String>,
}
