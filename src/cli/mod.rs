//! CLI module for fetchclip
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// fetchclip - download a video and cut a clip out of it
///
/// Downloads with yt-dlp into a private temporary work area, re-encodes the
/// requested range with ffmpeg and hands the clip back.
#[derive(Parser, Debug)]
#[command(name = "fetchclip")]
#[command(about = "Download a video by URL and cut a clip out of it")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file (default: fetchclip.toml or config/fetchclip.toml)
    #[arg(long, global = true, env = "FETCHCLIP_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Kill external tools running longer than this many seconds (0 = never)
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a video, cut a clip and save it
    Clip(args::ClipArgs),
    /// Interactive session reading commands from stdin
    Session(args::SessionArgs),
    /// Parse and display time values
    Time(args::TimeArgs),
}
