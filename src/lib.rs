//! fetchclip library
//!
//! Download a video by URL with yt-dlp and cut a clip out of it with ffmpeg.
//! Each [`app::Session`] owns a private work area and walks through
//! `Idle -> Downloading -> Ready -> Trimming -> Cropped`.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use app::container::{AppContainer, DefaultAppContainer};
pub use app::session::{Action, PhaseKind, Session};
pub use domain::errors::DomainError;
pub use domain::model::{QualityTier, TimeRange, TimeSpec};
