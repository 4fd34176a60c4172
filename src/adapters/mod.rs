// Adapters - External system implementations

pub mod command_runner;
pub mod exec_ffmpeg;
pub mod fs_local;
pub mod probe_ffprobe;
pub mod toml_config;
pub mod tracing_log;
pub mod ytdlp;

// Re-export adapters
pub use command_runner::{ToolOutput, ToolRunner};
pub use exec_ffmpeg::FFmpegAdapter;
pub use fs_local::FsLocalAdapter;
pub use probe_ffprobe::FFprobeAdapter;
pub use toml_config::{AppConfig, TomlConfigAdapter};
pub use tracing_log::TracingLogAdapter;
pub use ytdlp::YtDlpAdapter;
