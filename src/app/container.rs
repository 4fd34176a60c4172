use std::sync::Arc;

use crate::adapters::{
    AppConfig, FFmpegAdapter, FFprobeAdapter, FsLocalAdapter, ToolRunner, TracingLogAdapter,
    YtDlpAdapter,
};
use crate::app::{download_interactor::DownloadInteractor, session::Session, trim_interactor::TrimInteractor};
use crate::domain::errors::DomainError;
use crate::domain::model::{DerivedNaming, TrimSettings};
use crate::ports::{FetchPort, LogPort, ProbePort, StoragePort, TrimPort};

pub trait AppContainer: Send + Sync {
    fn download_interactor(&self) -> Arc<DownloadInteractor>;
    fn trim_interactor(&self) -> Arc<TrimInteractor>;

    /// Fresh idle session sharing this container's adapters
    fn new_session(&self) -> Session;
}

pub struct DefaultAppContainer {
    download_interactor: Arc<DownloadInteractor>,
    trim_interactor: Arc<TrimInteractor>,
    storage_port: Arc<dyn StoragePort>,
    log_port: Arc<dyn LogPort>,
}

impl DefaultAppContainer {
    /// Wire the real tool adapters from configuration
    pub fn new(config: &AppConfig) -> Result<Self, DomainError> {
        config.validate()?;
        let timeout = config.timeout();

        let fetch_port = Arc::new(
            YtDlpAdapter::new(ToolRunner::new(&config.tools.ytdlp).with_timeout(timeout))
                .with_ffmpeg_location(custom_ffmpeg(config)),
        );
        let probe_port = Arc::new(FFprobeAdapter::new(
            ToolRunner::new(&config.tools.ffprobe).with_timeout(timeout),
        ));
        let trim_port = Arc::new(FFmpegAdapter::new(
            ToolRunner::new(&config.tools.ffmpeg).with_timeout(timeout),
        ));
        let storage_port = Arc::new(FsLocalAdapter::new(config.work_root()));
        let log_port = Arc::new(TracingLogAdapter::new(config.log_level()?));

        Ok(Self::with_ports(
            fetch_port,
            probe_port,
            trim_port,
            storage_port,
            log_port,
            config.trim.clone(),
            config.derived_naming(),
        ))
    }

    /// Wire arbitrary port implementations
    pub fn with_ports(
        fetch_port: Arc<dyn FetchPort>,
        probe_port: Arc<dyn ProbePort>,
        trim_port: Arc<dyn TrimPort>,
        storage_port: Arc<dyn StoragePort>,
        log_port: Arc<dyn LogPort>,
        settings: TrimSettings,
        naming: DerivedNaming,
    ) -> Self {
        let download_interactor = Arc::new(DownloadInteractor::new(
            Arc::clone(&fetch_port),
            Arc::clone(&storage_port),
            Arc::clone(&log_port),
        ));

        let trim_interactor = Arc::new(TrimInteractor::new(
            probe_port,
            trim_port,
            Arc::clone(&storage_port),
            Arc::clone(&log_port),
            settings,
            naming,
        ));

        Self {
            download_interactor,
            trim_interactor,
            storage_port,
            log_port,
        }
    }
}

/// yt-dlp only needs to be told about ffmpeg when it is not the one on PATH
fn custom_ffmpeg(config: &AppConfig) -> Option<std::path::PathBuf> {
    let ffmpeg = &config.tools.ffmpeg;
    if ffmpeg.components().count() > 1 {
        Some(ffmpeg.clone())
    } else {
        None
    }
}

impl AppContainer for DefaultAppContainer {
    fn download_interactor(&self) -> Arc<DownloadInteractor> {
        Arc::clone(&self.download_interactor)
    }

    fn trim_interactor(&self) -> Arc<TrimInteractor> {
        Arc::clone(&self.trim_interactor)
    }

    fn new_session(&self) -> Session {
        Session::new(
            self.download_interactor(),
            self.trim_interactor(),
            Arc::clone(&self.storage_port),
            Arc::clone(&self.log_port),
        )
    }
}
