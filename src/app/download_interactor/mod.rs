// Download interactor - Orchestrates fetching a video into a work area

use std::sync::Arc;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Interactor for the download use case
pub struct DownloadInteractor {
    fetch_port: Arc<dyn FetchPort>,
    storage_port: Arc<dyn StoragePort>,
    log_port: Arc<dyn LogPort>,
}

impl DownloadInteractor {
    /// Create new download interactor with injected ports
    pub fn new(
        fetch_port: Arc<dyn FetchPort>,
        storage_port: Arc<dyn StoragePort>,
        log_port: Arc<dyn LogPort>,
    ) -> Self {
        Self {
            fetch_port,
            storage_port,
            log_port,
        }
    }

    /// Fetch `request` into `area` and locate the produced file.
    ///
    /// The work area is expected to be fresh: whatever media file shows up
    /// after the tool exits is taken to be the download.
    pub async fn fetch(
        &self,
        request: &DownloadRequest,
        area: &WorkArea,
    ) -> Result<MediaFile, DownloadError> {
        self.log_port
            .log_event(
                &LogEvent::new(LogLevel::Info, "Starting download")
                    .with("url", &request.url)
                    .with("quality", request.quality)
                    .with("work_area", area.path().display()),
            )
            .await;

        self.fetch_port
            .fetch(request, area.path())
            .await
            .map_err(|e| DownloadError::process_failed(e.to_string()))?;

        let candidates = self
            .storage_port
            .list_media(area, &MediaFormat::ALL)
            .await
            .map_err(|e| DownloadError::no_file_produced(e.to_string()))?;

        let source = SourceSelector::pick(&candidates).cloned().ok_or_else(|| {
            DownloadError::no_file_produced(format!(
                "downloader exited cleanly but {} holds no mp4, mkv or webm file",
                area.path().display()
            ))
        })?;

        if candidates.len() > 1 {
            self.log_port
                .warn(&format!(
                    "Download produced {} media files, using {}",
                    candidates.len(),
                    source.file_name()
                ))
                .await;
        }

        self.log_port
            .info(&format!("Downloaded {}", source.file_name()))
            .await;
        Ok(source)
    }
}
