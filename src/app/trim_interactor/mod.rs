// Trim interactor - Orchestrates cutting a range out of the source

use std::sync::Arc;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Result of a successful trim
#[derive(Debug, Clone, PartialEq)]
pub struct TrimOutcome {
    pub derived: MediaFile,
    /// Range actually cut, after bounds resolution
    pub range: TimeRange,
    pub clamped: bool,
}

/// Interactor for the trim use case
pub struct TrimInteractor {
    probe_port: Arc<dyn ProbePort>,
    trim_port: Arc<dyn TrimPort>,
    storage_port: Arc<dyn StoragePort>,
    log_port: Arc<dyn LogPort>,
    settings: TrimSettings,
    naming: DerivedNaming,
}

impl TrimInteractor {
    /// Create new trim interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        trim_port: Arc<dyn TrimPort>,
        storage_port: Arc<dyn StoragePort>,
        log_port: Arc<dyn LogPort>,
        settings: TrimSettings,
        naming: DerivedNaming,
    ) -> Self {
        Self {
            probe_port,
            trim_port,
            storage_port,
            log_port,
            settings,
            naming,
        }
    }

    /// Cut `range` out of `source` into the derived path next to it.
    ///
    /// The derived file only becomes visible once the engine has exited
    /// successfully; on any failure the staged output is dropped.
    pub async fn trim(&self, source: &MediaFile, range: TimeRange) -> Result<TrimOutcome, TrimError> {
        let probe = self
            .probe_port
            .probe_media(&source.path)
            .await
            .map_err(|e| TrimError::encode_failed(format!("could not probe source: {}", e)))?;

        let unknown = || "unknown".to_string();
        self.log_port
            .log_event(
                &LogEvent::new(LogLevel::Debug, "Probed source")
                    .with("source", source.file_name())
                    .with("video_codec", probe.video_codec.clone().unwrap_or_else(unknown))
                    .with("audio_codec", probe.audio_codec.clone().unwrap_or_else(unknown)),
            )
            .await;

        if probe.duration.is_none() {
            self.log_port
                .warn(&format!(
                    "Duration of {} is unknown, skipping bounds check",
                    source.file_name()
                ))
                .await;
        }

        let resolved = RangeResolver::resolve(range, probe.duration, self.settings.range_policy)?;
        if resolved.clamped {
            self.log_port
                .warn(&format!(
                    "End {} is past the end of the video, clamped to {}",
                    range.end(),
                    resolved.range.end()
                ))
                .await;
        }

        let target = self
            .storage_port
            .derived_path(source, &self.settings.derived_suffix, self.naming)
            .await
            .map_err(|e| TrimError::encode_failed(e.to_string()))?;
        let staging = self.storage_port.staging_path(&target);

        let job = TrimJob {
            source: source.path.clone(),
            range: resolved.range,
            output: staging.clone(),
            settings: self.settings.clone(),
        };

        self.log_port
            .log_event(
                &LogEvent::new(LogLevel::Info, "Starting trim")
                    .with("source", source.file_name())
                    .with("range", resolved.range)
                    .with("target", target.display()),
            )
            .await;

        let committed = match self.trim_port.trim(&job).await {
            Ok(()) => self
                .storage_port
                .commit(&staging, &target)
                .await
                .map_err(|e| TrimError::encode_failed(e.to_string())),
            Err(e) => Err(TrimError::encode_failed(e.to_string())),
        };

        match committed {
            Ok(derived) => {
                self.log_port
                    .info(&format!("Trim finished: {}", derived.file_name()))
                    .await;
                Ok(TrimOutcome {
                    derived,
                    range: resolved.range,
                    clamped: resolved.clamped,
                })
            }
            Err(e) => {
                if let Err(discard) = self.storage_port.discard(&staging).await {
                    self.log_port
                        .warn(&format!("Could not remove staged output: {}", discard))
                        .await;
                }
                self.log_port.error(&format!("Trim failed: {}", e)).await;
                Err(e)
            }
        }
    }
}
