//! Session state machine
//!
//! A [`Session`] sequences download and trim for one user and owns the work
//! area they happen in. Actions are only accepted in the phases where they
//! are legal; every failure leaves the session in a well-defined earlier
//! phase, never in one that points at a file that does not exist.
//!
//! ```text
//! Idle --download--> Downloading --ok--> Ready --crop--> Trimming --ok--> Cropped
//!                         |  err            ^                |  err          |
//!                         v                 +----------------+               |
//!                        Idle               ^------------------- crop -------+
//! ```
//!
//! `reset` returns to `Idle` from anywhere and removes the work area.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;

use crate::app::download_interactor::DownloadInteractor;
use crate::app::trim_interactor::{TrimInteractor, TrimOutcome};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Observable phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Idle,
    Downloading,
    Ready,
    Trimming,
    Cropped,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseKind::Idle => "idle",
            PhaseKind::Downloading => "downloading",
            PhaseKind::Ready => "ready",
            PhaseKind::Trimming => "trimming",
            PhaseKind::Cropped => "cropped",
        };
        f.write_str(name)
    }
}

/// Phase together with the artifacts that exist in it
#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Idle,
    Downloading {
        area: WorkArea,
    },
    Ready {
        area: WorkArea,
        source: MediaFile,
    },
    Trimming {
        area: WorkArea,
        source: MediaFile,
    },
    Cropped {
        area: WorkArea,
        source: MediaFile,
        derived: MediaFile,
    },
}

impl Phase {
    fn kind(&self) -> PhaseKind {
        match self {
            Phase::Idle => PhaseKind::Idle,
            Phase::Downloading { .. } => PhaseKind::Downloading,
            Phase::Ready { .. } => PhaseKind::Ready,
            Phase::Trimming { .. } => PhaseKind::Trimming,
            Phase::Cropped { .. } => PhaseKind::Cropped,
        }
    }

    fn area(&self) -> Option<&WorkArea> {
        match self {
            Phase::Idle => None,
            Phase::Downloading { area }
            | Phase::Ready { area, .. }
            | Phase::Trimming { area, .. }
            | Phase::Cropped { area, .. } => Some(area),
        }
    }

    fn source(&self) -> Option<&MediaFile> {
        match self {
            Phase::Ready { source, .. }
            | Phase::Trimming { source, .. }
            | Phase::Cropped { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// User-facing actions a front end can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Download,
    Crop,
    Save,
    Reset,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Download => "download",
            Action::Crop => "crop",
            Action::Save => "save",
            Action::Reset => "reset",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful download
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadOutcome {
    pub source: MediaFile,
    /// Cleanup problems with the superseded work area
    pub warnings: Vec<StorageError>,
}

/// One user's download-then-trim pipeline
pub struct Session {
    phase: Phase,
    phase_tx: watch::Sender<PhaseKind>,
    download_interactor: Arc<DownloadInteractor>,
    trim_interactor: Arc<TrimInteractor>,
    storage_port: Arc<dyn StoragePort>,
    log_port: Arc<dyn LogPort>,
}

impl Session {
    pub fn new(
        download_interactor: Arc<DownloadInteractor>,
        trim_interactor: Arc<TrimInteractor>,
        storage_port: Arc<dyn StoragePort>,
        log_port: Arc<dyn LogPort>,
    ) -> Self {
        let (phase_tx, _) = watch::channel(PhaseKind::Idle);
        Self {
            phase: Phase::Idle,
            phase_tx,
            download_interactor,
            trim_interactor,
            storage_port,
            log_port,
        }
    }

    pub fn phase(&self) -> PhaseKind {
        self.phase.kind()
    }

    /// Receiver that sees every phase change, including the transient ones
    pub fn subscribe(&self) -> watch::Receiver<PhaseKind> {
        self.phase_tx.subscribe()
    }

    pub fn work_area(&self) -> Option<&WorkArea> {
        self.phase.area()
    }

    pub fn source(&self) -> Option<&MediaFile> {
        self.phase.source()
    }

    pub fn derived(&self) -> Option<&MediaFile> {
        match &self.phase {
            Phase::Cropped { derived, .. } => Some(derived),
            _ => None,
        }
    }

    /// Actions legal in the current phase
    pub fn available_actions(&self) -> Vec<Action> {
        match self.phase.kind() {
            PhaseKind::Idle => vec![Action::Download, Action::Reset],
            PhaseKind::Ready => vec![Action::Download, Action::Crop, Action::Reset],
            PhaseKind::Cropped => vec![Action::Download, Action::Crop, Action::Save, Action::Reset],
            PhaseKind::Downloading | PhaseKind::Trimming => Vec::new(),
        }
    }

    /// Download `url` into a fresh work area.
    ///
    /// A previous download is torn down first; problems removing it are
    /// reported as warnings on the outcome. Invalid input leaves the
    /// session untouched.
    pub async fn download(
        &mut self,
        url: &str,
        quality: QualityTier,
    ) -> Result<DownloadOutcome, DomainError> {
        self.ensure_allowed(Action::Download)?;
        let request = DownloadRequest::new(url, quality)?;

        let mut warnings = Vec::new();
        if let Err(e) = self.teardown().await {
            self.log_port
                .warn(&format!("Previous work area not fully removed: {}", e))
                .await;
            warnings.push(e);
        }

        let area = self.storage_port.create_work_area().await?;
        self.set_phase(Phase::Downloading { area: area.clone() });

        match self.download_interactor.fetch(&request, &area).await {
            Ok(source) => {
                self.set_phase(Phase::Ready {
                    area,
                    source: source.clone(),
                });
                Ok(DownloadOutcome { source, warnings })
            }
            Err(e) => {
                self.log_port.error(&format!("Download failed: {}", e)).await;
                if let Err(cleanup) = self.storage_port.clear(&area).await {
                    self.log_port
                        .warn(&format!("Failed download left files behind: {}", cleanup))
                        .await;
                }
                self.set_phase(Phase::Idle);
                Err(e.into())
            }
        }
    }

    /// Crop the downloaded video to `[start, end)` given as user text
    pub async fn crop(&mut self, start: &str, end: &str) -> Result<TrimOutcome, DomainError> {
        self.ensure_allowed(Action::Crop)?;
        let range = TimeRange::parse(start, end)?;
        self.crop_range(range).await
    }

    /// Crop the downloaded video to an already validated range
    pub async fn crop_range(&mut self, range: TimeRange) -> Result<TrimOutcome, DomainError> {
        let (area, source) = match &self.phase {
            Phase::Ready { area, source } | Phase::Cropped { area, source, .. } => {
                (area.clone(), source.clone())
            }
            _ => return Err(self.invalid(Action::Crop)),
        };

        let source = match self.storage_port.resolve(&area, &source).await {
            Ok(source) => source,
            Err(e) => {
                self.log_port
                    .error(&format!("Source video is gone, resetting session: {}", e))
                    .await;
                if let Err(cleanup) = self.reset().await {
                    self.log_port
                        .warn(&format!("Reset after missing source: {}", cleanup))
                        .await;
                }
                return Err(e.into());
            }
        };

        self.set_phase(Phase::Trimming {
            area: area.clone(),
            source: source.clone(),
        });

        match self.trim_interactor.trim(&source, range).await {
            Ok(outcome) => {
                self.set_phase(Phase::Cropped {
                    area,
                    source,
                    derived: outcome.derived.clone(),
                });
                Ok(outcome)
            }
            Err(e) => {
                self.set_phase(Phase::Ready { area, source });
                Err(e.into())
            }
        }
    }

    /// Return to `Idle` and remove the work area.
    ///
    /// The session is `Idle` afterwards even when removal fails; the error
    /// is only informational.
    pub async fn reset(&mut self) -> Result<(), StorageError> {
        let result = self.teardown().await;
        if let Err(e) = &result {
            self.log_port
                .warn(&format!("Work area not fully removed: {}", e))
                .await;
        }
        result
    }

    /// The derived clip as a named byte stream
    pub async fn derived_download(&self) -> Result<DerivedDownload, DomainError> {
        let derived = self.derived_or_invalid()?;
        let bytes = self.storage_port.read_bytes(derived).await?;
        Ok(DerivedDownload {
            file_name: DERIVED_DOWNLOAD_NAME,
            mime_type: DERIVED_MIME_TYPE,
            bytes,
        })
    }

    /// Copy the derived clip to `dest`, returning the bytes written
    pub async fn export_derived(&self, dest: &Path) -> Result<u64, DomainError> {
        let derived = self.derived_or_invalid()?;
        let written = self.storage_port.export(derived, dest).await?;
        self.log_port
            .info(&format!("Saved clip to {}", dest.display()))
            .await;
        Ok(written)
    }

    fn derived_or_invalid(&self) -> Result<&MediaFile, DomainError> {
        self.derived().ok_or_else(|| self.invalid(Action::Save))
    }

    fn ensure_allowed(&self, action: Action) -> Result<(), DomainError> {
        if self.available_actions().contains(&action) {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: Action) -> DomainError {
        DomainError::InvalidTransition {
            action: action.as_str(),
            phase: self.phase.kind().to_string(),
        }
    }

    /// Forget the current work area and remove it from disk
    async fn teardown(&mut self) -> Result<(), StorageError> {
        let area = self.phase.area().cloned();
        self.set_phase(Phase::Idle);
        match area {
            Some(area) => self.storage_port.clear(&area).await,
            None => Ok(()),
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        let kind = phase.kind();
        self.phase = phase;
        self.phase_tx.send_replace(kind);
    }
}
