// Local filesystem adapter - Work area bookkeeping in the system temp dir

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Suffix of files that are still being written
const STAGING_SUFFIX: &str = ".part";

/// Extension of derived outputs
const DERIVED_EXTENSION: &str = "mp4";

/// Local filesystem adapter
pub struct FsLocalAdapter {
    work_root: PathBuf,
}

impl FsLocalAdapter {
    /// Create a new adapter placing work areas under `work_root`
    pub fn new(work_root: impl Into<PathBuf>) -> Self {
        Self {
            work_root: work_root.into(),
        }
    }

    pub fn work_root(&self) -> &Path {
        &self.work_root
    }

    fn derived_candidate(dir: &Path, base: &str, counter: Option<u32>) -> PathBuf {
        match counter {
            Some(n) => dir.join(format!("{}_{}.{}", base, n, DERIVED_EXTENSION)),
            None => dir.join(format!("{}.{}", base, DERIVED_EXTENSION)),
        }
    }
}

impl Default for FsLocalAdapter {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

#[async_trait]
impl StoragePort for FsLocalAdapter {
    async fn create_work_area(&self) -> Result<WorkArea, StorageError> {
        tokio::fs::create_dir_all(&self.work_root)
            .await
            .map_err(|e| StorageError::from_io(&self.work_root, "create work root", e))?;

        let prefix = format!("fetchclip-{}-", Utc::now().format("%Y%m%dT%H%M%S"));
        let dir = tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir_in(&self.work_root)
            .map_err(|e| StorageError::from_io(&self.work_root, "create work area", e))?
            .keep();

        debug!("Created work area {}", dir.display());
        Ok(WorkArea::new(dir))
    }

    async fn list_media(
        &self,
        area: &WorkArea,
        formats: &[MediaFormat],
    ) -> Result<Vec<MediaFile>, StorageError> {
        let mut media = Vec::new();
        for entry in WalkDir::new(area.path()).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                StorageError::new(area.path(), format!("failed to list work area: {}", e))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(file) = MediaFile::from_path(entry.path()) {
                if formats.contains(&file.format) {
                    media.push(file);
                }
            }
        }
        Ok(media)
    }

    async fn resolve(&self, area: &WorkArea, media: &MediaFile) -> Result<MediaFile, StorageError> {
        self.list_media(area, &MediaFormat::ALL)
            .await?
            .into_iter()
            .find(|candidate| candidate.path == media.path)
            .ok_or_else(|| StorageError::new(&media.path, "media file is no longer in the work area"))
    }

    async fn derived_path(
        &self,
        source: &MediaFile,
        suffix: &str,
        naming: DerivedNaming,
    ) -> Result<PathBuf, StorageError> {
        let dir = source
            .path
            .parent()
            .ok_or_else(|| StorageError::new(&source.path, "source has no parent directory"))?;
        let base = format!("{}_{}", source.stem(), suffix);

        let first = Self::derived_candidate(dir, &base, None);
        if naming == DerivedNaming::Overwrite {
            return Ok(first);
        }

        let mut candidate = first;
        let mut counter = 0u32;
        while tokio::fs::try_exists(&candidate)
            .await
            .map_err(|e| StorageError::from_io(&candidate, "check derived path", e))?
        {
            counter += 1;
            candidate = Self::derived_candidate(dir, &base, Some(counter));
        }
        Ok(candidate)
    }

    fn staging_path(&self, target: &Path) -> PathBuf {
        let mut staged = target.as_os_str().to_owned();
        staged.push(STAGING_SUFFIX);
        PathBuf::from(staged)
    }

    async fn commit(&self, staging: &Path, target: &Path) -> Result<MediaFile, StorageError> {
        let media = MediaFile::from_path(target)
            .ok_or_else(|| StorageError::new(target, "target is not a media file name"))?;

        let metadata = tokio::fs::metadata(staging)
            .await
            .map_err(|e| StorageError::from_io(staging, "read staged output", e))?;
        if !metadata.is_file() || metadata.len() == 0 {
            return Err(StorageError::new(staging, "staged output is empty"));
        }

        tokio::fs::rename(staging, target)
            .await
            .map_err(|e| StorageError::from_io(target, "commit staged output", e))?;
        debug!("Committed {}", target.display());
        Ok(media)
    }

    async fn discard(&self, staging: &Path) -> Result<(), StorageError> {
        match tokio::fs::remove_file(staging).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io(staging, "discard staged output", e)),
        }
    }

    async fn export(&self, media: &MediaFile, dest: &Path) -> Result<u64, StorageError> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::from_io(parent, "create export directory", e))?;
        }
        tokio::fs::copy(&media.path, dest)
            .await
            .map_err(|e| StorageError::from_io(dest, "export media", e))
    }

    async fn read_bytes(&self, media: &MediaFile) -> Result<Vec<u8>, StorageError> {
        tokio::fs::read(&media.path)
            .await
            .map_err(|e| StorageError::from_io(&media.path, "read media", e))
    }

    async fn clear(&self, area: &WorkArea) -> Result<(), StorageError> {
        let mut entries = match tokio::fs::read_dir(area.path()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(StorageError::from_io(area.path(), "read work area", e)),
        };

        let mut failed = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    failed.push(format!("<listing>: {}", e));
                    break;
                }
            };
            let path = entry.path();
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            let removed = if is_dir {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };
            if let Err(e) = removed {
                warn!("Could not remove {}: {}", path.display(), e);
                failed.push(format!("{}: {}", path.display(), e));
            }
        }

        if !failed.is_empty() {
            return Err(StorageError::new(
                area.path(),
                format!("partial cleanup, could not remove {}", failed.join("; ")),
            ));
        }

        tokio::fs::remove_dir(area.path())
            .await
            .map_err(|e| StorageError::from_io(area.path(), "remove work area", e))?;
        debug!("Removed work area {}", area.path().display());
        Ok(())
    }
}
