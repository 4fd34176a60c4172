// In-crate port fakes for interactor and session tests

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use crate::adapters::fs_local::FsLocalAdapter;
use crate::app::download_interactor::DownloadInteractor;
use crate::app::session::Session;
use crate::app::trim_interactor::TrimInteractor;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Downloader that drops canned files into the destination
pub struct FakeFetch {
    files: Vec<(&'static str, &'static str)>,
    failure: Option<ToolError>,
    pub requests: Mutex<Vec<DownloadRequest>>,
}

impl FakeFetch {
    pub fn producing(files: &[(&'static str, &'static str)]) -> Self {
        Self {
            files: files.to_vec(),
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ToolError) -> Self {
        Self {
            files: Vec::new(),
            failure: Some(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl FetchPort for FakeFetch {
    async fn fetch(&self, request: &DownloadRequest, dest_dir: &Path) -> Result<(), ToolError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(error) = &self.failure {
            // a failing tool may still leave partial files behind
            std::fs::write(dest_dir.join("partial.webm.part"), b"partial").unwrap();
            return Err(error.clone());
        }
        for (name, content) in &self.files {
            std::fs::write(dest_dir.join(name), content).unwrap();
        }
        Ok(())
    }
}

/// Prober reporting a fixed duration
pub struct FakeProbe {
    probe: MediaProbe,
    fail: bool,
}

impl FakeProbe {
    pub fn with_duration(duration: Option<f64>) -> Self {
        Self::reporting(MediaProbe {
            duration,
            ..MediaProbe::default()
        })
    }

    pub fn reporting(probe: MediaProbe) -> Self {
        Self { probe, fail: false }
    }

    pub fn failing() -> Self {
        Self {
            probe: MediaProbe::default(),
            fail: true,
        }
    }
}

#[async_trait]
impl ProbePort for FakeProbe {
    async fn probe_media(&self, _file_path: &Path) -> Result<MediaProbe, ToolError> {
        if self.fail {
            return Err(ToolError::Failed {
                tool: "ffprobe".to_string(),
                code: Some(1),
                stderr: "Invalid data found when processing input".to_string(),
            });
        }
        Ok(self.probe.clone())
    }
}

/// Media engine writing a description of the job as the output
pub struct FakeTrim {
    fail: AtomicBool,
    pub jobs: Mutex<Vec<TrimJob>>,
}

impl FakeTrim {
    pub fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn last_job(&self) -> Option<TrimJob> {
        self.jobs.lock().unwrap().last().cloned()
    }

    pub fn rendered(range: &TimeRange) -> String {
        format!("clip {}", range)
    }
}

#[async_trait]
impl TrimPort for FakeTrim {
    async fn trim(&self, job: &TrimJob) -> Result<(), ToolError> {
        self.jobs.lock().unwrap().push(job.clone());
        if self.fail.load(Ordering::SeqCst) {
            // ffmpeg writes a partial output before failing
            std::fs::write(&job.output, b"garbage").unwrap();
            return Err(ToolError::Failed {
                tool: "ffmpeg".to_string(),
                code: Some(1),
                stderr: "Conversion failed!".to_string(),
            });
        }
        std::fs::write(&job.output, Self::rendered(&job.range)).unwrap();
        Ok(())
    }
}

/// Local storage whose cleanup can be made to fail
pub struct StickyStorage {
    inner: FsLocalAdapter,
    fail_clear: AtomicBool,
}

impl StickyStorage {
    pub fn new(work_root: PathBuf) -> Self {
        Self {
            inner: FsLocalAdapter::new(work_root),
            fail_clear: AtomicBool::new(false),
        }
    }

    pub fn set_fail_clear(&self, fail: bool) {
        self.fail_clear.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl StoragePort for StickyStorage {
    async fn create_work_area(&self) -> Result<WorkArea, StorageError> {
        self.inner.create_work_area().await
    }

    async fn list_media(
        &self,
        area: &WorkArea,
        formats: &[MediaFormat],
    ) -> Result<Vec<MediaFile>, StorageError> {
        self.inner.list_media(area, formats).await
    }

    async fn resolve(&self, area: &WorkArea, media: &MediaFile) -> Result<MediaFile, StorageError> {
        self.inner.resolve(area, media).await
    }

    async fn derived_path(
        &self,
        source: &MediaFile,
        suffix: &str,
        naming: DerivedNaming,
    ) -> Result<PathBuf, StorageError> {
        self.inner.derived_path(source, suffix, naming).await
    }

    fn staging_path(&self, target: &Path) -> PathBuf {
        self.inner.staging_path(target)
    }

    async fn commit(&self, staging: &Path, target: &Path) -> Result<MediaFile, StorageError> {
        self.inner.commit(staging, target).await
    }

    async fn discard(&self, staging: &Path) -> Result<(), StorageError> {
        self.inner.discard(staging).await
    }

    async fn export(&self, media: &MediaFile, dest: &Path) -> Result<u64, StorageError> {
        self.inner.export(media, dest).await
    }

    async fn read_bytes(&self, media: &MediaFile) -> Result<Vec<u8>, StorageError> {
        self.inner.read_bytes(media).await
    }

    async fn clear(&self, area: &WorkArea) -> Result<(), StorageError> {
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(StorageError::new(area.path(), "file is in use"));
        }
        self.inner.clear(area).await
    }
}

/// Log sink that remembers what it was told
#[derive(Default)]
pub struct RecordingLog {
    pub entries: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingLog {
    pub fn warnings(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, _)| *level == LogLevel::Warn)
            .map(|(_, message)| message.clone())
            .collect()
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.entries.lock().unwrap().push((level, message.to_string()));
    }
}

#[async_trait]
impl LogPort for RecordingLog {
    async fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    async fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }

    async fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }

    async fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    async fn log_event(&self, event: &LogEvent) {
        let mut line = event.message.clone();
        for (key, value) in &event.context {
            line.push_str(&format!(" {}={}", key, value));
        }
        self.push(event.level, &line);
    }
}

/// Session wired to fakes, with handles to inspect them
pub struct Harness {
    pub session: Session,
    pub fetch: Arc<FakeFetch>,
    pub trim: Arc<FakeTrim>,
    pub storage: Arc<StickyStorage>,
    pub log: Arc<RecordingLog>,
    pub download_interactor: Arc<DownloadInteractor>,
    pub trim_interactor: Arc<TrimInteractor>,
    pub root: TempDir,
}

impl Harness {
    pub fn new(fetch: FakeFetch, probe: FakeProbe) -> Self {
        Self::with_settings(fetch, probe, TrimSettings::default(), DerivedNaming::Overwrite)
    }

    pub fn with_settings(
        fetch: FakeFetch,
        probe: FakeProbe,
        settings: TrimSettings,
        naming: DerivedNaming,
    ) -> Self {
        let root = TempDir::new().unwrap();
        let fetch = Arc::new(fetch);
        let trim = Arc::new(FakeTrim::new());
        let storage = Arc::new(StickyStorage::new(root.path().join("work")));
        let log = Arc::new(RecordingLog::default());

        let download_interactor = Arc::new(DownloadInteractor::new(
            Arc::clone(&fetch) as Arc<dyn FetchPort>,
            Arc::clone(&storage) as Arc<dyn StoragePort>,
            Arc::clone(&log) as Arc<dyn LogPort>,
        ));
        let trim_interactor = Arc::new(TrimInteractor::new(
            Arc::new(probe) as Arc<dyn ProbePort>,
            Arc::clone(&trim) as Arc<dyn TrimPort>,
            Arc::clone(&storage) as Arc<dyn StoragePort>,
            Arc::clone(&log) as Arc<dyn LogPort>,
            settings,
            naming,
        ));
        let session = Session::new(
            Arc::clone(&download_interactor),
            Arc::clone(&trim_interactor),
            Arc::clone(&storage) as Arc<dyn StoragePort>,
            Arc::clone(&log) as Arc<dyn LogPort>,
        );

        Self {
            session,
            fetch,
            trim,
            storage,
            log,
            download_interactor,
            trim_interactor,
            root,
        }
    }

    /// Session that downloads one 60 second webm
    pub fn standard() -> Self {
        Self::new(
            FakeFetch::producing(&[("My Video.webm", "source")]),
            FakeProbe::with_duration(Some(60.0)),
        )
    }

    pub fn work_root(&self) -> PathBuf {
        self.root.path().join("work")
    }
}
