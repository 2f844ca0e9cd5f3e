//! The seam between the core and whatever actually touches the filesystem.
//!
//! Every operation the core needs from the outside world goes through
//! [`Backend`]. The production implementation is [`FsBackend`]; tests plug in
//! scripted doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::deletion::DeleteOutcome;
use super::error::CoreResult;
use super::metadata::MetadataRecord;
use super::workshop::WorkshopLocation;
use super::{file_ops, project, scanner, workshop, Entry};

/// Parameters of one full scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub root: PathBuf,
    /// `0` means unlimited.
    pub max_depth: usize,
    pub include_files: bool,
    pub min_size: u64,
}

/// Operations the core delegates to its external collaborator.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Walks `request.root` and returns a flat list with `level` and
    /// `parent_path` populated.
    async fn scan(&self, request: &ScanRequest) -> CoreResult<Vec<Entry>>;

    /// Returns every empty directory below `root`, flat and unordered.
    async fn find_empty(&self, root: &Path, max_depth: usize) -> CoreResult<Vec<PathBuf>>;

    async fn get_metadata(&self, folder: &Path) -> CoreResult<MetadataRecord>;

    /// Total bytes of all `paths`. Fails if any path cannot be read.
    async fn total_size(&self, paths: &[PathBuf]) -> CoreResult<u64>;

    /// Attempts every path independently and never aborts the batch.
    async fn delete_all(&self, paths: &[PathBuf]) -> DeleteOutcome;

    /// Copies `source` into `destination_dir` and returns the new path.
    async fn backup(&self, source: &Path, destination_dir: &Path) -> CoreResult<PathBuf>;

    /// Opens a directory or URL with the platform handler.
    async fn open_externally(&self, target: &str) -> CoreResult<()>;

    fn resolve_catalog_url(&self, external_id: &str) -> CoreResult<String>;

    /// Looks for the wallpaper workshop folder in the usual install locations.
    async fn detect_workshop(&self) -> Option<WorkshopLocation> {
        None
    }
}

/// The real filesystem. Blocking work is moved off the async runtime.
#[derive(Debug, Default, Clone)]
pub struct FsBackend;

#[async_trait]
impl Backend for FsBackend {
    async fn scan(&self, request: &ScanRequest) -> CoreResult<Vec<Entry>> {
        let request = request.clone();
        tokio::task::spawn_blocking(move || scanner::scan_entries(&request)).await?
    }

    async fn find_empty(&self, root: &Path, max_depth: usize) -> CoreResult<Vec<PathBuf>> {
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || scanner::find_empty_folders(&root, max_depth)).await?
    }

    async fn get_metadata(&self, folder: &Path) -> CoreResult<MetadataRecord> {
        let folder = folder.to_path_buf();
        tokio::task::spawn_blocking(move || project::read_project_json(&folder)).await?
    }

    async fn total_size(&self, paths: &[PathBuf]) -> CoreResult<u64> {
        let paths = paths.to_vec();
        tokio::task::spawn_blocking(move || file_ops::total_size(&paths)).await?
    }

    async fn delete_all(&self, paths: &[PathBuf]) -> DeleteOutcome {
        let owned = paths.to_vec();
        match tokio::task::spawn_blocking(move || file_ops::delete_paths(&owned)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // The worker died; nothing is known about any path.
                tracing::error!("Delete worker failed: {}", e);
                DeleteOutcome::all_failed(paths, &e.to_string())
            }
        }
    }

    async fn backup(&self, source: &Path, destination_dir: &Path) -> CoreResult<PathBuf> {
        let source = source.to_path_buf();
        let destination_dir = destination_dir.to_path_buf();
        tokio::task::spawn_blocking(move || file_ops::copy_item(&source, &destination_dir)).await?
    }

    async fn open_externally(&self, target: &str) -> CoreResult<()> {
        let target = target.to_string();
        tokio::task::spawn_blocking(move || file_ops::open_externally(&target)).await?
    }

    fn resolve_catalog_url(&self, external_id: &str) -> CoreResult<String> {
        workshop::catalog_url(external_id)
    }

    async fn detect_workshop(&self) -> Option<WorkshopLocation> {
        tokio::task::spawn_blocking(workshop::detect_workshop)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("Workshop detection failed: {}", e);
                None
            })
    }
}
