//! Descriptive folder metadata and the session cache that holds it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::backend::Backend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallpaperType {
    Scene,
    Video,
    Web,
    Application,
    Unknown,
}

impl WallpaperType {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "scene" => WallpaperType::Scene,
            "video" => WallpaperType::Video,
            "web" => WallpaperType::Web,
            "application" | "app" => WallpaperType::Application,
            _ => WallpaperType::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WallpaperType::Scene => "Scene",
            WallpaperType::Video => "Video",
            WallpaperType::Web => "Website",
            WallpaperType::Application => "Application",
            WallpaperType::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreviewKind {
    #[default]
    Image,
    Video,
    AnimatedImage,
}

/// What we know about a wallpaper folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub wallpaper_type: WallpaperType,
    pub preview_path: Option<PathBuf>,
    /// Only meaningful when `preview_path` is set.
    pub preview_kind: PreviewKind,
    pub external_id: Option<String>,
}

/// A settled lookup. `Missing` is the negative marker and is distinct from
/// "never looked up", which is simply the absence of a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheSlot {
    Loaded(MetadataRecord),
    Missing,
}

/// Path-keyed metadata store. Slots are never invalidated individually; the
/// only way to drop them is [`MetadataCache::reset`].
#[derive(Debug, Default, Clone)]
pub struct MetadataCache {
    slots: HashMap<PathBuf, CacheSlot>,
}

impl MetadataCache {
    /// Pure lookup. Never triggers loading and returns `None` for both
    /// negative and absent slots.
    pub fn get(&self, path: &Path) -> Option<&MetadataRecord> {
        match self.slots.get(path) {
            Some(CacheSlot::Loaded(record)) => Some(record),
            _ => None,
        }
    }

    pub fn slot(&self, path: &Path) -> Option<&CacheSlot> {
        self.slots.get(path)
    }

    pub fn is_cached(&self, path: &Path) -> bool {
        self.slots.contains_key(path)
    }

    /// The subset of `paths` that has no slot yet, without duplicates.
    pub fn missing<'a, I>(&self, paths: I) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = &'a PathBuf>,
    {
        let mut seen = std::collections::HashSet::new();
        paths
            .into_iter()
            .filter(|p| !self.slots.contains_key(*p) && seen.insert((*p).clone()))
            .cloned()
            .collect()
    }

    /// Stores settled lookups. A slot that already exists is kept as is.
    pub fn absorb(&mut self, results: Vec<(PathBuf, CacheSlot)>) {
        for (path, slot) in results {
            self.slots.entry(path).or_insert(slot);
        }
    }

    pub fn reset(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn positive_count(&self) -> usize {
        self.slots
            .values()
            .filter(|s| matches!(s, CacheSlot::Loaded(_)))
            .count()
    }

    pub fn negative_count(&self) -> usize {
        self.slots.len() - self.positive_count()
    }

    /// Loads every uncached path and waits until all lookups have settled.
    pub async fn ensure_loaded(
        &mut self,
        backend: Arc<dyn Backend>,
        folder_paths: &[PathBuf],
        concurrency: usize,
    ) {
        let missing = self.missing(folder_paths);
        let results = fetch_metadata(backend, missing, concurrency).await;
        self.absorb(results);
    }
}

/// Looks up all `paths` concurrently (at most `concurrency` in flight) and
/// returns once every lookup has settled. A failing lookup yields
/// [`CacheSlot::Missing`] for its path and never affects the others.
pub async fn fetch_metadata(
    backend: Arc<dyn Backend>,
    paths: Vec<PathBuf>,
    concurrency: usize,
) -> Vec<(PathBuf, CacheSlot)> {
    if paths.is_empty() {
        return Vec::new();
    }

    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut set = JoinSet::new();

    for path in paths.iter().cloned() {
        let backend = backend.clone();
        let permits = permits.clone();
        set.spawn(async move {
            let _permit = permits.acquire_owned().await;
            let slot = match backend.get_metadata(&path).await {
                Ok(record) => CacheSlot::Loaded(record),
                Err(e) => {
                    tracing::debug!("Metadata lookup failed for {:?}: {}", path, e);
                    CacheSlot::Missing
                }
            };
            (path, slot)
        });
    }

    let mut results = Vec::with_capacity(paths.len());
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => tracing::warn!("Metadata task did not complete: {}", e),
        }
    }

    // A task that panicked never reported its path; record it as missing too.
    if results.len() < paths.len() {
        let settled: std::collections::HashSet<PathBuf> =
            results.iter().map(|(p, _)| p.clone()).collect();
        for path in paths {
            if !settled.contains(&path) {
                results.push((path, CacheSlot::Missing));
            }
        }
    }

    tracing::info!(
        "Metadata warm-up settled: {} loaded, {} missing",
        results
            .iter()
            .filter(|(_, s)| matches!(s, CacheSlot::Loaded(_)))
            .count(),
        results
            .iter()
            .filter(|(_, s)| matches!(s, CacheSlot::Missing))
            .count()
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::ScanRequest;
    use crate::core::deletion::DeleteOutcome;
    use crate::core::error::{CoreError, CoreResult};
    use crate::core::Entry;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_test::traced_test;

    /// Succeeds for paths ending in an even digit, fails otherwise.
    #[derive(Default)]
    struct ParityBackend {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Backend for ParityBackend {
        async fn scan(&self, _request: &ScanRequest) -> CoreResult<Vec<Entry>> {
            Ok(Vec::new())
        }
        async fn find_empty(&self, _root: &Path, _depth: usize) -> CoreResult<Vec<PathBuf>> {
            Ok(Vec::new())
        }
        async fn get_metadata(&self, folder: &Path) -> CoreResult<MetadataRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            let last = folder.to_string_lossy().chars().last().unwrap_or('x');
            match last.to_digit(10) {
                Some(d) if d % 2 == 0 => Ok(MetadataRecord {
                    title: Some(format!("Item {d}")),
                    description: None,
                    tags: vec![],
                    wallpaper_type: WallpaperType::Scene,
                    preview_path: None,
                    preview_kind: PreviewKind::Image,
                    external_id: None,
                }),
                _ => Err(CoreError::metadata(folder, "project.json missing")),
            }
        }
        async fn total_size(&self, _paths: &[PathBuf]) -> CoreResult<u64> {
            Ok(0)
        }
        async fn delete_all(&self, _paths: &[PathBuf]) -> DeleteOutcome {
            DeleteOutcome::default()
        }
        async fn backup(&self, source: &Path, _destination: &Path) -> CoreResult<PathBuf> {
            Err(CoreError::backup(source, "not supported"))
        }
        async fn open_externally(&self, _target: &str) -> CoreResult<()> {
            Ok(())
        }
        fn resolve_catalog_url(&self, id: &str) -> CoreResult<String> {
            Ok(id.to_string())
        }
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[tokio::test]
    async fn failures_become_negative_entries() {
        let backend = Arc::new(ParityBackend::default());
        let mut cache = MetadataCache::default();
        let folders = paths(&["/w/0", "/w/1", "/w/2", "/w/3", "/w/4"]);

        cache.ensure_loaded(backend.clone(), &folders, 2).await;

        assert_eq!(cache.len(), 5);
        assert_eq!(cache.positive_count(), 3);
        assert_eq!(cache.negative_count(), 2);
        assert_eq!(cache.slot(Path::new("/w/1")), Some(&CacheSlot::Missing));
        assert!(cache.get(Path::new("/w/1")).is_none());
        assert_eq!(
            cache.get(Path::new("/w/2")).and_then(|r| r.title.clone()),
            Some("Item 2".to_string())
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn warm_up_logs_settled_counts() {
        let backend = Arc::new(ParityBackend::default());
        let results = fetch_metadata(backend, paths(&["/w/2", "/w/7"]), 4).await;
        assert_eq!(results.len(), 2);
        assert!(logs_contain("Metadata warm-up settled: 1 loaded, 1 missing"));
    }

    #[tokio::test]
    async fn cached_paths_are_not_looked_up_again() {
        let backend = Arc::new(ParityBackend::default());
        let mut cache = MetadataCache::default();
        let folders = paths(&["/w/0", "/w/1"]);

        cache.ensure_loaded(backend.clone(), &folders, 4).await;
        cache.ensure_loaded(backend.clone(), &folders, 4).await;

        // Negative slots count as cached as well.
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn reset_forgets_everything() {
        let backend = Arc::new(ParityBackend::default());
        let mut cache = MetadataCache::default();
        cache.ensure_loaded(backend.clone(), &paths(&["/w/0"]), 1).await;
        cache.reset();
        assert!(cache.is_empty());
        assert!(!cache.is_cached(Path::new("/w/0")));
    }

    #[test]
    fn get_never_loads() {
        let cache = MetadataCache::default();
        assert!(cache.get(Path::new("/w/0")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn absorb_keeps_existing_slots() {
        let mut cache = MetadataCache::default();
        cache.absorb(vec![(PathBuf::from("/w/1"), CacheSlot::Missing)]);
        cache.absorb(vec![(
            PathBuf::from("/w/1"),
            CacheSlot::Loaded(MetadataRecord {
                title: None,
                description: None,
                tags: vec![],
                wallpaper_type: WallpaperType::Unknown,
                preview_path: None,
                preview_kind: PreviewKind::Image,
                external_id: None,
            }),
        )]);
        assert_eq!(cache.slot(Path::new("/w/1")), Some(&CacheSlot::Missing));
    }

    #[test]
    fn wallpaper_type_parsing() {
        assert_eq!(WallpaperType::parse("Video"), WallpaperType::Video);
        assert_eq!(WallpaperType::parse("app"), WallpaperType::Application);
        assert_eq!(WallpaperType::parse("preset"), WallpaperType::Unknown);
        assert_eq!(WallpaperType::Web.label(), "Website");
    }
}
