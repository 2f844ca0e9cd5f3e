//! Defines the central, mutable state of the application.

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::config::{self, AppConfig};
use crate::core::workshop::WorkshopLocation;
use crate::core::{
    ClickMachine, DeletePhase, DeletionReport, EmptyFolders, EntrySet, MetadataCache, Selection,
    WallpaperType,
};

/// Which listing the entry set currently holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ViewMode {
    #[default]
    Scan,
    EmptyFolders,
}

/// Holds the complete, mutable state of the application.
///
/// This struct is wrapped in an `Arc<Mutex<...>>` and shared between the IPC
/// handlers and the tasks they spawn. No lock is held across an `.await`.
#[derive(Default)]
pub struct AppState {
    /// The application's configuration settings.
    pub config: AppConfig,
    /// Where the config is persisted; `None` means the platform directory.
    pub config_dir: Option<PathBuf>,
    /// The directory the user chose to work on.
    pub current_path: Option<PathBuf>,
    /// Result of the last workshop detection.
    pub workshop: Option<WorkshopLocation>,

    pub entries: EntrySet,
    pub view_mode: ViewMode,
    pub metadata: MetadataCache,
    /// The scan root the metadata cache was filled for.
    pub metadata_root: Option<PathBuf>,
    pub selection: Selection,
    /// Expanded folder paths. May name paths that no longer exist.
    pub expanded: HashSet<PathBuf>,
    pub type_filter: Option<WallpaperType>,
    /// Present only while the entry set holds a non-empty discovery result.
    pub empty_folders: Option<EmptyFolders>,

    /// Bumped by every scan or discovery; results carrying an older value
    /// are dropped on arrival.
    pub scan_generation: u64,
    pub is_scanning: bool,
    pub is_finding_empty: bool,

    pub delete_phase: DeletePhase,
    pub last_deletion: Option<DeletionReport>,
    /// Resolves the deletion waiting in `AwaitingConfirmation`.
    pub pending_confirmation: Option<oneshot::Sender<bool>>,

    pub click: ClickMachine,
    pub click_task: Option<JoinHandle<()>>,

    pub status_message: String,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let mut state = Self {
            current_path: config.last_directory.clone(),
            ..Default::default()
        };
        state.click.set_delay(config.click_delay());
        state.config = config;
        state.status_message = "Ready.".to_string();
        state
    }

    /// Starts a new scan generation and returns its token.
    pub fn next_generation(&mut self) -> u64 {
        self.scan_generation += 1;
        self.scan_generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.scan_generation == generation
    }

    /// Swaps in a new entry set. Selection and expansion never survive this;
    /// the focus survives only if its entry is still there.
    pub fn replace_entries(&mut self, entries: EntrySet, mode: ViewMode) {
        self.entries = entries;
        self.view_mode = mode;
        self.selection.reset_for(&self.entries);
        self.expanded.clear();
        if mode == ViewMode::Scan {
            self.empty_folders = None;
        }
    }

    /// Empties the metadata cache when `root` is not the root it was filled for.
    pub fn prepare_metadata_for(&mut self, root: &Path) {
        if self.metadata_root.as_deref() != Some(root) {
            if !self.metadata.is_empty() {
                tracing::info!("Scan root changed to {:?}; resetting metadata cache", root);
            }
            self.metadata.reset();
            self.metadata_root = Some(root.to_path_buf());
        }
    }

    pub fn toggle_expanded(&mut self, path: &Path) {
        if !self.expanded.remove(path) {
            self.expanded.insert(path.to_path_buf());
        }
    }

    pub fn cancel_pending_click(&mut self) {
        self.click.reset();
        if let Some(handle) = self.click_task.take() {
            handle.abort();
        }
    }

    /// Copies what needs persisting so the file can be written after the
    /// state lock is released.
    pub fn config_snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            config: self.config.clone(),
            dir: self.config_dir.clone(),
        }
    }
}

/// A detached copy of the configuration and where it is stored.
pub struct ConfigSnapshot {
    config: AppConfig,
    dir: Option<PathBuf>,
}

impl ConfigSnapshot {
    /// Writes the config file. Failures are logged and otherwise ignored.
    pub fn save(&self) {
        if let Err(e) = config::settings::save_config(&self.config, self.dir.as_deref()) {
            tracing::warn!("Failed to save config: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::fixtures::dir;

    #[test]
    fn replacing_entries_clears_selection_and_expansion() {
        let mut state = AppState::new(AppConfig::default());
        state.entries = EntrySet::new(vec![dir("/r/a", 10, 1), dir("/r/b", 5, 1)]);
        state.selection.set_checked(Path::new("/r/a"), true);
        state.selection.focus(Path::new("/r/b"));
        state.expanded.insert(PathBuf::from("/r/a"));

        state.replace_entries(EntrySet::new(vec![dir("/r/b", 5, 1)]), ViewMode::Scan);

        assert!(state.selection.is_empty());
        assert!(state.expanded.is_empty());
        assert_eq!(state.selection.focused(), Some(Path::new("/r/b")));

        state.replace_entries(EntrySet::new(vec![dir("/r/c", 1, 1)]), ViewMode::Scan);
        assert_eq!(state.selection.focused(), None);
    }

    #[test]
    fn metadata_cache_survives_rescans_of_the_same_root() {
        let mut state = AppState::default();
        state.prepare_metadata_for(Path::new("/r"));
        state
            .metadata
            .absorb(vec![(PathBuf::from("/r/a"), crate::core::CacheSlot::Missing)]);

        state.prepare_metadata_for(Path::new("/r"));
        assert_eq!(state.metadata.len(), 1);

        state.prepare_metadata_for(Path::new("/other"));
        assert!(state.metadata.is_empty());
    }

    #[test]
    fn config_snapshot_saves_without_the_state() {
        let temp = tempfile::tempdir().unwrap();
        let mut state = AppState::new(AppConfig::default());
        state.config_dir = Some(temp.path().to_path_buf());
        state.config.language = "ko".to_string();

        let snapshot = state.config_snapshot();
        state.config.language = "de".to_string();
        drop(state);
        snapshot.save();

        let saved = config::settings::load_config(Some(temp.path())).unwrap();
        assert_eq!(saved.language, "ko");
    }

    #[test]
    fn generations_increase() {
        let mut state = AppState::default();
        let first = state.next_generation();
        let second = state.next_generation();
        assert!(!state.is_current(first));
        assert!(state.is_current(second));
    }
}
