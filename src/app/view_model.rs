//! Responsible for transforming the `AppState` into a `UiState` view model.
//!
//! This module acts as a presentation layer: it applies the wallpaper type
//! filter, renders the visible tree rows and computes the statistics shown in
//! the status bar. Nothing here mutates state.

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::state::{AppState, ViewMode};
use crate::config::AppConfig;
use crate::core::{
    Backend, DeletePhase, DeletionReport, Entry, PreviewKind, TreeEngine, WallpaperType,
};
use crate::utils::format_size;

/// A serializable representation of the application state for the UI.
#[derive(Serialize, Clone, Debug)]
pub struct UiState {
    pub config: AppConfig,
    pub current_path: Option<PathBuf>,
    pub workshop_path: Option<PathBuf>,
    pub view_mode: ViewMode,
    pub tree: Vec<TreeRow>,
    pub stats: Stats,
    pub type_filter: Option<WallpaperType>,
    pub focused_path: Option<PathBuf>,
    pub is_scanning: bool,
    pub is_finding_empty: bool,
    pub delete_phase: DeletePhase,
    pub can_delete_selected: bool,
    pub can_delete_all_empty: bool,
    pub empty_folder_count: usize,
    pub last_deletion: Option<DeletionReport>,
    pub status_message: String,
}

/// One visible line of the tree, flattened for the UI.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TreeRow {
    pub path: PathBuf,
    pub name: String,
    /// Metadata title when the folder has one.
    pub title: Option<String>,
    pub type_label: Option<String>,
    pub size: u64,
    pub size_label: String,
    pub depth: usize,
    pub is_file: bool,
    pub is_empty: bool,
    pub has_children: bool,
    pub is_expanded: bool,
    pub is_focused: bool,
    pub is_checked: bool,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_count: usize,
    pub total_size: u64,
    pub total_size_label: String,
    pub selected_count: usize,
    pub selected_size: u64,
    pub selected_size_label: String,
}

/// Everything the preview panel shows for a focused entry.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct PreviewInfo {
    pub path: PathBuf,
    pub name: String,
    pub title: String,
    pub is_file: bool,
    pub size: u64,
    pub size_label: String,
    pub type_label: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub external_id: Option<String>,
    pub preview_path: Option<PathBuf>,
    pub preview_kind: Option<PreviewKind>,
    pub catalog_url: Option<String>,
}

/// Entries that pass the type filter. Files never carry a wallpaper type,
/// so they are hidden whenever a filter is active.
pub fn visible_entries(state: &AppState) -> Vec<&Entry> {
    match state.type_filter {
        None => state.entries.iter().collect(),
        Some(wanted) => state
            .entries
            .iter()
            .filter(|e| {
                e.is_dir()
                    && state
                        .metadata
                        .get(&e.path)
                        .is_some_and(|m| m.wallpaper_type == wanted)
            })
            .collect(),
    }
}

/// Paths of the rows currently on screen, in display order.
pub fn rendered_paths(state: &AppState) -> Vec<PathBuf> {
    let visible = visible_entries(state);
    let engine = TreeEngine::new(visible);
    engine
        .render(&state.expanded, state.selection.focused())
        .into_iter()
        .map(|row| row.entry.path.clone())
        .collect()
}

/// Whether `path` has at least one visible child.
pub fn has_visible_children(state: &AppState, path: &Path) -> bool {
    TreeEngine::new(visible_entries(state)).has_children(path)
}

/// Creates the complete `UiState` from the current `AppState`.
pub fn generate_ui_state(state: &AppState) -> UiState {
    let tree = if state.is_scanning || state.is_finding_empty {
        Vec::new()
    } else {
        build_rows(state)
    };

    let total_size = state.entries.total_size();
    let selected_size = state.selection.aggregate_size(&state.entries);
    let stats = Stats {
        total_count: state.entries.len(),
        total_size,
        total_size_label: format_size(total_size),
        selected_count: state.selection.len(),
        selected_size,
        selected_size_label: format_size(selected_size),
    };

    let idle = !state.delete_phase.is_busy() && !state.is_scanning && !state.is_finding_empty;
    let empty_folder_count = state.empty_folders.as_ref().map_or(0, |e| e.total());

    UiState {
        config: state.config.clone(),
        current_path: state.current_path.clone(),
        workshop_path: state.workshop.as_ref().map(|w| w.workshop_path.clone()),
        view_mode: state.view_mode,
        tree,
        stats,
        type_filter: state.type_filter,
        focused_path: state.selection.focused().map(Path::to_path_buf),
        is_scanning: state.is_scanning,
        is_finding_empty: state.is_finding_empty,
        delete_phase: state.delete_phase,
        can_delete_selected: idle && !state.selection.is_empty(),
        can_delete_all_empty: idle && empty_folder_count > 0,
        empty_folder_count,
        last_deletion: state.last_deletion.clone(),
        status_message: state.status_message.clone(),
    }
}

fn build_rows(state: &AppState) -> Vec<TreeRow> {
    let engine = TreeEngine::new(visible_entries(state));
    engine
        .render(&state.expanded, state.selection.focused())
        .into_iter()
        .map(|row| {
            let entry = row.entry;
            let metadata = state.metadata.get(&entry.path);
            TreeRow {
                path: entry.path.clone(),
                name: entry.name.clone(),
                title: metadata.and_then(|m| m.title.clone()),
                type_label: metadata.map(|m| m.wallpaper_type.label().to_string()),
                size: entry.size,
                size_label: format_size(entry.size),
                depth: row.depth,
                is_file: entry.is_file,
                is_empty: entry.is_empty,
                has_children: row.has_children,
                is_expanded: row.is_expanded,
                is_focused: row.is_focused,
                is_checked: state.selection.is_checked(&entry.path),
            }
        })
        .collect()
}

/// Builds the preview for `path`, or `None` if it is not part of the entry set.
pub fn build_preview(state: &AppState, path: &Path, backend: &dyn Backend) -> Option<PreviewInfo> {
    let entry = state.entries.get(path)?;
    let metadata = state.metadata.get(path);

    let external_id = metadata.and_then(|m| m.external_id.clone());
    let catalog_url = external_id
        .as_deref()
        .and_then(|id| backend.resolve_catalog_url(id).ok());

    Some(PreviewInfo {
        path: entry.path.clone(),
        name: entry.name.clone(),
        title: metadata
            .and_then(|m| m.title.clone())
            .unwrap_or_else(|| "Untitled".to_string()),
        is_file: entry.is_file,
        size: entry.size,
        size_label: format_size(entry.size),
        type_label: metadata.map(|m| m.wallpaper_type.label().to_string()),
        description: metadata.and_then(|m| m.description.clone()),
        tags: metadata.map(|m| m.tags.clone()).unwrap_or_default(),
        preview_path: metadata.and_then(|m| m.preview_path.clone()),
        preview_kind: metadata
            .filter(|m| m.preview_path.is_some())
            .map(|m| m.preview_kind),
        external_id,
        catalog_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::fixtures::{dir, file};
    use crate::core::{CacheSlot, EntrySet, MetadataRecord};

    fn record(kind: WallpaperType, title: &str) -> MetadataRecord {
        MetadataRecord {
            title: Some(title.to_string()),
            description: None,
            tags: vec!["nature".to_string()],
            wallpaper_type: kind,
            preview_path: None,
            preview_kind: PreviewKind::Image,
            external_id: Some("42".to_string()),
        }
    }

    fn sample_state() -> AppState {
        let mut state = AppState::default();
        state.entries = EntrySet::new(vec![
            dir("/w/100", 500, 1),
            dir("/w/100/materials", 400, 2),
            dir("/w/200", 300, 1),
            file("/w/readme.txt", 10, 1),
        ]);
        state.metadata.absorb(vec![
            (
                PathBuf::from("/w/100"),
                CacheSlot::Loaded(record(WallpaperType::Video, "Rain")),
            ),
            (
                PathBuf::from("/w/200"),
                CacheSlot::Loaded(record(WallpaperType::Scene, "Forest")),
            ),
            (PathBuf::from("/w/100/materials"), CacheSlot::Missing),
        ]);
        state
    }

    #[test]
    fn rows_carry_metadata_and_selection() {
        let mut state = sample_state();
        state.selection.set_checked(Path::new("/w/200"), true);
        state.selection.set_checked(Path::new("/w/gone"), true);

        let ui = generate_ui_state(&state);
        let names: Vec<&str> = ui.tree.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["100", "200", "readme.txt"]);
        assert_eq!(ui.tree[0].title.as_deref(), Some("Rain"));
        assert_eq!(ui.tree[0].type_label.as_deref(), Some("Video"));
        assert!(ui.tree[0].has_children);
        assert!(ui.tree[1].is_checked);

        assert_eq!(ui.stats.total_count, 4);
        assert_eq!(ui.stats.selected_count, 2);
        assert_eq!(ui.stats.selected_size, 300);
        assert_eq!(ui.stats.selected_size_label, "300 B");
        assert!(ui.can_delete_selected);
        assert!(!ui.can_delete_all_empty);
    }

    #[test]
    fn type_filter_hides_files_and_orphans() {
        let mut state = sample_state();
        state.expanded.insert(PathBuf::from("/w/100"));
        state.type_filter = Some(WallpaperType::Scene);

        let paths = rendered_paths(&state);
        assert_eq!(paths, vec![PathBuf::from("/w/200")]);

        // The child has no metadata of its own, so it drops out with or
        // without its parent.
        state.type_filter = Some(WallpaperType::Video);
        assert_eq!(rendered_paths(&state), vec![PathBuf::from("/w/100")]);
        assert!(!has_visible_children(&state, Path::new("/w/100")));
    }

    #[test]
    fn tree_is_hidden_while_scanning() {
        let mut state = sample_state();
        state.is_scanning = true;
        let ui = generate_ui_state(&state);
        assert!(ui.tree.is_empty());
        assert!(!ui.can_delete_selected);
    }

    #[test]
    fn preview_uses_cached_metadata() {
        let state = sample_state();
        let backend = crate::core::FsBackend;

        let preview = build_preview(&state, Path::new("/w/100"), &backend).unwrap();
        assert_eq!(preview.title, "Rain");
        assert_eq!(preview.size_label, "500 B");
        assert_eq!(preview.preview_kind, None);
        assert_eq!(
            preview.catalog_url.as_deref(),
            Some("https://steamcommunity.com/sharedfiles/filedetails/?id=42")
        );

        let bare = build_preview(&state, Path::new("/w/100/materials"), &backend).unwrap();
        assert_eq!(bare.title, "Untitled");
        assert_eq!(bare.type_label, None);

        assert!(build_preview(&state, Path::new("/w/missing"), &backend).is_none());
    }
}
