//! Long-running background work: full scans and empty-folder discovery.
//!
//! Both tasks take a generation token when they start and drop their result
//! if a newer scan or discovery has begun in the meantime.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::events::UserEvent;
use super::helpers::{lock_state, notify};
use super::proxy::EventProxy;
use super::state::{AppState, ViewMode};
use crate::core::metadata::fetch_metadata;
use crate::core::{Backend, EmptyFolders, EntrySet, ScanRequest};

/// Starts a scan of the current path in the background.
pub fn start_scan<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>, backend: Arc<dyn Backend>) {
    let root = lock_state(&state).current_path.clone();
    match root {
        Some(root) => {
            tokio::spawn(async move {
                run_scan(root, proxy, state, backend).await;
            });
        }
        None => proxy.send_event(UserEvent::ShowError(
            "Choose a folder before scanning.".to_string(),
        )),
    }
}

/// Scans `root`, warms the metadata cache for every folder found and only
/// then publishes the new entry set. Returns `true` if the result was applied.
pub async fn run_scan<P: EventProxy>(
    root: PathBuf,
    proxy: P,
    state: Arc<Mutex<AppState>>,
    backend: Arc<dyn Backend>,
) -> bool {
    let (generation, request) = {
        let mut s = lock_state(&state);
        let generation = s.next_generation();
        s.is_scanning = true;
        s.is_finding_empty = false;
        s.status_message = format!("Scanning {}...", root.display());
        let request = ScanRequest {
            root: root.clone(),
            max_depth: s.config.max_depth,
            include_files: s.config.include_files,
            min_size: s.config.min_size_bytes,
        };
        notify(&s, &proxy);
        (generation, request)
    };
    tracing::info!("Scan #{} started for {:?}", generation, root);

    let entries = match backend.scan(&request).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!("Scan #{} failed: {}", generation, e);
            let mut s = lock_state(&state);
            if !s.is_current(generation) {
                return false;
            }
            s.is_scanning = false;
            s.status_message = format!("Scan failed: {e}");
            notify(&s, &proxy);
            proxy.send_event(UserEvent::ShowError(e.to_string()));
            return false;
        }
    };

    let entries = EntrySet::new(entries);
    let folders = entries.folder_paths();

    let (missing, concurrency) = {
        let mut s = lock_state(&state);
        if !s.is_current(generation) {
            tracing::info!("Scan #{} superseded before metadata warm-up", generation);
            return false;
        }
        s.prepare_metadata_for(&root);
        (s.metadata.missing(&folders), s.config.metadata_concurrency)
    };

    // The barrier: nothing is published until every lookup has settled.
    let fetched = fetch_metadata(backend, missing, concurrency).await;

    let mut s = lock_state(&state);
    if !s.is_current(generation) {
        tracing::info!("Scan #{} superseded; discarding {} entries", generation, entries.len());
        return false;
    }
    s.metadata.absorb(fetched);
    let count = entries.len();
    s.replace_entries(entries, ViewMode::Scan);
    s.is_scanning = false;
    s.status_message = format!("Scan complete. Found {count} items.");
    tracing::info!("Scan #{} applied with {} entries", generation, count);
    notify(&s, &proxy);
    true
}

pub fn start_find_empty<P: EventProxy>(
    proxy: P,
    state: Arc<Mutex<AppState>>,
    backend: Arc<dyn Backend>,
) {
    let root = lock_state(&state).current_path.clone();
    match root {
        Some(root) => {
            tokio::spawn(async move {
                run_find_empty(root, proxy, state, backend).await;
            });
        }
        None => proxy.send_event(UserEvent::ShowError(
            "Choose a folder before searching for empty folders.".to_string(),
        )),
    }
}

/// Discovers empty folders below `root`. A non-empty result replaces the
/// entry set with synthesized records; an empty one leaves it untouched.
pub async fn run_find_empty<P: EventProxy>(
    root: PathBuf,
    proxy: P,
    state: Arc<Mutex<AppState>>,
    backend: Arc<dyn Backend>,
) -> bool {
    let (generation, max_depth) = {
        let mut s = lock_state(&state);
        let generation = s.next_generation();
        s.is_finding_empty = true;
        s.is_scanning = false;
        s.status_message = "Searching for empty folders...".to_string();
        notify(&s, &proxy);
        (generation, s.config.max_depth)
    };

    let result = backend.find_empty(&root, max_depth).await;

    let mut s = lock_state(&state);
    if !s.is_current(generation) {
        tracing::info!("Empty-folder search #{} superseded", generation);
        return false;
    }
    s.is_finding_empty = false;

    match result {
        Ok(paths) if paths.is_empty() => {
            s.empty_folders = None;
            s.status_message = "No empty folders found.".to_string();
            notify(&s, &proxy);
            proxy.send_event(UserEvent::ShowInfo("No empty folders found.".to_string()));
        }
        Ok(paths) => {
            let found = EmptyFolders::from_discovery(&root, paths);
            tracing::info!(
                "Found {} empty folders ({} top level)",
                found.total(),
                found.top_level_count()
            );
            s.status_message = format!("Found {} empty folders.", found.total());
            s.replace_entries(EntrySet::new(found.entries.clone()), ViewMode::EmptyFolders);
            s.empty_folders = Some(found);
            notify(&s, &proxy);
        }
        Err(e) => {
            tracing::error!("Empty-folder search failed: {}", e);
            s.status_message = format!("Search failed: {e}");
            notify(&s, &proxy);
            proxy.send_event(UserEvent::ShowError(e.to_string()));
        }
    }
    true
}
