//! Filesystem walks: the full inventory scan and empty-folder discovery.

use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::backend::ScanRequest;
use super::entry::display_name;
use super::error::{CoreError, CoreResult};
use super::Entry;

/// `0` and `usize::MAX` both mean "no limit".
fn effective_depth(max_depth: usize) -> usize {
    if max_depth == 0 {
        usize::MAX
    } else {
        max_depth
    }
}

/// Fails unless `root` is a readable directory.
fn check_root(root: &Path) -> CoreResult<()> {
    let metadata = fs::metadata(root).map_err(|e| CoreError::scan(root, e))?;
    if !metadata.is_dir() {
        return Err(CoreError::scan(root, "not a directory"));
    }
    fs::read_dir(root).map_err(|e| CoreError::scan(root, e))?;
    Ok(())
}

/// Walks `request.root` and returns one entry per directory (and per file
/// when requested), sorted by size, largest first.
///
/// Directory sizes are recursive and computed in parallel once the walk has
/// collected every candidate.
pub fn scan_entries(request: &ScanRequest) -> CoreResult<Vec<Entry>> {
    let root = request.root.as_path();
    check_root(root)?;

    let mut candidates: Vec<(PathBuf, usize, bool)> = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(effective_depth(request.max_depth))
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_type = entry.file_type();
        if file_type.is_dir() {
            candidates.push((entry.path().to_path_buf(), entry.depth(), false));
        } else if request.include_files && file_type.is_file() {
            candidates.push((entry.path().to_path_buf(), entry.depth(), true));
        }
    }

    tracing::info!(
        "Collected {} candidates under {:?}, sizing...",
        candidates.len(),
        root
    );

    let mut entries: Vec<Entry> = candidates
        .into_par_iter()
        .filter_map(|(path, level, is_file)| {
            let size = if is_file {
                fs::symlink_metadata(&path).map(|m| m.len()).unwrap_or(0)
            } else {
                folder_size(&path)
            };
            if size < request.min_size {
                return None;
            }
            Some(Entry {
                name: display_name(&path),
                parent_path: path.parent().map(Path::to_path_buf),
                path,
                size,
                is_file,
                level,
                is_empty: false,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.size.cmp(&a.size));
    tracing::info!("Scan of {:?} produced {} entries", root, entries.len());
    Ok(entries)
}

/// Recursive byte count of all regular files below `path`. Unreadable
/// entries are skipped.
pub fn folder_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Finds directories below `root` that contain no files at any depth.
///
/// A directory holding only empty directories is itself empty, so nested
/// results are reported alongside their ancestors. Emptiness is always judged
/// on the full subtree; `max_depth` only limits which directories are
/// reported.
pub fn find_empty_folders(root: &Path, max_depth: usize) -> CoreResult<Vec<PathBuf>> {
    check_root(root)?;
    let report_depth = effective_depth(max_depth);

    let mut dirs: Vec<(PathBuf, usize)> = Vec::new();
    let mut occupied: HashSet<PathBuf> = HashSet::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // An unreadable directory may hide files; never call its
                // ancestors empty.
                tracing::warn!("Skipping unreadable entry during empty scan: {}", e);
                if let Some(path) = e.path() {
                    mark_ancestors(path, root, &mut occupied);
                    occupied.insert(path.to_path_buf());
                }
                continue;
            }
        };

        if entry.file_type().is_dir() {
            if entry.depth() <= report_depth {
                dirs.push((entry.path().to_path_buf(), entry.depth()));
            }
        } else {
            mark_ancestors(entry.path(), root, &mut occupied);
        }
    }

    let mut empty: Vec<PathBuf> = dirs
        .into_iter()
        .filter(|(path, _)| !occupied.contains(path))
        .map(|(path, _)| path)
        .collect();
    empty.sort();

    tracing::info!("Found {} empty folders under {:?}", empty.len(), root);
    Ok(empty)
}

fn mark_ancestors(path: &Path, root: &Path, occupied: &mut HashSet<PathBuf>) {
    let mut current = path.parent();
    while let Some(parent) = current {
        if parent == root || !parent.starts_with(root) {
            break;
        }
        if !occupied.insert(parent.to_path_buf()) {
            // Everything above was marked by an earlier sibling.
            break;
        }
        current = parent.parent();
    }
}
