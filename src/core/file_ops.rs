//! Destructive and size-related operations on user paths.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::deletion::{DeleteOutcome, FailedItem};
use super::error::{CoreError, CoreResult};
use super::scanner::folder_size;

/// Deletes every path independently, deepest first so that children listed
/// next to their parents are removed before the parent goes.
///
/// Nothing here aborts the batch: each failure is recorded with its reason.
pub fn delete_paths(paths: &[PathBuf]) -> DeleteOutcome {
    let mut ordered: Vec<&PathBuf> = paths.iter().collect();
    ordered.sort_by_key(|p| std::cmp::Reverse(p.components().count()));

    let mut outcome = DeleteOutcome::default();
    for path in ordered {
        match delete_one(path) {
            Ok(()) => {
                tracing::info!("Deleted {:?}", path);
                outcome.success_count += 1;
            }
            Err(e) => {
                tracing::warn!("{}", e);
                let error = match e {
                    CoreError::DeleteItem { reason, .. } => reason,
                    other => other.to_string(),
                };
                outcome.failed_items.push(FailedItem {
                    path: path.clone(),
                    error,
                });
            }
        }
    }
    outcome
}

fn delete_item_error(path: &Path, reason: String) -> CoreError {
    CoreError::DeleteItem {
        path: path.to_path_buf(),
        reason,
    }
}

fn delete_one(path: &Path) -> CoreResult<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(delete_item_error(path, "Path does not exist".to_string()));
        }
        Err(e) => return Err(delete_item_error(path, format!("Cannot read path: {e}"))),
    };

    let result = if metadata.is_dir() {
        clear_readonly_tree(path);
        fs::remove_dir_all(path)
    } else {
        clear_readonly(path);
        fs::remove_file(path)
    };
    result.map_err(|e| delete_item_error(path, format!("Delete failed: {e}")))
}

#[cfg(windows)]
fn clear_readonly(path: &Path) {
    if let Ok(metadata) = fs::metadata(path) {
        let mut permissions = metadata.permissions();
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        let _ = fs::set_permissions(path, permissions);
    }
}

#[cfg(not(windows))]
fn clear_readonly(_path: &Path) {}

#[cfg(windows)]
fn clear_readonly_tree(path: &Path) {
    for entry in WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        clear_readonly(entry.path());
    }
}

#[cfg(not(windows))]
fn clear_readonly_tree(_path: &Path) {}

/// Sum of the on-disk size of `paths`. Any path that cannot be read fails the
/// whole calculation.
pub fn total_size(paths: &[PathBuf]) -> CoreResult<u64> {
    let mut total = 0u64;
    for path in paths {
        let metadata = fs::symlink_metadata(path).map_err(|e| CoreError::size_calc(path, e))?;
        total += if metadata.is_dir() {
            fs::read_dir(path).map_err(|e| CoreError::size_calc(path, e))?;
            folder_size(path)
        } else {
            metadata.len()
        };
    }
    Ok(total)
}

/// Copies `source` (a file or a whole folder) into `destination_dir` under its
/// own name and returns the path of the copy. An existing copy is never
/// overwritten.
pub fn copy_item(source: &Path, destination_dir: &Path) -> CoreResult<PathBuf> {
    let name = source
        .file_name()
        .ok_or_else(|| CoreError::backup(source, "Path has no file name"))?;
    let metadata = fs::symlink_metadata(source)
        .map_err(|e| CoreError::backup(source, format!("Cannot read path: {e}")))?;
    if metadata.is_dir() && destination_dir.starts_with(source) {
        return Err(CoreError::backup(
            source,
            "Backup folder lies inside the item being backed up",
        ));
    }

    fs::create_dir_all(destination_dir)
        .map_err(|e| CoreError::backup(source, format!("Cannot create backup folder: {e}")))?;
    let target = destination_dir.join(name);
    if fs::symlink_metadata(&target).is_ok() {
        return Err(CoreError::backup(
            source,
            format!("{} already exists", target.display()),
        ));
    }

    if metadata.is_dir() {
        copy_tree(source, &target)?;
    } else {
        fs::copy(source, &target).map_err(|e| CoreError::backup(source, e))?;
    }
    Ok(target)
}

/// Recreates the tree below `source` at `target`. Symlinks are skipped.
fn copy_tree(source: &Path, target: &Path) -> CoreResult<()> {
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(|e| CoreError::backup(source, e))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| CoreError::backup(source, e))?;
        let dest = target.join(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&dest).map_err(|e| CoreError::backup(entry.path(), e))?;
        } else if file_type.is_file() {
            fs::copy(entry.path(), &dest).map_err(|e| CoreError::backup(entry.path(), e))?;
        } else {
            tracing::debug!("Not copying special file {:?}", entry.path());
        }
    }
    Ok(())
}

/// Hands `target` (a path or URL) to the platform's default handler.
pub fn open_externally(target: &str) -> CoreResult<()> {
    open::that(target).map_err(|e| CoreError::ExternalOpen {
        target: target.to_string(),
        reason: e.to_string(),
    })
}
