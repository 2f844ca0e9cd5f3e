//! The scanned entry record and the set that owns one scan's worth of them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One filesystem object discovered by a scan.
///
/// The parent/child relation is derived from `parent_path`; an entry never
/// stores its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub path: PathBuf,
    pub name: String,
    /// Bytes. For directories this is the recursive size computed by the scanner.
    pub size: u64,
    pub is_file: bool,
    /// Depth relative to the scan root; direct children of the root are level 1.
    pub level: usize,
    pub parent_path: Option<PathBuf>,
    /// Only set for records synthesized by the empty-folder flow.
    #[serde(default)]
    pub is_empty: bool,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        !self.is_file
    }

    pub fn is_child_of(&self, parent: &Path) -> bool {
        self.parent_path.as_deref() == Some(parent)
    }
}

/// Returns the last component of `path` as a display name.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Exactly one scan result, replaced as a whole and never patched.
#[derive(Debug, Default, Clone)]
pub struct EntrySet {
    entries: Vec<Entry>,
    index: HashMap<PathBuf, usize>,
}

impl EntrySet {
    /// Builds a set from a flat list. When a path occurs twice the first
    /// occurrence wins so that `path` stays unique.
    pub fn new(entries: Vec<Entry>) -> Self {
        let mut unique = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());
        for entry in entries {
            if index.contains_key(&entry.path) {
                tracing::warn!("Duplicate entry in scan result ignored: {:?}", entry.path);
                continue;
            }
            index.insert(entry.path.clone(), unique.len());
            unique.push(entry);
        }
        Self {
            entries: unique,
            index,
        }
    }

    pub fn get(&self, path: &Path) -> Option<&Entry> {
        self.index.get(path).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.index.contains_key(path)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }

    /// Paths of every directory entry, used to warm the metadata cache.
    pub fn folder_paths(&self) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter(|e| e.is_dir())
            .map(|e| e.path.clone())
            .collect()
    }
}
