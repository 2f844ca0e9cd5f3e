//! Turns the flat result of empty-folder discovery into entry records.
//!
//! Discovery only returns paths, so level and parent are derived here from
//! path components relative to the scan root rather than taken from a walk.

use std::path::{Path, PathBuf};

use super::entry::display_name;
use super::Entry;

/// The outcome of one discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmptyFolders {
    /// Every discovered path, in discovery order. This is the delete set.
    pub paths: Vec<PathBuf>,
    /// Synthesized records for display.
    pub entries: Vec<Entry>,
}

impl EmptyFolders {
    pub fn from_discovery(root: &Path, paths: Vec<PathBuf>) -> Self {
        let entries = paths.iter().map(|p| synthesize(root, p)).collect();
        Self { paths, entries }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn total(&self) -> usize {
        self.paths.len()
    }

    /// How many of them show up as tree roots.
    pub fn top_level_count(&self) -> usize {
        self.entries.iter().filter(|e| e.level == 1).count()
    }
}

/// Builds the record for one discovered empty directory.
pub fn synthesize(root: &Path, path: &Path) -> Entry {
    let level = path
        .components()
        .count()
        .saturating_sub(root.components().count());

    Entry {
        path: path.to_path_buf(),
        name: display_name(path),
        size: 0,
        is_file: false,
        level,
        parent_path: path.parent().map(Path::to_path_buf),
        is_empty: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::TreeEngine;
    use std::collections::HashSet;

    #[test]
    fn levels_follow_path_components() {
        let root = Path::new("/r");
        let found = EmptyFolders::from_discovery(
            root,
            vec![
                PathBuf::from("/r/a"),
                PathBuf::from("/r/a/b"),
                PathBuf::from("/r/c"),
            ],
        );

        let levels: Vec<(String, usize)> = found
            .entries
            .iter()
            .map(|e| (e.name.clone(), e.level))
            .collect();
        assert_eq!(
            levels,
            vec![("a".into(), 1), ("b".into(), 2), ("c".into(), 1)]
        );
        assert!(found.entries.iter().all(|e| e.is_empty && !e.is_file && e.size == 0));
        assert_eq!(found.entries[1].parent_path, Some(PathBuf::from("/r/a")));

        // Display roots are the level-1 subset, the delete set is everything.
        let engine = TreeEngine::new(&found.entries);
        let roots: Vec<&str> = engine
            .render(&HashSet::new(), None)
            .iter()
            .map(|r| r.entry.name.as_str())
            .collect();
        assert_eq!(roots.len(), 2);
        assert!(roots.contains(&"a") && roots.contains(&"c"));
        assert_eq!(found.top_level_count(), 2);
        assert_eq!(found.paths.len(), 3);
    }

    #[test]
    fn trailing_separator_on_root_does_not_shift_levels() {
        let entry = synthesize(Path::new("/r/"), Path::new("/r/a"));
        assert_eq!(entry.level, 1);
    }

    #[test]
    fn nothing_found() {
        let found = EmptyFolders::from_discovery(Path::new("/r"), Vec::new());
        assert!(found.is_empty());
        assert_eq!(found.top_level_count(), 0);
    }
}
