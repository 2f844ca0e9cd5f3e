//! Checkbox selection and the separate focused (previewed) path.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::EntrySet;

#[derive(Debug, Default, Clone)]
pub struct Selection {
    checked: HashSet<PathBuf>,
    focused: Option<PathBuf>,
}

impl Selection {
    /// Sets membership of `path` to `checked`. Driven by the checkbox state,
    /// so calling it twice with the same value is a no-op.
    pub fn set_checked(&mut self, path: &Path, checked: bool) {
        if checked {
            self.checked.insert(path.to_path_buf());
        } else {
            self.checked.remove(path);
        }
    }

    /// Replaces the selection with every currently rendered path.
    pub fn select_all<I>(&mut self, rendered: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.checked = rendered.into_iter().collect();
    }

    pub fn clear_all(&mut self) {
        self.checked.clear();
    }

    pub fn is_checked(&self, path: &Path) -> bool {
        self.checked.contains(path)
    }

    pub fn checked(&self) -> &HashSet<PathBuf> {
        &self.checked
    }

    pub fn len(&self) -> usize {
        self.checked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checked.is_empty()
    }

    /// Selected paths in a stable order for display and deletion requests.
    pub fn sorted_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.checked.iter().cloned().collect();
        paths.sort();
        paths
    }

    /// Sum of `size` over selected paths that still exist in `entries`.
    pub fn aggregate_size(&self, entries: &EntrySet) -> u64 {
        self.checked
            .iter()
            .filter_map(|p| entries.get(p))
            .map(|e| e.size)
            .sum()
    }

    pub fn focused(&self) -> Option<&Path> {
        self.focused.as_deref()
    }

    pub fn focus(&mut self, path: &Path) {
        self.focused = Some(path.to_path_buf());
    }

    pub fn clear_focus(&mut self) {
        self.focused = None;
    }

    /// Drops every checked path; used whenever the entry set is replaced.
    /// The focus survives only if it still points at an existing entry.
    pub fn reset_for(&mut self, entries: &EntrySet) {
        self.checked.clear();
        if let Some(path) = &self.focused {
            if !entries.contains(path) {
                self.focused = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::fixtures::{dir, file};
    use proptest::prelude::*;

    fn sample() -> EntrySet {
        EntrySet::new(vec![
            dir("/r/a", 300, 1),
            file("/r/a/x", 100, 2),
            file("/r/b", 50, 1),
        ])
    }

    #[test]
    fn explicit_target_state() {
        let mut sel = Selection::default();
        let p = Path::new("/r/a");
        sel.set_checked(p, true);
        sel.set_checked(p, true);
        assert_eq!(sel.len(), 1);
        sel.set_checked(p, false);
        sel.set_checked(p, false);
        assert!(sel.is_empty());
    }

    #[test]
    fn aggregate_ignores_vanished_paths() {
        let mut sel = Selection::default();
        sel.set_checked(Path::new("/r/a"), true);
        sel.set_checked(Path::new("/r/b"), true);
        sel.set_checked(Path::new("/r/deleted"), true);
        assert_eq!(sel.aggregate_size(&sample()), 350);
    }

    #[test]
    fn focus_is_independent_of_checks() {
        let mut sel = Selection::default();
        sel.focus(Path::new("/r/a"));
        assert!(sel.is_empty());
        sel.set_checked(Path::new("/r/b"), true);
        sel.clear_all();
        assert_eq!(sel.focused(), Some(Path::new("/r/a")));
    }

    #[test]
    fn reset_clears_checks_and_dangling_focus() {
        let mut sel = Selection::default();
        sel.set_checked(Path::new("/r/a"), true);
        sel.focus(Path::new("/r/gone"));
        sel.reset_for(&sample());
        assert!(sel.is_empty());
        assert_eq!(sel.focused(), None);

        sel.focus(Path::new("/r/a"));
        sel.reset_for(&sample());
        assert_eq!(sel.focused(), Some(Path::new("/r/a")));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Set(usize, bool),
        SelectAll,
        ClearAll,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..5, any::<bool>()).prop_map(|(i, c)| Op::Set(i, c)),
            Just(Op::SelectAll),
            Just(Op::ClearAll),
        ]
    }

    proptest! {
        #[test]
        fn aggregate_matches_intersection(ops in prop::collection::vec(op(), 0..30)) {
            let entries = sample();
            // Index 3 and 4 are paths that are not in the entry set.
            let universe = ["/r/a", "/r/a/x", "/r/b", "/r/stale", "/r/other"];
            let mut sel = Selection::default();
            for op in ops {
                match op {
                    Op::Set(i, c) => sel.set_checked(Path::new(universe[i]), c),
                    Op::SelectAll => sel.select_all(entries.iter().map(|e| e.path.clone())),
                    Op::ClearAll => sel.clear_all(),
                }
            }
            let expected: u64 = entries
                .iter()
                .filter(|e| sel.is_checked(&e.path))
                .map(|e| e.size)
                .sum();
            prop_assert_eq!(sel.aggregate_size(&entries), expected);
        }
    }
}
