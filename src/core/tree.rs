//! Turns a flat entry list into ordered, indentation-tagged rows.
//!
//! The parent/child index is rebuilt on every render from `parent_path`, so
//! nothing holds references across scans. Only expanded branches are walked;
//! collapsed subtrees cost one index lookup.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::Entry;

/// One visible line of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRow<'a> {
    pub entry: &'a Entry,
    /// Indentation only; 0 for roots.
    pub depth: usize,
    pub has_children: bool,
    pub is_expanded: bool,
    pub is_focused: bool,
}

/// A per-render view over the entries that survived filtering.
pub struct TreeEngine<'a> {
    roots: Vec<&'a Entry>,
    children: HashMap<&'a Path, Vec<&'a Entry>>,
}

impl<'a> TreeEngine<'a> {
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a Entry>,
    {
        let mut roots = Vec::new();
        let mut children: HashMap<&'a Path, Vec<&'a Entry>> = HashMap::new();

        for entry in entries {
            if entry.level == 1 {
                roots.push(entry);
            }
            if let Some(parent) = entry.parent_path.as_deref() {
                children.entry(parent).or_default().push(entry);
            }
        }

        roots.sort_by(|a, b| b.size.cmp(&a.size));
        Self { roots, children }
    }

    pub fn has_children(&self, path: &Path) -> bool {
        self.children.contains_key(path)
    }

    /// Produces the visible rows in display order.
    ///
    /// Entries whose parent is not part of the view are never reached from a
    /// root and are left out.
    pub fn render(&self, expanded: &HashSet<PathBuf>, focused: Option<&Path>) -> Vec<RenderRow<'a>> {
        let mut rows = Vec::new();
        for root in &self.roots {
            self.emit(root, 0, expanded, focused, &mut rows);
        }
        rows
    }

    fn emit(
        &self,
        entry: &'a Entry,
        depth: usize,
        expanded: &HashSet<PathBuf>,
        focused: Option<&Path>,
        rows: &mut Vec<RenderRow<'a>>,
    ) {
        let kids = self.children.get(entry.path.as_path());
        let has_children = kids.is_some();
        let is_expanded = expanded.contains(&entry.path);

        rows.push(RenderRow {
            entry,
            depth,
            has_children,
            is_expanded,
            is_focused: focused == Some(entry.path.as_path()),
        });

        if let (Some(kids), true) = (kids, is_expanded) {
            let mut sorted = kids.clone();
            sorted.sort_by(|a, b| sibling_order(a, b));
            for child in sorted {
                self.emit(child, depth + 1, expanded, focused, rows);
            }
        }
    }
}

/// Directories before files, then larger first.
pub fn sibling_order(a: &Entry, b: &Entry) -> Ordering {
    a.is_file
        .cmp(&b.is_file)
        .then_with(|| b.size.cmp(&a.size))
}
