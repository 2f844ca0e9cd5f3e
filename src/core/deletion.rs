//! Types and rules of the batch-deletion pipeline.
//!
//! The driver that walks a request through these phases lives in
//! `app::deletion`; this module only knows how to describe a request, how to
//! summarize it for confirmation and how to classify what came back.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::entry::display_name;
use super::EntrySet;
use crate::utils::format::format_size;

/// Where a deletion request currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletePhase {
    #[default]
    Idle,
    SizeCalculating,
    AwaitingConfirmation,
    Deleting,
    Succeeded,
    PartiallyFailed,
    Failed,
}

impl DeletePhase {
    /// `true` while a request occupies the pipeline.
    pub fn is_busy(&self) -> bool {
        !matches!(self, DeletePhase::Idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletionKind {
    Selected,
    Single,
    AllEmpty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRequest {
    pub kind: DeletionKind,
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedItem {
    pub path: PathBuf,
    pub error: String,
}

/// What the collaborator reports for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub success_count: usize,
    pub failed_items: Vec<FailedItem>,
}

impl DeleteOutcome {
    pub fn attempted(&self) -> usize {
        self.success_count + self.failed_items.len()
    }

    /// Every path failed for the same reason.
    pub fn all_failed(paths: &[PathBuf], error: &str) -> Self {
        Self {
            success_count: 0,
            failed_items: paths
                .iter()
                .map(|p| FailedItem {
                    path: p.clone(),
                    error: error.to_string(),
                })
                .collect(),
        }
    }

    /// The terminal phase this outcome maps to.
    pub fn classify(&self) -> DeletePhase {
        match (self.success_count, self.failed_items.len()) {
            (_, 0) => DeletePhase::Succeeded,
            (0, _) => DeletePhase::Failed,
            _ => DeletePhase::PartiallyFailed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryItem {
    pub path: PathBuf,
    pub name: String,
    /// Known size from the current scan, if the path is part of it.
    pub size: Option<u64>,
}

/// Everything the user sees before confirming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationSummary {
    pub kind: DeletionKind,
    pub count: usize,
    pub items: Vec<SummaryItem>,
    pub total_size: u64,
    pub total_size_label: String,
}

impl ConfirmationSummary {
    pub fn new(request: &DeletionRequest, entries: &EntrySet, total_size: u64) -> Self {
        let items = request
            .paths
            .iter()
            .map(|path| match entries.get(path) {
                Some(entry) => SummaryItem {
                    path: path.clone(),
                    name: entry.name.clone(),
                    size: Some(entry.size),
                },
                None => SummaryItem {
                    path: path.clone(),
                    name: display_name(path),
                    size: None,
                },
            })
            .collect();

        Self {
            kind: request.kind,
            count: request.paths.len(),
            items,
            total_size,
            total_size_label: format_size(total_size),
        }
    }

    /// Plain-text form for hosts without a dialog.
    pub fn to_prompt(&self) -> String {
        let mut text = format!("Delete the following {} item(s)?\n\n", self.count);
        for item in &self.items {
            match item.size {
                Some(size) => text.push_str(&format!("  • {} ({})\n", item.name, format_size(size))),
                None => text.push_str(&format!("  • {}\n", item.path.display())),
            }
        }
        text.push_str(&format!(
            "\nTotal size: {}\n\nThis cannot be undone.",
            self.total_size_label
        ));
        text
    }
}

/// The user-facing account of a finished (or aborted) request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionReport {
    pub kind: DeletionKind,
    pub phase: DeletePhase,
    pub submitted: usize,
    pub success_count: usize,
    pub failed_items: Vec<FailedItem>,
    /// Set when the request was aborted before anything was deleted.
    pub error: Option<String>,
    pub message: String,
}

impl DeletionReport {
    pub fn from_outcome(kind: DeletionKind, submitted: usize, outcome: DeleteOutcome) -> Self {
        let phase = outcome.classify();
        let message = match phase {
            _ if submitted == 0 => "Nothing to delete.".to_string(),
            DeletePhase::Succeeded => format!("Deleted {} item(s).", outcome.success_count),
            DeletePhase::PartiallyFailed => format!(
                "Deletion partially completed: {} succeeded, {} failed.",
                outcome.success_count,
                outcome.failed_items.len()
            ),
            _ => format!(
                "Nothing was deleted: all {} item(s) failed.",
                outcome.failed_items.len()
            ),
        };
        Self {
            kind,
            phase,
            submitted,
            success_count: outcome.success_count,
            failed_items: outcome.failed_items,
            error: None,
            message,
        }
    }

    /// A request that never reached the deleting phase.
    pub fn aborted(kind: DeletionKind, submitted: usize, error: String) -> Self {
        Self {
            kind,
            phase: DeletePhase::Failed,
            submitted,
            success_count: 0,
            failed_items: Vec::new(),
            message: format!("Nothing was deleted: {error}"),
            error: Some(error),
        }
    }

    /// Whether the filesystem may have changed and a rescan is due.
    pub fn changed_filesystem(&self) -> bool {
        matches!(
            self.phase,
            DeletePhase::Succeeded | DeletePhase::PartiallyFailed
        ) && self.success_count > 0
    }

    pub fn failed_paths(&self) -> impl Iterator<Item = &Path> {
        self.failed_items.iter().map(|f| f.path.as_path())
    }
}
