//! Domain logic: entries, metadata, tree rendering, selection, deletion rules,
//! empty-folder synthesis and click disambiguation, plus the filesystem
//! collaborator behind the [`Backend`] trait.

pub mod backend;
pub mod click;
pub mod deletion;
pub mod empty;
pub mod entry;
pub mod error;
pub mod file_ops;
pub mod metadata;
pub mod project;
pub mod scanner;
pub mod selection;
pub mod tree;
pub mod workshop;

pub use backend::{Backend, FsBackend, ScanRequest};
pub use click::{ClickMachine, ClickOutcome, SingleClickAction};
pub use deletion::{
    ConfirmationSummary, DeleteOutcome, DeletePhase, DeletionKind, DeletionReport,
    DeletionRequest, FailedItem,
};
pub use empty::EmptyFolders;
pub use entry::{Entry, EntrySet};
pub use error::{CoreError, CoreResult};
pub use metadata::{CacheSlot, MetadataCache, MetadataRecord, PreviewKind, WallpaperType};
pub use selection::Selection;
pub use tree::{RenderRow, TreeEngine};
