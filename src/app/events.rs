//! Defines the event and message structures for communication between the backend and frontend.

use serde::{Deserialize, Serialize};

use super::view_model::{PreviewInfo, UiState};
use crate::core::{ConfirmationSummary, DeletionReport};

/// Events sent from the application to the host.
///
/// Serialized as `{"event": "<variant>", "data": ...}`, one per line on the
/// headless host's stdout.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum UserEvent {
    /// A complete state update to re-render the UI.
    StateUpdate(Box<UiState>),
    /// A deletion is waiting for `confirmDeletion`.
    ConfirmDeletion(ConfirmationSummary),
    /// The result of a deletion request, including aborted ones.
    DeletionReport(DeletionReport),
    /// Details for the preview panel after a row was focused.
    ShowPreview(Box<PreviewInfo>),
    /// An error message to be displayed to the user.
    ShowError(String),
    /// A neutral notice, e.g. "no empty folders found".
    ShowInfo(String),
}

/// A message received from the host via the IPC channel.
#[derive(Deserialize, Debug)]
pub struct IpcMessage {
    /// The name of the command to execute.
    pub command: String,
    /// The payload associated with the command, as a JSON value.
    #[serde(default)]
    pub payload: serde_json::Value,
}
