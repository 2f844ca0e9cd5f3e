//! The application layer: shared state, IPC dispatch and the tasks behind it.

pub mod commands;
pub mod confirm;
pub mod deletion;
pub mod events;
pub mod helpers;
pub mod interaction;
pub mod proxy;
pub mod state;
pub mod tasks;
pub mod view_model;

use std::sync::{Arc, Mutex};

use commands::{CheckedPayload, ConfirmPayload, PathPayload, TypeFilterPayload};
use confirm::ConfirmationService;
use events::{IpcMessage, UserEvent};
use proxy::EventProxy;
use state::AppState;

use crate::core::Backend;

/// Parses one IPC message and runs the matching command.
///
/// Long-running commands are spawned onto the tokio runtime, so this must be
/// called from within one.
pub fn handle_ipc_message<P: EventProxy>(
    message: String,
    backend: Arc<dyn Backend>,
    confirmer: Arc<dyn ConfirmationService>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    let msg: IpcMessage = match serde_json::from_str(&message) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!("Failed to parse IPC message: {} ({})", e, message);
            proxy.send_event(UserEvent::ShowError(format!("Malformed message: {e}")));
            return;
        }
    };

    tracing::debug!("IPC command received: {}", msg.command);
    let command = msg.command.as_str();
    let payload = msg.payload;

    match command {
        "initialize" => {
            tokio::spawn(commands::initialize(proxy, state, backend));
        }
        "detectWorkshop" => {
            tokio::spawn(commands::detect_workshop(proxy, state, backend));
        }
        "setPath" => {
            if let Some(p) = commands::parse_payload::<PathPayload, _>(command, payload, &proxy) {
                commands::set_path(p.path, proxy, state);
            }
        }
        "scan" | "rescan" => commands::scan(proxy, state, backend),
        "findEmpty" => commands::find_empty(proxy, state, backend),
        "setChecked" => {
            if let Some(p) = commands::parse_payload::<CheckedPayload, _>(command, payload, &proxy)
            {
                commands::set_checked(p, proxy, state);
            }
        }
        "selectAll" => commands::select_all(proxy, state),
        "deselectAll" => commands::deselect_all(proxy, state),
        "clearFocus" => commands::clear_focus(proxy, state),
        "clickRow" => {
            if let Some(p) = commands::parse_payload::<PathPayload, _>(command, payload, &proxy) {
                commands::click_row(p.path, proxy, state, backend);
            }
        }
        "doubleClickRow" => {
            if let Some(p) = commands::parse_payload::<PathPayload, _>(command, payload, &proxy) {
                commands::double_click_row(p.path, proxy, state, backend);
            }
        }
        "toggleExpand" => {
            if let Some(p) = commands::parse_payload::<PathPayload, _>(command, payload, &proxy) {
                commands::toggle_expand(p.path, proxy, state);
            }
        }
        "setTypeFilter" => {
            let payload = if payload.is_null() {
                serde_json::json!({})
            } else {
                payload
            };
            if let Some(p) =
                commands::parse_payload::<TypeFilterPayload, _>(command, payload, &proxy)
            {
                commands::set_type_filter(p, proxy, state);
            }
        }
        "deleteSelected" => commands::delete_selected(backend, confirmer, proxy, state),
        "deleteItem" => {
            if let Some(p) = commands::parse_payload::<PathPayload, _>(command, payload, &proxy) {
                commands::delete_item(p.path, backend, confirmer, proxy, state);
            }
        }
        "deleteAllEmpty" => commands::delete_all_empty(backend, confirmer, proxy, state),
        "confirmDeletion" => {
            if let Some(p) = commands::parse_payload::<ConfirmPayload, _>(command, payload, &proxy)
            {
                commands::confirm_deletion(p, state);
            }
        }
        "setBackupDirectory" => {
            if let Some(p) = commands::parse_payload::<PathPayload, _>(command, payload, &proxy) {
                commands::set_backup_directory(p.path, proxy, state);
            }
        }
        "backupItem" => {
            if let Some(p) = commands::parse_payload::<PathPayload, _>(command, payload, &proxy) {
                commands::backup_item(p.path, proxy, state, backend);
            }
        }
        "openFolder" => {
            if let Some(p) = commands::parse_payload::<PathPayload, _>(command, payload, &proxy) {
                commands::open_folder(p.path, proxy, backend);
            }
        }
        "openCatalogPage" => {
            if let Some(p) = commands::parse_payload::<PathPayload, _>(command, payload, &proxy) {
                commands::open_catalog_page(p.path, proxy, state, backend);
            }
        }
        "updateConfig" => commands::update_config(payload, proxy, state),
        _ => tracing::warn!("Unknown IPC command: {}", command),
    }
}

/// Encodes an event as one line of JSON for the headless host.
pub fn encode_event(event: &UserEvent) -> serde_json::Result<String> {
    serde_json::to_string(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FsBackend;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn setup() -> (
        Arc<Mutex<AppState>>,
        mpsc::UnboundedSender<UserEvent>,
        mpsc::UnboundedReceiver<UserEvent>,
        Arc<dyn Backend>,
        Arc<dyn ConfirmationService>,
    ) {
        let state = Arc::new(Mutex::new(AppState::default()));
        let (tx, rx) = mpsc::unbounded_channel();
        let confirmer = Arc::new(confirm::PromptConfirmation::new(tx.clone(), state.clone()));
        (state, tx, rx, Arc::new(FsBackend), confirmer)
    }

    #[tokio::test]
    async fn malformed_message_is_reported() {
        let (state, tx, mut rx, backend, confirmer) = setup();
        handle_ipc_message("not json".into(), backend, confirmer, tx, state);
        assert!(matches!(rx.recv().await, Some(UserEvent::ShowError(_))));
    }

    #[tokio::test]
    async fn dispatches_selection_commands() {
        let (state, tx, mut rx, backend, confirmer) = setup();
        let msg = json!({"command": "setChecked", "payload": {"path": "/w/1", "checked": true}});
        handle_ipc_message(msg.to_string(), backend, confirmer, tx, state.clone());

        match rx.recv().await {
            Some(UserEvent::StateUpdate(ui)) => assert_eq!(ui.stats.selected_count, 1),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(state
            .lock()
            .unwrap()
            .selection
            .is_checked(std::path::Path::new("/w/1")));
    }

    #[tokio::test]
    async fn missing_payload_fields_are_reported() {
        let (state, tx, mut rx, backend, confirmer) = setup();
        let msg = json!({"command": "deleteItem"});
        handle_ipc_message(msg.to_string(), backend, confirmer, tx, state);
        match rx.recv().await {
            Some(UserEvent::ShowError(msg)) => assert!(msg.contains("deleteItem")),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn events_encode_with_a_tag() {
        let line = encode_event(&UserEvent::ShowInfo("hello".into())).unwrap();
        assert_eq!(line, r#"{"event":"ShowInfo","data":"hello"}"#);
    }
}
