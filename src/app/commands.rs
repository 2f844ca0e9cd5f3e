// src/app/commands.rs
//! Contains all the command handlers that are callable from the host via IPC.
//!
//! Each function in this module corresponds to a specific `IpcMessage::command`.
//! Handlers mutate the `AppState`, start background work where needed and
//! report back through `UserEvent`s.

use serde::Deserialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::confirm::{self, ConfirmationService};
use super::deletion::run_deletion;
use super::events::UserEvent;
use super::helpers::{lock_state, notify, with_state_and_notify};
use super::interaction;
use super::proxy::EventProxy;
use super::state::AppState;
use super::tasks::{start_find_empty, start_scan};
use super::view_model::rendered_paths;
use crate::config::AppConfig;
use crate::core::{Backend, DeletionKind, DeletionRequest, WallpaperType};

#[derive(Deserialize, Debug)]
pub struct PathPayload {
    pub path: PathBuf,
}

#[derive(Deserialize, Debug)]
pub struct CheckedPayload {
    pub path: PathBuf,
    pub checked: bool,
}

#[derive(Deserialize, Debug, Default)]
pub struct TypeFilterPayload {
    #[serde(default)]
    pub filter: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ConfirmPayload {
    pub accepted: bool,
}

/// Deserializes a command payload, reporting a malformed one to the UI.
pub fn parse_payload<T, P>(command: &str, payload: serde_json::Value, proxy: &P) -> Option<T>
where
    T: for<'de> Deserialize<'de>,
    P: EventProxy,
{
    match serde_json::from_value(payload) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Invalid payload for '{}': {}", command, e);
            proxy.send_event(UserEvent::ShowError(format!(
                "Invalid request '{command}': {e}"
            )));
            None
        }
    }
}

/// Sends the initial state. Without a remembered folder the workshop
/// location is detected and used as the starting path.
pub async fn initialize<P: EventProxy>(
    proxy: P,
    state: Arc<Mutex<AppState>>,
    backend: Arc<dyn Backend>,
) {
    let needs_detection = {
        let s = lock_state(&state);
        notify(&s, &proxy);
        s.current_path.is_none()
    };
    if needs_detection {
        detect_workshop(proxy, state, backend).await;
    }
}

/// Looks for the workshop folder and adopts it as the current path if none
/// is set yet.
pub async fn detect_workshop<P: EventProxy>(
    proxy: P,
    state: Arc<Mutex<AppState>>,
    backend: Arc<dyn Backend>,
) {
    let found = backend.detect_workshop().await;
    let message = match &found {
        Some(location) => format!(
            "Workshop folder found: {}",
            location.workshop_path.display()
        ),
        None => "Workshop folder not found. Please choose it manually.".to_string(),
    };

    with_state_and_notify(&state, &proxy, |s| {
        if let Some(location) = &found {
            if s.current_path.is_none() {
                s.current_path = Some(location.workshop_path.clone());
            }
        }
        s.workshop = found;
    });
    proxy.send_event(UserEvent::ShowInfo(message));
}

/// Chooses the folder to work on. Takes effect with the next scan.
pub fn set_path<P: EventProxy>(path: PathBuf, proxy: P, state: Arc<Mutex<AppState>>) {
    if !path.is_dir() {
        proxy.send_event(UserEvent::ShowError(format!(
            "Not a directory: {}",
            path.display()
        )));
        return;
    }
    let snapshot = {
        let mut s = lock_state(&state);
        s.current_path = Some(path.clone());
        s.config.last_directory = Some(path);
        notify(&s, &proxy);
        s.config_snapshot()
    };
    snapshot.save();
}

/// Chooses where `backup_item` copies to. The folder is created on the first
/// backup if it does not exist yet.
pub fn set_backup_directory<P: EventProxy>(path: PathBuf, proxy: P, state: Arc<Mutex<AppState>>) {
    if path.exists() && !path.is_dir() {
        proxy.send_event(UserEvent::ShowError(format!(
            "Not a directory: {}",
            path.display()
        )));
        return;
    }
    let snapshot = {
        let mut s = lock_state(&state);
        s.status_message = format!("Backup folder set: {}", path.display());
        s.config.backup_directory = Some(path);
        notify(&s, &proxy);
        s.config_snapshot()
    };
    snapshot.save();
}

/// Copies one item into the backup folder. The item itself is left alone.
pub fn backup_item<P: EventProxy>(
    path: PathBuf,
    proxy: P,
    state: Arc<Mutex<AppState>>,
    backend: Arc<dyn Backend>,
) {
    let destination = lock_state(&state).config.backup_directory.clone();
    let Some(destination) = destination else {
        proxy.send_event(UserEvent::ShowError(
            "Choose a backup folder first.".to_string(),
        ));
        return;
    };

    with_state_and_notify(&state, &proxy, |s| {
        s.status_message = format!("Backing up {}...", path.display());
    });
    tokio::spawn(async move {
        let result = backend.backup(&path, &destination).await;
        let message = match &result {
            Ok(copy) => format!("Backup complete: {}", copy.display()),
            Err(e) => format!("Backup failed: {e}"),
        };
        with_state_and_notify(&state, &proxy, |s| s.status_message = message.clone());
        match result {
            Ok(copy) => {
                tracing::info!("Backed up {:?} to {:?}", path, copy);
                proxy.send_event(UserEvent::ShowInfo(message));
            }
            Err(e) => {
                tracing::error!("{}", e);
                proxy.send_event(UserEvent::ShowError(message));
            }
        }
    });
}

/// Starts a full scan of the current path. Also serves as the rescan command.
pub fn scan<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>, backend: Arc<dyn Backend>) {
    start_scan(proxy, state, backend);
}

pub fn find_empty<P: EventProxy>(
    proxy: P,
    state: Arc<Mutex<AppState>>,
    backend: Arc<dyn Backend>,
) {
    start_find_empty(proxy, state, backend);
}

pub fn set_checked<P: EventProxy>(payload: CheckedPayload, proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        s.selection.set_checked(&payload.path, payload.checked);
    });
}

/// Checks every row that is currently rendered.
pub fn select_all<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        let paths = rendered_paths(s);
        s.selection.select_all(paths);
    });
}

pub fn deselect_all<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| s.selection.clear_all());
}

pub fn clear_focus<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| s.selection.clear_focus());
}

pub fn set_type_filter<P: EventProxy>(
    payload: TypeFilterPayload,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    let filter = payload
        .filter
        .filter(|f| !f.is_empty() && f != "all")
        .map(|f| WallpaperType::parse(&f));
    with_state_and_notify(&state, &proxy, |s| s.type_filter = filter);
}

pub fn delete_selected<P: EventProxy>(
    backend: Arc<dyn Backend>,
    confirmer: Arc<dyn ConfirmationService>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    let paths = lock_state(&state).selection.sorted_paths();
    spawn_deletion(
        DeletionRequest {
            kind: DeletionKind::Selected,
            paths,
        },
        backend,
        confirmer,
        proxy,
        state,
    );
}

pub fn delete_item<P: EventProxy>(
    path: PathBuf,
    backend: Arc<dyn Backend>,
    confirmer: Arc<dyn ConfirmationService>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    spawn_deletion(
        DeletionRequest {
            kind: DeletionKind::Single,
            paths: vec![path],
        },
        backend,
        confirmer,
        proxy,
        state,
    );
}

/// Deletes every discovered empty folder, nested ones included.
pub fn delete_all_empty<P: EventProxy>(
    backend: Arc<dyn Backend>,
    confirmer: Arc<dyn ConfirmationService>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    let paths = lock_state(&state)
        .empty_folders
        .as_ref()
        .map(|found| found.paths.clone());
    match paths {
        Some(paths) if !paths.is_empty() => spawn_deletion(
            DeletionRequest {
                kind: DeletionKind::AllEmpty,
                paths,
            },
            backend,
            confirmer,
            proxy,
            state,
        ),
        _ => proxy.send_event(UserEvent::ShowError(
            "There are no empty folders to delete.".to_string(),
        )),
    }
}

fn spawn_deletion<P: EventProxy>(
    request: DeletionRequest,
    backend: Arc<dyn Backend>,
    confirmer: Arc<dyn ConfirmationService>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    tokio::spawn(async move {
        run_deletion(request, backend, confirmer, proxy, state).await;
    });
}

pub fn confirm_deletion(payload: ConfirmPayload, state: Arc<Mutex<AppState>>) {
    confirm::resolve_pending(&state, payload.accepted);
}

pub fn open_folder<P: EventProxy>(path: PathBuf, proxy: P, backend: Arc<dyn Backend>) {
    tokio::spawn(async move {
        if let Err(e) = backend.open_externally(&path.to_string_lossy()).await {
            tracing::error!("{}", e);
            proxy.send_event(UserEvent::ShowError(e.to_string()));
        }
    });
}

/// Opens the catalog page of a wallpaper folder in the browser.
pub fn open_catalog_page<P: EventProxy>(
    path: PathBuf,
    proxy: P,
    state: Arc<Mutex<AppState>>,
    backend: Arc<dyn Backend>,
) {
    let external_id = lock_state(&state)
        .metadata
        .get(&path)
        .and_then(|m| m.external_id.clone());

    let Some(external_id) = external_id else {
        proxy.send_event(UserEvent::ShowError(format!(
            "No workshop id known for {}",
            path.display()
        )));
        return;
    };

    let url = match backend.resolve_catalog_url(&external_id) {
        Ok(url) => url,
        Err(e) => {
            proxy.send_event(UserEvent::ShowError(e.to_string()));
            return;
        }
    };

    tokio::spawn(async move {
        if let Err(e) = backend.open_externally(&url).await {
            tracing::error!("{}", e);
            proxy.send_event(UserEvent::ShowError(e.to_string()));
        }
    });
}

/// Replaces and persists the configuration. Scan settings apply from the
/// next scan on; the click delay applies immediately.
pub fn update_config<P: EventProxy>(
    payload: serde_json::Value,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    let Some(new_config) = parse_payload::<AppConfig, _>("updateConfig", payload, &proxy) else {
        return;
    };
    let snapshot = {
        let mut s = lock_state(&state);
        s.click.set_delay(new_config.click_delay());
        s.config = new_config;
        notify(&s, &proxy);
        s.config_snapshot()
    };
    snapshot.save();
}

pub fn click_row<P: EventProxy>(
    path: PathBuf,
    proxy: P,
    state: Arc<Mutex<AppState>>,
    backend: Arc<dyn Backend>,
) {
    interaction::click_row(path, proxy, state, backend);
}

pub fn double_click_row<P: EventProxy>(
    path: PathBuf,
    proxy: P,
    state: Arc<Mutex<AppState>>,
    backend: Arc<dyn Backend>,
) {
    interaction::double_click_row(path, proxy, state, backend);
}

pub fn toggle_expand<P: EventProxy>(path: PathBuf, proxy: P, state: Arc<Mutex<AppState>>) {
    interaction::toggle_expand(&path, &proxy, &state);
}
