//! Runs the click machine on a real clock and applies what it decides.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

use super::events::UserEvent;
use super::helpers::{lock_state, notify};
use super::proxy::EventProxy;
use super::state::AppState;
use super::view_model::{build_preview, has_visible_children};
use crate::core::click::resolve_single_click;
use crate::core::{Backend, ClickOutcome, SingleClickAction};

/// A click on the body of a row. The single-click action is held back until
/// the click delay elapses without a second click.
pub fn click_row<P: EventProxy>(
    path: PathBuf,
    proxy: P,
    state: Arc<Mutex<AppState>>,
    backend: Arc<dyn Backend>,
) {
    let mut s = lock_state(&state);
    let outcome = s.click.click(&path, Instant::now());
    match outcome {
        ClickOutcome::Schedule { token, delay } => {
            if let Some(previous) = s.click_task.take() {
                previous.abort();
            }
            let task_state = state.clone();
            s.click_task = Some(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                fire_single_click(token, proxy, task_state, backend);
            }));
        }
        ClickOutcome::DoubleClick { path } => {
            if let Some(pending) = s.click_task.take() {
                pending.abort();
            }
            drop(s);
            open_directory(path, proxy, state, backend);
        }
    }
}

/// A double click reported by the host itself.
pub fn double_click_row<P: EventProxy>(
    path: PathBuf,
    proxy: P,
    state: Arc<Mutex<AppState>>,
    backend: Arc<dyn Backend>,
) {
    lock_state(&state).cancel_pending_click();
    open_directory(path, proxy, state, backend);
}

/// The expand affordance: toggles right away and leaves the focus alone.
pub fn toggle_expand<P: EventProxy>(path: &Path, proxy: &P, state: &Arc<Mutex<AppState>>) {
    let mut s = lock_state(state);
    s.toggle_expanded(path);
    notify(&s, proxy);
}

fn fire_single_click<P: EventProxy>(
    token: u64,
    proxy: P,
    state: Arc<Mutex<AppState>>,
    backend: Arc<dyn Backend>,
) {
    let mut s = lock_state(&state);
    let Some(path) = s.click.fire(token) else {
        return;
    };
    s.click_task = None;

    let has_children = has_visible_children(&s, &path);
    let action = resolve_single_click(&path, s.selection.focused(), has_children);
    match action {
        SingleClickAction::ToggleExpansion(path) => {
            s.toggle_expanded(&path);
            notify(&s, &proxy);
        }
        SingleClickAction::Focus(path) => {
            s.selection.focus(&path);
            notify(&s, &proxy);
            if let Some(preview) = build_preview(&s, &path, backend.as_ref()) {
                proxy.send_event(UserEvent::ShowPreview(Box::new(preview)));
            }
        }
    }
}

/// Opens a directory row with the platform handler. Files are left alone.
fn open_directory<P: EventProxy>(
    path: PathBuf,
    proxy: P,
    state: Arc<Mutex<AppState>>,
    backend: Arc<dyn Backend>,
) {
    let is_dir = lock_state(&state)
        .entries
        .get(&path)
        .is_some_and(|e| e.is_dir());
    if !is_dir {
        tracing::debug!("Double click on {:?} ignored", path);
        return;
    }
    tokio::spawn(async move {
        if let Err(e) = backend.open_externally(&path.to_string_lossy()).await {
            tracing::error!("{}", e);
            proxy.send_event(UserEvent::ShowError(e.to_string()));
        }
    });
}
