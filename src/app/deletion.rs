//! Drives one deletion request through size calculation, confirmation,
//! deletion and the rescan that follows it.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::confirm::ConfirmationService;
use super::events::UserEvent;
use super::helpers::{lock_state, notify};
use super::proxy::EventProxy;
use super::state::AppState;
use super::tasks::run_scan;
use crate::core::{
    Backend, ConfirmationSummary, DeletePhase, DeletionKind, DeletionReport, DeletionRequest,
};

/// Runs `request` to completion. Returns the report that was sent, or `None`
/// if the request was rejected or declined.
pub async fn run_deletion<P: EventProxy>(
    request: DeletionRequest,
    backend: Arc<dyn Backend>,
    confirmer: Arc<dyn ConfirmationService>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) -> Option<DeletionReport> {
    let submitted = request.paths.len();

    let (generation, root) = {
        let mut s = lock_state(&state);
        if s.delete_phase.is_busy() {
            tracing::warn!("Rejected {:?} deletion: another one is running", request.kind);
            proxy.send_event(UserEvent::ShowError(
                "Another deletion is already in progress.".to_string(),
            ));
            return None;
        }

        if submitted == 0 {
            let report = DeletionReport::from_outcome(request.kind, 0, Default::default());
            s.last_deletion = Some(report.clone());
            notify(&s, &proxy);
            proxy.send_event(UserEvent::DeletionReport(report.clone()));
            return Some(report);
        }

        s.delete_phase = DeletePhase::SizeCalculating;
        s.cancel_pending_click();
        notify(&s, &proxy);
        (s.scan_generation, s.current_path.clone())
    };
    tracing::info!("{:?} deletion of {} path(s) started", request.kind, submitted);

    let total = match backend.total_size(&request.paths).await {
        Ok(total) => total,
        Err(e) => {
            tracing::error!("Size calculation failed, nothing deleted: {}", e);
            let report = DeletionReport::aborted(request.kind, submitted, e.to_string());
            finish(&state, &proxy, &report);
            return Some(report);
        }
    };

    let summary = {
        let mut s = lock_state(&state);
        s.delete_phase = DeletePhase::AwaitingConfirmation;
        notify(&s, &proxy);
        ConfirmationSummary::new(&request, &s.entries, total)
    };

    if !confirmer.confirm(&summary).await {
        tracing::info!("Deletion declined by user");
        let mut s = lock_state(&state);
        s.delete_phase = DeletePhase::Idle;
        notify(&s, &proxy);
        return None;
    }

    {
        let mut s = lock_state(&state);
        s.delete_phase = DeletePhase::Deleting;
        notify(&s, &proxy);
    }

    let outcome = backend.delete_all(&request.paths).await;
    // Scans started from here on see the filesystem after the deletion.
    let settled_generation = lock_state(&state).scan_generation;
    let report = DeletionReport::from_outcome(request.kind, submitted, outcome);
    tracing::info!(
        "Deletion finished as {:?}: {} deleted, {} failed",
        report.phase,
        report.success_count,
        report.failed_items.len()
    );

    if request.kind == DeletionKind::Single && report.changed_filesystem() {
        let mut s = lock_state(&state);
        let deleted_focus = s
            .selection
            .focused()
            .is_some_and(|f| request.paths.iter().any(|p| p == f));
        if deleted_focus {
            s.selection.clear_focus();
        }
    }

    finish(&state, &proxy, &report);

    if report.changed_filesystem() {
        resync(generation, settled_generation, root, proxy, state, backend).await;
    }
    Some(report)
}

/// Publishes `report` and returns the pipeline to `Idle`.
fn finish<P: EventProxy>(state: &Arc<Mutex<AppState>>, proxy: &P, report: &DeletionReport) {
    let mut s = lock_state(state);
    s.delete_phase = DeletePhase::Idle;
    s.last_deletion = Some(report.clone());
    s.status_message = report.message.clone();
    notify(&s, proxy);
    proxy.send_event(UserEvent::DeletionReport(report.clone()));
}

/// Rescans after a deletion that changed the filesystem.
///
/// A scan started after the deletion settled already shows its result and is
/// left alone. Otherwise the root the deletion started from is rescanned, or
/// the current path if a scan was started while the deletion was running;
/// that scan may have walked entries that are gone now.
async fn resync<P: EventProxy>(
    started_generation: u64,
    settled_generation: u64,
    root: Option<PathBuf>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
    backend: Arc<dyn Backend>,
) {
    let target = {
        let s = lock_state(&state);
        if !s.is_current(settled_generation) {
            None
        } else if settled_generation != started_generation {
            s.current_path.clone()
        } else {
            root
        }
    };
    match target {
        Some(root) => {
            run_scan(root, proxy, state, backend).await;
        }
        None => tracing::info!("Skipping post-deletion rescan; a newer scan already covers it"),
    }
}
