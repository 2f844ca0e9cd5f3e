//! Asking the user whether a deletion may proceed.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use super::events::UserEvent;
use super::helpers::lock_state;
use super::proxy::EventProxy;
use super::state::AppState;
use crate::core::ConfirmationSummary;

/// A trait to abstract the confirmation prompt, allowing for mocking in tests.
#[async_trait]
pub trait ConfirmationService: Send + Sync {
    /// Resolves to `true` only if the user accepted.
    async fn confirm(&self, summary: &ConfirmationSummary) -> bool;
}

/// Emits `ConfirmDeletion` and waits for the host to answer with
/// `confirmDeletion`.
pub struct PromptConfirmation<P: EventProxy> {
    proxy: P,
    state: Arc<Mutex<AppState>>,
}

impl<P: EventProxy> PromptConfirmation<P> {
    pub fn new(proxy: P, state: Arc<Mutex<AppState>>) -> Self {
        Self { proxy, state }
    }
}

#[async_trait]
impl<P: EventProxy> ConfirmationService for PromptConfirmation<P> {
    async fn confirm(&self, summary: &ConfirmationSummary) -> bool {
        let (tx, rx) = oneshot::channel();
        {
            let mut state = lock_state(&self.state);
            // A replaced sender resolves its waiter as declined.
            state.pending_confirmation = Some(tx);
        }
        self.proxy
            .send_event(UserEvent::ConfirmDeletion(summary.clone()));
        rx.await.unwrap_or(false)
    }
}

/// Hands the host's answer to the waiting deletion. Returns `false` when
/// nothing was waiting.
pub fn resolve_pending(state: &Arc<Mutex<AppState>>, accepted: bool) -> bool {
    let pending = lock_state(state).pending_confirmation.take();
    match pending {
        Some(tx) => tx.send(accepted).is_ok(),
        None => {
            tracing::warn!("Confirmation answer received but no deletion is waiting");
            false
        }
    }
}
