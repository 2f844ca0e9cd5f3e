//! Single- versus double-click disambiguation on tree rows.
//!
//! A row click is held back for a short delay. If another click arrives on
//! any row before the delay elapses the pending click is dropped and the
//! pair counts as a double click. The timer itself is owned by the caller;
//! this machine only hands out tokens and decides what a firing token means.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_CLICK_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickState {
    Idle,
    PendingSingleClick {
        path: PathBuf,
        deadline: Instant,
        token: u64,
    },
}

/// What the caller has to do after feeding a click in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Start a timer for `delay` and call [`ClickMachine::fire`] with `token`.
    Schedule { token: u64, delay: Duration },
    /// A pending click was cancelled; run the double-click action on `path`.
    DoubleClick { path: PathBuf },
}

/// The resolved meaning of a single click once its timer has fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleClickAction {
    ToggleExpansion(PathBuf),
    Focus(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ClickMachine {
    state: ClickState,
    delay: Duration,
    next_token: u64,
}

impl Default for ClickMachine {
    fn default() -> Self {
        Self::new(DEFAULT_CLICK_DELAY)
    }
}

impl ClickMachine {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: ClickState::Idle,
            delay,
            next_token: 0,
        }
    }

    pub fn state(&self) -> &ClickState {
        &self.state
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Feeds a click on `path` (not on its expand affordance).
    pub fn click(&mut self, path: &Path, now: Instant) -> ClickOutcome {
        if let ClickState::PendingSingleClick { deadline, .. } = &self.state {
            if now < *deadline {
                self.state = ClickState::Idle;
                return ClickOutcome::DoubleClick {
                    path: path.to_path_buf(),
                };
            }
        }

        self.next_token += 1;
        let token = self.next_token;
        self.state = ClickState::PendingSingleClick {
            path: path.to_path_buf(),
            deadline: now + self.delay,
            token,
        };
        ClickOutcome::Schedule {
            token,
            delay: self.delay,
        }
    }

    /// A double click reported directly by the host. Always cancels whatever
    /// single click is pending.
    pub fn double_click(&mut self) {
        self.state = ClickState::Idle;
    }

    /// Called when the timer for `token` elapses. Returns the clicked path if
    /// that click is still the pending one.
    pub fn fire(&mut self, token: u64) -> Option<PathBuf> {
        let is_current = matches!(
            &self.state,
            ClickState::PendingSingleClick { token: pending, .. } if *pending == token
        );
        if !is_current {
            return None;
        }
        match std::mem::replace(&mut self.state, ClickState::Idle) {
            ClickState::PendingSingleClick { path, .. } => Some(path),
            ClickState::Idle => None,
        }
    }

    pub fn reset(&mut self) {
        self.state = ClickState::Idle;
    }
}

/// Clicking the row that is already focused toggles it open or closed when it
/// has children; any other click moves the focus.
pub fn resolve_single_click(
    path: &Path,
    focused: Option<&Path>,
    has_children: bool,
) -> SingleClickAction {
    if focused == Some(path) && has_children {
        SingleClickAction::ToggleExpansion(path.to_path_buf())
    } else {
        SingleClickAction::Focus(path.to_path_buf())
    }
}
