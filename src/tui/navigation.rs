//! Current view plus a single slot of history.

use tracing::debug;

use crate::tui::enums::ViewId;

/// Only one level of back-navigation is kept: going A -> B -> C and back
/// twice ends on the fallback, not on A.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    current: ViewId,
    previous: Option<ViewId>,
}

impl NavigationState {
    pub fn new(start: ViewId) -> Self {
        NavigationState {
            current: start,
            previous: None,
        }
    }

    pub fn current(&self) -> ViewId {
        self.current
    }

    pub fn previous(&self) -> Option<ViewId> {
        self.previous
    }

    /// Move to `view`, remembering where we came from. Re-entering the
    /// current view leaves the history untouched.
    pub fn navigate_to(&mut self, view: ViewId) {
        if view == self.current {
            return;
        }
        debug!(from = ?self.current, to = ?view, "navigate");
        self.previous = Some(self.current);
        self.current = view;
    }

    /// Return to the previous view and empty the slot, or go to `fallback`.
    pub fn go_back(&mut self, fallback: ViewId) {
        let target = self.previous.take().unwrap_or(fallback);
        debug!(from = ?self.current, to = ?target, "back");
        self.current = target;
    }

    /// Switch view without touching the history slot.
    pub fn replace(&mut self, view: ViewId) {
        self.current = view;
    }
}
