//! Browser-history collaborators.
//!
//! The "current path for history" value is an explicit service
//! ([`HistoryState`]) initialized from the page's starting location and
//! injected into the navigation controller, never read from ambient globals.
//! Persistence of prior-page snapshots is behind [`HistoryStore`];
//! [`SessionHistory`] is the in-memory default.

use parking_lot::Mutex;
use serde::Serialize;

/// Upper bound on retained page snapshots.
pub const HISTORY_CACHE_SIZE: usize = 10;

/// Process-wide "current path" for history bookkeeping.
pub struct HistoryState {
    path: Mutex<String>,
}

impl HistoryState {
    /// Initialize from the page's current location.
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            path: Mutex::new(initial_path.into()),
        }
    }

    pub fn get(&self) -> String {
        self.path.lock().clone()
    }

    pub fn set(&self, path: &str) {
        *self.path.lock() = path.to_string();
    }
}

/// A cached snapshot of the page as it was before leaving `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSnapshot {
    pub path: String,
    pub html: String,
}

/// A history mutation performed by the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UrlChange {
    Push(String),
    Replace(String),
}

/// Session cache of prior page snapshots plus the history mutations.
pub trait HistoryStore: Send + Sync {
    /// Cache the current page under its current path.
    fn save_current_page(&self, path: &str, html: &str);
    /// Push a new history entry for `path`.
    fn push_url(&self, path: &str);
    /// Replace the current history entry with `path`.
    fn replace_url(&self, path: &str);
}

/// In-memory [`HistoryStore`] keeping the most recent
/// [`HISTORY_CACHE_SIZE`] snapshots.
#[derive(Default)]
pub struct SessionHistory {
    snapshots: Mutex<Vec<PageSnapshot>>,
    changes: Mutex<Vec<UrlChange>>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<PageSnapshot> {
        self.snapshots.lock().clone()
    }

    pub fn changes(&self) -> Vec<UrlChange> {
        self.changes.lock().clone()
    }
}

impl HistoryStore for SessionHistory {
    fn save_current_page(&self, path: &str, html: &str) {
        let mut snapshots = self.snapshots.lock();
        snapshots.push(PageSnapshot {
            path: path.to_string(),
            html: html.to_string(),
        });
        let excess = snapshots.len().saturating_sub(HISTORY_CACHE_SIZE);
        if excess > 0 {
            snapshots.drain(..excess);
        }
    }

    fn push_url(&self, path: &str) {
        self.changes.lock().push(UrlChange::Push(path.to_string()));
    }

    fn replace_url(&self, path: &str) {
        self.changes
            .lock()
            .push(UrlChange::Replace(path.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_state_get_set() {
        let state = HistoryState::new("/start");
        assert_eq!(state.get(), "/start");
        state.set("/next");
        assert_eq!(state.get(), "/next");
    }

    #[test]
    fn test_session_history_records_changes() {
        let history = SessionHistory::new();
        history.push_url("/a");
        history.replace_url("/b");
        assert_eq!(
            history.changes(),
            vec![UrlChange::Push("/a".into()), UrlChange::Replace("/b".into())]
        );
    }

    #[test]
    fn test_snapshot_cache_capped() {
        let history = SessionHistory::new();
        for i in 0..HISTORY_CACHE_SIZE + 3 {
            history.save_current_page(&format!("/p{}", i), "<div></div>");
        }
        let snapshots = history.snapshots();
        assert_eq!(snapshots.len(), HISTORY_CACHE_SIZE);
        assert_eq!(snapshots[0].path, "/p3");
    }
}
