//! Per-link download accounting.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

/// Plain copy of a link's counters, as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    /// Total downloads across all users.
    #[serde(default)]
    pub downloads: u64,
    /// Downloads per username.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub user_downloads: HashMap<String, u64>,
}

/// Download counters guarded by the link's own lock.
///
/// The lock is held only for the read-modify-write of the counters, never
/// across I/O. Every version of a link produced by an update holds the same
/// `Arc`, so downloads of different links never contend and a download that
/// resolved an older version still counts against the current one.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(from = "CounterSnapshot", into = "CounterSnapshot")]
pub struct DownloadCounters {
    state: Mutex<CounterSnapshot>,
}

impl DownloadCounters {
    fn lock(&self) -> MutexGuard<'_, CounterSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy the current values.
    pub fn snapshot(&self) -> CounterSnapshot {
        self.lock().clone()
    }

    /// Global download count.
    pub fn downloads(&self) -> u64 {
        self.lock().downloads
    }

    /// Download count of one user.
    pub fn user_downloads(&self, username: &str) -> u64 {
        self.lock().user_downloads.get(username).copied().unwrap_or(0)
    }

    /// Count one download by `username`.
    pub fn record(&self, username: &str) {
        let mut state = self.lock();
        state.downloads += 1;
        *state.user_downloads.entry(username.to_string()).or_insert(0) += 1;
    }

    /// Zero both counters.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.downloads = 0;
        state.user_downloads.clear();
    }

    /// Whether one more download by `username` fits under `limit`.
    ///
    /// A limit of 0 means unlimited.
    pub fn admits(&self, limit: u64, per_user: bool, username: &str) -> bool {
        fits(&self.lock(), limit, per_user, username)
    }

    /// Count one download by `username` if it fits under `limit`.
    ///
    /// Check and increment happen under one lock hold, so concurrent
    /// callers can never overshoot the limit.
    pub fn try_record(&self, limit: u64, per_user: bool, username: &str) -> bool {
        let mut state = self.lock();
        if !fits(&state, limit, per_user, username) {
            return false;
        }
        state.downloads += 1;
        *state.user_downloads.entry(username.to_string()).or_insert(0) += 1;
        true
    }
}

fn fits(state: &CounterSnapshot, limit: u64, per_user: bool, username: &str) -> bool {
    if limit == 0 {
        return true;
    }
    if per_user {
        state.user_downloads.get(username).copied().unwrap_or(0) < limit
    } else {
        state.downloads < limit
    }
}

impl Clone for DownloadCounters {
    fn clone(&self) -> Self {
        Self::from(self.snapshot())
    }
}

impl From<CounterSnapshot> for DownloadCounters {
    fn from(snapshot: CounterSnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
        }
    }
}

impl From<DownloadCounters> for CounterSnapshot {
    fn from(counters: DownloadCounters) -> Self {
        counters
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
