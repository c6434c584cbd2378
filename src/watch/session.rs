use std::sync::Mutex;

use chrono::{DateTime, Local};
use tokio_util::sync::CancellationToken;

use super::sample::Interval;
use super::store::{SampleStore, Snapshot};
use crate::sync::lock_or_recover;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Collecting,
    /// The target stopped answering queries; the series is final.
    Ended,
    /// A metrics query exceeded the configured timeout.
    TimedOut,
    /// Superseded by a later retarget or stopped by the shell.
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        self != SessionState::Collecting
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionState::Collecting => "collecting",
            SessionState::Ended => "target process ended",
            SessionState::TimedOut => "metrics query timed out",
            SessionState::Cancelled => "stopped",
        }
    }
}

/// Public description of a session, safe to hand to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: u64,
    pub pid: u32,
    pub name: String,
    pub interval: Interval,
    pub started_at: DateTime<Local>,
    pub state: SessionState,
}

#[derive(Debug)]
pub(crate) struct WatchSession {
    pub(crate) id: u64,
    pub(crate) pid: u32,
    pub(crate) name: String,
    pub(crate) interval: Interval,
    pub(crate) started_at: DateTime<Local>,
    pub(crate) store: SampleStore,
    pub(crate) cancel: CancellationToken,
    state: Mutex<SessionState>,
}

impl WatchSession {
    pub(crate) fn new(id: u64, pid: u32, name: String, interval: Interval) -> Self {
        Self {
            id,
            pid,
            name,
            interval,
            started_at: Local::now(),
            store: SampleStore::new(),
            cancel: CancellationToken::new(),
            state: Mutex::new(SessionState::Collecting),
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        *lock_or_recover(&self.state)
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Stops the session with `state`. The store is sealed before the token
    /// fires, so no append can land after this returns. Only the first call
    /// decides the final state; later calls are no-ops.
    pub(crate) fn finish(&self, state: SessionState) -> bool {
        let mut current = lock_or_recover(&self.state);
        if current.is_terminal() {
            return false;
        }
        self.store.seal();
        *current = state;
        self.cancel.cancel();
        true
    }

    pub(crate) fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            pid: self.pid,
            name: self.name.clone(),
            interval: self.interval,
            started_at: self.started_at,
            state: self.state(),
        }
    }
}
