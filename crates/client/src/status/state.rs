// crates/client/src/status/state.rs
//! Local state of a mounted status controller.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use jobwatch_core::{choose_job, present, StatusView, ViewFlags};
use jobwatch_types::Job;
use serde::Serialize;
use tokio::sync::watch;

/// Mutable fields owned by the controller. Jobs are a read-only snapshot of
/// the service, ordered oldest-first.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusState {
    pub jobs: Vec<Job>,
    pub loading: bool,
    pub cancel_in_progress: bool,
    pub last_refreshed: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl Default for StatusState {
    fn default() -> Self {
        Self {
            jobs: Vec::new(),
            loading: true,
            cancel_in_progress: false,
            last_refreshed: None,
            last_error: None,
        }
    }
}

impl StatusState {
    pub fn chosen_job(&self) -> Option<&Job> {
        choose_job(&self.jobs)
    }

    pub fn view(&self, is_configured: bool) -> StatusView {
        let flags = ViewFlags {
            loading: self.loading,
            cancel_in_progress: self.cancel_in_progress,
            is_configured,
        };
        present(self.chosen_job(), flags)
    }
}

/// What subscribers receive after every state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub view: StatusView,
    pub loading: bool,
    pub cancel_in_progress: bool,
    pub chosen: Option<Job>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    fn capture(state: &StatusState, is_configured: bool) -> Self {
        Self {
            view: state.view(is_configured),
            loading: state.loading,
            cancel_in_progress: state.cancel_in_progress,
            chosen: state.chosen_job().cloned(),
            refreshed_at: state.last_refreshed,
        }
    }
}

struct Inner {
    state: StatusState,
    disposed: bool,
}

/// State cell shared between the poll loop, action tasks and readers.
///
/// Uses `std::sync::RwLock` because no lock is held across `.await`.
/// Disposal and every write happen under the same write lock, so once
/// [`StatusStore::dispose`] returns no further mutation can land.
pub struct StatusStore {
    inner: RwLock<Inner>,
    is_configured: bool,
    snapshot_tx: watch::Sender<StatusSnapshot>,
}

impl StatusStore {
    pub fn new(is_configured: bool) -> Self {
        let state = StatusState::default();
        let (snapshot_tx, _) = watch::channel(StatusSnapshot::capture(&state, is_configured));
        Self {
            inner: RwLock::new(Inner {
                state,
                disposed: false,
            }),
            is_configured,
            snapshot_tx,
        }
    }

    /// Apply `f` unless the store is disposed. Returns whether it was applied.
    pub fn update(&self, f: impl FnOnce(&mut StatusState)) -> bool {
        let mut inner = match self.inner.write() {
            Ok(guard) => guard,
            Err(e) => {
                tracing::error!("RwLock poisoned writing status state: {e}");
                return false;
            }
        };
        if inner.disposed {
            return false;
        }
        f(&mut inner.state);
        self.snapshot_tx
            .send_replace(StatusSnapshot::capture(&inner.state, self.is_configured));
        true
    }

    /// Mark the store disposed. Returns false if it already was.
    pub fn dispose(&self) -> bool {
        match self.inner.write() {
            Ok(mut inner) => !std::mem::replace(&mut inner.disposed, true),
            Err(e) => {
                tracing::error!("RwLock poisoned disposing status state: {e}");
                false
            }
        }
    }

    pub fn is_disposed(&self) -> bool {
        match self.inner.read() {
            Ok(inner) => inner.disposed,
            Err(_) => true,
        }
    }

    pub fn state(&self) -> StatusState {
        match self.inner.read() {
            Ok(inner) => inner.state.clone(),
            Err(e) => {
                tracing::error!("RwLock poisoned reading status state: {e}");
                StatusState::default()
            }
        }
    }

    pub fn chosen_job(&self) -> Option<Job> {
        match self.inner.read() {
            Ok(inner) => inner.state.chosen_job().cloned(),
            Err(e) => {
                tracing::error!("RwLock poisoned reading status state: {e}");
                None
            }
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.snapshot_tx.subscribe()
    }
}
