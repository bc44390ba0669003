// crates/client/src/status/controller.rs
//! Mounted status controller: owns the poll loop and the shared state.
//!
//! Lifecycle:
//! - `mount` publishes a loading snapshot, fetches once, then refreshes on a
//!   fixed cadence;
//! - every refresh races the request against the controller's
//!   `CancellationToken`, so `unmount` abandons requests already in flight;
//! - `unmount` disposes the store before cancelling, which rules out any state
//!   write after it returns.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jobwatch_core::order_jobs;
use jobwatch_types::{Job, JobType};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use super::state::{StatusSnapshot, StatusState, StatusStore};
use crate::analytics::Analytics;
use crate::error::ClientError;
use crate::metrics;
use crate::service::JobService;

/// What the controller watches and how often.
#[derive(Debug, Clone)]
pub struct StatusSettings {
    pub job_type: JobType,
    pub poll_interval: Duration,
    pub is_configured: bool,
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self {
            job_type: JobType::default(),
            poll_interval: Duration::from_secs(15),
            is_configured: true,
        }
    }
}

/// Why a refresh ran. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefreshTrigger {
    Mount,
    Interval,
    Manual,
    Create,
    Cancel,
}

impl RefreshTrigger {
    fn as_str(self) -> &'static str {
        match self {
            RefreshTrigger::Mount => "mount",
            RefreshTrigger::Interval => "interval",
            RefreshTrigger::Manual => "manual",
            RefreshTrigger::Create => "create",
            RefreshTrigger::Cancel => "cancel",
        }
    }
}

pub(crate) struct Shared {
    pub(crate) service: Arc<dyn JobService>,
    pub(crate) analytics: Analytics,
    pub(crate) settings: StatusSettings,
    pub(crate) store: StatusStore,
    pub(crate) cancel: CancellationToken,
    tracker: TaskTracker,
}

impl Shared {
    async fn run_poll_loop(self: Arc<Self>) {
        let period = self.settings.poll_interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.refresh(RefreshTrigger::Mount).await;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => self.refresh(RefreshTrigger::Interval).await,
            }
        }
        debug!(job_type = %self.settings.job_type, "poll loop stopped");
    }

    /// Fetch the job list and fold the result into local state.
    ///
    /// Success replaces the snapshot; success or failure clears `loading` and
    /// `cancel_in_progress`. Nothing is written once the controller is unmounted.
    pub(crate) async fn refresh(&self, trigger: RefreshTrigger) {
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!(trigger = trigger.as_str(), "refresh abandoned: controller unmounted");
                return;
            }
            result = self.service.get_jobs_by_type(&self.settings.job_type) => result,
        };

        let applied = match result {
            Ok(jobs) => {
                metrics::record_poll("success");
                let jobs = order_jobs(jobs);
                debug!(
                    trigger = trigger.as_str(),
                    job_type = %self.settings.job_type,
                    count = jobs.len(),
                    "jobs refreshed"
                );
                self.store.update(move |state| {
                    state.jobs = jobs;
                    state.loading = false;
                    state.cancel_in_progress = false;
                    state.last_refreshed = Some(Utc::now());
                    state.last_error = None;
                })
            }
            Err(err) => {
                metrics::record_poll("error");
                warn!(
                    trigger = trigger.as_str(),
                    job_type = %self.settings.job_type,
                    error = %err,
                    "job refresh failed"
                );
                let message = err.to_string();
                self.store.update(move |state| {
                    state.loading = false;
                    state.cancel_in_progress = false;
                    state.last_error = Some(message);
                })
            }
        };

        if !applied {
            debug!(trigger = trigger.as_str(), "refresh result dropped: controller unmounted");
        }
    }

    /// Fire-and-forget refresh tracked with the controller's other tasks.
    pub(crate) fn spawn_refresh(self: &Arc<Self>, trigger: RefreshTrigger) {
        let shared = Arc::clone(self);
        self.tracker.spawn(async move {
            shared.refresh(trigger).await;
        });
    }

    fn shutdown(&self) -> bool {
        let was_live = self.store.dispose();
        self.cancel.cancel();
        self.tracker.close();
        was_live
    }
}

/// Handle to a mounted status controller.
///
/// Dropping the handle unmounts the controller; [`StatusHandle::unmount`]
/// additionally waits for its tasks to wind down.
pub struct StatusHandle {
    pub(crate) shared: Arc<Shared>,
}

impl StatusHandle {
    /// Mount a controller and start polling. Must be called inside a Tokio runtime.
    pub fn mount(service: Arc<dyn JobService>, analytics: Analytics, settings: StatusSettings) -> Self {
        info!(
            job_type = %settings.job_type,
            poll_interval_secs = settings.poll_interval.as_secs(),
            "mounting status controller"
        );
        let shared = Arc::new(Shared {
            service,
            analytics,
            store: StatusStore::new(settings.is_configured),
            settings,
            cancel: CancellationToken::new(),
            tracker: TaskTracker::new(),
        });

        let poller = Arc::clone(&shared);
        shared.tracker.spawn(poller.run_poll_loop());

        Self { shared }
    }

    /// Refresh now and wait for the result to be applied.
    pub async fn reload(&self) -> Result<(), ClientError> {
        self.ensure_mounted()?;
        self.shared.refresh(RefreshTrigger::Manual).await;
        Ok(())
    }

    /// Receive a new snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.shared.store.subscribe()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.shared.store.snapshot()
    }

    pub fn state(&self) -> StatusState {
        self.shared.store.state()
    }

    pub fn chosen_job(&self) -> Option<Job> {
        self.shared.store.chosen_job()
    }

    pub fn settings(&self) -> &StatusSettings {
        &self.shared.settings
    }

    pub fn is_mounted(&self) -> bool {
        !self.shared.store.is_disposed()
    }

    /// Wait until the first refresh has completed.
    pub async fn ready(&self) -> Result<StatusSnapshot, ClientError> {
        self.ensure_mounted()?;
        let mut rx = self.subscribe();
        let snapshot = tokio::select! {
            _ = self.shared.cancel.cancelled() => return Err(ClientError::Disposed),
            result = rx.wait_for(|s| !s.loading) => match result {
                Ok(s) => s.clone(),
                Err(_) => return Err(ClientError::Disposed),
            },
        };
        Ok(snapshot)
    }

    /// Stop polling, abandon in-flight requests and wait for tasks to exit.
    pub async fn unmount(self) {
        if self.shared.shutdown() {
            info!(job_type = %self.shared.settings.job_type, "status controller unmounted");
        }
        self.shared.tracker.wait().await;
    }

    pub(crate) fn ensure_mounted(&self) -> Result<(), ClientError> {
        if self.shared.store.is_disposed() {
            Err(ClientError::Disposed)
        } else {
            Ok(())
        }
    }
}

impl Drop for StatusHandle {
    fn drop(&mut self) {
        self.shared.shutdown();
    }
}
