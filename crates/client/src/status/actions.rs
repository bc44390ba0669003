// crates/client/src/status/actions.rs
//! Create and cancel requests issued from a mounted status controller.

use jobwatch_types::{Job, NewJob};
use tracing::{info, warn};

use super::controller::{RefreshTrigger, StatusHandle};
use crate::error::ClientError;
use crate::metrics;

impl StatusHandle {
    /// Schedule a new job of the watched type.
    ///
    /// On success an extra refresh is started immediately and the created job
    /// is returned. On failure the error is returned and nothing is refreshed.
    pub async fn create_index_job(&self) -> Result<Job, ClientError> {
        self.ensure_mounted()?;
        let shared = &self.shared;
        let request = NewJob::of_type(shared.settings.job_type.clone());

        let result = tokio::select! {
            biased;
            _ = shared.cancel.cancelled() => Err(ClientError::Disposed),
            result = shared.service.create_job(&request) => result,
        };

        match result {
            Ok(job) => {
                info!(job_id = %job.id, job_type = %job.job_type, "index job scheduled");
                metrics::record_job_action("create", "success");
                shared.analytics.deprecated_track(
                    "api",
                    "api_jobs_create_success",
                    "",
                    "job_type",
                    request.job_type.as_str(),
                );
                shared.spawn_refresh(RefreshTrigger::Create);
                Ok(job)
            }
            Err(err) => {
                warn!(job_type = %request.job_type, error = %err, "failed to schedule index job");
                metrics::record_job_action("create", "error");
                shared.analytics.deprecated_track(
                    "api",
                    "api_jobs_create_fail",
                    "",
                    "job_type",
                    request.job_type.as_str(),
                );
                Err(err)
            }
        }
    }

    /// Cancel the currently chosen job.
    ///
    /// Returns `Ok(None)` without sending anything when no job is chosen.
    /// Otherwise marks the cancel as in progress, sends the request and
    /// refreshes whatever the outcome; the refresh is the only feedback, so a
    /// failed cancel is logged rather than returned.
    pub async fn cancel_index_job(&self) -> Result<Option<Job>, ClientError> {
        self.ensure_mounted()?;
        let shared = &self.shared;

        let Some(job) = shared.store.chosen_job() else {
            return Ok(None);
        };

        if !shared.store.update(|state| state.cancel_in_progress = true) {
            return Err(ClientError::Disposed);
        }

        let result = tokio::select! {
            biased;
            _ = shared.cancel.cancelled() => return Err(ClientError::Disposed),
            result = shared.service.cancel_job(&job.id) => result,
        };

        match result {
            Ok(()) => {
                info!(job_id = %job.id, "index job cancel requested");
                metrics::record_job_action("cancel", "success");
                shared
                    .analytics
                    .deprecated_track("api", "api_jobs_cancel_success", "", "job_id", &job.id);
            }
            Err(err) => {
                warn!(job_id = %job.id, error = %err, "index job cancel failed");
                metrics::record_job_action("cancel", "error");
                shared
                    .analytics
                    .deprecated_track("api", "api_jobs_cancel_fail", "", "job_id", &job.id);
            }
        }

        shared.spawn_refresh(RefreshTrigger::Cancel);
        Ok(Some(job))
    }
}
