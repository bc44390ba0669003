// crates/core/src/selector.rs
//! Picks the one job that represents the current state of a job type.
//!
//! The service may hold many jobs of the same type (finished, queued, running).
//! Only one of them is surfaced to the user:
//! 1. the first job that is running or waiting for a cancel to land, else
//! 2. the last job that is not pending, else
//! 3. the last job (every job is pending).

use jobwatch_types::{Job, JobStatus};

/// Choose the job to display from `jobs`, honouring list order.
///
/// Callers that do not control the order should pass the output of
/// [`order_jobs`] so the result does not depend on how the service sorted
/// its response.
pub fn choose_job(jobs: &[Job]) -> Option<&Job> {
    if let Some(running) = jobs
        .iter()
        .find(|job| matches!(job.status, JobStatus::InProgress | JobStatus::CancelRequested))
    {
        return Some(running);
    }

    jobs.iter()
        .rev()
        .find(|job| job.status != JobStatus::Pending)
        .or_else(|| jobs.last())
}

/// Sort a service snapshot oldest-first by creation time.
///
/// The sort is stable: jobs created in the same millisecond keep the order
/// the service returned them in.
pub fn order_jobs(mut jobs: Vec<Job>) -> Vec<Job> {
    jobs.sort_by_key(|job| job.create_at);
    jobs
}
