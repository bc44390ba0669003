// crates/client/src/status/fake.rs
//! Scripted in-memory job service for controller tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jobwatch_types::{Job, JobStatus, JobType, NewJob};
use tokio::sync::Notify;

use crate::error::ClientError;
use crate::service::JobService;

#[derive(Default)]
pub(crate) struct FakeJobService {
    pub(crate) jobs: Mutex<Vec<Job>>,
    pub(crate) fetch_calls: AtomicUsize,
    pub(crate) cancelled_ids: Mutex<Vec<String>>,
    pub(crate) created: Mutex<Vec<NewJob>>,
    pub(crate) fetch_error: Mutex<Option<ClientError>>,
    pub(crate) create_error: Mutex<Option<ClientError>>,
    pub(crate) cancel_error: Mutex<Option<ClientError>>,
    /// Signalled each time a fetch starts.
    pub(crate) fetch_started: Notify,
    /// When set, fetches block until the gate is notified.
    pub(crate) fetch_gate: Option<Arc<Notify>>,
}

impl FakeJobService {
    pub(crate) fn with_jobs(jobs: Vec<Job>) -> Self {
        Self {
            jobs: Mutex::new(jobs),
            ..Self::default()
        }
    }

    pub(crate) fn gated(gate: Arc<Notify>) -> Self {
        Self {
            fetch_gate: Some(gate),
            ..Self::default()
        }
    }

    pub(crate) fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn set_jobs(&self, jobs: Vec<Job>) {
        *self.jobs.lock().unwrap() = jobs;
    }
}

#[async_trait]
impl JobService for FakeJobService {
    async fn get_jobs_by_type(&self, _job_type: &JobType) -> Result<Vec<Job>, ClientError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.fetch_started.notify_one();
        if let Some(gate) = &self.fetch_gate {
            gate.notified().await;
        }
        if let Some(err) = self.fetch_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.jobs.lock().unwrap().clone())
    }

    async fn create_job(&self, job: &NewJob) -> Result<Job, ClientError> {
        if let Some(err) = self.create_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.created.lock().unwrap().push(job.clone());
        let mut jobs = self.jobs.lock().unwrap();
        let created = Job::new(format!("job-{}", jobs.len() + 1), job.job_type.clone(), JobStatus::Pending)
            .with_create_at(jobs.iter().map(|j| j.create_at).max().unwrap_or(0) + 1);
        jobs.push(created.clone());
        Ok(created)
    }

    async fn cancel_job(&self, job_id: &str) -> Result<(), ClientError> {
        self.cancelled_ids.lock().unwrap().push(job_id.to_string());
        if let Some(err) = self.cancel_error.lock().unwrap().clone() {
            return Err(err);
        }
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) {
            job.status = JobStatus::CancelRequested;
        }
        Ok(())
    }
}
