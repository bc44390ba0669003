// crates/client/src/service.rs
//! Job service port and its HTTP implementation.

use std::sync::Arc;

use async_trait::async_trait;
use jobwatch_types::{Job, JobType, NewJob};

use crate::error::ClientError;
use crate::transport::ApiClient;

/// Remote service that owns background jobs.
///
/// Implementations include:
/// - `HttpJobService`: the server's REST job API
/// - in-memory fakes, used by the status controller tests
#[async_trait]
pub trait JobService: Send + Sync {
    /// Jobs of one type, in whatever order the service keeps them.
    async fn get_jobs_by_type(&self, job_type: &JobType) -> Result<Vec<Job>, ClientError>;

    /// Schedule a new job and return it as stored by the service.
    async fn create_job(&self, job: &NewJob) -> Result<Job, ClientError>;

    /// Ask the service to cancel a pending or running job.
    async fn cancel_job(&self, job_id: &str) -> Result<(), ClientError>;
}

pub struct HttpJobService {
    client: Arc<ApiClient>,
    per_page: u32,
}

impl HttpJobService {
    pub fn new(client: Arc<ApiClient>, per_page: u32) -> Self {
        Self { client, per_page }
    }
}

#[async_trait]
impl JobService for HttpJobService {
    async fn get_jobs_by_type(&self, job_type: &JobType) -> Result<Vec<Job>, ClientError> {
        let path = format!("/api/v4/jobs/type/{}", urlencoding::encode(job_type.as_str()));
        let query = [("page", "0".to_string()), ("per_page", self.per_page.to_string())];
        self.client.get_json(&path, &query).await
    }

    async fn create_job(&self, job: &NewJob) -> Result<Job, ClientError> {
        self.client.post_json("/api/v4/jobs", job).await
    }

    async fn cancel_job(&self, job_id: &str) -> Result<(), ClientError> {
        let path = format!("/api/v4/jobs/{}/cancel", urlencoding::encode(job_id));
        self.client.post_empty(&path).await
    }
}
