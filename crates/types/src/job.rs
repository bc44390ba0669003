// crates/types/src/job.rs
//! Wire model for background jobs as reported by the job service.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a background job.
///
/// Serialized as the service's snake_case strings. Statuses this client does
/// not know about survive a round-trip through [`JobStatus::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    InProgress,
    Success,
    Error,
    CancelRequested,
    Canceled,
    Unknown(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::InProgress => "in_progress",
            JobStatus::Success => "success",
            JobStatus::Error => "error",
            JobStatus::CancelRequested => "cancel_requested",
            JobStatus::Canceled => "canceled",
            JobStatus::Unknown(raw) => raw,
        }
    }

    /// Whether the job still occupies the queue: pending, running, or
    /// waiting for a cancel to land.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            JobStatus::Pending | JobStatus::InProgress | JobStatus::CancelRequested
        )
    }

    /// Whether the job can still be cancelled by the user.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::InProgress)
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => JobStatus::Pending,
            "in_progress" => JobStatus::InProgress,
            "success" => JobStatus::Success,
            "error" => JobStatus::Error,
            "cancel_requested" => JobStatus::CancelRequested,
            "canceled" => JobStatus::Canceled,
            _ => JobStatus::Unknown(raw),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Unknown(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of background work, e.g. `elasticsearch_post_indexing`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobType(String);

impl JobType {
    pub const ELASTICSEARCH_POST_INDEXING: &'static str = "elasticsearch_post_indexing";
    pub const DATA_RETENTION: &'static str = "data_retention";
    pub const MESSAGE_EXPORT: &'static str = "message_export";
    pub const LDAP_SYNC: &'static str = "ldap_sync";
    pub const MIGRATIONS: &'static str = "migrations";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn elasticsearch_post_indexing() -> Self {
        Self::new(Self::ELASTICSEARCH_POST_INDEXING)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobType {
    fn default() -> Self {
        Self::elasticsearch_post_indexing()
    }
}

impl From<&str> for JobType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for JobType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-form job payload. Only `error` has meaning to this client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Read-only snapshot of a job owned by the job service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    #[serde(default)]
    pub priority: i64,
    /// Creation time, milliseconds since the Unix epoch.
    #[serde(default)]
    pub create_at: i64,
    #[serde(default)]
    pub start_at: i64,
    #[serde(default)]
    pub last_activity_at: i64,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JobData>,
}

impl Job {
    pub fn new(id: impl Into<String>, job_type: JobType, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            job_type,
            priority: 0,
            create_at: 0,
            start_at: 0,
            last_activity_at: 0,
            status,
            progress: 0,
            data: None,
        }
    }

    pub fn with_progress(mut self, progress: i64) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_create_at(mut self, create_at: i64) -> Self {
        self.create_at = create_at;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.data.get_or_insert_with(JobData::default).error = Some(error.into());
        self
    }

    /// Completion percentage clamped to `0..=100`.
    pub fn percent(&self) -> u8 {
        self.progress.clamp(0, 100) as u8
    }

    /// Error recorded by the worker, or `""` when there is none.
    pub fn error_message(&self) -> &str {
        self.data
            .as_ref()
            .and_then(|d| d.error.as_deref())
            .unwrap_or("")
    }
}

/// Request body for scheduling a new job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJob {
    #[serde(rename = "type")]
    pub job_type: JobType,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

impl NewJob {
    pub fn of_type(job_type: JobType) -> Self {
        Self {
            job_type,
            data: BTreeMap::new(),
        }
    }
}
