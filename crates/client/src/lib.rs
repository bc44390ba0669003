// crates/client/src/lib.rs
//! Client for background indexing jobs.
//!
//! Polls a job service, picks the job that represents the current indexing
//! state, renders it as a status view, and issues create/cancel requests.

pub mod analytics;
pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod service;
pub mod status;
pub mod transport;

pub use analytics::{Analytics, AnalyticsPort, NoopAnalytics, TracingAnalytics};
pub use config::ClientConfig;
pub use error::{ClientError, ConfigError};
pub use service::{HttpJobService, JobService};
pub use status::{StatusHandle, StatusSettings, StatusSnapshot, StatusState};
pub use transport::{ApiClient, SessionEvent};
