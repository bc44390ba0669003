// crates/client/src/config.rs
//! Client configuration, read from CLI flags with environment fallbacks.

use std::time::Duration;

use clap::{ArgAction, Args};
use jobwatch_types::JobType;
use reqwest::Url;

use crate::error::ConfigError;
use crate::status::StatusSettings;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8065";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PER_PAGE: u32 = 100;
const MAX_PER_PAGE: u32 = 200;

#[derive(Debug, Clone, Args)]
pub struct ClientConfig {
    /// Base URL of the server hosting the job API.
    #[arg(long, env = "JOBWATCH_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Session or personal access token sent as a bearer token.
    #[arg(long, env = "JOBWATCH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Job type to watch.
    #[arg(long, env = "JOBWATCH_JOB_TYPE", default_value = JobType::ELASTICSEARCH_POST_INDEXING)]
    pub job_type: String,

    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    pub poll_interval_secs: u64,

    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Jobs fetched per refresh.
    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: u32,

    /// Analytics developer key. Legacy page/track calls are only forwarded when set.
    #[arg(long, env = "JOBWATCH_SEGMENT_KEY", hide_env_values = true)]
    pub segment_key: Option<String>,

    /// Whether the search backend is configured; `false` keeps the index button disabled.
    #[arg(long, env = "JOBWATCH_CONFIGURED", default_value_t = true, action = ArgAction::Set)]
    pub configured: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            token: None,
            job_type: JobType::ELASTICSEARCH_POST_INDEXING.into(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            per_page: DEFAULT_PER_PAGE,
            segment_key: None,
            configured: true,
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.server_url).map_err(|e| ConfigError::InvalidServerUrl {
            url: self.server_url.clone(),
            message: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroRequestTimeout);
        }
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(ConfigError::InvalidPageSize(self.per_page));
        }
        if self.job_type.trim().is_empty() {
            return Err(ConfigError::EmptyJobType);
        }
        Ok(())
    }

    pub fn job_type(&self) -> JobType {
        JobType::new(self.job_type.trim())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Empty keys count as unset.
    pub fn segment_key(&self) -> Option<&str> {
        self.segment_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn status_settings(&self) -> StatusSettings {
        StatusSettings {
            job_type: self.job_type(),
            poll_interval: self.poll_interval(),
            is_configured: self.configured,
        }
    }
}
