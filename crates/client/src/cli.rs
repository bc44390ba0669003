// crates/client/src/cli.rs
//! `jobwatch` command line: argument definitions and command dispatch.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jobwatch_core::create_error_message;
use jobwatch_observability::{init_tracing, LogConfig, LogFormat};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::analytics::{Analytics, AnalyticsPort, TracingAnalytics};
use crate::config::ClientConfig;
use crate::metrics;
use crate::service::HttpJobService;
use crate::status::{StatusHandle, StatusSnapshot};
use crate::transport::{ApiClient, SessionEvent};

#[derive(Parser, Debug)]
#[command(name = "jobwatch")]
#[command(about = "Watch, schedule and cancel background indexing jobs")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,

    #[command(flatten)]
    pub client: ClientConfig,

    /// Stderr log format: compact or json.
    #[arg(long, global = true, default_value = "compact")]
    pub log_format: LogFormat,

    /// Also write JSON logs to this file, rotated daily.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the current indexing status once.
    Status {
        /// Give up if the first refresh takes longer than this.
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
    /// Print every status change until interrupted.
    Watch,
    /// Schedule a new index job.
    Create,
    /// Cancel the job currently shown.
    Cancel,
    /// Print the ordered job list as JSON.
    Jobs,
}

impl Cli {
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            format: self.log_format,
            file: self.log_file.clone(),
        }
    }
}

pub async fn dispatch(cli: Cli) -> Result<ExitCode> {
    let _guard = init_tracing(&cli.log_config())?;
    cli.client.validate()?;
    metrics::describe_metrics();

    let api = Arc::new(
        ApiClient::new(
            &cli.client.server_url,
            cli.client.token.clone(),
            cli.client.request_timeout(),
        )
        .context("building API client")?,
    );
    tokio::spawn(log_session_events(api.subscribe()));

    let service = Arc::new(HttpJobService::new(api, cli.client.per_page));
    let analytics = Analytics::new(
        Some(Arc::new(TracingAnalytics) as Arc<dyn AnalyticsPort>),
        cli.client.segment_key().map(str::to_owned),
    );
    analytics.deprecated_track_page();

    let handle = StatusHandle::mount(service, analytics, cli.client.status_settings());
    let code = run(&handle, &cli.cmd).await;
    handle.unmount().await;
    code
}

async fn run(handle: &StatusHandle, cmd: &Command) -> Result<ExitCode> {
    match cmd {
        Command::Status { timeout_secs } => {
            let snap = tokio::time::timeout(Duration::from_secs(*timeout_secs), first_refresh(handle))
                .await
                .context("timed out waiting for job status")??;
            println!("{}", snap.view);
            Ok(ExitCode::SUCCESS)
        }
        Command::Watch => watch(handle).await,
        Command::Create => {
            first_refresh(handle).await?;
            match handle.create_index_job().await {
                Ok(job) => {
                    println!("{}", job.id);
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("{}", create_error_message(&err.to_string()));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Cancel => {
            first_refresh(handle).await?;
            match handle.cancel_index_job().await? {
                Some(job) => println!("Cancel requested for job {}", job.id),
                None => println!("No job to cancel"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Jobs => {
            first_refresh(handle).await?;
            println!("{}", serde_json::to_string_pretty(&handle.state().jobs)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Wait for the first refresh and fail if it could not fetch jobs, so an
/// unreachable server is not reported as an empty queue.
async fn first_refresh(handle: &StatusHandle) -> Result<StatusSnapshot> {
    let snapshot = handle.ready().await?;
    if let Some(err) = handle.state().last_error {
        anyhow::bail!("failed to fetch jobs: {err}");
    }
    Ok(snapshot)
}

async fn watch(handle: &StatusHandle) -> Result<ExitCode> {
    let mut rx = handle.subscribe();
    let mut last_line = String::new();
    loop {
        let line = rx.borrow_and_update().view.to_string();
        if line != last_line {
            println!("{line}");
            last_line = line;
        }
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping watch");
                break;
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn log_session_events(mut rx: broadcast::Receiver<SessionEvent>) {
    loop {
        match rx.recv().await {
            Ok(SessionEvent::ConnectionLost) => warn!("lost connection to server"),
            Ok(SessionEvent::Reconnected) => info!("reconnected to server"),
            Ok(SessionEvent::LoggedOut { redirect_to }) => {
                warn!(redirect_to = %redirect_to, "session expired, log in again")
            }
            Ok(SessionEvent::ReloadRequired) => warn!("server requested a reload"),
            Err(broadcast::error::RecvError::Lagged(n)) => debug!(skipped = n, "session events lagged"),
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::status::fake::FakeJobService;
    use crate::status::StatusSettings;
    use jobwatch_types::{Job, JobStatus, JobType};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_status_with_defaults() {
        let cli = Cli::try_parse_from(["jobwatch", "status"]).unwrap();
        assert_eq!(cli.cmd, Command::Status { timeout_secs: 30 });
        assert_eq!(cli.log_format, LogFormat::Compact);
        assert!(cli.log_file.is_none());
        assert_eq!(cli.client.poll_interval_secs, 15);
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "jobwatch",
            "--server-url",
            "https://chat.example.com",
            "watch",
            "--log-format",
            "json",
            "--log-file",
            "/tmp/jobwatch.log",
        ])
        .unwrap();
        assert_eq!(cli.cmd, Command::Watch);
        let log = cli.log_config();
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(log.file, Some(PathBuf::from("/tmp/jobwatch.log")));
        assert_eq!(cli.client.server_url, "https://chat.example.com");
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        assert!(Cli::try_parse_from(["jobwatch", "--log-format", "xml", "jobs"]).is_err());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["jobwatch"]).is_err());
    }

    fn unreachable_server() -> StatusHandle {
        let service = Arc::new(FakeJobService::default());
        *service.fetch_error.lock().unwrap() =
            Some(ClientError::Transport("connection refused".into()));
        StatusHandle::mount(service, Analytics::disabled(), StatusSettings::default())
    }

    #[tokio::test]
    async fn test_status_fails_when_first_refresh_fails() {
        let handle = unreachable_server();
        let err = run(&handle, &Command::Status { timeout_secs: 5 })
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to fetch jobs: Network error: connection refused"
        );
        handle.unmount().await;
    }

    #[tokio::test]
    async fn test_actions_not_sent_when_first_refresh_fails() {
        let service = Arc::new(FakeJobService::with_jobs(vec![Job::new(
            "p",
            JobType::default(),
            JobStatus::Pending,
        )]));
        *service.fetch_error.lock().unwrap() =
            Some(ClientError::Transport("connection refused".into()));
        let handle = StatusHandle::mount(service.clone(), Analytics::disabled(), StatusSettings::default());

        assert!(run(&handle, &Command::Create).await.is_err());
        assert!(run(&handle, &Command::Cancel).await.is_err());
        assert!(run(&handle, &Command::Jobs).await.is_err());
        assert!(service.created.lock().unwrap().is_empty());
        assert!(service.cancelled_ids.lock().unwrap().is_empty());
        handle.unmount().await;
    }

    #[tokio::test]
    async fn test_status_succeeds_with_reachable_server() {
        let service = Arc::new(FakeJobService::default());
        let handle = StatusHandle::mount(service, Analytics::disabled(), StatusSettings::default());
        let code = run(&handle, &Command::Status { timeout_secs: 5 }).await.unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        handle.unmount().await;
    }
}
