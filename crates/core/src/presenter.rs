// crates/core/src/presenter.rs
//! Maps the chosen job and view flags to user-facing status text and button state.
//!
//! Everything here is a pure function of its inputs and is recomputed on every
//! state change.

use std::fmt;

use jobwatch_types::{Job, JobStatus};
use serde::Serialize;

pub const MSG_LOADING: &str = "Loading...";
pub const MSG_NO_JOBS: &str = "No indexing jobs queued.";
pub const MSG_PENDING: &str = "Job pending.";
pub const MSG_SUCCESS: &str = "Indexing complete.";
pub const MSG_CANCEL_REQUESTED: &str = "Canceling Job...";
pub const MSG_CANCELED: &str = "Indexing job cancelled.";

/// Local flags owned by the status controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewFlags {
    /// True until the first refresh completes.
    pub loading: bool,
    /// True between a cancel request and the refresh that follows it.
    pub cancel_in_progress: bool,
    /// Whether the backing search engine is configured at all.
    pub is_configured: bool,
}

impl Default for ViewFlags {
    fn default() -> Self {
        Self {
            loading: true,
            cancel_in_progress: false,
            is_configured: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonLabel {
    Ready,
    InProgress,
}

impl ButtonLabel {
    pub fn text(self) -> &'static str {
        match self {
            ButtonLabel::Ready => "Build Index",
            ButtonLabel::InProgress => "Indexing in progress",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HelpText {
    BuildIndex,
    CancelIndexing,
}

impl HelpText {
    pub fn text(self) -> &'static str {
        match self {
            HelpText::BuildIndex => {
                "All posts in the database will be indexed from oldest to newest. \
                 Elasticsearch is available during indexing but search results may be \
                 incomplete until the indexing job is complete."
            }
            HelpText::CancelIndexing => {
                "Cancelling stops the indexing job and removes it from the queue. \
                 Posts that have already been indexed will not be deleted."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexButton {
    pub disabled: bool,
    pub label: ButtonLabel,
    pub help: HelpText,
}

/// Everything a front end needs to draw the indexing status panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub message: String,
    pub index_button: IndexButton,
    pub cancel_visible: bool,
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status: {}", self.message)
    }
}

/// Status line for the chosen job. `loading` only matters when nothing is chosen.
pub fn status_message(chosen: Option<&Job>, loading: bool) -> String {
    let Some(job) = chosen else {
        return if loading { MSG_LOADING } else { MSG_NO_JOBS }.to_string();
    };

    match &job.status {
        JobStatus::Pending => MSG_PENDING.to_string(),
        JobStatus::InProgress => format!("Job in progress. {}% complete.", job.percent()),
        JobStatus::Success => MSG_SUCCESS.to_string(),
        JobStatus::Error => format!("Indexing failed: {}", job.error_message()),
        JobStatus::CancelRequested => MSG_CANCEL_REQUESTED.to_string(),
        JobStatus::Canceled => MSG_CANCELED.to_string(),
        JobStatus::Unknown(_) => String::new(),
    }
}

/// Build the full view for the chosen job.
pub fn present(chosen: Option<&Job>, flags: ViewFlags) -> StatusView {
    let mut index_button = IndexButton {
        disabled: !flags.is_configured,
        label: ButtonLabel::Ready,
        help: HelpText::BuildIndex,
    };
    let mut cancel_visible = false;

    if flags.loading {
        index_button.disabled = true;
    } else if let Some(job) = chosen {
        if job.status.is_active() {
            index_button.disabled = true;
            index_button.label = ButtonLabel::InProgress;
            index_button.help = HelpText::CancelIndexing;
        }
        cancel_visible = !flags.cancel_in_progress && job.status.is_cancellable();
    }

    let message = if flags.loading {
        MSG_LOADING.to_string()
    } else {
        status_message(chosen, false)
    };

    StatusView {
        message,
        index_button,
        cancel_visible,
    }
}

/// Message shown when scheduling a new index job fails.
pub fn create_error_message(error: &str) -> String {
    format!("Failed to schedule Bulk Index Job: {error}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::choose_job;
    use jobwatch_types::JobType;
    use pretty_assertions::assert_eq;

    fn job(status: JobStatus) -> Job {
        Job::new("j", JobType::default(), status)
    }

    fn ready() -> ViewFlags {
        ViewFlags {
            loading: false,
            ..ViewFlags::default()
        }
    }

    #[test]
    fn test_messages_for_every_status() {
        let cases = [
            (job(JobStatus::Pending), "Job pending."),
            (
                job(JobStatus::InProgress).with_progress(42),
                "Job in progress. 42% complete.",
            ),
            (job(JobStatus::Success), "Indexing complete."),
            (
                job(JobStatus::Error).with_error("node unreachable"),
                "Indexing failed: node unreachable",
            ),
            (job(JobStatus::CancelRequested), "Canceling Job..."),
            (job(JobStatus::Canceled), "Indexing job cancelled."),
        ];
        for (job, expected) in cases {
            assert_eq!(status_message(Some(&job), false), expected);
            assert_eq!(present(Some(&job), ready()).message, expected);
        }
    }

    #[test]
    fn test_messages_without_chosen_job() {
        assert_eq!(status_message(None, true), "Loading...");
        assert_eq!(status_message(None, false), "No indexing jobs queued.");
    }

    #[test]
    fn test_error_without_data_renders_empty_reason() {
        assert_eq!(status_message(Some(&job(JobStatus::Error)), false), "Indexing failed: ");
    }

    #[test]
    fn test_loading_view() {
        let view = present(None, ViewFlags::default());
        assert_eq!(view.message, "Loading...");
        assert!(view.index_button.disabled);
        assert_eq!(view.index_button.label, ButtonLabel::Ready);
        assert!(!view.cancel_visible);
        assert_eq!(view.to_string(), "Status: Loading...");
    }

    #[test]
    fn test_empty_list_not_loading() {
        let jobs: Vec<Job> = Vec::new();
        let view = present(choose_job(&jobs), ready());
        assert_eq!(view.message, "No indexing jobs queued.");
        assert!(!view.index_button.disabled);
        assert!(!view.cancel_visible);
    }

    #[test]
    fn test_in_progress_scenario() {
        let jobs = vec![
            job(JobStatus::Success),
            Job::new("running", JobType::default(), JobStatus::InProgress).with_progress(42),
        ];
        let chosen = choose_job(&jobs);
        assert_eq!(chosen.map(|j| j.id.as_str()), Some("running"));

        let view = present(chosen, ready());
        assert_eq!(
            view,
            StatusView {
                message: "Job in progress. 42% complete.".into(),
                index_button: IndexButton {
                    disabled: true,
                    label: ButtonLabel::InProgress,
                    help: HelpText::CancelIndexing,
                },
                cancel_visible: true,
            }
        );
    }

    #[test]
    fn test_success_scenario_has_no_cancel_button() {
        let jobs = vec![job(JobStatus::Success)];
        let view = present(choose_job(&jobs), ready());
        assert_eq!(view.message, "Indexing complete.");
        assert!(!view.cancel_visible);
        assert!(!view.index_button.disabled);
        assert_eq!(view.index_button.label, ButtonLabel::Ready);
        assert_eq!(view.index_button.help, HelpText::BuildIndex);
    }

    #[test]
    fn test_unconfigured_disables_button() {
        let flags = ViewFlags {
            is_configured: false,
            ..ready()
        };
        let view = present(Some(&job(JobStatus::Success)), flags);
        assert!(view.index_button.disabled);
        assert_eq!(view.index_button.label, ButtonLabel::Ready);
    }

    #[test]
    fn test_active_statuses_switch_button() {
        for status in [JobStatus::Pending, JobStatus::InProgress, JobStatus::CancelRequested] {
            let view = present(Some(&job(status.clone())), ready());
            assert!(view.index_button.disabled, "{status} should disable the button");
            assert_eq!(view.index_button.label, ButtonLabel::InProgress);
            assert_eq!(view.index_button.help, HelpText::CancelIndexing);
        }
        for status in [JobStatus::Success, JobStatus::Error, JobStatus::Canceled] {
            let view = present(Some(&job(status.clone())), ready());
            assert!(!view.index_button.disabled, "{status} should enable the button");
        }
    }

    #[test]
    fn test_cancel_hidden_while_cancel_in_progress() {
        let flags = ViewFlags {
            cancel_in_progress: true,
            ..ready()
        };
        let view = present(Some(&job(JobStatus::InProgress)), flags);
        assert!(!view.cancel_visible);

        let view = present(Some(&job(JobStatus::Pending)), ready());
        assert!(view.cancel_visible);

        let view = present(Some(&job(JobStatus::CancelRequested)), ready());
        assert!(!view.cancel_visible);
    }

    #[test]
    fn test_create_error_message() {
        assert_eq!(
            create_error_message("license expired"),
            "Failed to schedule Bulk Index Job: license expired"
        );
    }

    #[test]
    fn test_button_texts() {
        assert_eq!(ButtonLabel::Ready.text(), "Build Index");
        assert_eq!(ButtonLabel::InProgress.text(), "Indexing in progress");
        assert!(HelpText::CancelIndexing.text().starts_with("Cancelling stops"));
    }
}
