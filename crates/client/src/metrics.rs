// crates/client/src/metrics.rs
//! Client-side metrics.
//!
//! Recorded through the `metrics` facade. Nothing is exported unless the
//! embedding application installs a recorder; without one every call is a no-op.

use metrics::{counter, describe_counter, describe_gauge, gauge};

/// Describe all client metrics. Call once after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(
        "jobwatch_polls_total",
        "Job list refreshes, labelled by outcome (success/error)"
    );
    describe_counter!(
        "jobwatch_job_actions_total",
        "Create/cancel requests, labelled by action and outcome"
    );
    describe_gauge!(
        "jobwatch_connection_up",
        "1 while the job service is reachable, 0 after a transport failure"
    );
}

/// Record a completed refresh.
pub fn record_poll(outcome: &'static str) {
    counter!("jobwatch_polls_total", "outcome" => outcome).increment(1);
}

/// Record a create or cancel request.
pub fn record_job_action(action: &'static str, outcome: &'static str) {
    counter!("jobwatch_job_actions_total", "action" => action, "outcome" => outcome).increment(1);
}

pub fn record_connection(up: bool) {
    gauge!("jobwatch_connection_up").set(if up { 1.0 } else { 0.0 });
}
