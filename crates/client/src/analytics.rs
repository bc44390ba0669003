// crates/client/src/analytics.rs
//! Analytics port.
//!
//! Callers never talk to an analytics backend directly; they go through
//! [`Analytics`], which holds an optional [`AnalyticsPort`] and the configured
//! developer key. A missing port is a silent no-op.
//!
//! Two event families exist:
//! - legacy `deprecated_track` / `deprecated_track_page`, forwarded only when a
//!   developer key is configured;
//! - diagnostics `track_event`, disabled when a developer key is configured
//!   (the two pipelines are mutually exclusive).

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

pub type Properties = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackContext {
    pub ip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageContext {
    pub path: String,
    pub referrer: String,
    pub search: String,
    pub title: String,
    pub url: String,
}

/// Per-event options. Diagnostics events send an anonymised context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackOptions {
    pub context: TrackContext,
    pub page: PageContext,
}

impl TrackOptions {
    pub fn anonymous() -> Self {
        Self {
            context: TrackContext {
                ip: "0.0.0.0".into(),
            },
            page: PageContext::default(),
        }
    }
}

/// Capability interface of an analytics backend.
pub trait AnalyticsPort: Send + Sync {
    fn track(&self, event: &str, properties: Properties, options: Option<TrackOptions>);
    fn page(&self);
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAnalytics;

impl AnalyticsPort for NoopAnalytics {
    fn track(&self, _event: &str, _properties: Properties, _options: Option<TrackOptions>) {}
    fn page(&self) {}
}

/// Emits events as structured log records under the `jobwatch::analytics` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalytics;

impl AnalyticsPort for TracingAnalytics {
    fn track(&self, event: &str, properties: Properties, options: Option<TrackOptions>) {
        let properties = Value::Object(properties);
        let options = options
            .and_then(|o| serde_json::to_value(o).ok())
            .unwrap_or(Value::Null);
        tracing::info!(
            target: "jobwatch::analytics",
            event,
            properties = %properties,
            options = %options,
            "track"
        );
    }

    fn page(&self) {
        tracing::info!(target: "jobwatch::analytics", "page");
    }
}

#[derive(Clone, Default)]
pub struct Analytics {
    port: Option<Arc<dyn AnalyticsPort>>,
    developer_key: Option<String>,
}

impl Analytics {
    pub fn new(port: Option<Arc<dyn AnalyticsPort>>, developer_key: Option<String>) -> Self {
        Self {
            port,
            developer_key: developer_key.filter(|k| !k.is_empty()),
        }
    }

    /// No port, no key: every call is a no-op.
    pub fn disabled() -> Self {
        Self::default()
    }

    fn has_developer_key(&self) -> bool {
        self.developer_key.is_some()
    }

    pub fn deprecated_track(
        &self,
        category: &str,
        action: &str,
        label: &str,
        property: &str,
        value: &str,
    ) {
        if !self.has_developer_key() {
            return;
        }
        let Some(port) = &self.port else { return };

        let mut properties = Properties::new();
        properties.insert("category".into(), category.into());
        properties.insert("label".into(), label.into());
        properties.insert("property".into(), property.into());
        properties.insert("value".into(), value.into());
        port.track(action, properties, None);
    }

    pub fn deprecated_track_page(&self) {
        if !self.has_developer_key() {
            return;
        }
        if let Some(port) = &self.port {
            port.page();
        }
    }

    /// Diagnostics event. Extra `props` override `category`/`type` on key clashes.
    pub fn track_event(&self, category: &str, event: &str, props: Properties) {
        if self.has_developer_key() {
            return;
        }
        let Some(port) = &self.port else { return };

        let mut properties = Properties::new();
        properties.insert("category".into(), category.into());
        properties.insert("type".into(), event.into());
        properties.extend(props);
        port.track("event", properties, Some(TrackOptions::anonymous()));
    }
}

impl std::fmt::Debug for Analytics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analytics")
            .field("port", &self.port.is_some())
            .field("developer_key", &self.developer_key.is_some())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Recorded {
        Track {
            event: String,
            properties: Properties,
            options: Option<TrackOptions>,
        },
        Page,
    }

    #[derive(Default)]
    pub(crate) struct RecordingAnalytics {
        pub(crate) calls: Mutex<Vec<Recorded>>,
    }

    impl RecordingAnalytics {
        pub(crate) fn events(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|c| match c {
                    Recorded::Track { event, .. } => event.clone(),
                    Recorded::Page => "page".into(),
                })
                .collect()
        }
    }

    impl AnalyticsPort for RecordingAnalytics {
        fn track(&self, event: &str, properties: Properties, options: Option<TrackOptions>) {
            self.calls.lock().unwrap().push(Recorded::Track {
                event: event.into(),
                properties,
                options,
            });
        }

        fn page(&self) {
            self.calls.lock().unwrap().push(Recorded::Page);
        }
    }

    fn with_key(key: Option<&str>) -> (Arc<RecordingAnalytics>, Analytics) {
        let recorder = Arc::new(RecordingAnalytics::default());
        let analytics = Analytics::new(
            Some(recorder.clone() as Arc<dyn AnalyticsPort>),
            key.map(String::from),
        );
        (recorder, analytics)
    }

    #[test]
    fn test_deprecated_track_requires_developer_key() {
        let (recorder, analytics) = with_key(None);
        analytics.deprecated_track("api", "api_users_login_success", "", "login_id", "bob");
        analytics.deprecated_track_page();
        assert!(recorder.events().is_empty());

        let (recorder, analytics) = with_key(Some(""));
        analytics.deprecated_track_page();
        assert!(recorder.events().is_empty(), "empty key counts as unset");
    }

    #[test]
    fn test_deprecated_track_forwards_with_key() {
        let (recorder, analytics) = with_key(Some("dev-key"));
        analytics.deprecated_track("api", "api_users_login_success", "", "login_id", "bob");
        analytics.deprecated_track_page();

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        match &calls[0] {
            Recorded::Track {
                event,
                properties,
                options,
            } => {
                assert_eq!(event, "api_users_login_success");
                assert_eq!(properties["category"], "api");
                assert_eq!(properties["property"], "login_id");
                assert_eq!(properties["value"], "bob");
                assert!(options.is_none());
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert_eq!(calls[1], Recorded::Page);
    }

    #[test]
    fn test_track_event_disabled_by_developer_key() {
        let (recorder, analytics) = with_key(Some("dev-key"));
        analytics.track_event("ui", "open_status", Properties::new());
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_track_event_sends_anonymous_options() {
        let (recorder, analytics) = with_key(None);
        let mut props = Properties::new();
        props.insert("job_type".into(), "elasticsearch_post_indexing".into());
        analytics.track_event("admin", "index_requested", props);

        let calls = recorder.calls.lock().unwrap();
        let Recorded::Track {
            event,
            properties,
            options,
        } = &calls[0]
        else {
            panic!("expected a track call");
        };
        assert_eq!(event, "event");
        assert_eq!(properties["category"], "admin");
        assert_eq!(properties["type"], "index_requested");
        assert_eq!(properties["job_type"], "elasticsearch_post_indexing");
        let options = options.as_ref().unwrap();
        assert_eq!(options.context.ip, "0.0.0.0");
        assert_eq!(options.page, PageContext::default());
    }

    #[test]
    fn test_missing_port_is_noop() {
        let analytics = Analytics::new(None, Some("dev-key".into()));
        analytics.deprecated_track("a", "b", "c", "d", "e");
        analytics.deprecated_track_page();
        Analytics::disabled().track_event("a", "b", Properties::new());
    }

    #[test]
    fn test_builtin_ports_accept_events() {
        let mut props = Properties::new();
        props.insert("k".into(), Value::from(1));
        TracingAnalytics.track("event", props.clone(), Some(TrackOptions::anonymous()));
        TracingAnalytics.page();
        NoopAnalytics.track("event", props, None);
        NoopAnalytics.page();
    }
}
