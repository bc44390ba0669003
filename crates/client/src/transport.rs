// crates/client/src/transport.rs
//! HTTP transport for the job API.
//!
//! Every response passes through one classification step so callers see a
//! typed [`ClientError`] and session-level conditions are broadcast once:
//! - no HTTP status (connect/timeout) → connection marked down,
//! - first success after that → connection restored,
//! - MFA-required app error → page reload requested,
//! - 401 outside the login endpoint → user logged out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::metrics;

pub const LOGIN_PATH: &str = "/api/v4/users/login";
pub const MFA_REQUIRED_ID: &str = "api.context.mfa_required.app_error";
pub const LOGIN_REDIRECT: &str = "/login";

/// Session-level conditions detected while talking to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A request failed before the server answered.
    ConnectionLost,
    /// A request succeeded after the connection was marked down.
    Reconnected,
    /// The session token was rejected; the user must log in again.
    LoggedOut { redirect_to: String },
    /// The server demands MFA; the front end has to reload.
    ReloadRequired,
}

/// Error body returned by the server for failed requests.
#[derive(Debug, Default, Deserialize)]
struct AppErrorBody {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    has_connection: AtomicBool,
    events: broadcast::Sender<SessionEvent>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("jobwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let (events, _) = broadcast::channel(32);

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            has_connection: AtomicBool::new(true),
            events,
        })
    }

    /// Subscribe to session-level events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// False between a transport failure and the next successful request.
    pub fn has_connection(&self) -> bool {
        self.has_connection.load(Ordering::Relaxed)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let request = self.http.get(self.url(path)).query(query);
        let body = self.send(path, request).await?;
        decode(path, &body)
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T, ClientError> {
        let request = self.http.post(self.url(path)).json(payload);
        let body = self.send(path, request).await?;
        decode(path, &body)
    }

    /// POST without a body, ignoring whatever the server answers on success.
    pub async fn post_empty(&self, path: &str) -> Result<(), ClientError> {
        let request = self.http.post(self.url(path));
        self.send(path, request).await.map(|_| ())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, path: &str, mut request: RequestBuilder) -> Result<Vec<u8>, ClientError> {
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => return Err(self.handle_transport_error(path, &e)),
        };
        let status = response.status();
        let body = match response.bytes().await {
            Ok(b) => b.to_vec(),
            Err(e) => return Err(self.handle_transport_error(path, &e)),
        };

        if status.is_success() {
            self.handle_success();
            Ok(body)
        } else {
            Err(self.handle_error_status(path, status, &body))
        }
    }

    fn handle_success(&self) {
        if !self.has_connection.swap(true, Ordering::Relaxed) {
            info!(server = %self.base_url, "connection to server restored");
            metrics::record_connection(true);
            let _ = self.events.send(SessionEvent::Reconnected);
        }
    }

    fn handle_transport_error(&self, path: &str, err: &reqwest::Error) -> ClientError {
        warn!(path, error = %err, "request failed before the server answered");
        if self.has_connection.swap(false, Ordering::Relaxed) {
            metrics::record_connection(false);
            let _ = self.events.send(SessionEvent::ConnectionLost);
        }
        ClientError::Transport(err.to_string())
    }

    /// Only a successful call restores a connection marked down.
    fn handle_error_status(&self, path: &str, status: StatusCode, body: &[u8]) -> ClientError {
        let app_error: AppErrorBody = serde_json::from_slice(body).unwrap_or_default();

        if app_error.id.as_deref() == Some(MFA_REQUIRED_ID) {
            warn!(path, "server requires multi-factor authentication");
            let _ = self.events.send(SessionEvent::ReloadRequired);
            return ClientError::MfaRequired;
        }

        if status == StatusCode::UNAUTHORIZED && path != LOGIN_PATH {
            warn!(path, "session rejected, logging out");
            let _ = self.events.send(SessionEvent::LoggedOut {
                redirect_to: LOGIN_REDIRECT.to_string(),
            });
            return ClientError::Unauthorized {
                path: path.to_string(),
            };
        }

        debug!(path, status = status.as_u16(), id = ?app_error.id, "request rejected");
        ClientError::Api {
            status: status.as_u16(),
            message: app_error.message.unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            }),
            id: app_error.id,
        }
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T, ClientError> {
    serde_json::from_slice(body).map_err(|e| ClientError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}
