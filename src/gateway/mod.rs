//! HTTP gateway: every outbound request passes through here.
//!
//! Request phase attaches the bearer token from session state. Response phase
//! classifies the application-level envelope status (distinct from the
//! transport status) into success, session-expired, or application error.
//! Transport failures are classified for user messaging (timeout, network,
//! offline) and may themselves invalidate the session on 401/403.
//!
//! Side effects here are global: an expired session clears the token and
//! redirects the whole console to the login boundary, regardless of what the
//! initiating caller does with the returned error.

pub mod status;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::bridge::Bridge;
use crate::config::{ApiConfig, PathsConfig};
use crate::error::{ConsoleError, Result, TransportKind};
use crate::session::SessionStore;

/// Envelope statuses accepted as success
pub const STATUS_SUCCESS: i64 = 200;
pub const STATUS_SUCCESS_ALT: i64 = 0;
/// Session expired / not authenticated
pub const STATUS_OVERDUE: i64 = 401;
/// Forbidden; treated as session expiry like 401
pub const STATUS_FORBIDDEN: i64 = 403;

/// Application-level response envelope. `status` and `message` accept both
/// wire spellings (`status`/`code`, `message`/`msg`) seen across endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default, alias = "code")]
    pub status: i64,
    #[serde(default, alias = "msg")]
    pub message: String,
    pub data: Option<T>,
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS || self.status == STATUS_SUCCESS_ALT
    }

    pub fn is_expired(&self) -> bool {
        self.status == STATUS_OVERDUE || self.status == STATUS_FORBIDDEN
    }

    /// Unwrap the payload, treating an absent body on success as an error
    pub fn into_data(self) -> Result<T> {
        let status = self.status;
        self.data.ok_or(ConsoleError::Application {
            status,
            message: "response envelope carried no data".to_string(),
        })
    }
}

pub struct Gateway {
    client: reqwest::Client,
    base_url: Url,
    session: SessionStore,
    bridge: Arc<dyn Bridge>,
    login_path: String,
    offline_path: String,
}

impl Gateway {
    pub fn new(
        api: &ApiConfig,
        paths: &PathsConfig,
        session: SessionStore,
        bridge: Arc<dyn Bridge>,
    ) -> Result<Self> {
        let base_url = Url::parse(&api.base_url)
            .map_err(|_| ConsoleError::InvalidBaseUrl(api.base_url.clone()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(api.timeout_ms))
            .gzip(true)
            .build()
            .map_err(|e| ConsoleError::Transport {
                kind: TransportKind::Network,
                source: e,
            })?;
        Ok(Self {
            client,
            base_url,
            session,
            bridge,
            login_path: paths.login.clone(),
            offline_path: paths.offline.clone(),
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>> {
        self.request(Method::GET, path, None::<&()>).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Envelope<T>> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Envelope<T>> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>> {
        self.request(Method::DELETE, path, None::<&()>).await
    }

    pub async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Envelope<T>> {
        let url = self
            .base_url
            .join(path)
            .map_err(|_| ConsoleError::InvalidBaseUrl(format!("{}{path}", self.base_url)))?;

        let mut request = self.client.request(method.clone(), url);
        // Attach the bearer token when present; an absent token never blocks
        // the request, the server is expected to reject it
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, path, "gateway request");
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Err(self.classify_transport(e)),
        };

        let transport_status = response.status();
        if let Err(e) = response.error_for_status_ref() {
            return Err(self.handle_transport_status(transport_status, e));
        }

        let envelope: Envelope<T> = response.json().await.map_err(ConsoleError::Decode)?;
        self.classify_envelope(envelope)
    }

    /// No response at all: timeout, connection refused, DNS failure
    fn classify_transport(&self, e: reqwest::Error) -> ConsoleError {
        if e.is_timeout() || e.to_string().contains("timeout") {
            self.bridge
                .notify_error("Request timed out", "The request timed out, please retry later");
            return ConsoleError::Transport {
                kind: TransportKind::Timeout,
                source: e,
            };
        }
        if e.is_connect() {
            // Server unreachable: treat as the client being offline
            self.bridge
                .notify_error("Network error", "Could not reach the server");
            self.bridge.redirect(&self.offline_path);
            return ConsoleError::Transport {
                kind: TransportKind::Offline,
                source: e,
            };
        }
        self.bridge
            .notify_error("Network error", "A network error occurred, please retry later");
        ConsoleError::Transport {
            kind: TransportKind::Network,
            source: e,
        }
    }

    /// Non-2xx transport status. 401/403 invalidate the session.
    fn handle_transport_status(&self, code: StatusCode, e: reqwest::Error) -> ConsoleError {
        let code = code.as_u16();
        self.bridge
            .notify_error("Request failed", status::check_status(code));
        if code == 401 || code == 403 {
            self.session.clear_token();
            self.bridge.redirect(&self.login_path);
            return ConsoleError::AuthExpired {
                status: i64::from(code),
                message: status::check_status(code).to_string(),
            };
        }
        ConsoleError::Transport {
            kind: TransportKind::Network,
            source: e,
        }
    }

    /// Application-level classification of a parsed envelope
    fn classify_envelope<T>(&self, envelope: Envelope<T>) -> Result<Envelope<T>> {
        if envelope.is_expired() {
            self.bridge.notify_error("Session expired", &envelope.message);
            self.session.clear_token();
            self.bridge.redirect(&self.login_path);
            return Err(ConsoleError::AuthExpired {
                status: envelope.status,
                message: envelope.message,
            });
        }
        if !envelope.is_success() {
            self.bridge.notify_error("Request rejected", &envelope.message);
            return Err(ConsoleError::Application {
                status: envelope.status,
                message: envelope.message,
            });
        }
        Ok(envelope)
    }
}
