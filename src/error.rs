// Client-side error taxonomy shared across the gateway, router and session layers
use thiserror::Error;

/// How a transport-level failure should be presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Request exceeded the configured timeout
    Timeout,
    /// Server reachable but the exchange failed
    Network,
    /// Could not reach the server at all (treated as "client offline")
    Offline,
}

/// Errors surfaced to callers of the console core.
///
/// Global side effects (token clearing, login redirect) have already happened
/// by the time one of these reaches the caller; handling the error locally is
/// optional and double-notification is accepted.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Envelope or transport status said the session is no longer valid
    #[error("session expired: {message} (status {status})")]
    AuthExpired { status: i64, message: String },

    /// Server returned an empty menu tree - the account has no console access
    #[error("account has no menu permissions")]
    NoPermission,

    /// Request never produced a usable response
    #[error("transport failure: {source}")]
    Transport {
        kind: TransportKind,
        #[source]
        source: reqwest::Error,
    },

    /// Response body could not be parsed as an envelope
    #[error("malformed response body: {0}")]
    Decode(#[source] reqwest::Error),

    /// Envelope carried a non-success, non-expiry status
    #[error("server rejected request: {message} (status {status})")]
    Application { status: i64, message: String },

    /// A dynamic route was registered twice without an intervening reset
    #[error("route name already registered: {0}")]
    RouteConflict(String),

    /// Navigation target matched nothing in the route table
    #[error("no route matches path: {0}")]
    RouteNotFound(String),

    /// Menu entry referenced a view component nothing was registered for
    #[error("no view registered for component: {0}")]
    ViewUnresolved(String),

    /// Persisted session state could not be read or written
    #[error("state storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Persisted session state was present but unparseable
    #[error("malformed state file: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

impl ConsoleError {
    /// True when the failure already cleared the session and redirected to login
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ConsoleError::AuthExpired { .. })
    }

    pub fn transport_kind(&self) -> Option<TransportKind> {
        match self {
            ConsoleError::Transport { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
