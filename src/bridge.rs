//! Seam between the console core and whatever surface hosts it.
//!
//! The gateway and navigation guard produce user-visible notifications and
//! application-wide redirects as side effects. Hosts plug in by implementing
//! [`Bridge`]; the library never talks to a UI toolkit directly.

use std::sync::Mutex;

pub trait Bridge: Send + Sync {
    /// User-visible error notification (request rejected, session expired, ...)
    fn notify_error(&self, title: &str, message: &str);

    /// User-visible warning (no menu permission, ...)
    fn notify_warn(&self, title: &str, message: &str);

    /// Application-wide redirect request, e.g. back to the login boundary.
    /// Callers of in-flight requests must tolerate this firing mid-call.
    fn redirect(&self, path: &str);
}

/// Default bridge: everything goes to the tracing subscriber
#[derive(Debug, Default)]
pub struct TracingBridge;

impl Bridge for TracingBridge {
    fn notify_error(&self, title: &str, message: &str) {
        tracing::error!(title, "{}", message);
    }

    fn notify_warn(&self, title: &str, message: &str) {
        tracing::warn!(title, "{}", message);
    }

    fn redirect(&self, path: &str) {
        tracing::info!(path, "redirect requested");
    }
}

/// Everything a bridge was asked to do, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    Error { title: String, message: String },
    Warn { title: String, message: String },
    Redirect { path: String },
}

/// Recording bridge for tests and embedders that drain events themselves
#[derive(Debug, Default)]
pub struct MemoryBridge {
    events: Mutex<Vec<BridgeEvent>>,
}

impl MemoryBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BridgeEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn redirects(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                BridgeEvent::Redirect { path } => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                BridgeEvent::Error { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn push(&self, event: BridgeEvent) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).push(event);
    }
}

impl Bridge for MemoryBridge {
    fn notify_error(&self, title: &str, message: &str) {
        self.push(BridgeEvent::Error {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn notify_warn(&self, title: &str, message: &str) {
        self.push(BridgeEvent::Warn {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn redirect(&self, path: &str) {
        self.push(BridgeEvent::Redirect {
            path: path.to_string(),
        });
    }
}
