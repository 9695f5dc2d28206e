//! Process-wide session state: auth token, user profile, UI preferences.
//!
//! State is owned by [`SessionStore`] and mutated only through its methods.
//! Invariant: `token` absent means unauthenticated, and the navigation guard
//! will not let an unauthenticated session past the login boundary.

pub mod storage;
pub mod tabs;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::storage::StateFile;
use crate::session::tabs::TabItem;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, alias = "fullname")]
    pub display_name: String,
    #[serde(default)]
    pub avatar: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Column,
    Row,
}

/// UI preference block; survives logout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub layout: LayoutMode,
    pub is_collapse: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            layout: LayoutMode::Column,
            is_collapse: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub user: UserProfile,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub tabs: Vec<TabItem>,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

/// Shared handle on session state. Cloning is cheap; all clones see the same
/// state. When opened against a [`StateFile`], every mutation is written back
/// so a new process rehydrates where the last one left off.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<SessionState>>,
    file: Option<StateFile>,
}

impl SessionStore {
    /// Volatile store, nothing written to disk. Used by tests and embedders
    /// that handle persistence themselves.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionState::default())),
            file: None,
        }
    }

    /// Open against a state file, rehydrating whatever was persisted
    pub fn open(file: StateFile) -> Self {
        let state = file.load();
        Self {
            inner: Arc::new(RwLock::new(state)),
            file: Some(file),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Run a mutation and persist the result
    fn mutate(&self, f: impl FnOnce(&mut SessionState)) {
        {
            let mut state = self.write();
            f(&mut state);
            state.saved_at = Some(Utc::now());
        }
        self.persist();
    }

    fn persist(&self) {
        if let Some(file) = &self.file {
            let state = self.read().clone();
            if let Err(e) = file.save(&state) {
                tracing::error!("failed to persist session state: {}", e);
            }
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        self.mutate(|s| {
            s.token = if token.is_empty() { None } else { Some(token) };
        });
    }

    pub fn clear_token(&self) {
        self.mutate(|s| s.token = None);
    }

    pub fn api_token(&self) -> Option<String> {
        self.read().api_token.clone()
    }

    pub fn set_api_token(&self, token: impl Into<String>) {
        let token = token.into();
        self.mutate(|s| {
            s.api_token = if token.is_empty() { None } else { Some(token) };
        });
    }

    pub fn user(&self) -> UserProfile {
        self.read().user.clone()
    }

    pub fn set_user(&self, user: UserProfile) {
        self.mutate(|s| s.user = user);
    }

    pub fn set_language(&self, language: impl Into<String>) {
        self.mutate(|s| s.language = Some(language.into()));
    }

    pub fn set_layout(&self, layout: LayoutConfig) {
        self.mutate(|s| s.layout = layout);
    }

    /// Clear auth fields entry-by-entry; UI preferences (language, layout,
    /// tabs) are deliberately retained.
    pub fn logout(&self) {
        self.mutate(|s| {
            s.token = None;
            s.api_token = None;
            s.user = UserProfile::default();
        });
    }

    // Tab strip operations; see session::tabs for the semantics

    pub fn tabs(&self) -> Vec<TabItem> {
        self.read().tabs.clone()
    }

    pub fn add_tab(&self, tab: TabItem) {
        self.mutate(|s| tabs::add_tab(&mut s.tabs, tab));
    }

    pub fn set_tabs(&self, new_tabs: Vec<TabItem>) {
        self.mutate(|s| s.tabs = new_tabs);
    }

    pub fn remove_tab(&self, path: &str, is_current: bool) -> Option<String> {
        let mut next = None;
        self.mutate(|s| next = tabs::remove_tab(&mut s.tabs, path, is_current));
        next
    }

    pub fn close_multiple_tabs(&self, keep_path: Option<&str>) {
        self.mutate(|s| tabs::close_multiple(&mut s.tabs, keep_path));
    }

    pub fn close_left_tabs(&self, path: &str) {
        self.mutate(|s| tabs::close_left(&mut s.tabs, path));
    }

    pub fn close_right_tabs(&self, path: &str) {
        self.mutate(|s| tabs::close_right(&mut s.tabs, path));
    }

    pub fn set_tab_title(&self, path: &str, title: &str) {
        self.mutate(|s| tabs::set_tab_title(&mut s.tabs, path, title));
    }
}
