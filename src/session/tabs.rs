//! Tab strip bookkeeping. Tabs are part of persisted session state but are UI
//! preference data: they survive logout.

use serde::{Deserialize, Serialize};

pub const HOME_TAB_NAME: &str = "home";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabItem {
    pub icon: String,
    pub title: String,
    pub path: String,
    pub name: String,
    /// Whether the tab shows a close control (the home tab does not)
    pub close: bool,
}

/// Append unless a tab with the same path already exists
pub fn add_tab(tabs: &mut Vec<TabItem>, tab: TabItem) {
    if tabs.iter().all(|t| t.path != tab.path) {
        tabs.push(tab);
    }
}

/// Remove a tab by path. When the removed tab is the current one, returns the
/// neighbor path the caller should navigate to (right neighbor preferred).
pub fn remove_tab(tabs: &mut Vec<TabItem>, path: &str, is_current: bool) -> Option<String> {
    let mut next = None;
    if is_current {
        if let Some(idx) = tabs.iter().position(|t| t.path == path) {
            next = tabs
                .get(idx + 1)
                .or_else(|| idx.checked_sub(1).and_then(|i| tabs.get(i)))
                .map(|t| t.path.clone());
        }
    }
    tabs.retain(|t| t.path != path);
    next
}

/// Close every tab except the named one; the home tab always survives
pub fn close_multiple(tabs: &mut Vec<TabItem>, keep_path: Option<&str>) {
    tabs.retain(|t| Some(t.path.as_str()) == keep_path || t.name == HOME_TAB_NAME);
}

/// Close all tabs left of the named one (home survives)
pub fn close_left(tabs: &mut Vec<TabItem>, path: &str) {
    let Some(idx) = tabs.iter().position(|t| t.path == path) else {
        return;
    };
    let mut i = 0;
    tabs.retain(|t| {
        let keep = i >= idx || t.name == HOME_TAB_NAME;
        i += 1;
        keep
    });
}

/// Close all tabs right of the named one (home survives)
pub fn close_right(tabs: &mut Vec<TabItem>, path: &str) {
    let Some(idx) = tabs.iter().position(|t| t.path == path) else {
        return;
    };
    let mut i = 0;
    tabs.retain(|t| {
        let keep = i <= idx || t.name == HOME_TAB_NAME;
        i += 1;
        keep
    });
}

pub fn set_tab_title(tabs: &mut [TabItem], path: &str, title: &str) {
    for tab in tabs.iter_mut().filter(|t| t.path == path) {
        tab.title = title.to_string();
    }
}
