//! Permission-scoped menu tree and the state kept around it.
//!
//! The server returns a tree of [`MenuNode`] roots once per session. The
//! route materializer consumes the pre-order flattened list; breadcrumb and
//! keep-alive bookkeeping live here because they are derived from the same
//! tree.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuMeta {
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub title: String,
    /// Full-screen entries register as top-level routes, outside the layout
    #[serde(default)]
    pub is_full: bool,
    /// Pinned to the tab strip
    #[serde(default)]
    pub is_affix: bool,
    /// View instance kept alive when navigating away
    #[serde(default)]
    pub is_keep_alive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    pub path: String,
    pub name: String,
    /// Textual view reference, resolved by convention at materialization time
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub redirect: Option<String>,
    #[serde(default)]
    pub meta: MenuMeta,
    #[serde(default)]
    pub children: Vec<MenuNode>,
}

/// Pre-order flatten: every parent precedes its children. Nodes are cloned
/// with children intact; the materializer strips them before registration.
pub fn flatten(nodes: &[MenuNode]) -> Vec<MenuNode> {
    let mut flat = Vec::new();
    for node in nodes {
        flat.push(node.clone());
        flat.extend(flatten(&node.children));
    }
    flat
}

/// One breadcrumb step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub path: String,
    pub name: String,
    pub title: String,
}

/// Path -> ancestor chain (self included, root first) for every node
pub fn breadcrumbs(nodes: &[MenuNode]) -> HashMap<String, Vec<Crumb>> {
    fn walk(nodes: &[MenuNode], parent: &[Crumb], out: &mut HashMap<String, Vec<Crumb>>) {
        for node in nodes {
            let mut chain = parent.to_vec();
            chain.push(Crumb {
                path: node.path.clone(),
                name: node.name.clone(),
                title: node.meta.title.clone(),
            });
            out.insert(node.path.clone(), chain.clone());
            walk(&node.children, &chain, out);
        }
    }
    let mut out = HashMap::new();
    walk(nodes, &[], &mut out);
    out
}

/// Where the current session's menu tree comes from. The production
/// implementation fetches over the gateway; tests substitute their own.
#[async_trait]
pub trait MenuSource: Send + Sync {
    async fn fetch_menu(&self) -> Result<Vec<MenuNode>>;
}

#[derive(Debug, Default)]
struct MenuStateInner {
    menus: Vec<MenuNode>,
    current_route_name: String,
    keep_alive: Vec<String>,
}

/// Session-scoped menu state. Cleared on logout; the tree is fetched at most
/// once per session by the navigation guard.
#[derive(Clone, Default)]
pub struct MenuState {
    inner: Arc<RwLock<MenuStateInner>>,
}

impl MenuState {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MenuStateInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MenuStateInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_menus(&self, menus: Vec<MenuNode>) {
        self.write().menus = menus;
    }

    pub fn menus(&self) -> Vec<MenuNode> {
        self.read().menus.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.read().menus.is_empty()
    }

    pub fn flat_menus(&self) -> Vec<MenuNode> {
        flatten(&self.read().menus)
    }

    pub fn breadcrumbs(&self) -> HashMap<String, Vec<Crumb>> {
        breadcrumbs(&self.read().menus)
    }

    /// Forget the tree entirely; next authenticated navigation re-fetches
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.menus.clear();
        inner.keep_alive.clear();
    }

    pub fn set_current_route_name(&self, name: impl Into<String>) {
        self.write().current_route_name = name.into();
    }

    pub fn current_route_name(&self) -> String {
        self.read().current_route_name.clone()
    }

    pub fn add_keep_alive(&self, name: &str) {
        let mut inner = self.write();
        if !inner.keep_alive.iter().any(|n| n == name) {
            inner.keep_alive.push(name.to_string());
        }
    }

    pub fn remove_keep_alive(&self, name: &str) {
        self.write().keep_alive.retain(|n| n != name);
    }

    pub fn set_keep_alive(&self, names: Vec<String>) {
        self.write().keep_alive = names;
    }

    pub fn keep_alive(&self) -> Vec<String> {
        self.read().keep_alive.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, path: &str, children: Vec<MenuNode>) -> MenuNode {
        MenuNode {
            path: path.to_string(),
            name: name.to_string(),
            component: Some(format!("{path}/index")),
            redirect: None,
            meta: MenuMeta {
                title: name.to_string(),
                ..Default::default()
            },
            children,
        }
    }

    fn sample_tree() -> Vec<MenuNode> {
        vec![
            node("home", "/home/index", vec![]),
            node(
                "system",
                "/system",
                vec![
                    node("users", "/system/users", vec![]),
                    node("roles", "/system/roles", vec![]),
                ],
            ),
        ]
    }

    #[test]
    fn flatten_is_preorder_parent_first() {
        let flat = flatten(&sample_tree());
        let names: Vec<_> = flat.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["home", "system", "users", "roles"]);
    }

    #[test]
    fn flatten_keeps_children_on_clones() {
        let flat = flatten(&sample_tree());
        let system = flat.iter().find(|n| n.name == "system").unwrap();
        assert_eq!(system.children.len(), 2);
    }

    #[test]
    fn breadcrumbs_chain_root_first() {
        let crumbs = breadcrumbs(&sample_tree());
        let chain = &crumbs["/system/users"];
        let paths: Vec<_> = chain.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["/system", "/system/users"]);
    }

    #[test]
    fn menu_meta_accepts_camel_case_wire_keys() {
        let raw = r#"{
            "path": "/three",
            "name": "three",
            "meta": { "icon": "cube", "title": "Three", "isFull": true, "isKeepAlive": true }
        }"#;
        let node: MenuNode = serde_json::from_str(raw).unwrap();
        assert!(node.meta.is_full);
        assert!(node.meta.is_keep_alive);
        assert!(!node.meta.is_affix);
    }

    #[test]
    fn keep_alive_dedupes() {
        let state = MenuState::new();
        state.add_keep_alive("users");
        state.add_keep_alive("users");
        assert_eq!(state.keep_alive().len(), 1);
        state.remove_keep_alive("users");
        assert!(state.keep_alive().is_empty());
    }
}
