//! Route table and menu-to-route materialization.
//!
//! The table starts from a static baseline (root redirect, login, layout,
//! error pages). Menu-driven entries are registered dynamically per session
//! and torn back down on logout or auth failure; names are unique across the
//! whole table.

pub mod guard;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::config::PathsConfig;
use crate::error::{ConsoleError, Result};
use crate::menu::{MenuMeta, MenuNode};

pub const LAYOUT_ROUTE: &str = "layout";
pub const LOGIN_ROUTE: &str = "login";
pub const NOT_FOUND_ROUTE: &str = "404";
pub const OFFLINE_ROUTE: &str = "500";

/// A renderable screen. The console core never renders anything itself; hosts
/// decide what a view does when instantiated.
pub trait View: Send + Sync {
    fn render(&self) -> String;
}

pub type ViewFactory = Arc<dyn Fn() -> Box<dyn View> + Send + Sync>;

/// Lazily constructed view: resolved once at materialization time, built only
/// when a navigation actually lands on the route.
#[derive(Clone)]
pub struct ViewHandle {
    key: String,
    factory: ViewFactory,
}

impl ViewHandle {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn instantiate(&self) -> Box<dyn View> {
        (self.factory)()
    }
}

impl fmt::Debug for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewHandle").field("key", &self.key).finish()
    }
}

/// String-keyed registry mapping a menu component path to its view factory.
/// Keys follow the `views<component>` convention, mirroring how menu entries
/// reference screens by path.
#[derive(Clone, Default)]
pub struct ViewRegistry {
    factories: HashMap<String, ViewFactory>,
    fallback: Option<ViewFactory>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the factory for a component path such as `/home/index`
    pub fn register<F>(&mut self, component: &str, factory: F)
    where
        F: Fn() -> Box<dyn View> + Send + Sync + 'static,
    {
        self.factories
            .insert(Self::key_for(component), Arc::new(factory));
    }

    /// Factory used when no specific registration exists. Hosts without
    /// compiled views (the CLI) route everything through this.
    pub fn set_fallback<F>(&mut self, factory: F)
    where
        F: Fn() -> Box<dyn View> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(factory));
    }

    fn key_for(component: &str) -> String {
        format!("views{component}")
    }

    pub fn resolve(&self, component: &str) -> Result<ViewHandle> {
        let key = Self::key_for(component);
        let factory = self
            .factories
            .get(&key)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| ConsoleError::ViewUnresolved(component.to_string()))?;
        Ok(ViewHandle { key, factory })
    }
}

/// One navigable entry. Children are never stored here; nesting from the menu
/// tree is flattened away before registration.
#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub path: String,
    pub name: String,
    pub component: Option<ViewHandle>,
    pub redirect: Option<String>,
    pub meta: MenuMeta,
    /// Name of the enclosing route, `layout` for regular menu entries
    pub parent: Option<String>,
}

#[derive(Default)]
struct RouteTableInner {
    records: HashMap<String, RouteRecord>,
    by_path: HashMap<String, String>,
    /// Names registered by materialization, in registration order
    dynamic: Vec<String>,
}

/// Process-wide route table; shared mutable, last writer wins
#[derive(Clone)]
pub struct RouteTable {
    inner: Arc<RwLock<RouteTableInner>>,
}

impl RouteTable {
    /// Static baseline: root redirect to home, login, layout shell, error pages
    pub fn with_baseline(paths: &PathsConfig) -> Self {
        let table = Self {
            inner: Arc::new(RwLock::new(RouteTableInner::default())),
        };
        let baseline = [
            RouteRecord {
                path: "/".to_string(),
                name: "root".to_string(),
                component: None,
                redirect: Some(paths.home.clone()),
                meta: MenuMeta::default(),
                parent: None,
            },
            RouteRecord {
                path: paths.login.clone(),
                name: LOGIN_ROUTE.to_string(),
                component: None,
                redirect: None,
                meta: MenuMeta {
                    title: "Login".to_string(),
                    ..Default::default()
                },
                parent: None,
            },
            RouteRecord {
                path: "/layout".to_string(),
                name: LAYOUT_ROUTE.to_string(),
                component: None,
                redirect: Some(paths.home.clone()),
                meta: MenuMeta::default(),
                parent: None,
            },
            RouteRecord {
                path: "/404".to_string(),
                name: NOT_FOUND_ROUTE.to_string(),
                component: None,
                redirect: None,
                meta: MenuMeta {
                    title: "Not Found".to_string(),
                    ..Default::default()
                },
                parent: None,
            },
            RouteRecord {
                path: paths.offline.clone(),
                name: OFFLINE_ROUTE.to_string(),
                component: None,
                redirect: None,
                meta: MenuMeta {
                    title: "Connection Lost".to_string(),
                    ..Default::default()
                },
                parent: None,
            },
        ];
        for record in baseline {
            // Baseline names are distinct by construction
            let _ = table.insert(record, false);
        }
        table
    }

    fn insert(&self, record: RouteRecord, dynamic: bool) -> Result<()> {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if inner.records.contains_key(&record.name) {
            return Err(ConsoleError::RouteConflict(record.name));
        }
        inner.by_path.insert(record.path.clone(), record.name.clone());
        if dynamic {
            inner.dynamic.push(record.name.clone());
        }
        inner.records.insert(record.name.clone(), record);
        Ok(())
    }

    /// Register a dynamic top-level route (full-screen menu entries)
    pub fn add_route(&self, record: RouteRecord) -> Result<()> {
        self.insert(record, true)
    }

    /// Register a dynamic route nested under an existing parent
    pub fn add_child_route(&self, parent: &str, mut record: RouteRecord) -> Result<()> {
        if !self.has_route(parent) {
            return Err(ConsoleError::RouteNotFound(parent.to_string()));
        }
        record.parent = Some(parent.to_string());
        self.insert(record, true)
    }

    pub fn has_route(&self, name: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .records
            .contains_key(name)
    }

    pub fn remove_route(&self, name: &str) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if let Some(record) = inner.records.remove(name) {
            inner.by_path.remove(&record.path);
        }
        inner.dynamic.retain(|n| n != name);
    }

    pub fn dynamic_names(&self) -> Vec<String> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .dynamic
            .clone()
    }

    pub fn dynamic_is_empty(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .dynamic
            .is_empty()
    }

    /// All registered names, baseline included
    pub fn route_names(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<_> = inner.records.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn record(&self, name: &str) -> Option<RouteRecord> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .records
            .get(name)
            .cloned()
    }

    /// Exact path match, following redirects. Errors when nothing matches or
    /// a redirect chain leaves the table.
    pub fn match_path(&self, path: &str) -> Result<RouteRecord> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let mut current = path.to_string();
        // Redirect chains are shallow in practice; 8 guards against cycles
        for _ in 0..8 {
            let name = inner
                .by_path
                .get(&current)
                .ok_or_else(|| ConsoleError::RouteNotFound(current.clone()))?;
            let record = &inner.records[name];
            match &record.redirect {
                Some(target) => current = target.clone(),
                None => return Ok(record.clone()),
            }
        }
        Err(ConsoleError::RouteNotFound(path.to_string()))
    }

    /// Convert the flattened menu list into registered routes.
    ///
    /// Per node: children are stripped, a textual component reference is
    /// resolved through the registry, and the entry lands under the layout
    /// shell unless it is marked full-screen. Only idempotent when preceded
    /// by [`RouteTable::reset_dynamic`]; duplicate names error otherwise.
    pub fn materialize(&self, flat_menus: &[MenuNode], views: &ViewRegistry) -> Result<usize> {
        let mut added = 0;
        for node in flat_menus {
            let component = match &node.component {
                Some(reference) => Some(views.resolve(reference)?),
                None => None,
            };
            let record = RouteRecord {
                path: node.path.clone(),
                name: node.name.clone(),
                component,
                redirect: node.redirect.clone(),
                meta: node.meta.clone(),
                parent: None,
            };
            if node.meta.is_full {
                self.add_route(record)?;
            } else {
                self.add_child_route(LAYOUT_ROUTE, record)?;
            }
            added += 1;
        }
        tracing::debug!(routes = added, "materialized dynamic routes");
        Ok(added)
    }

    /// Remove every dynamically registered route, restoring the baseline
    pub fn reset_dynamic(&self) {
        let names = self.dynamic_names();
        for name in &names {
            self.remove_route(name);
        }
        if !names.is_empty() {
            tracing::debug!(routes = names.len(), "dynamic routes cleared");
        }
    }
}
