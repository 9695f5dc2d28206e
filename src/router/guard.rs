//! Navigation guard: every navigation attempt passes through here.
//!
//! The guard is a small explicit state machine (Idle, AwaitingMenu, Ready)
//! around the session bootstrap: token check, menu fetch, route
//! materialization, then re-dispatch of the original target. Steps run
//! strictly in order within one `navigate` call; the re-dispatch is sequenced
//! after materialization completes, never speculative.

use std::sync::{Arc, RwLock};

use crate::bridge::Bridge;
use crate::config::PathsConfig;
use crate::error::{ConsoleError, Result};
use crate::menu::{MenuSource, MenuState};
use crate::router::{RouteRecord, RouteTable, ViewRegistry, NOT_FOUND_ROUTE};
use crate::session::SessionStore;

/// Per-attempt outcome of the guard's decision algorithm; never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGuardDecision {
    Allow,
    RedirectToLogin,
    /// Authenticated navigation to the login boundary bounces back to the
    /// referring path
    RedirectToSelf,
    /// Route table was empty; menu was fetched, routes materialized, and the
    /// original target re-dispatched
    DeferThenRetry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// No dynamic routes; next authenticated navigation bootstraps
    Idle,
    /// Menu fetch in flight
    AwaitingMenu,
    /// Dynamic routes materialized for the current session
    Ready,
}

/// A completed navigation: where we ended up and how the guard got there
#[derive(Debug, Clone)]
pub struct Navigation {
    pub decision: RouteGuardDecision,
    pub route: RouteRecord,
    /// Final resolved path after redirects and re-dispatch
    pub path: String,
    pub from: String,
    pub redispatched: bool,
}

pub struct Navigator {
    session: SessionStore,
    menu: MenuState,
    routes: RouteTable,
    views: ViewRegistry,
    source: Arc<dyn MenuSource>,
    bridge: Arc<dyn Bridge>,
    paths: PathsConfig,
    state: RwLock<GuardState>,
    current: RwLock<String>,
}

impl Navigator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session: SessionStore,
        menu: MenuState,
        routes: RouteTable,
        views: ViewRegistry,
        source: Arc<dyn MenuSource>,
        bridge: Arc<dyn Bridge>,
        paths: PathsConfig,
    ) -> Self {
        Self {
            session,
            menu,
            routes,
            views,
            source,
            bridge,
            paths,
            state: RwLock::new(GuardState::Idle),
            current: RwLock::new("/".to_string()),
        }
    }

    pub fn state(&self) -> GuardState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: GuardState) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// Path of the route the console currently sits on
    pub fn current(&self) -> String {
        self.current.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_current(&self, path: &str) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = path.to_string();
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn menu(&self) -> &MenuState {
        &self.menu
    }

    /// Intercept one navigation attempt and drive it to completion.
    ///
    /// Decision order: login boundary handling, token check, current-route
    /// tracking, bootstrap-and-retry when the dynamic set is empty, then
    /// plain allow. Menu bootstrap failures clear the token, redirect to
    /// login and propagate as `Err`.
    pub async fn navigate(&self, to: &str) -> Result<Navigation> {
        let from = self.current();
        tracing::debug!(%from, %to, "navigation attempt");

        // 1. Login boundary
        if to.eq_ignore_ascii_case(&self.paths.login) {
            if self.session.is_authenticated() {
                // Never allow through to the login view while authenticated
                let back = if from.is_empty() || from.eq_ignore_ascii_case(&self.paths.login) {
                    self.paths.home.clone()
                } else {
                    from.clone()
                };
                let nav = self.resolve_authenticated(&back, from.clone()).await?;
                return Ok(Navigation {
                    decision: RouteGuardDecision::RedirectToSelf,
                    ..nav
                });
            }

            // Defensive reset: returning to login tears the session's routes down
            self.routes.reset_dynamic();
            self.menu.clear();
            self.set_state(GuardState::Idle);
            let route = self.routes.match_path(&self.paths.login)?;
            self.set_current(&self.paths.login);
            return Ok(Navigation {
                decision: RouteGuardDecision::Allow,
                path: route.path.clone(),
                route,
                from,
                redispatched: false,
            });
        }

        // 2. No token: redirect to login, intended target discarded
        if !self.session.is_authenticated() {
            let route = self.routes.match_path(&self.paths.login)?;
            self.set_current(&self.paths.login);
            return Ok(Navigation {
                decision: RouteGuardDecision::RedirectToLogin,
                path: route.path.clone(),
                route,
                from,
                redispatched: false,
            });
        }

        self.resolve_authenticated(to, from).await
    }

    /// Steps 3-5 of the decision algorithm, token already validated
    async fn resolve_authenticated(&self, to: &str, from: String) -> Result<Navigation> {
        // 3. Track the target's logical name for breadcrumb/tab consumers
        let logical = self
            .routes
            .match_path(to)
            .map(|r| r.name)
            .unwrap_or_else(|_| to.to_string());
        self.menu.set_current_route_name(&logical);

        // 4. First authenticated navigation (or post-reset): bootstrap, then
        //    re-dispatch the original target exactly once
        if self.routes.dynamic_is_empty() {
            self.set_state(GuardState::AwaitingMenu);
            if let Err(e) = self.init_dynamic_routes().await {
                self.set_state(GuardState::Idle);
                return Err(e);
            }
            self.set_state(GuardState::Ready);

            let route = self.resolve_target(to)?;
            self.menu.set_current_route_name(&route.name);
            return Ok(Navigation {
                decision: RouteGuardDecision::DeferThenRetry,
                path: route.path.clone(),
                route,
                from,
                redispatched: true,
            });
        }

        // 5. Allow
        let route = self.resolve_target(to)?;
        Ok(Navigation {
            decision: RouteGuardDecision::Allow,
            path: route.path.clone(),
            route,
            from,
            redispatched: false,
        })
    }

    /// Match the target in the table; unmatched targets land on the 404 route
    fn resolve_target(&self, to: &str) -> Result<RouteRecord> {
        let route = match self.routes.match_path(to) {
            Ok(route) => route,
            Err(_) => {
                tracing::warn!(%to, "no route matched, falling back to 404");
                self.routes
                    .record(NOT_FOUND_ROUTE)
                    .ok_or_else(|| ConsoleError::RouteNotFound(to.to_string()))?
            }
        };
        self.set_current(&route.path);
        Ok(route)
    }

    /// Fetch the menu tree and materialize routes for this session. Any
    /// failure (transport, authorization, empty tree) invalidates the
    /// session: token cleared, login redirect issued, error propagated.
    async fn init_dynamic_routes(&self) -> Result<()> {
        match self.fetch_and_materialize().await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.session.clear_token();
                self.bridge.redirect(&self.paths.login);
                self.set_current(&self.paths.login);
                Err(e)
            }
        }
    }

    async fn fetch_and_materialize(&self) -> Result<()> {
        let menus = self.source.fetch_menu().await?;
        if menus.is_empty() {
            self.bridge.notify_warn(
                "No access",
                "This account has no menu permissions; contact an administrator",
            );
            return Err(ConsoleError::NoPermission);
        }
        self.menu.set_menus(menus);
        self.routes
            .materialize(&self.menu.flat_menus(), &self.views)?;
        Ok(())
    }

    /// Logout: clear auth fields, drop menu state and dynamic routes
    pub fn logout(&self) {
        self.session.logout();
        self.menu.clear();
        self.routes.reset_dynamic();
        self.set_state(GuardState::Idle);
        self.set_current(&self.paths.login);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::MemoryBridge;
    use crate::menu::{MenuNode, MenuState};
    use crate::router::{View, ViewRegistry};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSource {
        menus: Vec<MenuNode>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MenuSource for FixedSource {
        async fn fetch_menu(&self) -> Result<Vec<MenuNode>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.menus.clone())
        }
    }

    struct Blank;
    impl View for Blank {
        fn render(&self) -> String {
            String::new()
        }
    }

    fn navigator(menus: Vec<MenuNode>) -> (Navigator, Arc<FixedSource>, Arc<MemoryBridge>) {
        let source = Arc::new(FixedSource {
            menus,
            calls: AtomicUsize::new(0),
        });
        let bridge = Arc::new(MemoryBridge::new());
        let paths = PathsConfig::default();
        let mut views = ViewRegistry::new();
        views.set_fallback(|| Box::new(Blank));
        let nav = Navigator::new(
            SessionStore::in_memory(),
            MenuState::new(),
            RouteTable::with_baseline(&paths),
            views,
            source.clone(),
            bridge.clone(),
            paths,
        );
        (nav, source, bridge)
    }

    fn home_menu() -> Vec<MenuNode> {
        vec![MenuNode {
            path: "/home/index".into(),
            name: "home".into(),
            component: Some("/home/index".into()),
            ..Default::default()
        }]
    }

    #[tokio::test]
    async fn guard_state_tracks_bootstrap() {
        let (nav, _, _) = navigator(home_menu());
        nav.session().set_token("tok");
        assert_eq!(nav.state(), GuardState::Idle);
        nav.navigate("/home/index").await.unwrap();
        assert_eq!(nav.state(), GuardState::Ready);
        nav.logout();
        assert_eq!(nav.state(), GuardState::Idle);
    }

    #[tokio::test]
    async fn logout_resets_routes_and_menu() {
        let (nav, _, _) = navigator(home_menu());
        nav.session().set_token("tok");
        nav.navigate("/home/index").await.unwrap();
        assert!(!nav.routes().dynamic_is_empty());

        nav.logout();
        assert!(nav.routes().dynamic_is_empty());
        assert!(nav.menu().is_empty());
        assert!(!nav.session().is_authenticated());
    }
}
