use std::sync::Arc;

use serde_json::json;

use crate::api::HttpMenuSource;
use crate::cli::utils::output_success;
use crate::cli::{build_context, OutputFormat};
use crate::config;
use crate::menu::MenuState;
use crate::router::guard::Navigator;
use crate::router::{RouteTable, View, ViewRegistry};

/// Placeholder view for the terminal: routes render as their title
struct TitleView(String);

impl View for TitleView {
    fn render(&self) -> String {
        self.0.clone()
    }
}

pub async fn handle(path: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = build_context()?;
    let cfg = config::config();

    let mut views = ViewRegistry::new();
    views.set_fallback(|| Box::new(TitleView("(no view output)".to_string())));

    let navigator = Navigator::new(
        ctx.session.clone(),
        MenuState::new(),
        RouteTable::with_baseline(&cfg.paths),
        views,
        Arc::new(HttpMenuSource::new(ctx.gateway.clone())),
        ctx.bridge.clone(),
        cfg.paths.clone(),
    );

    let nav = navigator.navigate(path).await?;
    output_success(
        &output_format,
        &format!("{} -> {} ({:?})", path, nav.path, nav.decision),
        Some(json!({
            "target": path,
            "resolved_path": nav.path,
            "route_name": nav.route.name,
            "decision": format!("{:?}", nav.decision),
            "redispatched": nav.redispatched,
        })),
    )
}
