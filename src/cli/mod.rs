pub mod commands;
pub mod utils;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::bridge::Bridge;
use crate::config;
use crate::gateway::Gateway;
use crate::session::storage::StateFile;
use crate::session::SessionStore;

#[derive(Parser)]
#[command(name = "opsconsole")]
#[command(about = "Opsconsole CLI - menu-driven admin console client")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Permission-scoped menu operations")]
    Menu {
        #[command(subcommand)]
        cmd: commands::menu::MenuCommands,
    },

    #[command(about = "Navigate to a console path through the guard")]
    Nav {
        #[arg(help = "Target path, e.g. /system/users")]
        path: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Bridge implementation for terminal use: notifications and redirect
/// notices go to stderr so piped JSON output stays clean
pub struct ConsoleBridge;

impl Bridge for ConsoleBridge {
    fn notify_error(&self, title: &str, message: &str) {
        eprintln!("Error: {title}: {message}");
    }

    fn notify_warn(&self, title: &str, message: &str) {
        eprintln!("Warning: {title}: {message}");
    }

    fn redirect(&self, path: &str) {
        eprintln!("Redirected to {path}");
    }
}

/// Everything a CLI command needs: persisted session plus a gateway bound to it
pub struct CliContext {
    pub session: SessionStore,
    pub gateway: Arc<Gateway>,
    pub bridge: Arc<ConsoleBridge>,
}

pub fn build_context() -> anyhow::Result<CliContext> {
    let cfg = config::config();
    let session = SessionStore::open(StateFile::new(cfg.storage.state_file.clone()));
    let bridge = Arc::new(ConsoleBridge);
    let gateway = Arc::new(Gateway::new(
        &cfg.api,
        &cfg.paths,
        session.clone(),
        bridge.clone(),
    )?);
    Ok(CliContext {
        session,
        gateway,
        bridge,
    })
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Menu { cmd } => commands::menu::handle(cmd, output_format).await,
        Commands::Nav { path } => commands::nav::handle(&path, output_format).await,
    }
}
