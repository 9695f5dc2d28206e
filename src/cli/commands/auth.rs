use clap::Subcommand;
use serde_json::json;

use crate::api;
use crate::cli::utils::{output_success, prompt_password};
use crate::cli::{build_context, OutputFormat};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login and persist the session")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout and clear auth fields from the session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show the persisted user profile")]
    Whoami,

    #[command(about = "Change the current user's password")]
    Passwd {
        #[arg(long, help = "Current password (will prompt if not provided)")]
        old: Option<String>,
        #[arg(long, help = "New password (will prompt if not provided)")]
        new: Option<String>,
    },
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = build_context()?;

    match cmd {
        AuthCommands::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };
            let reply = api::login(&ctx.gateway, &username, &password).await?;
            ctx.session.set_token(reply.token);
            ctx.session.set_user(reply.user_info.clone());
            output_success(
                &output_format,
                &format!("Logged in as {}", username),
                Some(json!({ "user": {
                    "id": reply.user_info.id,
                    "username": reply.user_info.username,
                    "display_name": reply.user_info.display_name,
                }})),
            )
        }
        AuthCommands::Logout => {
            ctx.session.logout();
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let state = ctx.session.snapshot();
            let authenticated = ctx.session.is_authenticated();
            let message = if authenticated {
                format!("Authenticated as {}", state.user.username)
            } else {
                "Not authenticated".to_string()
            };
            output_success(
                &output_format,
                &message,
                Some(json!({
                    "authenticated": authenticated,
                    "saved_at": state.saved_at,
                })),
            )
        }
        AuthCommands::Whoami => {
            let user = ctx.session.user();
            if user.username.is_empty() {
                anyhow::bail!("no user profile stored; login first");
            }
            output_success(
                &output_format,
                &format!("{} ({})", user.display_name, user.username),
                Some(json!({ "user": {
                    "id": user.id,
                    "username": user.username,
                    "display_name": user.display_name,
                    "avatar": user.avatar,
                }})),
            )
        }
        AuthCommands::Passwd { old, new } => {
            let old = match old {
                Some(p) => p,
                None => prompt_password()?,
            };
            let new = match new {
                Some(p) => p,
                None => prompt_password()?,
            };
            api::change_password(&ctx.gateway, &old, &new).await?;
            output_success(&output_format, "Password changed", None)
        }
    }
}
