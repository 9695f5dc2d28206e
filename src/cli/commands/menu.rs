use clap::Subcommand;

use crate::api;
use crate::cli::{build_context, OutputFormat};
use crate::menu::MenuNode;

#[derive(Subcommand)]
pub enum MenuCommands {
    #[command(about = "Fetch and print the permission-scoped menu tree")]
    List,
}

pub async fn handle(cmd: MenuCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = build_context()?;

    match cmd {
        MenuCommands::List => {
            let menus = api::fetch_menus(&ctx.gateway).await?;
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&menus)?);
                }
                OutputFormat::Text => {
                    if menus.is_empty() {
                        println!("No menu entries for this account");
                    } else {
                        print_tree(&menus, 0);
                    }
                }
            }
            Ok(())
        }
    }
}

fn print_tree(nodes: &[MenuNode], depth: usize) {
    for node in nodes {
        let title = if node.meta.title.is_empty() {
            &node.name
        } else {
            &node.meta.title
        };
        println!("{}{} ({})", "  ".repeat(depth), title, node.path);
        print_tree(&node.children, depth + 1);
    }
}
