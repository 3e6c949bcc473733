// SPDX-FileCopyrightText: 2026 Plinth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plinth - native plugin manager for cross-platform mobile projects.
//!
//! This is the binary entry point for the `plinth` command.

mod report;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use plinth_core::{PlinthError, ProjectContext};
use plinth_plugin::{CopyNativeIntegration, NpmPackageManager, PluginService};

use crate::report::{Line, render_line};

/// Plinth - native plugin manager for cross-platform mobile projects.
#[derive(Parser, Debug)]
#[command(name = "plinth", version, about, long_about = None)]
struct Cli {
    /// Project root directory.
    #[arg(long, global = true, default_value = ".")]
    project: PathBuf,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage project plugins.
    Plugin {
        #[command(subcommand)]
        action: PluginCommands,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum PluginCommands {
    /// Install a plugin from the registry or a local archive.
    Add {
        /// Registry specifier (`name`, `name@range`) or archive path.
        specifier: String,
    },
    /// Remove an installed plugin.
    Remove { name: String },
    /// List installed plugins.
    List,
    /// Integrate changed native plugin code into every installed platform.
    Prepare,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let root = std::path::absolute(&cli.project).unwrap_or_else(|_| cli.project.clone());
    let config = match plinth_config::load_and_validate(&root) {
        Ok(config) => config,
        Err(errors) => {
            plinth_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.general.log_level);

    let service = PluginService::new(
        ProjectContext::new(root),
        config.clone(),
        Arc::new(NpmPackageManager::new(config.npm.binary.clone())),
        Arc::new(CopyNativeIntegration::new()),
    );
    let use_color = !cli.plain && std::io::stdout().is_terminal();

    let Commands::Plugin { action } = cli.command;
    match execute(&service, action).await {
        Ok(outcome) => {
            println!();
            println!("  {}", outcome.heading);
            println!("  {}", "-".repeat(50));
            for line in &outcome.lines {
                println!("{}", render_line(line, use_color));
            }
            println!();
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "plugin command failed");
            eprintln!("plinth: {e}");
            ExitCode::FAILURE
        }
    }
}

/// What a plugin command prints.
///
/// Platform-level failures are lines, not errors: the exit status only
/// reflects whether the root operation succeeded.
#[derive(Debug)]
struct CommandOutcome {
    heading: String,
    lines: Vec<Line>,
}

async fn execute(
    service: &PluginService,
    action: PluginCommands,
) -> Result<CommandOutcome, PlinthError> {
    let outcome = match action {
        PluginCommands::Add { specifier } => {
            let report = service.add(&specifier).await?;
            CommandOutcome {
                heading: format!("plinth plugin add {specifier}"),
                lines: report::add_lines(&report),
            }
        }
        PluginCommands::Remove { name } => {
            let report = service.remove(&name).await?;
            CommandOutcome {
                heading: format!("plinth plugin remove {name}"),
                lines: report::remove_lines(&report),
            }
        }
        PluginCommands::List => {
            let plugins = service.list().await?;
            CommandOutcome {
                heading: format!("plinth plugin list ({} installed)", plugins.len()),
                lines: report::list_lines(&plugins),
            }
        }
        PluginCommands::Prepare => {
            let report = service.prepare().await?;
            CommandOutcome {
                heading: "plinth plugin prepare".to_string(),
                lines: report::prepare_lines(&report),
            }
        }
    };
    Ok(outcome)
}

/// Initialize the tracing subscriber with an EnvFilter.
///
/// `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("plinth={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
