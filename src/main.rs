//! projscope - Browse, search and track the files of a project.
//!
//! Usage:
//!   projscope                       Start the interactive shell
//!   projscope list-files            List all project files
//!   projscope list-files-time       List files with times and record changes
//!   projscope search-files PATTERN  Find files by name pattern
//!   projscope switch-root PATH      Change the project root (shell sessions)
//!   projscope --help                Show help

mod commands;
mod shell;

use std::io;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};

use projscope_core::ProjectConfig;

use crate::commands::{Command, Session, render_error};

#[derive(Parser)]
#[command(
    name = "projscope",
    version,
    about = "Browse, search and track the files of a project",
    long_about = "projscope lists, searches, reads and writes files inside a project root, \
                  skipping build output and VCS metadata.\n\n\
                  Run without a subcommand to start an interactive shell where the \
                  project root can be switched between commands."
)]
struct Cli {
    /// Project root (defaults to the configured root or the current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Tracked-file inventory location
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ProjectConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ProjectConfig::load_default().context("Failed to load config")?,
    }
    .merge(cli.root, cli.store);

    let session = Session::open(&config).context("Failed to open project")?;
    tracing::info!("Project root: {}", session.root().display());

    match cli.command {
        None | Some(Command::Shell) => {
            let stdin = io::stdin();
            shell::run(&session, stdin.lock(), io::stdout()).context("Shell I/O failed")?;
        }
        Some(command) => {
            let action = command.action();
            let output = session
                .execute(command)
                .map_err(|e| eyre!(render_error(action, &e)))?;
            print!("{output}");
        }
    }

    Ok(())
}
