//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Resolve configuration and take the data-directory lock
//! - Load the registries and hand the context to a front end
//!
//! The layer is thin: all mutations flow through [`crate::app::App`] inside
//! whichever front end (bridge or menu) runs the session.

pub mod args;

pub use args::{Cli, Command, Shell};

use anyhow::{Context as _, Result};
use clap::CommandFactory;
use clap_complete::{generate, shells};

use crate::bridge;
use crate::core::config::Config;
use crate::core::lock::DataLock;
use crate::store::{self, DataPaths};
use crate::ui::menu;
use crate::ui::output::{self, Verbosity};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);

    // Completions need no config, lock, or data.
    if let Command::Completions { shell } = cli.command {
        return completions(shell);
    }

    // A broken config file should not brick the tool; fall back to
    // defaults and say so.
    let config = Config::load().unwrap_or_else(|e| {
        output::warn(e, verbosity);
        Config::default()
    });
    let data_dir = config.resolve_data_dir(cli.data_dir.as_deref());
    output::debug(
        format_args!("data dir: {}", data_dir.display()),
        verbosity,
    );

    // Held for the whole session; released on drop.
    let _lock = DataLock::acquire(&data_dir)
        .with_context(|| format!("cannot lock data directory '{}'", data_dir.display()))?;

    let paths = DataPaths::new(&data_dir);
    let (mut app, load_errors) = store::load_app(&paths);
    for e in &load_errors {
        output::warn(e, verbosity);
    }

    match cli.command {
        Command::Bridge => {
            bridge::run(app, paths, verbosity).context("bridge session failed")?;
        }
        Command::Menu => {
            menu::run(&mut app, &paths).context("menu session failed")?;
        }
        Command::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Generate shell completion scripts on stdout.
fn completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    match shell {
        Shell::Bash => generate(shells::Bash, &mut cmd, &name, &mut std::io::stdout()),
        Shell::Zsh => generate(shells::Zsh, &mut cmd, &name, &mut std::io::stdout()),
        Shell::Fish => generate(shells::Fish, &mut cmd, &name, &mut std::io::stdout()),
        Shell::PowerShell => generate(shells::PowerShell, &mut cmd, &name, &mut std::io::stdout()),
    }

    Ok(())
}
