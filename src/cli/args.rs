//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! Available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--data-dir <path>`: Directory holding the flat data files
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Larder - shared-kitchen inventory with transactional order fulfillment
#[derive(Parser, Debug)]
#[command(name = "larder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the data files (overrides the config file)
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the line protocol for a dashboard over stdin/stdout
    #[command(
        name = "bridge",
        long_about = "Serve the dashboard line protocol over stdin/stdout.\n\n\
            Reads one command per line and answers each with exactly one JSON \
            document on stdout. Diagnostics go to stderr. The session ends on \
            QUIT or end of input. Mutations are saved to the data files as \
            they happen."
    )]
    Bridge,

    /// Run the interactive terminal menu
    #[command(
        name = "menu",
        long_about = "Run the interactive terminal menu.\n\n\
            Walks the catalog, stock, recipe, and order registries with \
            numbered submenus. State is saved to the data files when the \
            menu exits."
    )]
    Menu,

    /// Generate shell completion scripts
    #[command(name = "completions")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Shells supported for completion generation.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
