//! ui
//!
//! User interaction: output helpers and the interactive terminal menu.

pub mod menu;
pub mod output;

pub use output::Verbosity;
