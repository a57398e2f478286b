//! # gup CLI
//!
//! Command-line interface for Git User Profiles.
//!
//! Tells you which identity profile governs a repository, whether it is the
//! one git will actually commit with, and applies it when it is not.
//! Run `gup --help` for usage information.

mod cli;
pub mod ui;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}
