//! Color mode selection for CLI output.
//!
//! `--color auto` (the default) colors only when stdout is a terminal and
//! `NO_COLOR` is not set. See https://no-color.org/.

use std::io::IsTerminal;

use clap::ValueEnum;

/// Value of the `--color` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    /// Color even when piped.
    Always,
    /// Never color.
    Never,
    /// Color when writing to a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
}

impl ColorMode {
    /// Whether output should be colored under this mode.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal(),
        }
    }
}

/// Current terminal width, or 100 when it cannot be determined
/// (for instance when output is piped).
pub fn terminal_width() -> u16 {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0)
        .unwrap_or(100)
}
