//! # CLI UI Module
//!
//! Styling and formatting layer for gup CLI output. Output respects
//! `NO_COLOR`, stays readable without colors, and every data command has a
//! `--json` form for scripts.
//!
//! - `color`: color mode selection and terminal capability checks
//! - `style`: message prefixes, status coloring, quiet mode
//! - `format`: small value formatters (unset fields, timestamps, truncation)
//! - `table`: profile and diff tables with comfy-table

pub mod color;
pub mod format;
pub mod style;
pub mod table;

pub use color::ColorMode;
pub use style::{MessageType, Style};
