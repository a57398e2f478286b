//! Message styling for CLI output.
//!
//! | Prefix | Meaning | Color |
//! |--------|---------|-------|
//! | `[ok]` | Success | Green |
//! | `[err]` | Error | Red |
//! | `[warn]` | Warning | Yellow |
//! | `[info]` | Information | Blue |
//! | `[hint]` | Suggestion | Cyan |

use owo_colors::OwoColorize;

use gup_core::StatusCode;

use super::color::ColorMode;

/// Message severity/type for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Operation completed
    Ok,
    /// Operation failed
    Err,
    /// Operation succeeded with caveats
    Warn,
    /// Neutral status
    Info,
    /// Actionable next step
    Hint,
}

impl MessageType {
    /// Returns the prefix text for this message type.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Ok => "[ok]",
            Self::Err => "[err]",
            Self::Warn => "[warn]",
            Self::Info => "[info]",
            Self::Hint => "[hint]",
        }
    }

    /// Whether `--quiet` hides messages of this type.
    fn is_chatter(&self) -> bool {
        matches!(self, Self::Ok | Self::Info | Self::Hint)
    }
}

/// Styling interface for CLI output.
///
/// ```ignore
/// let style = Style::new(ColorMode::Never);
/// assert_eq!(style.message(MessageType::Ok, "Applied Work"), "[ok] Applied Work");
/// ```
#[derive(Debug, Clone)]
pub struct Style {
    color_mode: ColorMode,
    quiet: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self::new(ColorMode::default())
    }
}

impl Style {
    /// Create a Style with an explicit color mode.
    pub fn new(color_mode: ColorMode) -> Self {
        Self {
            color_mode,
            quiet: false,
        }
    }

    /// Suppress `[ok]`, `[info]` and `[hint]` lines printed through [`Style::emit`].
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(&self) -> bool {
        self.color_mode.is_enabled()
    }

    /// Format a simple message with a type prefix.
    pub fn message(&self, msg_type: MessageType, text: &str) -> String {
        let prefix = msg_type.prefix();
        if self.colors_enabled() {
            let colored_prefix = match msg_type {
                MessageType::Ok => prefix.green().to_string(),
                MessageType::Err => prefix.red().to_string(),
                MessageType::Warn => prefix.yellow().to_string(),
                MessageType::Info => prefix.blue().to_string(),
                MessageType::Hint => prefix.cyan().to_string(),
            };
            format!("{} {}", colored_prefix, text)
        } else {
            format!("{} {}", prefix, text)
        }
    }

    /// Print a message to stdout unless quiet mode hides it.
    pub fn emit(&self, msg_type: MessageType, text: &str) {
        if self.quiet && msg_type.is_chatter() {
            return;
        }
        println!("{}", self.message(msg_type, text));
    }

    /// Print a detail line under the previous message unless quiet.
    pub fn emit_detail(&self, label: &str, value: &str) {
        if !self.quiet {
            println!("{}", self.message_detail(label, value));
        }
    }

    /// Format a detail line with 5-space indentation.
    pub fn message_detail(&self, label: &str, value: &str) -> String {
        format!("     {}: {}", label, value)
    }

    /// Format a section header.
    pub fn section(&self, title: &str) -> String {
        if self.colors_enabled() {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    }

    /// Format an error with optional cause and hint.
    pub fn error_with_context(
        &self,
        msg: &str,
        cause: Option<&str>,
        hint: Option<&str>,
    ) -> String {
        let mut output = self.message(MessageType::Err, msg);

        if let Some(cause_text) = cause {
            output.push('\n');
            output.push_str(&format!("      Cause: {}", cause_text));
        }

        if let Some(hint_text) = hint {
            output.push('\n');
            output.push_str(&format!("      Hint: {}", hint_text));
        }

        output
    }

    /// Format a key-value pair.
    pub fn key_value(&self, key: &str, value: &str) -> String {
        if self.colors_enabled() {
            format!("{}: {}", key.dimmed(), value)
        } else {
            format!("{}: {}", key, value)
        }
    }

    /// Format a profile id (first 8 chars, yellow).
    pub fn profile_id(&self, id: &str) -> String {
        let short = id.get(..8).unwrap_or(id);
        if self.colors_enabled() {
            short.yellow().to_string()
        } else {
            short.to_string()
        }
    }

    /// Format a repository root (cyan).
    pub fn root_path(&self, path: &str) -> String {
        if self.colors_enabled() {
            path.cyan().to_string()
        } else {
            path.to_string()
        }
    }

    /// Format a status code: green when fine, yellow when the user has
    /// something to do, dim when there is no repository.
    pub fn status_code(&self, code: StatusCode) -> String {
        let text = code.to_string();
        if !self.colors_enabled() {
            return text;
        }
        match code {
            StatusCode::NoIssues => text.green().to_string(),
            StatusCode::NotAValidWorkspace => text.dimmed().to_string(),
            StatusCode::FieldsMissing => text.red().to_string(),
            StatusCode::NoProfilesInConfig
            | StatusCode::NoSelectedProfilesInConfig
            | StatusCode::ConfigOutOfSync => text.yellow().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_prefix() {
        assert_eq!(MessageType::Ok.prefix(), "[ok]");
        assert_eq!(MessageType::Err.prefix(), "[err]");
        assert_eq!(MessageType::Warn.prefix(), "[warn]");
        assert_eq!(MessageType::Info.prefix(), "[info]");
        assert_eq!(MessageType::Hint.prefix(), "[hint]");
    }

    #[test]
    fn test_message_no_color() {
        let style = Style::new(ColorMode::Never);
        assert_eq!(style.message(MessageType::Ok, "Applied"), "[ok] Applied");
        assert_eq!(style.message(MessageType::Err, "Failed"), "[err] Failed");
    }

    #[test]
    fn test_quiet_hides_chatter_only() {
        assert!(MessageType::Ok.is_chatter());
        assert!(MessageType::Hint.is_chatter());
        assert!(!MessageType::Warn.is_chatter());
        assert!(!MessageType::Err.is_chatter());
    }

    #[test]
    fn test_error_with_context() {
        let style = Style::new(ColorMode::Never);
        let output = style.error_with_context(
            "Failed to apply profile",
            Some("git config failed"),
            Some("Check that git is installed"),
        );
        assert!(output.contains("[err] Failed to apply profile"));
        assert!(output.contains("Cause: git config failed"));
        assert!(output.contains("Hint: Check that git is installed"));
    }

    #[test]
    fn test_profile_id_is_shortened() {
        let style = Style::new(ColorMode::Never);
        assert_eq!(style.profile_id("0f8fad5b-d9cb-469f-a165-70867728950e"), "0f8fad5b");
        assert_eq!(style.profile_id("abc"), "abc");
    }

    #[test]
    fn test_status_code_plain() {
        let style = Style::new(ColorMode::Never);
        assert_eq!(style.status_code(StatusCode::ConfigOutOfSync), "out-of-sync");
        assert_eq!(style.key_value("Repository", "/src/app"), "Repository: /src/app");
    }
}
