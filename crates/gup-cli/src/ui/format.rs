//! Formatting utilities for CLI output.

use chrono::{DateTime, Utc};

/// Placeholder for an empty identity field.
pub const UNSET: &str = "(unset)";

/// Show an empty value as [`UNSET`].
pub fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        UNSET
    } else {
        value
    }
}

/// Truncate a string to `max_len` characters, ending in `...` when cut.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return ".".repeat(max_len);
    }
    let kept: String = s.chars().take(max_len - 3).collect();
    format!("{}...", kept)
}

/// Format a timestamp as `2025-01-15 10:04:05 UTC`.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_or_unset() {
        assert_eq!(or_unset(""), "(unset)");
        assert_eq!(or_unset("Alice"), "Alice");
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello", 5), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hello", 3), "...");
        assert_eq!(truncate_str("✔ Wörk profile", 7), "✔ Wö...");
    }

    #[test]
    fn test_format_timestamp() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 15, 10, 4, 5).unwrap();
        assert_eq!(format_timestamp(ts), "2025-01-15 10:04:05 UTC");
    }
}
