//! Error types for gup-core.

use std::path::PathBuf;

use thiserror::Error;

/// Domain-specific errors for gup operations.
///
/// Status resolution never returns these: environment, data and tool
/// failures are folded into the [`WorkspaceStatus`](crate::WorkspaceStatus)
/// instead. Errors surface from explicit mutations (saving profiles, writing
/// identity config, loading configuration files).
#[derive(Error, Debug)]
pub enum GupError {
    /// Global configuration file is invalid.
    #[error("Global config invalid: {0}")]
    InvalidGlobalConfig(String),

    /// A configuration value is invalid.
    #[error("Invalid configuration: {message}. {hint}")]
    InvalidConfiguration {
        /// Description of the invalid configuration.
        message: String,
        /// Actionable hint on how to fix it.
        hint: String,
    },

    /// A settings file exists but cannot be parsed.
    #[error("Settings file `{path}` is invalid: {message}")]
    InvalidSettings {
        /// Path to the settings file.
        path: PathBuf,
        /// Description of the parse failure.
        message: String,
    },

    /// A settings file could not be written.
    #[error("Failed to write settings `{path}`: {message}")]
    SettingsWrite {
        /// Path to the settings file.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// The version-control tool could not be run or reported a failure.
    #[error("git {args} failed: {message}")]
    GitInvocation {
        /// The arguments passed to git, space separated.
        args: String,
        /// Description of the failure (stderr or spawn error).
        message: String,
    },

    /// One or more identity fields could not be written.
    ///
    /// Every field write is attempted; `keys` lists the ones that failed.
    #[error("Failed to write {} to local config of `{}`", keys.join(", "), root.display())]
    IdentityWrite {
        /// Repository root whose config was being written.
        root: PathBuf,
        /// Config keys that failed to write.
        keys: Vec<String>,
    },

    /// The path is not inside a repository.
    #[error("Not inside a git repository: {0}")]
    NotARepository(PathBuf),

    /// No profile matches the given id or label.
    #[error("Profile `{0}` not found.")]
    ProfileNotFound(String),

    /// A profile key matches more than one profile.
    #[error("Profile key `{key}` is ambiguous; it matches: {}", matches.join(", "))]
    AmbiguousProfile {
        /// The key that was looked up.
        key: String,
        /// Labels of the matching profiles.
        matches: Vec<String>,
    },

    /// A profile is missing required fields or is otherwise invalid.
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A wrapped generic error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
