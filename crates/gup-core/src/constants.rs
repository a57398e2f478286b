//! Common constants used throughout gup-core.
//!
//! Settings keys, directory names and git config keys live here so the
//! settings store, the profile store and the engine agree on them.

use std::time::Duration;

// ============================================================================
// Directory and File Names
// ============================================================================

/// The name of the gup directory, both in the home directory (`~/.gup/`)
/// and next to a repository root (`<root>/.gup/`).
pub const GUP_DIR: &str = ".gup";

/// File name of the global configuration (`~/.gup/config.yaml`).
pub const GLOBAL_CONFIG_FILENAME: &str = "config.yaml";

/// File name of a settings layer (`~/.gup/settings.yaml` for the global
/// layer, `<root>/.gup/settings.yaml` for the location layer).
pub const SETTINGS_FILENAME: &str = "settings.yaml";

// ============================================================================
// Settings Keys
// ============================================================================

/// Global settings key toggling auto-selection of a matching profile.
pub const SELECT_MATCHED_PROFILE_KEY: &str = "selectMatchedProfileAutomatically";

// ============================================================================
// Git Config Keys
// ============================================================================

/// Local git config key for the user name.
pub const GIT_USER_NAME_KEY: &str = "user.name";

/// Local git config key for the user email.
pub const GIT_USER_EMAIL_KEY: &str = "user.email";

/// Local git config key for the signing key.
pub const GIT_SIGNING_KEY_KEY: &str = "user.signingkey";

// ============================================================================
// Engine Defaults
// ============================================================================

/// Default time-to-live of a cached workspace status.
///
/// Long enough to absorb a burst of refresh triggers for one user action,
/// short enough that a freshly applied config shows up almost immediately.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(1000);

/// Default git executable.
pub const DEFAULT_GIT_BINARY: &str = "git";

/// Decorative marker prefixed to the selected profile's label in pick lists.
///
/// It is display-only and must be stripped before comparing or storing labels.
pub const SELECTED_MARKER: &str = "✔ ";
