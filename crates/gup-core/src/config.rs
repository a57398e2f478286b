//! Configuration types for gup.
//!
//! [`GlobalConfig`] is the user-level configuration stored in
//! `~/.gup/config.yaml`. Every section is optional; a missing file means
//! all defaults.
//!
//! ```yaml
//! git:
//!   binary: /usr/local/bin/git
//! cache:
//!   ttlMillis: 1000
//! settings:
//!   path: ~/.config/gup/settings.yaml
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CACHE_TTL, DEFAULT_GIT_BINARY, GLOBAL_CONFIG_FILENAME, GUP_DIR,
};
use crate::errors::GupError;

/// Cache TTLs above this are accepted but warned about.
const MAX_REASONABLE_TTL_MILLIS: u64 = 60_000;

// ============================================================================
// Sections
// ============================================================================

/// `git:` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitSection {
    /// Executable used for every git invocation.
    #[serde(default = "default_git_binary")]
    pub binary: PathBuf,
}

fn default_git_binary() -> PathBuf {
    PathBuf::from(DEFAULT_GIT_BINARY)
}

impl Default for GitSection {
    fn default() -> Self {
        Self {
            binary: default_git_binary(),
        }
    }
}

/// `cache:` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSection {
    /// Status cache time-to-live in milliseconds. `0` disables caching.
    #[serde(default = "default_ttl_millis")]
    pub ttl_millis: u64,
}

fn default_ttl_millis() -> u64 {
    DEFAULT_CACHE_TTL.as_millis() as u64
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_millis: default_ttl_millis(),
        }
    }
}

/// `settings:` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSection {
    /// Override for the global settings file. A leading `~/` is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// ============================================================================
// GlobalConfig
// ============================================================================

/// Global (user-level) configuration for gup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Git invocation.
    #[serde(default)]
    pub git: GitSection,

    /// Status cache.
    #[serde(default)]
    pub cache: CacheSection,

    /// Settings file location.
    #[serde(default)]
    pub settings: SettingsSection,
}

impl GlobalConfig {
    /// Load the global configuration from the default location (`~/.gup/config.yaml`).
    ///
    /// # Errors
    ///
    /// Returns [`GupError::InvalidGlobalConfig`] if the file exists but cannot be parsed.
    pub fn load_default() -> Result<Self, GupError> {
        match Self::default_path() {
            Some(path) => Self::from_path(&path),
            None => {
                tracing::debug!("Could not determine home directory, using default config");
                Ok(Self::default())
            }
        }
    }

    /// Load the global configuration from a specific path.
    ///
    /// If the file does not exist, returns a default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GupError::InvalidGlobalConfig`] if the file exists but cannot be parsed.
    pub fn from_path(path: &Path) -> Result<Self, GupError> {
        if !path.exists() {
            tracing::debug!(
                "Global config not found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            GupError::InvalidGlobalConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            GupError::InvalidGlobalConfig(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        for warning in config.validate()? {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(config)
    }

    /// Get the default global config directory (`~/.gup`).
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(GUP_DIR))
    }

    /// Get the default global config file path (`~/.gup/config.yaml`).
    pub fn default_path() -> Option<PathBuf> {
        Self::default_dir().map(|d| d.join(GLOBAL_CONFIG_FILENAME))
    }

    /// Validate the configuration, returning warnings for questionable values.
    ///
    /// # Errors
    ///
    /// Returns [`GupError::InvalidConfiguration`] if `git.binary` is empty.
    pub fn validate(&self) -> Result<Vec<String>, GupError> {
        let mut warnings = Vec::new();

        if self.git.binary.as_os_str().is_empty() {
            return Err(GupError::InvalidConfiguration {
                message: "git.binary cannot be empty".to_string(),
                hint: "Remove the key to use `git` from PATH".to_string(),
            });
        }

        if self.cache.ttl_millis == 0 {
            warnings.push(
                "cache.ttlMillis=0 disables status caching; every query runs git".to_string(),
            );
        } else if self.cache.ttl_millis > MAX_REASONABLE_TTL_MILLIS {
            warnings.push(format!(
                "cache.ttlMillis={} is very large; applied identity changes may show up late",
                self.cache.ttl_millis
            ));
        }

        Ok(warnings)
    }

    /// Status cache time-to-live.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache.ttl_millis)
    }

    /// Configured global settings path, with `~/` expanded.
    pub fn settings_path(&self) -> Option<PathBuf> {
        self.settings.path.as_deref().map(expand_home)
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

// ============================================================================
// Tests
// ============================================================================
