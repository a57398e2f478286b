//! Settings collaborator.
//!
//! Profiles and selections live in a two-layer key-value store:
//!
//! - the **global** layer holds `profiles` and
//!   `selectMatchedProfileAutomatically`;
//! - the **location** layer, one per repository root, holds
//!   `selectedProfileId`.
//!
//! [`FileSettings`] keeps each layer in a YAML file (`~/.gup/settings.yaml`
//! and `<root>/.gup/settings.yaml`) and re-reads them on every access, so
//! edits made by other processes are always visible. [`MemorySettings`] is
//! an in-process store for embedding hosts that own persistence and for
//! tests.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::constants::{GUP_DIR, SETTINGS_FILENAME};
use crate::errors::GupError;
use crate::profile::ProfileRecord;
use crate::workspace::RepositoryRoot;

// ============================================================================
// SettingsStore
// ============================================================================

/// Two-layer settings store consumed by the profile store and engine.
pub trait SettingsStore: std::fmt::Debug + Send + Sync {
    /// Stored profile records, in order, exactly as persisted.
    fn load_profiles(&self) -> Result<Vec<ProfileRecord>, GupError>;

    /// Replace the stored profile list with `profiles` in one write.
    fn store_profiles(&self, profiles: &[ProfileRecord]) -> Result<(), GupError>;

    /// Location-scoped `selectedProfileId` for `root`.
    fn selected_profile_id(&self, root: &RepositoryRoot) -> Result<Option<String>, GupError>;

    /// Set the location-scoped `selectedProfileId` for `root`.
    fn set_selected_profile_id(&self, root: &RepositoryRoot, id: &str) -> Result<(), GupError>;

    /// Global `selectMatchedProfileAutomatically` flag.
    fn select_matched_profile_automatically(&self) -> Result<bool, GupError>;

    /// Set the global `selectMatchedProfileAutomatically` flag.
    fn set_select_matched_profile_automatically(&self, enabled: bool) -> Result<(), GupError>;

    /// Whether a location layer exists.
    ///
    /// When it does not, the legacy per-profile `selected` flag is the only
    /// way to record a selection.
    fn has_location_scope(&self) -> bool {
        true
    }
}

// ============================================================================
// FileSettings
// ============================================================================

/// Global settings layer as stored on disk.
///
/// Keys gup does not know about are kept and written back untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GlobalSettingsFile {
    #[serde(default)]
    profiles: Vec<ProfileRecord>,

    #[serde(default)]
    select_matched_profile_automatically: bool,

    #[serde(flatten)]
    other: BTreeMap<String, serde_yaml::Value>,
}

/// Location settings layer as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationSettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected_profile_id: Option<String>,

    #[serde(flatten)]
    other: BTreeMap<String, serde_yaml::Value>,
}

/// YAML-file backed [`SettingsStore`].
#[derive(Debug, Clone)]
pub struct FileSettings {
    global_path: PathBuf,
}

impl FileSettings {
    /// Use `global_path` as the global settings file.
    pub fn new(global_path: impl Into<PathBuf>) -> Self {
        Self {
            global_path: global_path.into(),
        }
    }

    /// Use the default global settings file (`~/.gup/settings.yaml`).
    ///
    /// Falls back to `./.gup/settings.yaml` when the home directory cannot
    /// be determined.
    pub fn load_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::new(path),
            None => {
                tracing::debug!("Could not determine home directory, using ./{}", GUP_DIR);
                Self::new(PathBuf::from(GUP_DIR).join(SETTINGS_FILENAME))
            }
        }
    }

    /// Default global settings path (`~/.gup/settings.yaml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(GUP_DIR).join(SETTINGS_FILENAME))
    }

    /// Path of the global settings file.
    pub fn global_path(&self) -> &Path {
        &self.global_path
    }

    fn read_global(&self) -> Result<GlobalSettingsFile, GupError> {
        read_yaml(&self.global_path)
    }

    fn update_global(
        &self,
        update: impl FnOnce(&mut GlobalSettingsFile),
    ) -> Result<(), GupError> {
        let mut settings = self.read_global()?;
        update(&mut settings);
        write_yaml(&self.global_path, &settings)
    }
}

impl SettingsStore for FileSettings {
    fn load_profiles(&self) -> Result<Vec<ProfileRecord>, GupError> {
        Ok(self.read_global()?.profiles)
    }

    fn store_profiles(&self, profiles: &[ProfileRecord]) -> Result<(), GupError> {
        self.update_global(|settings| settings.profiles = profiles.to_vec())
    }

    fn selected_profile_id(&self, root: &RepositoryRoot) -> Result<Option<String>, GupError> {
        let settings: LocationSettingsFile = read_yaml(&root.settings_path())?;
        Ok(settings.selected_profile_id.filter(|id| !id.is_empty()))
    }

    fn set_selected_profile_id(&self, root: &RepositoryRoot, id: &str) -> Result<(), GupError> {
        let path = root.settings_path();
        let mut settings: LocationSettingsFile = read_yaml(&path)?;
        settings.selected_profile_id = Some(id.to_string());
        write_yaml(&path, &settings)
    }

    fn select_matched_profile_automatically(&self) -> Result<bool, GupError> {
        Ok(self.read_global()?.select_matched_profile_automatically)
    }

    fn set_select_matched_profile_automatically(&self, enabled: bool) -> Result<(), GupError> {
        self.update_global(|settings| settings.select_matched_profile_automatically = enabled)
    }
}

/// Read a YAML settings file; a missing or blank file yields defaults.
fn read_yaml<T: DeserializeOwned + Default>(path: &Path) -> Result<T, GupError> {
    if !path.exists() {
        return Ok(T::default());
    }

    let content = fs::read_to_string(path).map_err(|e| GupError::InvalidSettings {
        path: path.to_path_buf(),
        message: format!("Failed to read: {}", e),
    })?;

    if content.trim().is_empty() {
        return Ok(T::default());
    }

    serde_yaml::from_str(&content).map_err(|e| GupError::InvalidSettings {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Write a YAML settings file via a sibling temp file and rename, so a
/// concurrent reader never sees a half-written file.
fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<(), GupError> {
    let write_err = |message: String| GupError::SettingsWrite {
        path: path.to_path_buf(),
        message,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| write_err(format!("Failed to create directory: {}", e)))?;
        }
    }

    let content = serde_yaml::to_string(value).map_err(|e| write_err(e.to_string()))?;
    let tmp = path.with_extension("yaml.tmp");
    fs::write(&tmp, content).map_err(|e| write_err(e.to_string()))?;
    fs::rename(&tmp, path).map_err(|e| write_err(e.to_string()))?;
    Ok(())
}

// ============================================================================
// MemorySettings
// ============================================================================

#[derive(Debug, Default)]
struct MemoryState {
    profiles: Vec<ProfileRecord>,
    select_matched: bool,
    selected: HashMap<RepositoryRoot, String>,
}

/// In-process [`SettingsStore`].
///
/// Counts profile-list writes so callers can observe batching, and can be
/// told to fail writes or to behave as a store without a location layer.
#[derive(Debug)]
pub struct MemorySettings {
    state: Mutex<MemoryState>,
    profile_writes: AtomicUsize,
    location_scope: bool,
    fail_writes: bool,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            profile_writes: AtomicUsize::new(0),
            location_scope: true,
            fail_writes: false,
        }
    }
}

impl MemorySettings {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `profiles` (not counted as a write).
    pub fn with_profiles(profiles: Vec<ProfileRecord>) -> Self {
        let settings = Self::default();
        if let Ok(mut state) = settings.state.lock() {
            state.profiles = profiles;
        }
        settings
    }

    /// Start with `selectMatchedProfileAutomatically` set to `enabled`.
    pub fn with_auto_select(self, enabled: bool) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.select_matched = enabled;
        }
        self
    }

    /// Disable the location layer.
    pub fn without_location_scope(mut self) -> Self {
        self.location_scope = false;
        self
    }

    /// Make every write fail with [`GupError::SettingsWrite`].
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Number of times the profile list has been written.
    pub fn profile_writes(&self) -> usize {
        self.profile_writes.load(Ordering::SeqCst)
    }

    fn state(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, GupError> {
        self.state
            .lock()
            .map_err(|_| GupError::Other(anyhow::anyhow!("settings lock poisoned")))
    }

    fn check_writable(&self) -> Result<(), GupError> {
        if self.fail_writes {
            return Err(GupError::SettingsWrite {
                path: PathBuf::from("<memory>"),
                message: "writes disabled".to_string(),
            });
        }
        Ok(())
    }
}

impl SettingsStore for MemorySettings {
    fn load_profiles(&self) -> Result<Vec<ProfileRecord>, GupError> {
        Ok(self.state()?.profiles.clone())
    }

    fn store_profiles(&self, profiles: &[ProfileRecord]) -> Result<(), GupError> {
        self.check_writable()?;
        self.state()?.profiles = profiles.to_vec();
        self.profile_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn selected_profile_id(&self, root: &RepositoryRoot) -> Result<Option<String>, GupError> {
        if !self.location_scope {
            return Ok(None);
        }
        Ok(self
            .state()?
            .selected
            .get(root)
            .filter(|id| !id.is_empty())
            .cloned())
    }

    fn set_selected_profile_id(&self, root: &RepositoryRoot, id: &str) -> Result<(), GupError> {
        self.check_writable()?;
        if !self.location_scope {
            return Err(GupError::InvalidConfiguration {
                message: "settings store has no location scope".to_string(),
                hint: "Select the profile through its legacy `selected` flag".to_string(),
            });
        }
        self.state()?.selected.insert(root.clone(), id.to_string());
        Ok(())
    }

    fn select_matched_profile_automatically(&self) -> Result<bool, GupError> {
        Ok(self.state()?.select_matched)
    }

    fn set_select_matched_profile_automatically(&self, enabled: bool) -> Result<(), GupError> {
        self.check_writable()?;
        self.state()?.select_matched = enabled;
        Ok(())
    }

    fn has_location_scope(&self) -> bool {
        self.location_scope
    }
}

// ============================================================================
// Tests
// ============================================================================
