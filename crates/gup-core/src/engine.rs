//! gup engine: the workspace status resolution orchestrator.
//!
//! [`GupEngine`] ties the locator, the identity accessor, the profile store
//! and the status cache together. It answers "which identity should this
//! location use, and is it in effect?" and performs the few mutations that
//! follow from the answer (select, apply, auto-select).

use std::path::Path;
use std::sync::Arc;

use crate::cache::StatusCache;
use crate::config::GlobalConfig;
use crate::errors::GupError;
use crate::identity::{GitIdentity, IdentityConfigAccessor};
use crate::profile::{Profile, ProfileId, ProfileStore, SelectedProfile};
use crate::settings::{FileSettings, SettingsStore};
use crate::status::{is_in_sync, StatusCode, WorkspaceStatus};
use crate::vcs::{GitCli, VcsTool};
use crate::workspace::{RepositoryRoot, RepositoryRootLocator};

/// How a freshly classified status may be reused.
enum Outcome {
    /// Ordinary classification; cached.
    Settled(WorkspaceStatus),
    /// The classification changed the selection; not cached, so the next
    /// resolve observes the persisted state.
    AutoSelected(WorkspaceStatus),
}

// ============================================================================
// GupEngine
// ============================================================================

/// The main engine for gup operations.
///
/// Construct one per process and share it by reference; it is `Send + Sync`.
/// Nothing is global: tests build fresh engines with fresh caches.
///
/// # Example
///
/// ```ignore
/// use gup_core::{GlobalConfig, GupEngine};
/// use std::path::Path;
///
/// let engine = GupEngine::from_global_config(GlobalConfig::load_default()?)?;
/// let status = engine.resolve_path(Path::new("."));
/// println!("{}", status.display_label());
/// ```
#[derive(Debug)]
pub struct GupEngine {
    config: GlobalConfig,
    locator: RepositoryRootLocator,
    identity: IdentityConfigAccessor,
    profiles: ProfileStore,
    cache: StatusCache,
}

impl GupEngine {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create an engine over explicit collaborators.
    pub fn new(
        config: GlobalConfig,
        vcs: Arc<dyn VcsTool>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        let cache = StatusCache::new(config.cache_ttl());
        Self {
            locator: RepositoryRootLocator::new(vcs.clone()),
            identity: IdentityConfigAccessor::new(vcs),
            profiles: ProfileStore::new(settings),
            cache,
            config,
        }
    }

    /// Create an engine that runs the configured git binary and keeps
    /// settings in YAML files.
    ///
    /// The global settings file is `settings.path` from the config, or
    /// `~/.gup/settings.yaml`.
    pub fn from_global_config(config: GlobalConfig) -> anyhow::Result<Self> {
        let vcs = Arc::new(GitCli::new(config.git.binary.clone()));
        let settings = match config.settings_path() {
            Some(path) => FileSettings::new(path),
            None => FileSettings::load_default(),
        };
        tracing::debug!(
            "Using git `{}` and settings {}",
            vcs.binary().display(),
            settings.global_path().display()
        );
        Ok(Self::new(config, vcs, Arc::new(settings)))
    }

    /// Create an engine from `~/.gup/config.yaml` (or defaults).
    pub fn with_defaults() -> anyhow::Result<Self> {
        Self::from_global_config(GlobalConfig::load_default()?)
    }

    /// Create an engine from a specific config file.
    pub fn with_config(path: &Path) -> anyhow::Result<Self> {
        Self::from_global_config(GlobalConfig::from_path(path)?)
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// The profile store.
    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    // -------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------

    /// Repository root governing `path`.
    pub fn find_root(&self, path: &Path) -> Option<RepositoryRoot> {
        self.locator.find(path)
    }

    /// Identity configured at `root`. Unreadable fields are empty.
    pub fn current_identity(&self, root: &RepositoryRoot) -> GitIdentity {
        self.identity.read(root)
    }

    /// Resolve the status of `path`.
    pub fn resolve_path(&self, path: &Path) -> WorkspaceStatus {
        self.resolve(Some(path))
    }

    /// Resolve the status of the active location.
    ///
    /// Never fails: tool and settings problems degrade into the returned
    /// status. A fresh cached status for the root is returned as is.
    pub fn resolve(&self, location: Option<&Path>) -> WorkspaceStatus {
        let Some(location) = location else {
            tracing::debug!("No active location");
            return WorkspaceStatus::not_a_valid_workspace().with_message("No active location");
        };

        let Some(root) = self.locator.find(location) else {
            return WorkspaceStatus::not_a_valid_workspace().with_message(format!(
                "{} is not inside a git repository",
                location.display()
            ));
        };

        if let Some(cached) = self.cache.get(&root) {
            return cached;
        }

        let generation = self.cache.generation();
        match self.classify(&root) {
            Outcome::Settled(status) => {
                self.cache.put_if_current(&root, status.clone(), generation);
                status
            }
            Outcome::AutoSelected(status) => status,
        }
    }

    fn classify(&self, root: &RepositoryRoot) -> Outcome {
        let profiles = match self.profiles.list() {
            Ok(profiles) => profiles,
            Err(e) => {
                tracing::warn!("Failed to load profiles: {}", e);
                return Outcome::Settled(
                    WorkspaceStatus::for_root(StatusCode::NoProfilesInConfig, root.clone())
                        .with_message(format!("Failed to load profiles: {}", e)),
                );
            }
        };
        let identity = self.identity.read(root);

        let status = |code: StatusCode| {
            let mut status = WorkspaceStatus::for_root(code, root.clone());
            status.profiles_in_config_count = profiles.len();
            status.current_identity = Some(identity.clone());
            status
        };

        if profiles.is_empty() {
            return Outcome::Settled(status(StatusCode::NoProfilesInConfig));
        }

        let selected = self
            .profiles
            .selected_profile(root, &profiles)
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to read selection for {}: {}", root, e);
                SelectedProfile::NoSelection
            });

        let profile = match selected {
            SelectedProfile::Found { profile, tier } => {
                tracing::debug!("Selected profile {} via {:?}", profile.id, tier);
                profile
            }
            SelectedProfile::NoSelection => {
                return Outcome::Settled(
                    status(StatusCode::NoSelectedProfilesInConfig)
                        .with_message("No profile selected for this repository"),
                );
            }
            SelectedProfile::Dangling(id) => {
                return Outcome::Settled(
                    status(StatusCode::NoSelectedProfilesInConfig)
                        .with_message(format!("Selected profile {} no longer exists", id)),
                );
            }
        };

        let missing = profile.missing_fields();
        if !missing.is_empty() {
            let mut incomplete = status(StatusCode::FieldsMissing)
                .with_message(format!("Profile is missing: {}", missing.join(", ")));
            incomplete.selected_profile = Some(profile);
            return Outcome::Settled(incomplete);
        }

        if let Some(matched) = self.auto_match(&profiles, &identity, &profile.id) {
            if let Err(e) = self.profiles.set_selected_id(&matched.id, root) {
                tracing::warn!("Failed to persist auto-selected profile: {}", e);
            }
            self.cache.invalidate(Some(root));
            tracing::info!("Auto-selected profile {} for {}", matched.label, root);

            let mut auto = status(StatusCode::NoIssues)
                .with_message(format!("Auto-selected profile {}", matched.label));
            auto.in_sync = true;
            auto.selected_profile = Some(matched);
            return Outcome::AutoSelected(auto);
        }

        let in_sync = is_in_sync(&identity, &profile);
        let mut result = status(if in_sync {
            StatusCode::NoIssues
        } else {
            StatusCode::ConfigOutOfSync
        });
        result.in_sync = in_sync;
        result.selected_profile = Some(profile);
        Outcome::Settled(result)
    }

    /// First profile matching `identity` exactly, if auto-select is on and
    /// it is not already the selection.
    fn auto_match(
        &self,
        profiles: &[Profile],
        identity: &GitIdentity,
        selected: &ProfileId,
    ) -> Option<Profile> {
        let enabled = self.profiles.auto_select_enabled().unwrap_or_else(|e| {
            tracing::warn!("Failed to read auto-select setting: {}", e);
            false
        });
        if !enabled {
            return None;
        }

        profiles
            .iter()
            .find(|p| p.matches_exactly(identity))
            .filter(|p| &p.id != selected)
            .cloned()
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Make `id` the selection for `root`.
    pub fn select_profile(&self, root: &RepositoryRoot, id: &ProfileId) -> Result<Profile, GupError> {
        let profile = self
            .profiles
            .find(id)?
            .ok_or_else(|| GupError::ProfileNotFound(id.to_string()))?;

        let result = self.profiles.set_selected_id(id, root);
        self.cache.invalidate(Some(root));
        result?;

        tracing::debug!("Selected profile {} for {}", profile.label, root);
        Ok(profile)
    }

    /// Write profile `id`'s identity to `root`'s local config and select it.
    ///
    /// The selection is recorded and the cache invalidated even when the
    /// identity write fails; the write error is then returned.
    pub fn apply_profile(&self, root: &RepositoryRoot, id: &ProfileId) -> Result<Profile, GupError> {
        let profile = self
            .profiles
            .find(id)?
            .ok_or_else(|| GupError::ProfileNotFound(id.to_string()))?;

        if !profile.is_complete() {
            return Err(GupError::InvalidProfile(format!(
                "{} is missing: {}",
                profile.label,
                profile.missing_fields().join(", ")
            )));
        }

        let written = self.identity.write(root, &profile.identity());
        let selected = self.profiles.set_selected_id(id, root);
        self.cache.invalidate(Some(root));
        written?;
        selected?;

        tracing::debug!("Applied profile {} to {}", profile.label, root);
        Ok(profile)
    }

    /// Insert or update a profile. See [`ProfileStore::save`].
    pub fn save_profile(
        &self,
        profile: &Profile,
        previous_label: Option<&str>,
    ) -> Result<Profile, GupError> {
        let result = self.profiles.save(profile, previous_label);
        self.cache.invalidate(None);
        result
    }

    /// Delete a profile.
    pub fn remove_profile(&self, id: &ProfileId) -> Result<Profile, GupError> {
        let result = self.profiles.remove(id);
        self.cache.invalidate(None);
        result
    }

    /// Whether matching profiles are selected automatically.
    pub fn auto_select_enabled(&self) -> Result<bool, GupError> {
        self.profiles.auto_select_enabled()
    }

    /// Turn automatic selection of matching profiles on or off.
    pub fn set_auto_select(&self, enabled: bool) -> Result<(), GupError> {
        let result = self.profiles.set_auto_select(enabled);
        self.cache.invalidate(None);
        result
    }

    /// Drop cached statuses for `root`, or all of them.
    pub fn invalidate(&self, root: Option<&RepositoryRoot>) {
        self.cache.invalidate(root);
    }
}

// ============================================================================
// Tests
// ============================================================================
