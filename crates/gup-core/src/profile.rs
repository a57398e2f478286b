//! Identity profiles and the profile store.
//!
//! A [`Profile`] is a named identity (user name, email, signing key) with a
//! stable [`ProfileId`]. Profiles are persisted as [`ProfileRecord`]s in the
//! global settings layer; records written by older versions may lack an id
//! or a signing key, and are migrated in place the first time they are seen.
//!
//! ## Selection
//!
//! Which profile is selected for a repository is a two-tier lookup:
//!
//! 1. the location-scoped `selectedProfileId` setting of the root;
//! 2. the legacy per-profile `selected` flag (first flagged profile in list
//!    order wins when several are flagged).
//!
//! [`SelectedId::tier`] reports which tier answered.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::constants::SELECTED_MARKER;
use crate::errors::GupError;
use crate::identity::GitIdentity;
use crate::settings::SettingsStore;
use crate::workspace::RepositoryRoot;

// ============================================================================
// ProfileId
// ============================================================================

/// A unique, never reused profile identifier (UUID v4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 characters, for display.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProfileId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl AsRef<str> for ProfileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// ProfileRecord
// ============================================================================

/// A profile exactly as stored in settings.
///
/// Tolerates legacy shapes: `id` and `signingKey` may be absent or `null`,
/// and `null` text fields read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    /// Stable identifier; missing in records written before ids existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display label.
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,

    /// Git `user.name`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_name: String,

    /// Git `user.email`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,

    /// Git `user.signingkey`; `None` only in unmigrated records.
    #[serde(default)]
    pub signing_key: Option<String>,

    /// Legacy selection flag.
    #[serde(default, deserialize_with = "null_as_default")]
    pub selected: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Assign missing ids and normalize missing signing keys.
///
/// Returns `true` if any record changed. Running it again on its own output
/// changes nothing.
pub fn migrate_records(records: &mut [ProfileRecord]) -> bool {
    let mut changed = false;

    for record in records.iter_mut() {
        if record.id.as_deref().map_or(true, str::is_empty) {
            record.id = Some(ProfileId::generate().0);
            changed = true;
        }
        if record.signing_key.is_none() {
            record.signing_key = Some(String::new());
            changed = true;
        }
    }

    changed
}

// ============================================================================
// Profile
// ============================================================================

/// A migrated profile. Handed out by value: editing one changes nothing
/// until it is passed to [`ProfileStore::save`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Stable identifier.
    pub id: ProfileId,
    /// Display label (not unique).
    pub label: String,
    /// Git `user.name`.
    pub user_name: String,
    /// Git `user.email`.
    pub email: String,
    /// Git `user.signingkey`; empty when not used.
    pub signing_key: String,
    /// Legacy selection flag.
    pub selected: bool,
}

impl Profile {
    /// Create a new profile with a freshly generated id.
    pub fn new(
        label: impl Into<String>,
        user_name: impl Into<String>,
        email: impl Into<String>,
        signing_key: impl Into<String>,
    ) -> Self {
        Self {
            id: ProfileId::generate(),
            label: label.into(),
            user_name: user_name.into(),
            email: email.into(),
            signing_key: signing_key.into(),
            selected: false,
        }
    }

    /// The identity this profile would configure.
    pub fn identity(&self) -> GitIdentity {
        GitIdentity::new(&self.user_name, &self.email, &self.signing_key)
    }

    /// Names of required fields that are empty. The signing key is optional.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.label.trim().is_empty() {
            missing.push("label");
        }
        if self.user_name.trim().is_empty() {
            missing.push("userName");
        }
        if self.email.trim().is_empty() {
            missing.push("email");
        }
        missing
    }

    /// Whether label, user name and email are all set.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Exact, case-sensitive match of all three identity fields.
    pub fn matches_exactly(&self, identity: &GitIdentity) -> bool {
        self.user_name == identity.user_name
            && self.email == identity.email
            && self.signing_key == identity.signing_key
    }

    /// Label with the selection marker, for pick lists.
    pub fn decorated_label(&self) -> String {
        format!("{}{}", SELECTED_MARKER, strip_marker(&self.label))
    }

    fn from_record(record: ProfileRecord) -> Self {
        Self {
            id: ProfileId(record.id.unwrap_or_default()),
            label: record.label,
            user_name: record.user_name,
            email: record.email,
            signing_key: record.signing_key.unwrap_or_default(),
            selected: record.selected,
        }
    }

    fn to_record(&self) -> ProfileRecord {
        ProfileRecord {
            id: Some(self.id.0.clone()),
            label: strip_marker(&self.label).to_string(),
            user_name: self.user_name.clone(),
            email: self.email.clone(),
            signing_key: Some(self.signing_key.clone()),
            selected: self.selected,
        }
    }
}

/// Remove the display-only selection marker from a label.
pub fn strip_marker(label: &str) -> &str {
    label.strip_prefix(SELECTED_MARKER).unwrap_or(label).trim()
}

// ============================================================================
// Selection
// ============================================================================

/// Which lookup tier produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionTier {
    /// The root's `selectedProfileId` setting.
    LocationSetting,
    /// A profile's legacy `selected` flag.
    LegacyFlag,
}

/// A selected profile id and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedId {
    /// The selected id.
    pub id: ProfileId,
    /// The tier that supplied it.
    pub tier: SelectionTier,
}

/// Outcome of resolving a root's selection against the profile list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedProfile {
    /// The selection names an existing profile.
    Found {
        /// The selected profile.
        profile: Profile,
        /// The tier that supplied the selection.
        tier: SelectionTier,
    },
    /// Nothing is selected.
    NoSelection,
    /// The selected id matches no stored profile.
    Dangling(ProfileId),
}

impl SelectedProfile {
    /// The selected profile, if one was found.
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            Self::Found { profile, .. } => Some(profile),
            Self::NoSelection | Self::Dangling(_) => None,
        }
    }
}

// ============================================================================
// ProfileStore
// ============================================================================

/// View of the stored profiles.
///
/// Nothing is cached: every call re-reads the settings store, which stays
/// the single source of truth.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    settings: Arc<dyn SettingsStore>,
}

impl ProfileStore {
    /// Create a store over `settings`.
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    /// Load records and migrate them, persisting once if anything changed.
    ///
    /// A failed migration write is logged; the migrated view is still used
    /// and the write is retried on the next access.
    fn load_migrated(&self) -> Result<Vec<ProfileRecord>, GupError> {
        let mut records = self.settings.load_profiles()?;

        if migrate_records(&mut records) {
            match self.settings.store_profiles(&records) {
                Ok(()) => tracing::info!("Migrated {} stored profile(s)", records.len()),
                Err(e) => tracing::warn!("Failed to persist migrated profiles: {}", e),
            }
        }

        Ok(records)
    }

    /// All profiles, in stored order.
    pub fn list(&self) -> Result<Vec<Profile>, GupError> {
        Ok(self
            .load_migrated()?
            .into_iter()
            .map(Profile::from_record)
            .collect())
    }

    /// The profile with `id`, if any.
    pub fn find(&self, id: &ProfileId) -> Result<Option<Profile>, GupError> {
        Ok(self.list()?.into_iter().find(|p| &p.id == id))
    }

    /// Resolve a user-supplied key: exact id, then label (case-insensitive,
    /// marker stripped), then unique id prefix.
    ///
    /// # Errors
    ///
    /// [`GupError::ProfileNotFound`] when nothing matches and
    /// [`GupError::AmbiguousProfile`] when a label or prefix matches several.
    pub fn find_by_key(&self, key: &str) -> Result<Profile, GupError> {
        let profiles = self.list()?;
        let key = strip_marker(key);

        if let Some(profile) = profiles.iter().find(|p| p.id.as_str() == key) {
            return Ok(profile.clone());
        }

        let by_label: Vec<&Profile> = profiles
            .iter()
            .filter(|p| strip_marker(&p.label).eq_ignore_ascii_case(key))
            .collect();
        let candidates = if by_label.is_empty() && !key.is_empty() {
            profiles
                .iter()
                .filter(|p| p.id.as_str().starts_with(key))
                .collect()
        } else {
            by_label
        };

        match candidates.as_slice() {
            [] => Err(GupError::ProfileNotFound(key.to_string())),
            [profile] => Ok((*profile).clone()),
            many => Err(GupError::AmbiguousProfile {
                key: key.to_string(),
                matches: many
                    .iter()
                    .map(|p| format!("{} ({})", p.label, p.id.short()))
                    .collect(),
            }),
        }
    }

    /// Insert or update a profile.
    ///
    /// The record to overwrite is the one with the same id; failing that,
    /// the one whose label equals `previous_label` case-insensitively (or,
    /// for a profile with an empty id, its own label), which keeps its
    /// stored id; failing that, the profile is appended.
    ///
    /// The label is stored without the selection marker. Legacy `selected`
    /// flags are cleared on every record, unless the settings store has no
    /// location scope: then the flag is the only selection mechanism and the
    /// saved profile's flag is kept (clearing the others if it is set).
    ///
    /// Returns the profile as stored.
    pub fn save(&self, profile: &Profile, previous_label: Option<&str>) -> Result<Profile, GupError> {
        let mut records = self.load_migrated()?;
        let mut stored = profile.clone();
        stored.label = strip_marker(&profile.label).to_string();

        let by_id = records
            .iter()
            .position(|r| r.id.as_deref() == Some(profile.id.as_str()));
        // Labels are not unique: fall back to them only for an explicit
        // previous label or a profile without an id.
        let label_key = match previous_label {
            Some(previous) => Some(previous),
            None if profile.id.as_str().is_empty() => Some(stored.label.as_str()),
            None => None,
        };
        let target = by_id.or_else(|| {
            let wanted = strip_marker(label_key?);
            records
                .iter()
                .position(|r| strip_marker(&r.label).eq_ignore_ascii_case(wanted))
        });

        if by_id.is_none() {
            if let Some(existing) = target.and_then(|i| records[i].id.clone()) {
                stored.id = ProfileId(existing);
            } else if stored.id.as_str().is_empty() {
                stored.id = ProfileId::generate();
            }
        }

        let legacy_only = !self.settings.has_location_scope();
        if legacy_only {
            if stored.selected {
                records.iter_mut().for_each(|r| r.selected = false);
            }
        } else {
            records.iter_mut().for_each(|r| r.selected = false);
            stored.selected = false;
        }

        let record = stored.to_record();
        match target {
            Some(index) => records[index] = record,
            None => records.push(record),
        }

        self.settings.store_profiles(&records)?;
        tracing::debug!("Saved profile {} ({})", stored.label, stored.id);
        Ok(stored)
    }

    /// Delete the profile with `id`, returning it.
    pub fn remove(&self, id: &ProfileId) -> Result<Profile, GupError> {
        let mut records = self.load_migrated()?;
        let index = records
            .iter()
            .position(|r| r.id.as_deref() == Some(id.as_str()))
            .ok_or_else(|| GupError::ProfileNotFound(id.to_string()))?;

        let removed = Profile::from_record(records.remove(index));
        self.settings.store_profiles(&records)?;
        Ok(removed)
    }

    /// Two-tier selection lookup for `root`.
    pub fn get_selected_id(&self, root: &RepositoryRoot) -> Result<Option<SelectedId>, GupError> {
        let profiles = self.list()?;
        self.selected_id_among(root, &profiles)
    }

    /// Two-tier selection lookup against an already loaded profile list.
    pub fn selected_id_among(
        &self,
        root: &RepositoryRoot,
        profiles: &[Profile],
    ) -> Result<Option<SelectedId>, GupError> {
        if let Some(id) = self.settings.selected_profile_id(root)? {
            return Ok(Some(SelectedId {
                id: ProfileId(id),
                tier: SelectionTier::LocationSetting,
            }));
        }

        Ok(profiles.iter().find(|p| p.selected).map(|p| SelectedId {
            id: p.id.clone(),
            tier: SelectionTier::LegacyFlag,
        }))
    }

    /// Resolve the selection for `root` to a profile in `profiles`.
    pub fn selected_profile(
        &self,
        root: &RepositoryRoot,
        profiles: &[Profile],
    ) -> Result<SelectedProfile, GupError> {
        let Some(selected) = self.selected_id_among(root, profiles)? else {
            return Ok(SelectedProfile::NoSelection);
        };

        Ok(match profiles.iter().find(|p| p.id == selected.id) {
            Some(profile) => SelectedProfile::Found {
                profile: profile.clone(),
                tier: selected.tier,
            },
            None => SelectedProfile::Dangling(selected.id),
        })
    }

    /// Record `id` as the selection for `root`.
    ///
    /// Without a location scope the legacy flags are rewritten instead.
    pub fn set_selected_id(&self, id: &ProfileId, root: &RepositoryRoot) -> Result<(), GupError> {
        if self.settings.has_location_scope() {
            return self.settings.set_selected_profile_id(root, id.as_str());
        }

        let mut records = self.load_migrated()?;
        for record in records.iter_mut() {
            record.selected = record.id.as_deref() == Some(id.as_str());
        }
        self.settings.store_profiles(&records)
    }

    /// Global auto-select setting.
    pub fn auto_select_enabled(&self) -> Result<bool, GupError> {
        self.settings.select_matched_profile_automatically()
    }

    /// Change the global auto-select setting.
    pub fn set_auto_select(&self, enabled: bool) -> Result<(), GupError> {
        self.settings.set_select_matched_profile_automatically(enabled)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettings;
    use tempfile::TempDir;

    fn legacy(label: &str, selected: bool) -> ProfileRecord {
        ProfileRecord {
            id: None,
            label: label.to_string(),
            user_name: format!("{} user", label),
            email: format!("{}@x.com", label.to_lowercase()),
            signing_key: None,
            selected,
        }
    }

    fn store_with(records: Vec<ProfileRecord>) -> (ProfileStore, Arc<MemorySettings>) {
        let settings = Arc::new(MemorySettings::with_profiles(records));
        (ProfileStore::new(settings.clone()), settings)
    }

    fn temp_root() -> (TempDir, RepositoryRoot) {
        let temp = TempDir::new().unwrap();
        let root = RepositoryRoot::canonical(temp.path()).unwrap();
        (temp, root)
    }

    // ------------------------------------------------------------------------
    // Migration
    // ------------------------------------------------------------------------

    #[test]
    fn test_migration_assigns_ids_and_signing_keys() {
        let mut records = vec![legacy("Work", false), legacy("Home", false)];
        assert!(migrate_records(&mut records));

        for record in &records {
            assert!(record.id.as_deref().map_or(false, |id| !id.is_empty()));
            assert_eq!(record.signing_key.as_deref(), Some(""));
        }
        assert_ne!(records[0].id, records[1].id);
    }

    #[test]
    fn test_migration_is_idempotent() {
        let mut records = vec![legacy("Work", false)];
        assert!(migrate_records(&mut records));
        let snapshot = records.clone();
        assert!(!migrate_records(&mut records));
        assert_eq!(records, snapshot);
    }

    #[test]
    fn test_migration_treats_empty_id_as_missing() {
        let mut records = vec![ProfileRecord {
            id: Some(String::new()),
            signing_key: Some("KEY".to_string()),
            ..legacy("Work", false)
        }];
        assert!(migrate_records(&mut records));
        assert!(!records[0].id.as_deref().unwrap().is_empty());
        assert_eq!(records[0].signing_key.as_deref(), Some("KEY"));
    }

    #[test]
    fn test_list_persists_migration_once() {
        let (store, settings) = store_with(vec![legacy("Work", false), legacy("Home", false)]);

        let first = store.list().unwrap();
        assert_eq!(settings.profile_writes(), 1);

        let second = store.list().unwrap();
        assert_eq!(settings.profile_writes(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_list_survives_failed_migration_write() {
        let settings = Arc::new(
            MemorySettings::with_profiles(vec![legacy("Work", false)]).failing_writes(),
        );
        let store = ProfileStore::new(settings);
        let profiles = store.list().unwrap();
        assert_eq!(profiles.len(), 1);
        assert!(!profiles[0].id.as_str().is_empty());
    }

    #[test]
    fn test_record_deserializes_nulls() {
        let yaml = "label: null\nuserName: Alice\nemail: null\nsigningKey: null\nselected: null\n";
        let record: ProfileRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(record.label, "");
        assert_eq!(record.user_name, "Alice");
        assert_eq!(record.signing_key, None);
        assert!(!record.selected);
    }

    // ------------------------------------------------------------------------
    // Profile
    // ------------------------------------------------------------------------

    #[test]
    fn test_profile_missing_fields_exempts_signing_key() {
        let profile = Profile::new("Work", "Alice", "", "");
        assert_eq!(profile.missing_fields(), vec!["email"]);
        assert!(!profile.is_complete());
        assert!(Profile::new("Work", "Alice", "a@x.com", "").is_complete());
    }

    #[test]
    fn test_profile_matches_exactly_is_case_sensitive() {
        let profile = Profile::new("Work", "Alice", "a@x.com", "");
        assert!(profile.matches_exactly(&GitIdentity::new("Alice", "a@x.com", "")));
        assert!(!profile.matches_exactly(&GitIdentity::new("alice", "a@x.com", "")));
        assert!(!profile.matches_exactly(&GitIdentity::new("Alice", "a@x.com", "KEY")));
    }

    #[test]
    fn test_strip_marker() {
        assert_eq!(strip_marker("✔ Work"), "Work");
        assert_eq!(strip_marker("Work"), "Work");
        let profile = Profile::new("Work", "Alice", "a@x.com", "");
        assert_eq!(strip_marker(&profile.decorated_label()), "Work");
    }

    #[test]
    fn test_profile_id_short() {
        assert_eq!(ProfileId::new("0123456789abcdef").short(), "01234567");
        assert_eq!(ProfileId::new("abc").short(), "abc");
    }

    // ------------------------------------------------------------------------
    // Save / remove / find
    // ------------------------------------------------------------------------

    #[test]
    fn test_save_appends_new_profile() {
        let (store, _) = store_with(vec![]);
        let saved = store
            .save(&Profile::new("✔ Work", "Alice", "a@x.com", ""), None)
            .unwrap();

        let profiles = store.list().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].label, "Work");
        assert_eq!(profiles[0].id, saved.id);
    }

    #[test]
    fn test_save_overwrites_by_id() {
        let (store, _) = store_with(vec![]);
        let mut profile = store
            .save(&Profile::new("Work", "Alice", "a@x.com", ""), None)
            .unwrap();
        profile.label = "Office".to_string();
        profile.email = "alice@office.com".to_string();
        store.save(&profile, None).unwrap();

        let profiles = store.list().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].label, "Office");
        assert_eq!(profiles[0].email, "alice@office.com");
    }

    #[test]
    fn test_save_falls_back_to_label_and_keeps_stored_id() {
        let (store, _) = store_with(vec![legacy("Work", false)]);
        let stored_id = store.list().unwrap()[0].id.clone();

        // A profile built elsewhere, with an id the store has never seen
        let edited = Profile::new("Work", "Alice", "new@x.com", "");
        let saved = store.save(&edited, Some("WORK")).unwrap();

        let profiles = store.list().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].email, "new@x.com");
        assert_eq!(profiles[0].id, stored_id);
        assert_eq!(saved.id, stored_id);
    }

    #[test]
    fn test_save_clears_legacy_flags_with_location_scope() {
        let (store, _) = store_with(vec![legacy("Work", true), legacy("Home", true)]);
        let mut home = store.find_by_key("home").unwrap();
        home.selected = true;
        store.save(&home, None).unwrap();

        assert!(store.list().unwrap().iter().all(|p| !p.selected));
    }

    #[test]
    fn test_save_new_profiles_with_same_label_are_both_stored() {
        let (store, _) = store_with(vec![]);
        let alice = store
            .save(&Profile::new("Work", "Alice", "alice@x.com", ""), None)
            .unwrap();
        let bob = store
            .save(&Profile::new("work", "Bob", "bob@x.com", ""), None)
            .unwrap();

        assert_ne!(alice.id, bob.id);
        let profiles = store.list().unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].user_name, "Alice");
        assert_eq!(profiles[0].id, alice.id);
        assert_eq!(profiles[1].user_name, "Bob");
        assert_eq!(profiles[1].id, bob.id);
    }

    #[test]
    fn test_save_without_id_falls_back_to_own_label() {
        let (store, _) = store_with(vec![legacy("Work", false)]);
        let stored_id = store.list().unwrap()[0].id.clone();

        let mut edited = Profile::new("✔ work", "Alice", "new@x.com", "");
        edited.id = ProfileId::new("");
        let saved = store.save(&edited, None).unwrap();

        let profiles = store.list().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].email, "new@x.com");
        assert_eq!(saved.id, stored_id);
    }

    #[test]
    fn test_save_without_id_and_no_match_gets_fresh_id() {
        let (store, _) = store_with(vec![]);
        let mut profile = Profile::new("Work", "Alice", "a@x.com", "");
        profile.id = ProfileId::new("");
        let saved = store.save(&profile, None).unwrap();

        assert!(!saved.id.as_str().is_empty());
        assert_eq!(store.list().unwrap()[0].id, saved.id);
    }

    #[test]
    fn test_save_keeps_legacy_flag_without_location_scope() {
        let settings = Arc::new(
            MemorySettings::with_profiles(vec![legacy("Work", true), legacy("Home", false)])
                .without_location_scope(),
        );
        let store = ProfileStore::new(settings);
        let mut home = store.find_by_key("Home").unwrap();
        home.selected = true;
        store.save(&home, None).unwrap();

        let profiles = store.list().unwrap();
        assert!(!profiles[0].selected);
        assert!(profiles[1].selected);
    }

    #[test]
    fn test_remove_profile() {
        let (store, _) = store_with(vec![legacy("Work", false), legacy("Home", false)]);
        let work = store.find_by_key("Work").unwrap();
        let removed = store.remove(&work.id).unwrap();
        assert_eq!(removed.label, "Work");
        assert_eq!(store.list().unwrap().len(), 1);
        assert!(matches!(
            store.remove(&work.id),
            Err(GupError::ProfileNotFound(_))
        ));
    }

    #[test]
    fn test_find_by_key_label_prefix_and_ambiguity() {
        let (store, _) = store_with(vec![legacy("Work", false), legacy("work", false)]);
        let profiles = store.list().unwrap();

        assert_eq!(
            store.find_by_key(profiles[0].id.as_str()).unwrap().id,
            profiles[0].id
        );
        assert!(matches!(
            store.find_by_key("WORK"),
            Err(GupError::AmbiguousProfile { .. })
        ));
        assert_eq!(
            store.find_by_key(&profiles[1].id.as_str()[..12]).unwrap().id,
            profiles[1].id
        );
        assert!(matches!(
            store.find_by_key("nobody"),
            Err(GupError::ProfileNotFound(_))
        ));
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    #[test]
    fn test_selected_id_prefers_location_setting() {
        let (_temp, root) = temp_root();
        let (store, _) = store_with(vec![legacy("Work", true), legacy("Home", false)]);
        let home = store.find_by_key("Home").unwrap();
        store.set_selected_id(&home.id, &root).unwrap();

        let selected = store.get_selected_id(&root).unwrap().unwrap();
        assert_eq!(selected.id, home.id);
        assert_eq!(selected.tier, SelectionTier::LocationSetting);
    }

    #[test]
    fn test_selected_id_falls_back_to_legacy_flag() {
        let (_temp, root) = temp_root();
        let (store, _) = store_with(vec![legacy("Work", false), legacy("Home", true)]);

        let selected = store.get_selected_id(&root).unwrap().unwrap();
        assert_eq!(selected.id, store.find_by_key("Home").unwrap().id);
        assert_eq!(selected.tier, SelectionTier::LegacyFlag);
    }

    #[test]
    fn test_multiple_legacy_flags_first_in_list_order_wins() {
        let (_temp, root) = temp_root();
        let (store, _) = store_with(vec![
            legacy("Work", false),
            legacy("Home", true),
            legacy("Oss", true),
        ]);

        let selected = store.get_selected_id(&root).unwrap().unwrap();
        assert_eq!(selected.id, store.find_by_key("Home").unwrap().id);
    }

    #[test]
    fn test_selected_profile_variants() {
        let (_temp, root) = temp_root();
        let (store, _) = store_with(vec![legacy("Work", false)]);
        let profiles = store.list().unwrap();

        assert_eq!(
            store.selected_profile(&root, &profiles).unwrap(),
            SelectedProfile::NoSelection
        );

        store
            .set_selected_id(&ProfileId::new("gone"), &root)
            .unwrap();
        assert_eq!(
            store.selected_profile(&root, &profiles).unwrap(),
            SelectedProfile::Dangling(ProfileId::new("gone"))
        );

        store.set_selected_id(&profiles[0].id, &root).unwrap();
        let resolved = store.selected_profile(&root, &profiles).unwrap();
        assert_eq!(resolved.profile().map(|p| p.label.as_str()), Some("Work"));
    }

    #[test]
    fn test_set_selected_id_without_location_scope_uses_flags() {
        let (_temp, root) = temp_root();
        let settings = Arc::new(
            MemorySettings::with_profiles(vec![legacy("Work", true), legacy("Home", false)])
                .without_location_scope(),
        );
        let store = ProfileStore::new(settings);
        let home = store.find_by_key("Home").unwrap();
        store.set_selected_id(&home.id, &root).unwrap();

        let selected = store.get_selected_id(&root).unwrap().unwrap();
        assert_eq!(selected.id, home.id);
        assert_eq!(selected.tier, SelectionTier::LegacyFlag);
    }
}
