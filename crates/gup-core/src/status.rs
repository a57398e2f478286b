//! Status reporting types for gup.
//!
//! [`WorkspaceStatus`] is the only thing [`GupEngine::resolve`] hands back:
//! a classification ([`StatusCode`]) plus everything that was looked at to
//! reach it. It is recomputed on every resolve and never mutated in place.
//!
//! [`GupEngine::resolve`]: crate::GupEngine::resolve

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::GitIdentity;
use crate::profile::Profile;
use crate::workspace::RepositoryRoot;

// ============================================================================
// StatusCode
// ============================================================================

/// Outcome of classifying a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusCode {
    /// No location, or the location is not inside a repository.
    NotAValidWorkspace,
    /// The profile list is empty.
    NoProfilesInConfig,
    /// No stored profile matches the selection for this root.
    NoSelectedProfilesInConfig,
    /// The selected profile lacks a label, user name or email.
    FieldsMissing,
    /// The repository's identity differs from the selected profile.
    ConfigOutOfSync,
    /// The selected profile is in effect.
    NoIssues,
}

impl StatusCode {
    /// Whether the status asks the user to do something.
    pub fn needs_attention(&self) -> bool {
        !matches!(self, Self::NoIssues | Self::NotAValidWorkspace)
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotAValidWorkspace => "not-a-valid-workspace",
            Self::NoProfilesInConfig => "no-profiles",
            Self::NoSelectedProfilesInConfig => "no-selected-profile",
            Self::FieldsMissing => "fields-missing",
            Self::ConfigOutOfSync => "out-of-sync",
            Self::NoIssues => "ok",
        };
        write!(f, "{}", s)
    }
}

// ============================================================================
// WorkspaceStatus
// ============================================================================

/// Result of resolving one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceStatus {
    /// Classification.
    pub status: StatusCode,

    /// Optional human-readable detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Repository root governing the location, if one was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_root: Option<RepositoryRoot>,

    /// Number of stored profiles.
    pub profiles_in_config_count: usize,

    /// Identity read from the repository's local config.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_identity: Option<GitIdentity>,

    /// The selected (or just auto-selected) profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_profile: Option<Profile>,

    /// Whether the selected profile is what the repository has configured.
    pub in_sync: bool,

    /// When this status was computed.
    pub computed_at: DateTime<Utc>,
}

impl WorkspaceStatus {
    /// Status for a location that has no repository.
    pub fn not_a_valid_workspace() -> Self {
        Self {
            status: StatusCode::NotAValidWorkspace,
            message: None,
            repository_root: None,
            profiles_in_config_count: 0,
            current_identity: None,
            selected_profile: None,
            in_sync: false,
            computed_at: Utc::now(),
        }
    }

    /// Status with `code` for `root`; other fields empty.
    pub fn for_root(code: StatusCode, root: RepositoryRoot) -> Self {
        Self {
            status: code,
            repository_root: Some(root),
            ..Self::not_a_valid_workspace()
        }
    }

    /// Attach a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Short label for a status indicator.
    ///
    /// Shows the profile label when one is selected, otherwise what is wrong.
    pub fn display_label(&self) -> String {
        let profile_label = self
            .selected_profile
            .as_ref()
            .map(|p| crate::profile::strip_marker(&p.label).to_string());

        match (self.status, profile_label) {
            (StatusCode::NotAValidWorkspace, _) => "No repository".to_string(),
            (StatusCode::NoProfilesInConfig, _) => "No profiles".to_string(),
            (StatusCode::NoSelectedProfilesInConfig, _) => "No profile selected".to_string(),
            (StatusCode::FieldsMissing, Some(label)) => format!("{} (incomplete)", label),
            (StatusCode::FieldsMissing, None) => "Profile incomplete".to_string(),
            (StatusCode::ConfigOutOfSync, Some(label)) => format!("{} (not applied)", label),
            (StatusCode::ConfigOutOfSync, None) => "Not applied".to_string(),
            (StatusCode::NoIssues, Some(label)) => label,
            (StatusCode::NoIssues, None) => "Ok".to_string(),
        }
    }

    /// Field-by-field differences between the selected profile and the
    /// configured identity.
    pub fn field_diffs(&self) -> Vec<FieldDiff> {
        match (&self.selected_profile, &self.current_identity) {
            (Some(profile), Some(identity)) => diff_fields(profile, identity),
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// Sync Check
// ============================================================================

/// Whether `identity` is what `profile` would configure.
///
/// Each field compares case-insensitively. An entirely empty identity is
/// never in sync, even against a profile that is itself empty.
pub fn is_in_sync(identity: &GitIdentity, profile: &Profile) -> bool {
    if identity.is_empty() {
        return false;
    }
    identity.email.to_lowercase() == profile.email.to_lowercase()
        && identity.user_name.to_lowercase() == profile.user_name.to_lowercase()
        && identity.signing_key.to_lowercase() == profile.signing_key.to_lowercase()
}

/// One differing identity field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDiff {
    /// Git config key.
    pub key: &'static str,
    /// Value the profile wants.
    pub expected: String,
    /// Value currently configured.
    pub actual: String,
}

/// Fields where `identity` differs from `profile`, using the same
/// case-insensitive comparison as [`is_in_sync`].
pub fn diff_fields(profile: &Profile, identity: &GitIdentity) -> Vec<FieldDiff> {
    use crate::constants::{GIT_SIGNING_KEY_KEY, GIT_USER_EMAIL_KEY, GIT_USER_NAME_KEY};

    [
        (GIT_USER_NAME_KEY, &profile.user_name, &identity.user_name),
        (GIT_USER_EMAIL_KEY, &profile.email, &identity.email),
        (GIT_SIGNING_KEY_KEY, &profile.signing_key, &identity.signing_key),
    ]
    .into_iter()
    .filter(|(_, expected, actual)| expected.to_lowercase() != actual.to_lowercase())
    .map(|(key, expected, actual)| FieldDiff {
        key,
        expected: expected.clone(),
        actual: actual.clone(),
    })
    .collect()
}

// ============================================================================
// Tests
// ============================================================================
