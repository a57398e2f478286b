//! Identity config access at the repository-local level.
//!
//! [`IdentityConfigAccessor`] reads and writes `user.name`, `user.email` and
//! `user.signingkey` through the [`VcsTool`]. Only `--local` config is ever
//! touched: a user's global identity is never read or modified.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::{GIT_SIGNING_KEY_KEY, GIT_USER_EMAIL_KEY, GIT_USER_NAME_KEY};
use crate::errors::GupError;
use crate::vcs::VcsTool;
use crate::workspace::RepositoryRoot;

// ============================================================================
// GitIdentity
// ============================================================================

/// The identity currently configured for a repository.
///
/// Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitIdentity {
    /// `user.name`
    pub user_name: String,
    /// `user.email`
    pub email: String,
    /// `user.signingkey`
    pub signing_key: String,
}

impl GitIdentity {
    /// Create an identity from its three fields.
    pub fn new(
        user_name: impl Into<String>,
        email: impl Into<String>,
        signing_key: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            email: email.into(),
            signing_key: signing_key.into(),
        }
    }

    /// Whether no field is set at all.
    pub fn is_empty(&self) -> bool {
        self.user_name.is_empty() && self.email.is_empty() && self.signing_key.is_empty()
    }

    /// `(key, value)` pairs in git config order.
    fn entries(&self) -> [(&'static str, &str); 3] {
        [
            (GIT_USER_NAME_KEY, self.user_name.as_str()),
            (GIT_USER_EMAIL_KEY, self.email.as_str()),
            (GIT_SIGNING_KEY_KEY, self.signing_key.as_str()),
        ]
    }
}

impl std::fmt::Display for GitIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "(not configured)");
        }
        write!(f, "{} <{}>", self.user_name, self.email)?;
        if !self.signing_key.is_empty() {
            write!(f, " [key {}]", self.signing_key)?;
        }
        Ok(())
    }
}

// ============================================================================
// IdentityConfigAccessor
// ============================================================================

/// Reads and writes the identity triple in a repository's local config.
#[derive(Debug, Clone)]
pub struct IdentityConfigAccessor {
    vcs: Arc<dyn VcsTool>,
}

impl IdentityConfigAccessor {
    /// Create an accessor that goes through `vcs`.
    pub fn new(vcs: Arc<dyn VcsTool>) -> Self {
        Self { vcs }
    }

    /// Read the identity configured at `root`.
    ///
    /// Unset keys and invocation failures both read as an empty field.
    pub fn read(&self, root: &RepositoryRoot) -> GitIdentity {
        GitIdentity {
            user_name: self.read_key(root, GIT_USER_NAME_KEY),
            email: self.read_key(root, GIT_USER_EMAIL_KEY),
            signing_key: self.read_key(root, GIT_SIGNING_KEY_KEY),
        }
    }

    fn read_key(&self, root: &RepositoryRoot, key: &str) -> String {
        match self.vcs.get_local_config(root.as_path(), key) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Reading {} at {} failed, treating as unset: {}", key, root, e);
                String::new()
            }
        }
    }

    /// Write `identity` to the local config at `root`.
    ///
    /// Each field is written independently; an empty field clears the key.
    /// A failing field does not stop the others from being attempted, and
    /// nothing is rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`GupError::IdentityWrite`] naming every key that failed.
    pub fn write(&self, root: &RepositoryRoot, identity: &GitIdentity) -> Result<(), GupError> {
        let mut failed = Vec::new();

        for (key, value) in identity.entries() {
            let result = if value.is_empty() {
                self.vcs.unset_local_config(root.as_path(), key)
            } else {
                self.vcs.set_local_config(root.as_path(), key, value)
            };

            if let Err(e) = result {
                tracing::warn!("Writing {} at {} failed: {}", key, root, e);
                failed.push(key.to_string());
            }
        }

        if failed.is_empty() {
            tracing::debug!("Wrote identity {} to {}", identity, root);
            Ok(())
        } else {
            Err(GupError::IdentityWrite {
                root: root.as_path().to_path_buf(),
                keys: failed,
            })
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
