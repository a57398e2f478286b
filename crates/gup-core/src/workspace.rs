//! Repository root detection.
//!
//! This module provides [`RepositoryRoot`], the canonical identity of one
//! working tree, and [`RepositoryRootLocator`], which maps an arbitrary
//! filesystem location to the innermost repository containing it.
//!
//! Detection is delegated to the version-control tool so nested
//! repositories, submodules and linked worktrees follow git's own rules.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::{GUP_DIR, SETTINGS_FILENAME};
use crate::vcs::VcsTool;

// ============================================================================
// RepositoryRoot
// ============================================================================

/// Canonical absolute path of a repository working tree.
///
/// Two locations inside the same working tree always produce equal values,
/// so a `RepositoryRoot` is safe to use as a cache and settings key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryRoot(PathBuf);

impl RepositoryRoot {
    /// Build a root from a path, resolving symbolic links.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the path does not exist.
    pub fn canonical(path: &Path) -> std::io::Result<Self> {
        path.canonicalize().map(Self)
    }

    /// Get the root as a path.
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Path of the location-scoped settings file (`<root>/.gup/settings.yaml`).
    pub fn settings_path(&self) -> PathBuf {
        self.0.join(GUP_DIR).join(SETTINGS_FILENAME)
    }

    /// Last path component, for compact display.
    pub fn name(&self) -> String {
        self.0
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.0.display().to_string())
    }
}

impl std::fmt::Display for RepositoryRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for RepositoryRoot {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

// ============================================================================
// RepositoryRootLocator
// ============================================================================

/// Finds the repository root governing a filesystem location.
#[derive(Debug, Clone)]
pub struct RepositoryRootLocator {
    vcs: Arc<dyn VcsTool>,
}

impl RepositoryRootLocator {
    /// Create a locator that asks `vcs` about repositories.
    pub fn new(vcs: Arc<dyn VcsTool>) -> Self {
        Self { vcs }
    }

    /// Resolve the innermost repository root enclosing `path`.
    ///
    /// `path` may be the root itself, any file or directory below it, or a
    /// location that does not exist yet (its nearest existing ancestor is
    /// used). Returns `None` when the location is outside any repository or
    /// git cannot answer; this is an expected outcome, not an error.
    pub fn find(&self, path: &Path) -> Option<RepositoryRoot> {
        let Some(start) = probe_dir(path) else {
            tracing::debug!("No existing directory for {}", path.display());
            return None;
        };

        match self.vcs.is_repository(&start) {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!("{} is not inside a repository", start.display());
                return None;
            }
            Err(e) => {
                tracing::debug!("Repository check failed for {}: {}", start.display(), e);
                return None;
            }
        }

        let top = match self.vcs.top_level(&start) {
            Ok(top) => top,
            Err(e) => {
                tracing::debug!("Top-level lookup failed for {}: {}", start.display(), e);
                return None;
            }
        };

        match RepositoryRoot::canonical(&top) {
            Ok(root) => Some(root),
            Err(e) => {
                tracing::debug!("Cannot canonicalize {}: {}", top.display(), e);
                None
            }
        }
    }
}

/// Directory to run git in for `path`: the path itself when it is a
/// directory, its parent when it is a file, or the nearest existing
/// ancestor when it does not exist. Symbolic links are resolved.
fn probe_dir(path: &Path) -> Option<PathBuf> {
    let mut current = Some(path);
    while let Some(candidate) = current {
        if let Ok(resolved) = candidate.canonicalize() {
            return if resolved.is_dir() {
                Some(resolved)
            } else {
                resolved.parent().map(Path::to_path_buf)
            };
        }
        current = candidate.parent();
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::{git_available, GitCli, MemoryVcs};
    use std::fs;
    use tempfile::TempDir;

    fn git_init(dir: &Path) {
        let output = GitCli::default().run(dir, &["init", "-q"]).unwrap();
        assert!(output.success(), "git init failed: {}", output.stderr);
    }

    #[test]
    fn test_repository_root_settings_path() {
        let temp = TempDir::new().unwrap();
        let root = RepositoryRoot::canonical(temp.path()).unwrap();
        assert!(root.settings_path().ends_with(".gup/settings.yaml"));
        assert!(root.settings_path().starts_with(root.as_path()));
    }

    #[test]
    fn test_probe_dir_file_and_missing() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().canonicalize().unwrap();
        fs::create_dir_all(base.join("src")).unwrap();
        fs::write(base.join("src/lib.rs"), "").unwrap();

        assert_eq!(probe_dir(&base.join("src/lib.rs")), Some(base.join("src")));
        assert_eq!(
            probe_dir(&base.join("src/not/yet/created.rs")),
            Some(base.join("src"))
        );
        assert_eq!(probe_dir(&base), Some(base.clone()));
    }

    #[test]
    fn test_find_with_memory_vcs() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().canonicalize().unwrap();
        let inner = base.join("vendor/inner");
        fs::create_dir_all(inner.join("src")).unwrap();

        let vcs = Arc::new(MemoryVcs::with_repo(&base));
        vcs.add_repo(&inner);
        let locator = RepositoryRootLocator::new(vcs);

        assert_eq!(locator.find(&inner.join("src")).unwrap().as_path(), inner);
        assert_eq!(locator.find(&base.join("vendor")).unwrap().as_path(), base);
    }

    #[test]
    fn test_find_outside_repository_is_none() {
        let temp = TempDir::new().unwrap();
        let locator = RepositoryRootLocator::new(Arc::new(MemoryVcs::default()));
        assert!(locator.find(temp.path()).is_none());
    }

    #[test]
    fn test_find_with_broken_git_is_none() {
        let temp = TempDir::new().unwrap();
        let locator =
            RepositoryRootLocator::new(Arc::new(GitCli::new(temp.path().join("missing-git"))));
        assert!(locator.find(temp.path()).is_none());
    }

    #[test]
    fn test_find_same_root_from_any_subdirectory() {
        if !git_available() {
            eprintln!("git not available, skipping");
            return;
        }
        let temp = TempDir::new().unwrap();
        git_init(temp.path());
        let deep = temp.path().join("src/deep/nested");
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join("mod.rs"), "").unwrap();

        let locator = RepositoryRootLocator::new(Arc::new(GitCli::default()));
        let from_root = locator.find(temp.path()).unwrap();
        let from_deep = locator.find(&deep).unwrap();
        let from_file = locator.find(&deep.join("mod.rs")).unwrap();

        assert_eq!(from_root, from_deep);
        assert_eq!(from_root, from_file);
        assert_eq!(from_root.as_path(), temp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_find_prefers_nested_repository() {
        if !git_available() {
            eprintln!("git not available, skipping");
            return;
        }
        let temp = TempDir::new().unwrap();
        git_init(temp.path());
        let inner = temp.path().join("packages/inner");
        fs::create_dir_all(inner.join("lib")).unwrap();
        git_init(&inner);

        let locator = RepositoryRootLocator::new(Arc::new(GitCli::default()));
        let found = locator.find(&inner.join("lib")).unwrap();
        assert_eq!(found.as_path(), inner.canonicalize().unwrap());

        let outer = locator.find(&temp.path().join("packages")).unwrap();
        assert_eq!(outer.as_path(), temp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_find_outside_any_git_repository() {
        if !git_available() {
            eprintln!("git not available, skipping");
            return;
        }
        let temp = TempDir::new().unwrap();
        let locator = RepositoryRootLocator::new(Arc::new(GitCli::default()));
        assert!(locator.find(temp.path()).is_none());
    }
}
