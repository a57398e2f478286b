//! Version-control tool invocation.
//!
//! Everything gup knows about repositories comes from the `git` executable:
//! there is no `.git` directory walking here. [`VcsTool`] is the seam the
//! locator and the identity accessor call through; [`GitCli`] is the
//! process-backed implementation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::constants::DEFAULT_GIT_BINARY;
use crate::errors::GupError;

/// Exit code `git config --get` uses for "key not set".
const CONFIG_KEY_MISSING: i32 = 1;

/// Exit code `git config --unset` uses for "nothing to unset".
const CONFIG_NOTHING_TO_UNSET: i32 = 5;

/// Environment variables that override git's repository discovery.
const INHERITED_REPOSITORY_VARS: [&str; 4] =
    ["GIT_DIR", "GIT_WORK_TREE", "GIT_INDEX_FILE", "GIT_COMMON_DIR"];

// ============================================================================
// VcsTool
// ============================================================================

/// The four logical version-control operations gup depends on, plus unset.
///
/// Config operations are always scoped to the repository-local level.
pub trait VcsTool: fmt::Debug + Send + Sync {
    /// Whether `dir` lies inside a working tree.
    fn is_repository(&self, dir: &Path) -> Result<bool, GupError>;

    /// Top-level directory of the innermost working tree containing `dir`.
    fn top_level(&self, dir: &Path) -> Result<PathBuf, GupError>;

    /// Read a local config value. `Ok(None)` when the key is not set.
    fn get_local_config(&self, root: &Path, key: &str) -> Result<Option<String>, GupError>;

    /// Set a local config value.
    fn set_local_config(&self, root: &Path, key: &str, value: &str) -> Result<(), GupError>;

    /// Remove a local config value. Removing an unset key succeeds.
    fn unset_local_config(&self, root: &Path, key: &str) -> Result<(), GupError>;
}

// ============================================================================
// Process Primitive
// ============================================================================

/// Captured result of one git invocation.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Exit code, `None` when terminated by a signal.
    pub exit_code: Option<i32>,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
}

impl GitOutput {
    /// Whether git exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// First non-empty stdout line, trimmed.
    pub fn first_line(&self) -> Option<&str> {
        self.stdout.lines().map(str::trim).find(|line| !line.is_empty())
    }
}

/// [`VcsTool`] backed by the git command-line executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new(DEFAULT_GIT_BINARY)
    }
}

impl GitCli {
    /// Create a git runner for the given executable (name or path).
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// The executable this runner invokes.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Build `git -C <dir> <args...>`.
    ///
    /// Repository-selecting variables inherited from the caller (set inside
    /// git hooks, for instance) are removed so `-C` alone decides which
    /// repository is used.
    fn command(&self, dir: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-C").arg(dir).args(args).env("GIT_TERMINAL_PROMPT", "0");
        for var in INHERITED_REPOSITORY_VARS {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Run `git -C <dir> <args...>` and capture its output.
    ///
    /// A non-zero exit is not an error here; only a failure to spawn is.
    pub fn run(&self, dir: &Path, args: &[&str]) -> Result<GitOutput, GupError> {
        tracing::debug!("git -C {} {}", dir.display(), args.join(" "));

        let output = self
            .command(dir, args)
            .output()
            .map_err(|e| GupError::GitInvocation {
                args: args.join(" "),
                message: format!("failed to execute {}: {}", self.binary.display(), e),
            })?;

        Ok(GitOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn failure(args: &[&str], output: &GitOutput) -> GupError {
        let stderr = output.stderr.trim();
        GupError::GitInvocation {
            args: args.join(" "),
            message: if stderr.is_empty() {
                format!("exit code {:?}", output.exit_code)
            } else {
                stderr.to_string()
            },
        }
    }
}

impl VcsTool for GitCli {
    fn is_repository(&self, dir: &Path) -> Result<bool, GupError> {
        let output = self.run(dir, &["rev-parse", "--is-inside-work-tree"])?;
        Ok(output.success() && output.first_line() == Some("true"))
    }

    fn top_level(&self, dir: &Path) -> Result<PathBuf, GupError> {
        let args = ["rev-parse", "--show-toplevel"];
        let output = self.run(dir, &args)?;
        if !output.success() {
            return Err(Self::failure(&args, &output));
        }
        output
            .first_line()
            .map(PathBuf::from)
            .ok_or_else(|| GupError::GitInvocation {
                args: args.join(" "),
                message: "git did not return a top-level directory".to_string(),
            })
    }

    fn get_local_config(&self, root: &Path, key: &str) -> Result<Option<String>, GupError> {
        let args = ["config", "--local", "--get", key];
        let output = self.run(root, &args)?;
        match output.exit_code {
            Some(0) => Ok(Some(output.stdout.trim_end_matches(['\r', '\n']).to_string())),
            Some(CONFIG_KEY_MISSING) => Ok(None),
            _ => Err(Self::failure(&args, &output)),
        }
    }

    fn set_local_config(&self, root: &Path, key: &str, value: &str) -> Result<(), GupError> {
        let args = ["config", "--local", key, value];
        let output = self.run(root, &args)?;
        if output.success() {
            Ok(())
        } else {
            Err(Self::failure(&args, &output))
        }
    }

    fn unset_local_config(&self, root: &Path, key: &str) -> Result<(), GupError> {
        let args = ["config", "--local", "--unset", key];
        let output = self.run(root, &args)?;
        match output.exit_code {
            Some(0) | Some(CONFIG_NOTHING_TO_UNSET) => Ok(()),
            _ => Err(Self::failure(&args, &output)),
        }
    }
}

// ============================================================================
// Test Support
// ============================================================================

/// Whether a usable `git` is on the PATH. Real-git tests skip without it.
#[cfg(test)]
pub(crate) fn git_available() -> bool {
    Command::new(DEFAULT_GIT_BINARY)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// In-memory [`VcsTool`] for engine tests.
///
/// Repositories are registered by root path; the innermost registered root
/// containing a directory wins, like git's own nesting rules.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryVcs {
    repos: std::sync::Mutex<std::collections::BTreeMap<PathBuf, std::collections::BTreeMap<String, String>>>,
    failing_keys: std::sync::Mutex<std::collections::BTreeSet<String>>,
    reads: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MemoryVcs {
    pub(crate) fn with_repo(root: &Path) -> Self {
        let vcs = Self::default();
        vcs.add_repo(root);
        vcs
    }

    pub(crate) fn add_repo(&self, root: &Path) {
        self.repos
            .lock()
            .unwrap()
            .insert(root.to_path_buf(), Default::default());
    }

    pub(crate) fn set(&self, root: &Path, key: &str, value: &str) {
        self.repos
            .lock()
            .unwrap()
            .entry(root.to_path_buf())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    pub(crate) fn fail_writes_for(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    pub(crate) fn read_count(&self) -> usize {
        self.reads.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn innermost(&self, dir: &Path) -> Option<PathBuf> {
        self.repos
            .lock()
            .unwrap()
            .keys()
            .filter(|root| dir.starts_with(root))
            .max_by_key(|root| root.components().count())
            .cloned()
    }
}

#[cfg(test)]
impl VcsTool for MemoryVcs {
    fn is_repository(&self, dir: &Path) -> Result<bool, GupError> {
        Ok(self.innermost(dir).is_some())
    }

    fn top_level(&self, dir: &Path) -> Result<PathBuf, GupError> {
        self.innermost(dir)
            .ok_or_else(|| GupError::NotARepository(dir.to_path_buf()))
    }

    fn get_local_config(&self, root: &Path, key: &str) -> Result<Option<String>, GupError> {
        self.reads.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let repos = self.repos.lock().unwrap();
        let config = repos
            .get(root)
            .ok_or_else(|| GupError::NotARepository(root.to_path_buf()))?;
        Ok(config.get(key).cloned())
    }

    fn set_local_config(&self, root: &Path, key: &str, value: &str) -> Result<(), GupError> {
        if self.failing_keys.lock().unwrap().contains(key) {
            return Err(GupError::GitInvocation {
                args: format!("config --local {} {}", key, value),
                message: "simulated failure".to_string(),
            });
        }
        self.set(root, key, value);
        Ok(())
    }

    fn unset_local_config(&self, root: &Path, key: &str) -> Result<(), GupError> {
        if self.failing_keys.lock().unwrap().contains(key) {
            return Err(GupError::GitInvocation {
                args: format!("config --local --unset {}", key),
                message: "simulated failure".to_string(),
            });
        }
        if let Some(config) = self.repos.lock().unwrap().get_mut(root) {
            config.remove(key);
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
