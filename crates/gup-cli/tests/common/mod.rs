//! Shared test utilities for gup-cli integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use assert_cmd::Command;
use tempfile::TempDir;

/// Get a Command for the gup binary.
///
/// # Panics
///
/// Panics if the gup binary cannot be found. This should not happen
/// in a properly configured test environment.
#[allow(deprecated)]
pub fn gup_cmd() -> Command {
    Command::cargo_bin("gup").expect("gup binary should exist")
}

/// Whether a git executable is on PATH.
pub fn git_available() -> bool {
    StdCommand::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// An isolated home directory with a fresh repository under it.
pub struct TestEnv {
    temp: TempDir,
    pub repo: PathBuf,
}

impl TestEnv {
    /// Create the environment and `git init` the repository.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let repo = temp.path().join("repo");
        std::fs::create_dir_all(&repo).expect("create repo dir");
        let env = Self { temp, repo };
        env.git(&["init", "--quiet"]);
        env
    }

    pub fn home(&self) -> &Path {
        self.temp.path()
    }

    /// A directory that is not inside any repository.
    pub fn outside(&self) -> PathBuf {
        let dir = self.temp.path().join("plain");
        std::fs::create_dir_all(&dir).expect("create plain dir");
        dir
    }

    pub fn settings_path(&self) -> PathBuf {
        self.temp.path().join("settings.yaml")
    }

    /// `gup` running in the repository with isolated settings and no color.
    pub fn gup(&self) -> Command {
        let mut cmd = gup_cmd();
        cmd.current_dir(&self.repo)
            .env("HOME", self.home())
            .env("GUP_SETTINGS", self.settings_path())
            .env("GUP_COLOR", "never")
            .env_remove("GUP_CONFIG")
            .env_remove("GUP_VERBOSE")
            .env_remove("GUP_QUIET");
        cmd
    }

    /// Run git in the repository, panicking on failure.
    pub fn git(&self, args: &[&str]) -> String {
        let output = StdCommand::new("git")
            .current_dir(&self.repo)
            .env("HOME", self.home())
            .args(args)
            .output()
            .expect("run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Read a local config key, empty when unset.
    pub fn local_config(&self, key: &str) -> String {
        let output = StdCommand::new("git")
            .current_dir(&self.repo)
            .env("HOME", self.home())
            .args(["config", "--local", "--get", key])
            .output()
            .expect("run git config");
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// `gup add` a complete profile.
    pub fn add_profile(&self, label: &str, name: &str, email: &str) {
        self.gup()
            .args(["add", "--label", label, "--name", name, "--email", email])
            .assert()
            .success();
    }
}
