//! Integration tests for `gup status`.
//!
//! These tests validate status resolution end to end:
//! - Locations outside a repository
//! - Each status a repository can be in
//! - JSON output format
//! - Automatic selection of a matching profile

mod common;

use predicates::prelude::*;

use common::{git_available, TestEnv};

macro_rules! require_git {
    () => {
        if !git_available() {
            eprintln!("git not available, skipping");
            return;
        }
    };
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_status_outside_repository() {
    require_git!();
    let env = TestEnv::new();

    env.gup()
        .current_dir(env.outside())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("not-a-valid-workspace"))
        .stdout(predicate::str::contains("is not inside a git repository"));
}

#[test]
fn test_status_without_profiles() {
    require_git!();
    let env = TestEnv::new();

    env.gup()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("no-profiles"))
        .stdout(predicate::str::contains("gup add"));
}

#[test]
fn test_status_without_selection() {
    require_git!();
    let env = TestEnv::new();
    env.add_profile("Work", "Alice Example", "alice@corp.com");

    env.gup()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("no-selected-profile"))
        .stdout(predicate::str::contains("gup select"));
}

#[test]
fn test_status_out_of_sync_after_select() {
    require_git!();
    let env = TestEnv::new();
    env.add_profile("Work", "Alice Example", "alice@corp.com");
    env.git(&["config", "--local", "user.email", "alice@home.org"]);

    env.gup()
        .args(["select", "Work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Selected Work"))
        .stdout(predicate::str::contains("gup apply"));

    env.gup()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("out-of-sync"))
        .stdout(predicate::str::contains("Work (not applied)"))
        .stdout(predicate::str::contains("user.email"))
        .stdout(predicate::str::contains("alice@home.org"));
}

#[test]
fn test_status_ok_after_apply() {
    require_git!();
    let env = TestEnv::new();
    env.add_profile("Work", "Alice Example", "alice@corp.com");

    env.gup()
        .args(["apply", "Work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied Work"));

    assert_eq!(env.local_config("user.name"), "Alice Example");
    assert_eq!(env.local_config("user.email"), "alice@corp.com");

    env.gup()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: ok"));
}

#[test]
fn test_status_case_difference_is_in_sync() {
    require_git!();
    let env = TestEnv::new();
    env.add_profile("Work", "Alice Example", "alice@corp.com");
    env.gup().args(["select", "Work"]).assert().success();
    env.git(&["config", "--local", "user.name", "alice example"]);
    env.git(&["config", "--local", "user.email", "ALICE@corp.com"]);

    env.gup()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: ok"));
}

#[test]
fn test_status_incomplete_profile() {
    require_git!();
    let env = TestEnv::new();
    env.add_profile("Work", "Alice Example", "alice@corp.com");
    env.gup().args(["select", "Work"]).assert().success();
    env.gup()
        .args(["edit", "Work", "--email", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated profile Work"));

    env.gup()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("fields-missing"))
        .stdout(predicate::str::contains("Profile is missing: email"));
}

#[test]
fn test_status_json_output() {
    require_git!();
    let env = TestEnv::new();
    env.add_profile("Work", "Alice Example", "alice@corp.com");
    env.gup().args(["apply", "Work"]).assert().success();

    let output = env
        .gup()
        .args(["status", "--json"])
        .output()
        .expect("run gup status");
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("status output should be JSON");
    assert_eq!(json["status"], "noIssues");
    assert_eq!(json["inSync"], true);
    assert_eq!(json["profilesInConfigCount"], 1);
    assert_eq!(json["selectedProfile"]["label"], "Work");
    assert_eq!(json["currentIdentity"]["email"], "alice@corp.com");
}

#[test]
fn test_status_path_flag() {
    require_git!();
    let env = TestEnv::new();
    let nested = env.repo.join("src").join("deep");
    std::fs::create_dir_all(&nested).expect("create nested dir");

    env.gup()
        .current_dir(env.outside())
        .args(["status", "--path"])
        .arg(&nested)
        .assert()
        .success()
        .stdout(predicate::str::contains("no-profiles"));
}

#[test]
fn test_auto_select_switches_to_matching_profile() {
    require_git!();
    let env = TestEnv::new();
    env.add_profile("Work", "Alice Example", "alice@corp.com");
    env.add_profile("Home", "Alice Example", "alice@home.org");
    env.gup().args(["select", "Work"]).assert().success();
    env.git(&["config", "--local", "user.name", "Alice Example"]);
    env.git(&["config", "--local", "user.email", "alice@home.org"]);

    env.gup()
        .args(["auto-select", "on"])
        .assert()
        .success()
        .stdout(predicate::str::contains("selectMatchedProfileAutomatically = true"));

    env.gup()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: ok (Home)"))
        .stdout(predicate::str::contains("Auto-selected profile Home"));

    // The switch was persisted
    env.gup()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: ok (Home)"))
        .stdout(predicate::str::contains("Auto-selected").not());
}

#[test]
fn test_auto_select_off_leaves_selection() {
    require_git!();
    let env = TestEnv::new();
    env.add_profile("Work", "Alice Example", "alice@corp.com");
    env.add_profile("Home", "Alice Example", "alice@home.org");
    env.gup().args(["select", "Work"]).assert().success();
    env.git(&["config", "--local", "user.name", "Alice Example"]);
    env.git(&["config", "--local", "user.email", "alice@home.org"]);

    env.gup()
        .arg("auto-select")
        .assert()
        .success()
        .stdout(predicate::str::contains("selectMatchedProfileAutomatically: false"));

    env.gup()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("out-of-sync"));
}

#[test]
fn test_status_ignores_inherited_git_dir() {
    require_git!();
    let env = TestEnv::new();
    let other = TestEnv::new();

    // As inside a hook of another repository
    let output = env
        .gup()
        .env("GIT_DIR", other.repo.join(".git"))
        .env("GIT_WORK_TREE", &other.repo)
        .args(["status", "--json"])
        .output()
        .expect("run gup status");
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("status output should be JSON");
    let root = std::fs::canonicalize(&env.repo).expect("canonical repo path");
    assert_eq!(json["repositoryRoot"], root.to_string_lossy().as_ref());
}
