//! CLI definition and command dispatch for gup.
//!
//! ## Configuration Precedence
//!
//! 1. CLI flags (`--config`, `--settings`, `--verbose`)
//! 2. Environment variables (`GUP_CONFIG`, `GUP_SETTINGS`, `GUP_VERBOSE`)
//! 3. Config file (`~/.gup/config.yaml` or path from `--config`/`GUP_CONFIG`)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use crate::ui::{format, table, ColorMode, MessageType, Style};

use gup_core::{
    GlobalConfig, GupEngine, GupError, Profile, RepositoryRoot, SelectedProfile, StatusCode,
    WorkspaceStatus, SELECT_MATCHED_PROFILE_KEY,
};

// ============================================================================
// CLI Definition
// ============================================================================

/// Version string including git commit hash
const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// Git User Profiles – keep each repository committing as the right person
#[derive(Parser, Debug)]
#[command(name = "gup")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, env = "GUP_VERBOSE")]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true, env = "GUP_QUIET")]
    pub quiet: bool,

    /// Path to configuration file (default: ~/.gup/config.yaml)
    #[arg(long, global = true, env = "GUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the global settings file holding profiles (default: ~/.gup/settings.yaml)
    #[arg(long, global = true, env = "GUP_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Color output mode
    #[arg(long, global = true, env = "GUP_COLOR", value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Command,
}

/// `on` / `off` argument of `gup auto-select`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    /// Enable
    On,
    /// Disable
    Off,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show which profile governs a repository and whether it is applied
    #[command(after_help = r#"EXAMPLES:
    # Status of the repository containing the current directory
    gup status

    # Status of another location
    gup status --path ~/src/oss/project

    # JSON for scripts and prompts
    gup status --json | jq -r '.status'
"#)]
    Status {
        /// Location to resolve (default: current directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List stored profiles, marking the one selected for this repository
    List {
        /// Location whose selection is marked (default: current directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Create a profile
    #[command(after_help = r#"EXAMPLES:
    gup add --label Work --name "Alice Example" --email alice@corp.com
    gup add --label Oss --name "Alice Example" --email alice@users.noreply.github.com --signing-key 4AEE18F83AFDEB23
"#)]
    Add {
        /// Display label
        #[arg(long)]
        label: String,

        /// Git user.name
        #[arg(long)]
        name: String,

        /// Git user.email
        #[arg(long)]
        email: String,

        /// Git user.signingkey
        #[arg(long, default_value = "")]
        signing_key: String,
    },

    /// Change fields of a profile
    Edit {
        /// Profile label, id, or id prefix
        key: String,

        /// New label
        #[arg(long)]
        label: Option<String>,

        /// New git user.name
        #[arg(long)]
        name: Option<String>,

        /// New git user.email
        #[arg(long)]
        email: Option<String>,

        /// New git user.signingkey (empty string clears it)
        #[arg(long)]
        signing_key: Option<String>,
    },

    /// Delete a profile
    Remove {
        /// Profile label, id, or id prefix
        key: String,
    },

    /// Select a profile for a repository without touching its git config
    Select {
        /// Profile label, id, or id prefix
        key: String,

        /// Location inside the repository (default: current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Write a profile's identity to a repository's local git config
    #[command(after_help = r#"EXAMPLES:
    # Apply the profile already selected for this repository
    gup apply

    # Apply (and select) a specific profile
    gup apply Work
"#)]
    Apply {
        /// Profile label, id, or id prefix (default: the current selection)
        key: Option<String>,

        /// Location inside the repository (default: current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Show or change automatic selection of a profile matching git config
    AutoSelect {
        /// New state; omit to show the current one
        #[arg(value_enum)]
        state: Option<Toggle>,
    },
}

// ============================================================================
// Entry point
// ============================================================================

/// Parse arguments, build the engine and dispatch.
///
/// Returns `ExitCode::SUCCESS` on success, or `ExitCode::FAILURE` on error.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Warnings always; debug only with --verbose
    let log_level = if cli.verbose { "debug" } else { "warn" };
    let filter = format!("gup_core={},gup_cli={}", log_level, log_level);

    tracing_subscriber::fmt()
        .with_env_filter(&filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let style = Style::new(cli.color).with_quiet(cli.quiet);

    let engine = match build_engine(&cli) {
        Ok(engine) => engine,
        Err(e) => {
            let hint = match &cli.config {
                Some(path) => format!("Check your config at {}", path.display()),
                None => "Check your global config at ~/.gup/config.yaml".to_string(),
            };
            eprintln!(
                "{}",
                style.error_with_context(
                    "Failed to initialize gup",
                    Some(&e.to_string()),
                    Some(&hint),
                )
            );
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Status { path, json } => handle_status(&style, &engine, location(path), json),
        Command::List { path, json } => handle_list(&style, &engine, location(path), json),
        Command::Add {
            label,
            name,
            email,
            signing_key,
        } => handle_add(&style, &engine, label, name, email, signing_key),
        Command::Edit {
            key,
            label,
            name,
            email,
            signing_key,
        } => handle_edit(&style, &engine, &key, label, name, email, signing_key),
        Command::Remove { key } => handle_remove(&style, &engine, &key),
        Command::Select { key, path } => handle_select(&style, &engine, &key, location(path)),
        Command::Apply { key, path } => {
            handle_apply(&style, &engine, key.as_deref(), location(path))
        }
        Command::AutoSelect { state } => handle_auto_select(&style, &engine, state),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                style.error_with_context(&e.to_string(), None, error_hint(&e))
            );
            ExitCode::FAILURE
        }
    }
}

/// Config file, then `--settings` on top of it.
fn build_engine(cli: &Cli) -> anyhow::Result<GupEngine> {
    let mut config = match &cli.config {
        Some(path) => GlobalConfig::from_path(path)?,
        None => GlobalConfig::load_default()?,
    };
    if let Some(settings) = &cli.settings {
        config.settings.path = Some(settings.clone());
    }
    GupEngine::from_global_config(config)
}

fn location(path: Option<PathBuf>) -> PathBuf {
    path.unwrap_or_else(|| PathBuf::from("."))
}

fn error_hint(error: &GupError) -> Option<&'static str> {
    match error {
        GupError::NotARepository(_) => Some("Run inside a git repository or pass --path"),
        GupError::ProfileNotFound(_) => Some("Run `gup list` to see stored profiles"),
        GupError::AmbiguousProfile { .. } => Some("Use the profile id (or a longer prefix)"),
        GupError::GitInvocation { .. } | GupError::IdentityWrite { .. } => {
            Some("Check that git is installed and the repository is writable")
        }
        _ => None,
    }
}

fn require_root(engine: &GupEngine, path: &Path) -> Result<RepositoryRoot, GupError> {
    engine
        .find_root(path)
        .ok_or_else(|| GupError::NotARepository(path.to_path_buf()))
}

// ============================================================================
// Command handlers
// ============================================================================

fn handle_status(
    style: &Style,
    engine: &GupEngine,
    path: PathBuf,
    json: bool,
) -> Result<(), GupError> {
    let status = engine.resolve_path(&path);

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", style.section("STATUS"));
    println!();
    let root = status
        .repository_root
        .as_ref()
        .map(|r| style.root_path(&r.to_string()))
        .unwrap_or_else(|| "(none)".to_string());
    println!("  {}", style.key_value("Repository", &root));
    println!(
        "  {}",
        style.key_value(
            "Status",
            &format!("{} ({})", style.status_code(status.status), status.display_label())
        )
    );

    if status.status != StatusCode::NotAValidWorkspace {
        let profile = status
            .selected_profile
            .as_ref()
            .map(|p| format!("{} ({})", p.label, style.profile_id(p.id.as_str())))
            .unwrap_or_else(|| "(none)".to_string());
        println!("  {}", style.key_value("Profile", &profile));

        if let Some(identity) = &status.current_identity {
            println!("  {}", style.key_value("Identity", &identity.to_string()));
        }
        println!(
            "  {}",
            style.key_value("Profiles", &status.profiles_in_config_count.to_string())
        );
        println!(
            "  {}",
            style.key_value("Checked", &format::format_timestamp(status.computed_at))
        );
    }

    let diffs = status.field_diffs();
    if status.status == StatusCode::ConfigOutOfSync && !diffs.is_empty() {
        println!();
        println!("{}", table::render_diff_table(&diffs));
    }

    if let Some(message) = &status.message {
        println!();
        style.emit(MessageType::Info, message);
    }
    if let Some(hint) = status_hint(&status) {
        style.emit(MessageType::Hint, hint);
    }
    Ok(())
}

fn status_hint(status: &WorkspaceStatus) -> Option<&'static str> {
    match status.status {
        StatusCode::NoProfilesInConfig => {
            Some("Create one: gup add --label <LABEL> --name <NAME> --email <EMAIL>")
        }
        StatusCode::NoSelectedProfilesInConfig => Some("Pick one: gup select <PROFILE>"),
        StatusCode::FieldsMissing => Some("Complete it: gup edit <PROFILE> --email <EMAIL>"),
        StatusCode::ConfigOutOfSync => Some("Write it to git config: gup apply"),
        StatusCode::NotAValidWorkspace | StatusCode::NoIssues => None,
    }
}

fn handle_list(
    style: &Style,
    engine: &GupEngine,
    path: PathBuf,
    json: bool,
) -> Result<(), GupError> {
    let profiles = engine.profiles().list()?;
    let selected_id = match engine.find_root(&path) {
        Some(root) => engine
            .profiles()
            .selected_profile(&root, &profiles)?
            .profile()
            .map(|p| p.id.clone()),
        None => None,
    };

    if json {
        let entries: Vec<serde_json::Value> = profiles
            .iter()
            .map(|p| -> Result<serde_json::Value, serde_json::Error> {
                let mut value = serde_json::to_value(p)?;
                value["selectedHere"] = serde_json::Value::Bool(Some(&p.id) == selected_id.as_ref());
                Ok(value)
            })
            .collect::<Result<_, _>>()?;
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if profiles.is_empty() {
        style.emit(
            MessageType::Info,
            "No profiles stored. Create one with `gup add`.",
        );
        return Ok(());
    }

    let rows: Vec<table::ProfileRow> = profiles
        .iter()
        .map(|p| table::ProfileRow {
            selected: Some(&p.id) == selected_id.as_ref(),
            label: p.label.clone(),
            user_name: p.user_name.clone(),
            email: p.email.clone(),
            signing_key: p.signing_key.clone(),
            id: p.id.to_string(),
        })
        .collect();
    println!("{}", table::render_profiles_table(&rows));
    Ok(())
}

fn handle_add(
    style: &Style,
    engine: &GupEngine,
    label: String,
    name: String,
    email: String,
    signing_key: String,
) -> Result<(), GupError> {
    let profile = Profile::new(label, name, email, signing_key);
    let missing = profile.missing_fields();
    if !missing.is_empty() {
        return Err(GupError::InvalidProfile(format!(
            "empty {}",
            missing.join(", ")
        )));
    }

    let saved = engine.save_profile(&profile, None)?;
    style.emit(
        MessageType::Ok,
        &format!(
            "Added profile {} ({})",
            saved.label,
            style.profile_id(saved.id.as_str())
        ),
    );
    style.emit_detail("Identity", &saved.identity().to_string());
    style.emit(
        MessageType::Hint,
        &format!("Use it in a repository: gup apply {}", saved.id.short()),
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_edit(
    style: &Style,
    engine: &GupEngine,
    key: &str,
    label: Option<String>,
    name: Option<String>,
    email: Option<String>,
    signing_key: Option<String>,
) -> Result<(), GupError> {
    if label.is_none() && name.is_none() && email.is_none() && signing_key.is_none() {
        return Err(GupError::InvalidProfile(
            "nothing to change; pass --label, --name, --email or --signing-key".to_string(),
        ));
    }

    let mut profile = engine.profiles().find_by_key(key)?;
    let previous_label = profile.label.clone();

    if let Some(label) = label {
        profile.label = label;
    }
    if let Some(name) = name {
        profile.user_name = name;
    }
    if let Some(email) = email {
        profile.email = email;
    }
    if let Some(signing_key) = signing_key {
        profile.signing_key = signing_key;
    }

    let saved = engine.save_profile(&profile, Some(&previous_label))?;
    style.emit(
        MessageType::Ok,
        &format!(
            "Updated profile {} ({})",
            saved.label,
            style.profile_id(saved.id.as_str())
        ),
    );
    if !saved.is_complete() {
        eprintln!(
            "{}",
            style.message(
                MessageType::Warn,
                &format!("Profile is missing: {}", saved.missing_fields().join(", "))
            )
        );
    }
    Ok(())
}

fn handle_remove(style: &Style, engine: &GupEngine, key: &str) -> Result<(), GupError> {
    let profile = engine.profiles().find_by_key(key)?;
    let removed = engine.remove_profile(&profile.id)?;
    style.emit(
        MessageType::Ok,
        &format!(
            "Removed profile {} ({})",
            removed.label,
            style.profile_id(removed.id.as_str())
        ),
    );
    Ok(())
}

fn handle_select(
    style: &Style,
    engine: &GupEngine,
    key: &str,
    path: PathBuf,
) -> Result<(), GupError> {
    let root = require_root(engine, &path)?;
    let profile = engine.profiles().find_by_key(key)?;
    let selected = engine.select_profile(&root, &profile.id)?;

    style.emit(
        MessageType::Ok,
        &format!(
            "Selected {} for {}",
            selected.label,
            style.root_path(&root.to_string())
        ),
    );

    if engine.resolve_path(root.as_path()).status == StatusCode::ConfigOutOfSync {
        style.emit(
            MessageType::Hint,
            "The repository's git config differs; run `gup apply` to write it",
        );
    }
    Ok(())
}

fn handle_apply(
    style: &Style,
    engine: &GupEngine,
    key: Option<&str>,
    path: PathBuf,
) -> Result<(), GupError> {
    let root = require_root(engine, &path)?;

    let profile = match key {
        Some(key) => engine.profiles().find_by_key(key)?,
        None => {
            let profiles = engine.profiles().list()?;
            match engine.profiles().selected_profile(&root, &profiles)? {
                SelectedProfile::Found { profile, .. } => profile,
                SelectedProfile::Dangling(id) => {
                    return Err(GupError::ProfileNotFound(id.to_string()))
                }
                SelectedProfile::NoSelection => {
                    return Err(GupError::InvalidConfiguration {
                        message: "No profile selected for this repository".to_string(),
                        hint: "Name one: gup apply <PROFILE>".to_string(),
                    })
                }
            }
        }
    };

    let applied = engine.apply_profile(&root, &profile.id)?;
    style.emit(
        MessageType::Ok,
        &format!(
            "Applied {} to {}",
            applied.label,
            style.root_path(&root.to_string())
        ),
    );
    style.emit_detail("Identity", &applied.identity().to_string());
    Ok(())
}

fn handle_auto_select(
    style: &Style,
    engine: &GupEngine,
    state: Option<Toggle>,
) -> Result<(), GupError> {
    match state {
        Some(toggle) => {
            let enabled = toggle == Toggle::On;
            engine.set_auto_select(enabled)?;
            style.emit(
                MessageType::Ok,
                &format!("{} = {}", SELECT_MATCHED_PROFILE_KEY, enabled),
            );
        }
        None => {
            println!(
                "{}",
                style.key_value(
                    SELECT_MATCHED_PROFILE_KEY,
                    &engine.auto_select_enabled()?.to_string()
                )
            );
        }
    }
    Ok(())
}
