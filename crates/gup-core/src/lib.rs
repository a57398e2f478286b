//! # gup-core
//!
//! **Git User Profiles** – workspace identity resolution engine.
//!
//! This crate decides which stored identity profile governs a filesystem
//! location, whether that profile is what the repository's local git config
//! currently says, and keeps the answer cheap to ask for repeatedly. It is
//! consumed by the `gup` CLI and can be embedded in other tools.
//!
//! ## Main Types
//!
//! - [`GupEngine`] – resolves a location to a [`WorkspaceStatus`]
//! - [`ProfileStore`] – the stored profiles, with migration and selection
//! - [`SettingsStore`] – where profiles and selections are persisted
//! - [`VcsTool`] – the git invocation seam
//! - [`GupError`] – domain-specific error type
//!
//! ## Example
//!
//! ```ignore
//! use gup_core::{GupEngine, StatusCode};
//! use std::path::Path;
//!
//! let engine = GupEngine::with_defaults()?;
//! let status = engine.resolve_path(Path::new("."));
//! if status.status == StatusCode::ConfigOutOfSync {
//!     for diff in status.field_diffs() {
//!         println!("{}: {} != {}", diff.key, diff.expected, diff.actual);
//!     }
//! }
//! ```

// Modules
pub mod cache;
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod identity;
pub mod profile;
pub mod settings;
pub mod status;
pub mod vcs;
pub mod workspace;

// Re-exports for convenience
pub use cache::StatusCache;
pub use config::{CacheSection, GitSection, GlobalConfig, SettingsSection};
pub use constants::{
    DEFAULT_CACHE_TTL, GIT_SIGNING_KEY_KEY, GIT_USER_EMAIL_KEY, GIT_USER_NAME_KEY,
    GLOBAL_CONFIG_FILENAME, GUP_DIR, SELECTED_MARKER, SELECT_MATCHED_PROFILE_KEY, SETTINGS_FILENAME,
};
pub use engine::GupEngine;
pub use errors::GupError;
pub use identity::{GitIdentity, IdentityConfigAccessor};
pub use profile::{
    migrate_records, strip_marker, Profile, ProfileId, ProfileRecord, ProfileStore, SelectedId,
    SelectedProfile, SelectionTier,
};
pub use settings::{FileSettings, MemorySettings, SettingsStore};
pub use status::{diff_fields, is_in_sync, FieldDiff, StatusCode, WorkspaceStatus};
pub use vcs::{GitCli, GitOutput, VcsTool};
pub use workspace::{RepositoryRoot, RepositoryRootLocator};
