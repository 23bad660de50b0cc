//! # Configuration
//!
//! Two different things are configured here.
//!
//! ## Runtime configuration ([`GramVaultConfig`])
//!
//! Where gramvault keeps its data, loaded with [`confique`] in priority order:
//! 1. **Environment variables**: `GRAMVAULT_DATA_DIR`, `GRAMVAULT_BACKUP_DIR`.
//! 2. **Config file**: `gramvault.toml` in the OS config directory (via `directories`).
//! 3. **Compiled defaults**: the OS data directory, and the working directory for backups.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | OS data dir | Directory holding one JSON file per collection |
//! | `backup_dir` | `.` | Where `backup export` writes when no path is given |
//!
//! ## Application settings ([`AppSettings`])
//!
//! The display titles the user edits are stored data, not configuration files. They are
//! loaded once at startup through [`load_settings`], which runs the declared
//! [`SETTINGS_MIGRATIONS`] table. A future rewrite of stored settings is one more entry
//! in that table, applied to every store whose `schemaVersion` is older.

use confique::Config;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::{AppSettings, DEFAULT_PRIMARY_TITLE};
use crate::store::{Persistence, StorageBackend};

pub const CONFIG_FILENAME: &str = "gramvault.toml";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "gramvault", "gramvault")
}

/// Runtime configuration, stored in `gramvault.toml`.
#[derive(Config, Debug, Clone, Default, PartialEq, Eq)]
pub struct GramVaultConfig {
    /// Directory holding the data files.
    #[config(env = "GRAMVAULT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory that receives exported backups.
    #[config(env = "GRAMVAULT_BACKUP_DIR")]
    pub backup_dir: Option<PathBuf>,
}

impl GramVaultConfig {
    /// Default location of the config file, if the OS exposes a config directory.
    pub fn default_config_file() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
    }

    /// Load from the environment, then `config_file` when given. Missing files are ignored.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = config_file {
            builder = builder.file(path);
        }
        Ok(builder.load()?)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from(".gramvault"))
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.backup_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// One step in the settings upgrade path.
pub struct SettingsMigration {
    /// Settings with a `schemaVersion` below this receive the migration.
    pub version: u32,
    pub description: &'static str,
    pub apply: fn(&mut AppSettings),
}

const LEGACY_PRIMARY_TITLE: &str = "PRECISION";

fn rename_legacy_title(settings: &mut AppSettings) {
    if settings.primary_title == LEGACY_PRIMARY_TITLE {
        settings.primary_title = DEFAULT_PRIMARY_TITLE.to_string();
    }
}

/// Ordered by version, ascending.
pub const SETTINGS_MIGRATIONS: &[SettingsMigration] = &[SettingsMigration {
    version: 1,
    description: "rename the legacy PRECISION title",
    apply: rename_legacy_title,
}];

pub fn latest_settings_version() -> u32 {
    SETTINGS_MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Applies every pending migration. Returns whether anything ran.
pub fn migrate_settings(settings: &mut AppSettings) -> bool {
    let mut ran = false;
    for migration in SETTINGS_MIGRATIONS {
        if migration.version > settings.schema_version {
            log::info!(
                "applying settings migration {}: {}",
                migration.version,
                migration.description
            );
            (migration.apply)(settings);
            settings.schema_version = migration.version;
            ran = true;
        }
    }
    ran
}

/// Loads the stored settings (or defaults), migrating and persisting when needed.
pub fn load_settings<B: StorageBackend>(persistence: &Persistence<B>) -> Result<AppSettings> {
    let Some(mut settings) = persistence.settings() else {
        return Ok(AppSettings {
            schema_version: latest_settings_version(),
            ..AppSettings::default()
        });
    };

    if migrate_settings(&mut settings) {
        persistence.save_settings(&settings)?;
    }
    Ok(settings)
}
