//! Optional `swapi-people.toml` settings
//!
//! The file only names the database. A missing file means every default
//! applies, and `--database` on the command line wins over both.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory
pub const CONFIG_FILE: &str = "swapi-people.toml";

/// Database used when neither the CLI nor the config file names one
pub const DEFAULT_DATABASE: &str = "data/swapi.dat";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwapiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl SwapiConfig {
    /// Read the config at `path`, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.is_file() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading swapi-people config {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("parsing swapi-people config {}", path.display()))
    }

    /// Write the config to `path`. An existing file is only replaced with `overwrite`.
    pub fn save(&self, path: &Path, overwrite: bool) -> anyhow::Result<()> {
        if path.exists() && !overwrite {
            anyhow::bail!(
                "{} already names a database; pass `init --write-config --force` to replace it",
                path.display()
            );
        }

        let contents = toml::to_string_pretty(self).context("serializing swapi-people config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("writing swapi-people config {}", path.display()))
    }

    /// Database path from the config, or `data/swapi.dat`
    pub fn database_path(&self) -> PathBuf {
        self.database
            .as_deref()
            .map_or_else(|| PathBuf::from(DEFAULT_DATABASE), PathBuf::from)
    }

    /// Pick the database file to open and make sure its directory exists.
    ///
    /// `cli_database` takes precedence over the config file.
    pub fn prepare_database(&self, cli_database: Option<&Path>) -> anyhow::Result<PathBuf> {
        let database = cli_database.map_or_else(|| self.database_path(), Path::to_path_buf);
        if let Some(parent) = database.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("creating directory {} for the character database", parent.display())
            })?;
        }
        Ok(database)
    }
}
