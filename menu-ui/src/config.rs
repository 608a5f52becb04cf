//! TOML configuration file.
//!
//! Every key is optional; missing keys keep their defaults:
//!
//! ```toml
//! backend   = "sqlite"
//! database  = "restaurant.db"
//! log_level = "debug"
//! log_file  = "restaurant.log"
//! log_console = true
//! ```
//!
//! Command-line flags override whatever the file sets.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use menu_core::db::DbConfig;
use serde::Deserialize;
use thiserror::Error;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "restaurant.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub backend: String,
    pub database: String,
    /// Filter directive. `None` defers to `RUST_LOG`, then `info`.
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    /// Log lines on stderr.
    pub log_console: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let db = DbConfig::default();
        Self {
            backend: db.backend,
            database: db.connection_string,
            log_level: None,
            log_file: None,
            log_console: true,
        }
    }
}

/// Values given on the command line. `None` leaves the configured value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub backend: Option<String>,
    pub database: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reads `path` if given, otherwise [`DEFAULT_CONFIG_FILE`] when it
    /// exists, otherwise the defaults. An explicitly named file must exist.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if let Some(database) = overrides.database {
            self.database = database;
        }
        if overrides.log_level.is_some() {
            self.log_level = overrides.log_level;
        }
        if overrides.log_file.is_some() {
            self.log_file = overrides.log_file;
        }
        self
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.backend.clone(),
            connection_string: self.database.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.db_config(), DbConfig::default());
    }

    #[test]
    fn file_values_replace_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            database = "data/bistro.db"
            log_level = "debug"
            log_file = "bistro.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend, "sqlite");
        assert_eq!(config.database, "data/bistro.db");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_file, Some(PathBuf::from("bistro.log")));
        assert!(config.log_console);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            AppConfig::from_toml_str("colour = \"blue\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn command_line_wins_over_file() {
        let config = AppConfig::from_toml_str("database = \"file.db\"\nlog_level = \"warn\"")
            .unwrap()
            .with_overrides(Overrides {
                database: Some(":memory:".to_string()),
                ..Default::default()
            });

        assert_eq!(config.database, ":memory:");
        assert_eq!(config.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn named_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        assert!(matches!(
            AppConfig::resolve(Some(&missing)),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restaurant.toml");
        fs::write(&path, "backend = \"sqlite\"\nlog_console = false\n").unwrap();

        let config = AppConfig::load(&path).unwrap();

        assert!(!config.log_console);
    }
}
