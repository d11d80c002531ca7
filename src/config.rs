//! Configuration for the library desk: collection sizing, lending rules and
//! logging. Values come from an optional `library-desk.toml` in the platform
//! config directory, overridden by `LIBRARY_DESK__*` environment variables.
//! Anything left unset keeps the defaults below.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::{LibraryError, LibraryResult};
use crate::models::DEFAULT_BORROW_LIMIT;
use crate::store::GrowthPolicy;

/// File stem looked up in the config directory.
const CONFIG_FILE_STEM: &str = "library-desk";
/// Prefix for environment overrides, e.g. `LIBRARY_DESK__LENDING__DEFAULT_LIMIT=5`.
const ENV_PREFIX: &str = "LIBRARY_DESK";
/// File name of the log written inside the log directory.
pub const LOG_FILE_NAME: &str = "library-desk.log";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CollectionConfig {
    pub initial_capacity: usize,
    pub growth: GrowthPolicy,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LendingConfig {
    /// Loans a new student may hold at once.
    pub default_limit: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub level: String,
    /// Where the log file goes. Defaults to the platform data directory.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CollectionConfig,
    pub roster: CollectionConfig,
    pub lending: LendingConfig,
    pub logging: LoggingConfig,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 2,
            growth: GrowthPolicy::default(),
        }
    }
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_BORROW_LIMIT,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl AppConfig {
    /// Load from the platform config directory and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_STEM));
        Self::load_from(file.as_deref())
    }

    /// Load with an explicit config file stem (extension optional). The file
    /// may be missing.
    pub fn load_from(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }
        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Reject settings the collections could never work with.
    pub fn validate(&self) -> LibraryResult<()> {
        self.catalog.growth.validate()?;
        self.roster.growth.validate()?;
        if self.lending.default_limit == 0 {
            return Err(LibraryError::invalid(
                "lending.default_limit must be at least 1",
            ));
        }
        Ok(())
    }

    /// Directory the log file is written to.
    pub fn log_directory(&self) -> PathBuf {
        self.logging
            .directory
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_local_dir().join("logs")))
            .unwrap_or_else(|| PathBuf::from("logs"))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", CONFIG_FILE_STEM)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_match_the_classic_desk() {
        let config = AppConfig::default();
        assert_eq!(config.catalog.initial_capacity, 2);
        assert_eq!(config.catalog.growth, GrowthPolicy::Increment { step: 2 });
        assert_eq!(config.lending.default_limit, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("library-desk-no-such-config");
        let config = AppConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.catalog, CollectionConfig::default());
        assert_eq!(config.lending, LendingConfig::default());
    }

    #[test]
    fn file_overrides_selected_keys() {
        let dir = std::env::temp_dir().join(format!("library-desk-cfg-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("desk.toml");
        fs::write(
            &path,
            r#"
[catalog]
initial_capacity = 8
growth = { strategy = "doubling" }

[lending]
default_limit = 5
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(Some(&path)).unwrap();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(
            config.catalog,
            CollectionConfig {
                initial_capacity: 8,
                growth: GrowthPolicy::Doubling
            }
        );
        assert_eq!(config.roster, CollectionConfig::default());
        assert_eq!(config.lending.default_limit, 5);
    }

    #[test]
    fn zero_step_and_zero_limit_fail_validation() {
        let mut config = AppConfig::default();
        config.roster.growth = GrowthPolicy::Increment { step: 0 };
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.lending.default_limit = 0;
        assert!(config.validate().is_err());
    }
}
