//! Configuration loading and import path resolution
//!
//! Every path the importer needs is resolved with the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error. A TOML file that exists but cannot
//! be parsed is.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit TOML config file
pub const ENV_CONFIG: &str = "HDI_CONFIG";
/// Environment variable overriding the database file
pub const ENV_DATABASE: &str = "HDI_DATABASE";
/// Environment variable overriding the housing CSV
pub const ENV_HOUSING_FILE: &str = "HDI_HOUSING_FILE";
/// Environment variable overriding the income CSV
pub const ENV_INCOME_FILE: &str = "HDI_INCOME_FILE";
/// Environment variable overriding the ZIP/geography CSV
pub const ENV_ZIP_FILE: &str = "HDI_ZIP_FILE";

const DEFAULT_HOUSING_FILE: &str = "housing.csv";
const DEFAULT_INCOME_FILE: &str = "income.csv";
const DEFAULT_ZIP_FILE: &str = "zip.csv";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// SQLite database file receiving the merged housing table
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Housing attributes CSV
    #[serde(default)]
    pub housing_file: Option<PathBuf>,

    /// Income attributes CSV
    #[serde(default)]
    pub income_file: Option<PathBuf>,

    /// ZIP code / geography reference CSV
    #[serde(default)]
    pub zip_file: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Load configuration, locating the file if none is given
    ///
    /// An explicit path (argument or `HDI_CONFIG`) must exist. Without one,
    /// the platform config locations are searched and defaults are used when
    /// nothing is found.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| env_path(ENV_CONFIG));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::from_file(&path);
        }

        match default_config_file() {
            Some(path) => Self::from_file(&path),
            None => {
                info!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse a specific TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
        info!("Loaded config file: {}", path.display());
        Ok(config)
    }
}

/// Path overrides supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub database: Option<PathBuf>,
    pub housing_file: Option<PathBuf>,
    pub income_file: Option<PathBuf>,
    pub zip_file: Option<PathBuf>,
}

/// Fully resolved locations for one import run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPaths {
    pub database: PathBuf,
    pub housing_file: PathBuf,
    pub income_file: PathBuf,
    pub zip_file: PathBuf,
}

impl ImportPaths {
    /// Resolve every path: CLI, then environment, then TOML, then default
    pub fn resolve(cli: &PathOverrides, toml: &TomlConfig) -> Self {
        Self {
            database: resolve_path(
                cli.database.as_ref(),
                ENV_DATABASE,
                toml.database_path.as_ref(),
                default_database_path,
            ),
            housing_file: resolve_path(
                cli.housing_file.as_ref(),
                ENV_HOUSING_FILE,
                toml.housing_file.as_ref(),
                || PathBuf::from(DEFAULT_HOUSING_FILE),
            ),
            income_file: resolve_path(
                cli.income_file.as_ref(),
                ENV_INCOME_FILE,
                toml.income_file.as_ref(),
                || PathBuf::from(DEFAULT_INCOME_FILE),
            ),
            zip_file: resolve_path(
                cli.zip_file.as_ref(),
                ENV_ZIP_FILE,
                toml.zip_file.as_ref(),
                || PathBuf::from(DEFAULT_ZIP_FILE),
            ),
        }
    }
}

fn resolve_path(
    cli: Option<&PathBuf>,
    env_var_name: &str,
    toml: Option<&PathBuf>,
    default: impl FnOnce() -> PathBuf,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli {
        return path.clone();
    }

    // Priority 2: Environment variable
    if let Some(path) = env_path(env_var_name) {
        debug!("{} taken from environment", env_var_name);
        return path;
    }

    // Priority 3: TOML config file
    if let Some(path) = toml {
        return path.clone();
    }

    // Priority 4: Compiled default
    default()
}

/// Read a path from the environment, treating empty values as unset
fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Get the first existing config file for the platform
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("hdi").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/hdi/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default database path
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("hdi"))
        .unwrap_or_else(|| PathBuf::from("./hdi_data"))
        .join("housing.db")
}
