//! TOML configuration loading
//!
//! Settings come from an optional TOML file, then command line flags
//! override them. The default file lives at `<config dir>/hotmod/hotmod.toml`
//! and is skipped when absent; a file named with `--config-file` must exist.
//!
//! ```toml
//! watchdog_ms = 1000
//! rollback_on_failure = false
//! exclude_modules = ["heartbeat"]
//!
//! [log]
//! level = "info"
//! format = "ext"
//! color = true
//! ```

use crate::app::cli::{Args, LOG_LEVELS};
use crate::core::logging::LogFormat;
use crate::registry::api::RegistryConfig;
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration file named on the command line does not exist
    #[error("The specified configuration file does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Error reading configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value is out of range
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Logging section of the configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
    /// `None` detects colour support from the terminal
    pub color: Option<bool>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            file: None,
            color: None,
        }
    }
}

/// Effective runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub watchdog_ms: u64,
    pub rollback_on_failure: bool,
    pub exclude_modules: Vec<String>,
    pub log: LogConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            watchdog_ms: 1000,
            rollback_on_failure: false,
            exclude_modules: Vec::new(),
            log: LogConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Default configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("hotmod").join("hotmod.toml"))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str, path: &Path) -> ConfigResult<Self> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the configuration file, or defaults when there is none
    pub async fn load(config_file: Option<&Path>) -> ConfigResult<Self> {
        let path = match config_file {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    log::debug!("No configuration file found; using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
        Self::from_toml_str(&contents, &path)
    }

    /// Load the configuration and apply command line overrides
    pub async fn resolve(args: &Args) -> ConfigResult<Self> {
        let mut config = Self::load(args.config_file.as_deref()).await?;
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Override file values with those given on the command line
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(watchdog_ms) = args.watchdog_ms {
            self.watchdog_ms = watchdog_ms;
        }
        if args.rollback {
            self.rollback_on_failure = true;
        }
        for name in &args.exclude_modules {
            if !self.exclude_modules.contains(name) {
                self.exclude_modules.push(name.clone());
            }
        }

        if let Some(level) = &args.log_level {
            self.log.level = level.clone();
        }
        self.log.level = adjust_level(&self.log.level, args.verbosity());
        if let Some(format) = args.log_format {
            self.log.format = format;
        }
        if let Some(file) = &args.log_file {
            self.log.file = Some(file.clone());
        }
        if let Some(color) = args.color_override() {
            self.log.color = Some(color);
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> ConfigResult<()> {
        if self.watchdog_ms == 0 {
            return Err(ConfigError::Invalid {
                message: "watchdog_ms must be greater than zero".to_string(),
            });
        }
        if !LOG_LEVELS.contains(&self.log.level.as_str()) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "unknown log level '{}' (expected one of {})",
                    self.log.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }
        Ok(())
    }

    /// Whether log output should be coloured
    ///
    /// An explicit setting wins; otherwise colour is used on a terminal
    /// unless `NO_COLOR` is set.
    pub fn color_enabled(&self) -> bool {
        self.log.color.unwrap_or_else(|| {
            std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
        })
    }

    /// Registry tunables derived from this configuration
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig::default()
            .with_watchdog_delay(Duration::from_millis(self.watchdog_ms))
            .with_rollback(self.rollback_on_failure)
    }
}

/// Shift a log level by `-v`/`-q` counts, clamped to the known levels
fn adjust_level(level: &str, verbosity: i16) -> String {
    let Some(index) = LOG_LEVELS.iter().position(|l| *l == level) else {
        return level.to_string();
    };
    let max = (LOG_LEVELS.len() - 1) as i16;
    let adjusted = (index as i16 + verbosity).clamp(0, max);
    LOG_LEVELS[adjusted as usize].to_string()
}
