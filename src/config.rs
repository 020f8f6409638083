use crate::error::{ConfigError, SetupError};
use crate::input_loader::Prompter;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "google_search_config.json";
pub const DEFAULT_HISTORY_FILE: &str = "search_history.json";
pub const DEFAULT_OUTPUT_DIR: &str = "extracted_leads";

/// Credentials for the custom search API. Immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub api_key: String,
    #[serde(alias = "cx")]
    pub search_engine_id: String,
}

/// Where the tool reads and writes its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_file: PathBuf,
    pub history_file: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for AppPaths {
    fn default() -> Self {
        AppPaths {
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl AppPaths {
    /// Defaults, overridden by `LEAD_EXTRACTOR_CONFIG`, `LEAD_EXTRACTOR_HISTORY`
    /// and `LEAD_EXTRACTOR_OUTPUT` when set.
    pub fn from_env() -> Self {
        let mut paths = AppPaths::default();
        if let Some(p) = env_path("LEAD_EXTRACTOR_CONFIG") {
            paths.config_file = p;
        }
        if let Some(p) = env_path("LEAD_EXTRACTOR_HISTORY") {
            paths.history_file = p;
        }
        if let Some(p) = env_path("LEAD_EXTRACTOR_OUTPUT") {
            paths.output_dir = p;
        }
        paths
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from)
}

pub fn load_config(path: &Path) -> Result<SearchConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let config: SearchConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::Malformed {
            path: path.to_path_buf(),
            source: e,
        })?;

    if config.api_key.trim().is_empty() {
        return Err(ConfigError::Incomplete {
            path: path.to_path_buf(),
            field: "api_key",
        });
    }
    if config.search_engine_id.trim().is_empty() {
        return Err(ConfigError::Incomplete {
            path: path.to_path_buf(),
            field: "search_engine_id",
        });
    }

    info!("Loaded API configuration from {:?}", path);
    Ok(config)
}

pub fn save_config(path: &Path, config: &SearchConfig) -> Result<(), ConfigError> {
    let write_err = |source: io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let json = serde_json::to_string_pretty(config).map_err(|e| write_err(io::Error::other(e)))?;
    fs::write(path, json).map_err(write_err)?;
    info!("Saved API configuration to {:?}", path);
    Ok(())
}

/// Loads the config, or asks for credentials and saves them when the file
/// does not exist yet. Any other load failure is returned untouched.
pub fn load_or_create_config<R: BufRead, W: Write>(
    path: &Path,
    prompter: &mut Prompter<R, W>,
) -> Result<SearchConfig, SetupError> {
    match load_config(path) {
        Ok(config) => return Ok(config),
        Err(ConfigError::Missing { .. }) => {
            warn!("No config at {:?}, starting first-time setup", path);
        }
        Err(e) => return Err(e.into()),
    }

    prompter.say("--- Google API Configuration (First-time setup) ---")?;
    let config = loop {
        let api_key = prompter.ask("Enter your Google Custom Search API key: ")?;
        let search_engine_id = prompter.ask("Enter your Google Custom Search Engine ID (cx): ")?;
        if api_key.is_empty() || search_engine_id.is_empty() {
            prompter.say("Both values are required.")?;
            continue;
        }
        break SearchConfig {
            api_key,
            search_engine_id,
        };
    };

    save_config(path, &config)?;
    prompter.say(&format!("Configuration saved to {}\n", path.display()))?;
    Ok(config)
}
