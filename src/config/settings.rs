use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::core::DEFAULT_WINDOW_NAME;
use crate::util::paths::config_path;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Name pre-filled in the UI's save form for an unsaved window
    pub default_window_name: String,
    /// Override for the state file location (default: <data dir>/state.json)
    pub state_file: Option<PathBuf>,
    /// Log filter directive (e.g. "tabvault=debug"), overriding RUST_LOG
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_window_name: DEFAULT_WINDOW_NAME.to_string(),
            state_file: None,
            log_filter: None,
        }
    }
}

/// On-disk representation; every field optional so a partial file works.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    default_window_name: Option<String>,
    state_file: Option<PathBuf>,
    log_filter: Option<String>,
}

impl Config {
    /// Load configuration from `<data dir>/config.toml`, falling back to
    /// defaults when the file is missing. A present-but-broken file is an
    /// error: silently ignoring a typo'd config is worse than refusing to
    /// start.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        let file: ConfigFile = toml::from_str(&contents)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: ConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            default_window_name: file
                .default_window_name
                .filter(|name| !name.is_empty())
                .unwrap_or(defaults.default_window_name),
            state_file: file.state_file,
            log_filter: file.log_filter,
        }
    }
}
