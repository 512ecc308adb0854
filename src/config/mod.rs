//! Configuration management

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "restaurant-console";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Root of the REST API; endpoint paths are joined onto it
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Location opened after the session is restored
    #[serde(default = "default_start_path")]
    pub start_path: String,

    /// Where the session token is kept; defaults to the data directory
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_start_path() -> String {
    "/dashboard".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            start_path: default_start_path(),
            data_dir: None,
        }
    }
}

impl Config {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(get_data_dir)
    }
}

/// Get config directory (XDG_CONFIG_HOME or platform default)
pub fn get_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("RC_CONFIG_DIR") {
        return PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library/Application Support")
                .join(APP_DIR_NAME);
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_DIR_NAME);
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".config").join(APP_DIR_NAME);
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join(APP_DIR_NAME);
        }
    }

    // Fallback to current directory
    PathBuf::from(".")
}

/// Get data directory (XDG_DATA_HOME or platform default)
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("RC_DATA_DIR") {
        return PathBuf::from(dir);
    }

    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library/Application Support")
                .join(APP_DIR_NAME);
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join(APP_DIR_NAME);
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".local/share").join(APP_DIR_NAME);
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("LOCALAPPDATA") {
            return PathBuf::from(appdata).join(APP_DIR_NAME);
        }
    }

    // Fallback to ./data
    PathBuf::from("./data")
}

pub fn load_config() -> Result<Config> {
    let config_dir = get_config_dir();

    let builder = ::config::Config::builder()
        // Start with defaults
        .set_default("api_base_url", default_api_base_url())?
        .set_default("start_path", default_start_path())?
        // Load from config file if it exists
        .add_source(
            ::config::File::with_name(&config_dir.join("config").to_string_lossy()).required(false),
        )
        // Override with environment variables (RC_API_BASE_URL, RC_START_PATH, ...)
        .add_source(::config::Environment::with_prefix("RC").try_parsing(true));

    let config = builder.build()?;

    Ok(config.try_deserialize()?)
}
