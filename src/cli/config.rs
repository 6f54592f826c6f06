//! Configuration file and credential resolution.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration loaded from the config file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Model name for analysis calls
    pub model: Option<String>,

    /// Base URL of the OpenAI-compatible API
    pub api_base: Option<String>,

    /// Directory for derived export filenames (default: cwd)
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default config file location.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", config_path.display()))
    }

    /// Returns the path to the config file.
    ///
    /// Default: `~/.config/note-voyeur/config.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("note-voyeur")
            .join("config.toml")
    }
}

/// Resolves the analysis API key.
///
/// Precedence order:
/// 1. Explicit `--api-key` flag
/// 2. `OPENAI_API_KEY` environment variable
/// 3. `.env` key-value file in the current directory, then in the
///    user config dir
pub fn resolve_api_key(flag: Option<&str>) -> Option<String> {
    if let Some(key) = flag {
        return Some(key.to_string());
    }
    if let Ok(key) = std::env::var("OPENAI_API_KEY")
        && !key.trim().is_empty()
    {
        return Some(key);
    }
    env_file_paths().iter().find_map(|p| read_env_file(p))
}

/// Locations searched for a `.env` file, in precedence order.
fn env_file_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from(".env"),
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("note-voyeur")
            .join(".env"),
    ]
}

/// Reads `OPENAI_API_KEY` from a `KEY=VALUE` env file, skipping blank
/// lines and `#` comments. A missing or unreadable file is not an
/// error, just an absent key.
fn read_env_file(path: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(path).ok()?;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=')
            && key.trim() == "OPENAI_API_KEY"
        {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}
