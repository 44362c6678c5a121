//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use launch_core::sites::SiteDirectory;

/// Upstream endpoint for launch data.
pub const DEFAULT_API_URL: &str = "https://api.spacexdata.com/v4/launches";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TREES: usize = 100;
const DATA_FILE: &str = "launches.csv";

/// Settings shared by every command.
///
/// - `LAUNCH_PREDICTOR_DATA`: path of the launch table
/// - `LAUNCH_PREDICTOR_API_URL`: upstream launch endpoint
/// - `LAUNCH_PREDICTOR_HOST` / `LAUNCH_PREDICTOR_PORT`: dashboard bind address
/// - `LAUNCH_PREDICTOR_SEED`: forest seed (unset means non-deterministic fits)
/// - `LAUNCH_PREDICTOR_TREES`: forest size
/// - `LAUNCH_PREDICTOR_SITES`: JSON file replacing the built-in site table
#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub api_url: String,
    pub host: String,
    pub port: u16,
    pub seed: Option<u64>,
    pub n_trees: usize,
    pub sites_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables. Unparseable numeric
    /// values fall back to their defaults.
    pub fn from_env() -> Result<Self> {
        let data_path = match std::env::var("LAUNCH_PREDICTOR_DATA") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_data_path()?,
        };

        Ok(Self {
            data_path,
            api_url: std::env::var("LAUNCH_PREDICTOR_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            host: std::env::var("LAUNCH_PREDICTOR_HOST")
                .unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: parse_env("LAUNCH_PREDICTOR_PORT").unwrap_or(DEFAULT_PORT),
            seed: parse_env("LAUNCH_PREDICTOR_SEED"),
            n_trees: parse_env("LAUNCH_PREDICTOR_TREES").unwrap_or(DEFAULT_TREES),
            sites_path: std::env::var("LAUNCH_PREDICTOR_SITES").ok().map(PathBuf::from),
        })
    }

    /// Configuration rooted at an explicit table path (for tests).
    pub fn with_data_path(path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: path.into(),
            api_url: DEFAULT_API_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            seed: None,
            n_trees: DEFAULT_TREES,
            sites_path: None,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The site table: the configured JSON file, else the built-in one.
    pub fn site_directory(&self) -> Result<SiteDirectory> {
        match &self.sites_path {
            Some(path) => SiteDirectory::from_json_file(path)
                .with_context(|| format!("Failed to load site table {}", path.display())),
            None => Ok(SiteDirectory::builtin()),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    parse_value(key, &std::env::var(key).ok()?)
}

/// Parse one setting, warning about and ignoring a malformed value.
fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = raw, "Ignoring malformed setting");
            None
        }
    }
}

/// `launches.csv` inside the platform data directory.
pub fn default_data_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "launch-predictor")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join(DATA_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_data_path_uses_defaults() {
        let config = Config::with_data_path("/tmp/launches.csv");
        assert_eq!(config.data_path, PathBuf::from("/tmp/launches.csv"));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.n_trees, 100);
        assert!(config.seed.is_none());
    }

    #[test]
    fn malformed_settings_are_ignored() {
        assert_eq!(parse_value::<u64>("LAUNCH_PREDICTOR_SEED", " 42 "), Some(42));
        assert_eq!(parse_value::<u64>("LAUNCH_PREDICTOR_SEED", "4x2"), None);
        assert_eq!(parse_value::<u16>("LAUNCH_PREDICTOR_PORT", "70000"), None);
        assert_eq!(parse_value::<usize>("LAUNCH_PREDICTOR_TREES", "-5"), None);
    }

    #[test]
    fn missing_sites_file_is_an_error() {
        let mut config = Config::with_data_path("/tmp/launches.csv");
        config.sites_path = Some(PathBuf::from("/nonexistent/sites.json"));
        assert!(config.site_directory().is_err());
    }

    #[test]
    fn default_site_table_is_builtin() {
        let config = Config::with_data_path("/tmp/launches.csv");
        assert_eq!(config.site_directory().unwrap().len(), 4);
    }
}
