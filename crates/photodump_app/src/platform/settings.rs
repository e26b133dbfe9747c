use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use photodump_engine::{ApiSettings, FixedDelay};
use serde::Deserialize;

use super::logging::LogDestination;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "photodump.ron";

/// Command-line arguments. Every flag overrides the config file.
#[derive(Parser, Debug, Default)]
#[command(name = "photodump")]
#[command(about = "Terminal client for the photodump categorization server")]
#[command(version)]
pub struct Cli {
    /// Server base URL, e.g. http://127.0.0.1:8000
    #[arg(long, env = "PHOTODUMP_SERVER")]
    pub server: Option<String>,

    /// Path to a RON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where the result archive is saved
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// Log destination
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub reconnect_delay_ms: u64,
    pub connect_timeout_ms: u64,
    pub download_dir: PathBuf,
    pub log_destination: LogDestination,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        Self {
            server_url: api.base_url,
            reconnect_delay_ms: 1000,
            connect_timeout_ms: api.connect_timeout.as_millis() as u64,
            download_dir: api.download_dir,
            log_destination: LogDestination::default(),
        }
    }
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        ron::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Config file (explicit, or the default one when present) with CLI overrides applied.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::load(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(cli);
        Ok(config)
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(server) = &cli.server {
            self.server_url = server.clone();
        }
        if let Some(dir) = &cli.download_dir {
            self.download_dir = dir.clone();
        }
        if let Some(destination) = cli.log {
            self.log_destination = destination;
        }
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.server_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            download_dir: self.download_dir.clone(),
        }
    }

    pub fn reconnect_policy(&self) -> FixedDelay {
        FixedDelay(Duration::from_millis(self.reconnect_delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;

    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::{Cli, ClientConfig};
    use crate::platform::logging::LogDestination;

    #[test]
    fn defaults_match_local_server() {
        let config = ClientConfig::default();
        assert_eq!(config.server_url, "http://127.0.0.1:8000");
        assert_eq!(config.reconnect_policy().0, Duration::from_secs(1));
        assert_eq!(config.api_settings().connect_timeout, Duration::from_secs(10));
        assert_eq!(config.log_destination, LogDestination::File);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photodump.ron");
        fs::write(
            &path,
            r#"(server_url: "http://photos.local:9000", log_destination: Both)"#,
        )
        .unwrap();

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.server_url, "http://photos.local:9000");
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.reconnect_delay_ms, 1000);
    }

    #[test]
    fn cli_flags_override_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.ron");
        fs::write(
            &path,
            r#"(server_url: "http://from-file:1", download_dir: "file-dir")"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "photodump",
            "--config",
            path.to_str().unwrap(),
            "--server",
            "http://from-cli:2",
            "--log",
            "terminal",
        ])
        .unwrap();
        let config = ClientConfig::resolve(&cli).unwrap();

        assert_eq!(config.server_url, "http://from-cli:2");
        assert_eq!(config.download_dir, PathBuf::from("file-dir"));
        assert_eq!(config.log_destination, LogDestination::Terminal);
    }

    #[test]
    fn broken_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.ron");
        fs::write(&path, "(server_url: ").unwrap();
        assert!(ClientConfig::load(&path).is_err());

        let missing = Cli {
            config: Some(dir.path().join("missing.ron")),
            ..Cli::default()
        };
        assert!(ClientConfig::resolve(&missing).is_err());
    }
}
