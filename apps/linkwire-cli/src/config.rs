//! CLI configuration.
//!
//! Reads JSON at `~/.config/linkwire/config.json`. A missing file yields the
//! defaults; an unreadable one is reported and ignored.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 11011;

/// On-disk config format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    host: String,
    #[serde(default)]
    port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    download_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub host: String,
    pub port: u16,
    pub download_dir: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            download_dir: None,
        }
    }
}

impl CliConfig {
    /// Loads configuration from the default location.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_file_path()?)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let mut config = Self::default();
        if !path.exists() {
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<ConfigFile>(&content) {
            Ok(file) => {
                if !file.host.is_empty() {
                    config.host = file.host;
                }
                if file.port != 0 {
                    config.port = file.port;
                }
                config.download_dir = file.download_dir;
            }
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to parse config, using defaults"
            ),
        }

        Ok(config)
    }

    /// Applies positional `[host] [port]` arguments.
    pub fn apply_args<I>(&mut self, mut args: I) -> anyhow::Result<()>
    where
        I: Iterator<Item = String>,
    {
        if let Some(host) = args.next() {
            self.host = host;
        }
        if let Some(port) = args.next() {
            self.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid port {port:?}: {e}"))?;
        }
        Ok(())
    }
}

fn config_file_path() -> anyhow::Result<PathBuf> {
    Ok(config_base_dir()?.join("linkwire").join("config.json"))
}

fn config_base_dir() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let appdata = std::env::var("APPDATA")?;
        Ok(PathBuf::from(appdata))
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Ok(dir) = std::env::var("XDG_CONFIG_HOME")
            && !dir.is_empty()
        {
            return Ok(PathBuf::from(dir));
        }
        let home = std::env::var("HOME")?;
        Ok(PathBuf::from(home).join(".config"))
    }
}
