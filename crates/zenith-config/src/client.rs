//! The client config file and its resolution into effective settings.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::paths::{expand_path, xdg_config_dir};
use crate::{ConfigError, Result};

/// Server used when neither the command line nor the file names one.
pub const DEFAULT_SERVER: &str = "http://localhost:8000";

/// Request timeout used when the file does not set one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default config filename.
const CLIENT_CONFIG_FILE: &str = "client.yaml";

/// Root client configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    /// Server root URL, e.g. `https://zenith.example.com`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Where the persisted session lives. Defaults to the config directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a YAML string.
    ///
    /// An empty document is an empty config.
    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        if yaml_str.trim().is_empty() {
            return Ok(Self::new());
        }
        serde_yaml::from_str(yaml_str).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    /// Serialize to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Apply the precedence rules and validate the result.
    ///
    /// `server_override` carries the `--server` flag or `ZENITH_API_URL`.
    pub fn resolve(&self, server_override: Option<&str>) -> Result<ResolvedConfig> {
        let (server, source) = match (server_override, self.server.as_deref()) {
            (Some(s), _) if !s.trim().is_empty() => (s.trim(), ServerSource::Override),
            (_, Some(s)) if !s.trim().is_empty() => (s.trim(), ServerSource::File),
            _ => (DEFAULT_SERVER, ServerSource::Default),
        };
        validate_server(server)?;

        let data_dir = match &self.data_dir {
            Some(dir) => expand_path(dir),
            None => xdg_config_dir().ok_or_else(|| {
                ConfigError::Other("Could not determine data directory".to_string())
            })?,
        };

        Ok(ResolvedConfig {
            server: server.trim_end_matches('/').to_string(),
            source,
            timeout: Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            data_dir,
        })
    }
}

fn validate_server(server: &str) -> Result<()> {
    let invalid = |reason: &str| ConfigError::InvalidServer {
        url: server.to_string(),
        reason: reason.to_string(),
    };
    let url = Url::parse(server).map_err(|e| invalid(&e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(&format!("unsupported scheme '{}'", other))),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    Ok(())
}

/// Where the effective server URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerSource {
    /// `--server` flag or `ZENITH_API_URL`.
    Override,
    File,
    Default,
}

impl fmt::Display for ServerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerSource::Override => write!(f, "command line"),
            ServerSource::File => write!(f, "config file"),
            ServerSource::Default => write!(f, "default"),
        }
    }
}

/// Effective settings after precedence is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Server root, without a trailing slash.
    pub server: String,
    pub source: ServerSource,
    pub timeout: Duration,
    pub data_dir: PathBuf,
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading / Saving
// ─────────────────────────────────────────────────────────────────────────────

/// Get the path to the client config file.
pub fn client_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(CLIENT_CONFIG_FILE))
}

/// Load the client configuration.
///
/// Returns a default config if the file doesn't exist.
pub fn load_client_config() -> Result<ClientConfig> {
    load_client_config_from(client_config_path().as_deref())
}

/// Load client config from a specific path.
pub fn load_client_config_from(path: Option<&Path>) -> Result<ClientConfig> {
    let Some(path) = path else {
        return Ok(ClientConfig::new());
    };

    if !path.exists() {
        return Ok(ClientConfig::new());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;

    ClientConfig::from_yaml(&contents)
}

/// Save client config to a specific path.
pub fn save_client_config_to(config: &ClientConfig, path: &Path) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = config.to_yaml()?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
