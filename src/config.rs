//! Gateway configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// External address pieces used to build download URLs.
    #[serde(default)]
    pub external: ExternalConfig,

    /// DCC file-transfer policy.
    #[serde(default)]
    pub dcc: DccConfig,
}

/// How the gateway is reachable from the outside; used when constructing
/// `scheme://host/downloads/<user>/<file>` URLs.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalConfig {
    /// URL scheme, `https` unless overridden.
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Externally visible host name.
    #[serde(default)]
    pub host: String,
}

/// DCC file-transfer policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DccConfig {
    /// Master switch; offers are dropped silently when disabled.
    #[serde(default)]
    pub enabled: bool,

    /// Automatic download of incoming offers.
    #[serde(default)]
    pub autoget: AutogetConfig,

    /// Directory downloaded files are written to, one subdirectory per user.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

/// Auto-accept policy for DCC offers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutogetConfig {
    /// When set, offers are accepted and streamed to disk without asking.
    #[serde(default)]
    pub enabled: bool,
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

impl Default for ExternalConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: String::new(),
        }
    }
}

impl Default for DccConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            autoget: AutogetConfig::default(),
            download_dir: default_download_dir(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Path a download for `user`/`file` is streamed to.
    pub fn downloaded_file(&self, user: &str, file: &str) -> PathBuf {
        self.dcc.download_dir.join(user).join(file)
    }

    /// The URL a download is served from once fetched.
    pub fn download_url(&self, user: &str, file: &str) -> String {
        format!(
            "{}://{}/downloads/{}/{}",
            self.external.scheme, self.external.host, user, file
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_conservative() {
        let config: Config = toml::from_str("").unwrap();
        assert!(!config.dcc.enabled);
        assert!(!config.dcc.autoget.enabled);
        assert_eq!(config.external.scheme, "https");
    }

    #[test]
    fn parses_full_config() {
        let config: Config = toml::from_str(
            r#"
            [external]
            scheme = "http"
            host = "gate.example.net"

            [dcc]
            enabled = true
            download_dir = "/var/lib/ircgate/downloads"

            [dcc.autoget]
            enabled = true
            "#,
        )
        .unwrap();

        assert!(config.dcc.enabled);
        assert!(config.dcc.autoget.enabled);
        assert_eq!(
            config.download_url("alice", "file.bin"),
            "http://gate.example.net/downloads/alice/file.bin"
        );
        assert_eq!(
            config.downloaded_file("alice", "file.bin"),
            PathBuf::from("/var/lib/ircgate/downloads/alice/file.bin")
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(toml::from_str::<Config>("[dcc]\nautoaccept = true\n").is_err());
    }
}
