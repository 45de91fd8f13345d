//! Configuration loading.
//!
//! Configuration comes from the first file found among the standard
//! locations (or an explicit `--config` path), with environment
//! variable overrides applied afterwards. TOML, YAML, and JSON are
//! all accepted, dispatched on the file extension.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::secrets::VaultConfig;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP API settings
    pub server: ServerConfig,

    /// Vault secret store settings
    pub vault: VaultConfig,

    /// Key generation settings
    pub keygen: KeygenConfig,

    /// SSH client settings
    pub ssh: SshConfig,
}

/// HTTP API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the server to
    pub bind_address: SocketAddr,
    /// Whether to enable permissive CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            enable_cors: true,
        }
    }
}

/// Key generation settings.
///
/// An empty passphrase disables private-key encryption at rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeygenConfig {
    /// RSA modulus size in bits
    pub bits: usize,
    /// Passphrase for private-key encryption at rest
    pub passphrase: String,
    /// Salt for the passphrase key derivation
    pub salt: String,
}

impl Default for KeygenConfig {
    fn default() -> Self {
        Self {
            bits: 4096,
            passphrase: String::new(),
            salt: String::new(),
        }
    }
}

/// SSH client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    /// Connect and inactivity timeout. Key installation on slow hosts
    /// can take a while, so this defaults to minutes, not seconds.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
        }
    }
}

impl Config {
    /// Load configuration from the first file found, then apply
    /// environment overrides.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Config::default();

        for path in Self::get_config_paths(config_path) {
            if path.exists() {
                config = Self::from_file(&path)?;
                break;
            }
        }

        config.apply_env_overrides();
        Ok(config)
    }

    /// Candidate configuration file paths in priority order.
    fn get_config_paths(explicit_path: Option<&PathBuf>) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(path) = explicit_path {
            paths.push(path.clone());
            return paths;
        }

        if let Ok(env_config) = std::env::var("NODEWARDEN_CONFIG") {
            paths.push(PathBuf::from(env_config));
        }

        paths.push(PathBuf::from("nodewarden.toml"));
        paths.push(PathBuf::from("nodewarden.yaml"));

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".nodewarden/config.toml"));
        }

        paths.push(PathBuf::from("/etc/nodewarden/config.toml"));

        paths
    }

    /// Parse one configuration file, dispatching on its extension.
    fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let config = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        Ok(config)
    }

    /// Apply the standard Vault environment variables on top of
    /// whatever the file provided.
    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("VAULT_ADDR") {
            self.vault.address = addr;
        }
        if let Ok(token) = std::env::var("VAULT_TOKEN") {
            self.vault.token = token;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.bind_address.port(), 8080);
        assert_eq!(config.keygen.bits, 4096);
        assert!(config.keygen.passphrase.is_empty());
        assert_eq!(config.ssh.timeout, Duration::from_secs(120));
        assert_eq!(config.vault.mount, "secret");
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[server]
bind_address = "0.0.0.0:9090"

[keygen]
bits = 2048
passphrase = "hunter2"
salt = "pepper"

[ssh]
timeout = "30s"
"#
        )
        .unwrap();

        let path = file.path().to_path_buf();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.bind_address.port(), 9090);
        assert_eq!(config.keygen.bits, 2048);
        assert_eq!(config.keygen.passphrase, "hunter2");
        assert_eq!(config.ssh.timeout, Duration::from_secs(30));
        // Unspecified sections fall back to defaults.
        assert_eq!(config.vault.mount, "secret");
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
vault:
  address: "http://vault.internal:8200"
  mount: "kv"
  base_path: "ssh-nodes"
"#
        )
        .unwrap();

        let path = file.path().to_path_buf();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.vault.address, "http://vault.internal:8200");
        assert_eq!(config.vault.mount, "kv");
        assert_eq!(config.vault.base_path, "ssh-nodes");
    }
}
