// Copyright (c) 2026 Suporte ao Franqueado
// SPDX-License-Identifier: AGPL-3.0

// Client Configuration Types
//
// Defines the configuration schema for the access request client:
// - Kubernetes-style manifest format (apiVersion/kind/spec)
// - Directory (helpdesk persons API) endpoint and token
// - Automation webhook endpoint
// - Optional relay prefix and request timeout

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_VERSION: &str = "access-request/v1";
pub const KIND: &str = "ClientConfig";

pub const DEFAULT_DIRECTORY_URL: &str = "https://api.movidesk.com/public/v1";
pub const CONFIG_PATH_ENV: &str = "ACCESS_REQUEST_CONFIG_PATH";

/// Top-level configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfigManifest {
    /// API version (must be "access-request/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "ClientConfig")
    pub kind: String,

    pub spec: ClientConfig,
}

/// Remote services the workflow talks to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub directory: DirectoryConfig,

    pub automation: AutomationConfig,

    /// Prefix that forwards the percent-encoded target URL (e.g. "https://corsproxy.io/?")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay_url: Option<String>,

    /// Per-request timeout; none by default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Base URL of the persons API
    #[serde(default = "default_directory_url")]
    pub base_url: String,

    /// Static access token (supports "env:VAR_NAME")
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationConfig {
    /// Webhook that receives the request payload
    #[serde(default)]
    pub webhook_url: String,
}

fn default_directory_url() -> String {
    DEFAULT_DIRECTORY_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            directory: DirectoryConfig {
                base_url: default_directory_url(),
                token: "env:MOVIDESK_TOKEN".to_string(),
            },
            automation: AutomationConfig {
                webhook_url: "env:BOTCONVERSA_WEBHOOK_URL".to_string(),
            },
            relay_url: None,
            request_timeout_secs: None,
        }
    }
}

impl Default for ClientConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            spec: ClientConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Directory token with `env:` references resolved
    pub fn directory_token(&self) -> anyhow::Result<String> {
        resolve_secret(&self.directory.token)
    }

    /// Webhook URL with `env:` references resolved
    pub fn webhook_url(&self) -> anyhow::Result<String> {
        resolve_secret(&self.automation.webhook_url)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Resolve "env:VAR_NAME" references, pass literals through unchanged
pub fn resolve_secret(value: &str) -> anyhow::Result<String> {
    match value.strip_prefix("env:") {
        Some(var) => std::env::var(var)
            .map_err(|_| anyhow::anyhow!("Environment variable '{}' is not set", var)),
        None => Ok(value.to_string()),
    }
}

impl ClientConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Candidate locations, in precedence order
    /// 1. ACCESS_REQUEST_CONFIG_PATH environment variable
    /// 2. ./access-request.yaml (working directory)
    /// 3. ~/.access-request/config.yaml (user home)
    /// 4. /etc/access-request/config.yaml (system, Unix)
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            paths.push(PathBuf::from(path));
        }
        paths.push(PathBuf::from("./access-request.yaml"));
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".access-request").join("config.yaml"));
        }
        #[cfg(unix)]
        paths.push(PathBuf::from("/etc/access-request/config.yaml"));
        paths
    }

    /// First existing file among `search_paths()`
    pub fn discover_config() -> Option<PathBuf> {
        Self::search_paths().into_iter().find(|p| p.exists())
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ACCESS_REQUEST_DIRECTORY_URL") {
            tracing::info!("Environment override: ACCESS_REQUEST_DIRECTORY_URL");
            self.spec.directory.base_url = val;
        }
        if let Ok(val) = std::env::var("ACCESS_REQUEST_DIRECTORY_TOKEN") {
            tracing::info!("Environment override: ACCESS_REQUEST_DIRECTORY_TOKEN");
            self.spec.directory.token = val;
        }
        if let Ok(val) = std::env::var("ACCESS_REQUEST_WEBHOOK_URL") {
            tracing::info!("Environment override: ACCESS_REQUEST_WEBHOOK_URL");
            self.spec.automation.webhook_url = val;
        }
        if let Ok(val) = std::env::var("ACCESS_REQUEST_RELAY_URL") {
            tracing::info!("Environment override: ACCESS_REQUEST_RELAY_URL");
            self.spec.relay_url = if val.is_empty() { None } else { Some(val) };
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        validate_http_url("spec.directory.base_url", &self.spec.directory.base_url)?;

        let token = self.spec.directory_token()?;
        if token.trim().is_empty() {
            anyhow::bail!("spec.directory.token cannot be empty");
        }

        let webhook = self.spec.webhook_url()?;
        validate_http_url("spec.automation.webhook_url", &webhook)?;

        if let Some(relay) = &self.spec.relay_url {
            validate_http_url("spec.relay_url", relay)?;
        }

        if self.spec.request_timeout_secs == Some(0) {
            anyhow::bail!("spec.request_timeout_secs must be greater than zero");
        }

        Ok(())
    }
}

fn validate_http_url(field: &str, value: &str) -> anyhow::Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", field);
    }
    let parsed = url::Url::parse(value)
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL ({}): {}", field, value, e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("{} must use http or https, got '{}'", field, parsed.scheme());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
apiVersion: access-request/v1
kind: ClientConfig
spec:
  directory:
    base_url: https://api.movidesk.com/public/v1
    token: test-token
  automation:
    webhook_url: https://hooks.example.com/catch/1/abc/
  relay_url: https://corsproxy.io/?
"#;

    #[test]
    fn test_default_manifest() {
        let manifest = ClientConfigManifest::default();
        assert_eq!(manifest.api_version, "access-request/v1");
        assert_eq!(manifest.kind, "ClientConfig");
        assert_eq!(manifest.spec.directory.base_url, DEFAULT_DIRECTORY_URL);
        assert!(manifest.spec.relay_url.is_none());
        assert!(manifest.spec.request_timeout().is_none());
    }

    #[test]
    fn test_parse_and_validate() {
        let manifest = ClientConfigManifest::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(manifest.spec.directory.token, "test-token");
        assert_eq!(manifest.spec.relay_url.as_deref(), Some("https://corsproxy.io/?"));
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access-request.yaml");

        let mut manifest = ClientConfigManifest::from_yaml_str(SAMPLE).unwrap();
        manifest.spec.request_timeout_secs = Some(15);
        manifest.to_yaml_file(&path).unwrap();

        let loaded = ClientConfigManifest::load_or_default(Some(path)).unwrap();
        assert_eq!(loaded.spec.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(loaded.spec.automation.webhook_url, "https://hooks.example.com/catch/1/abc/");
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = ClientConfigManifest::load_or_default(Some(dir.path().join("nope.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_validation() {
        let mut manifest = ClientConfigManifest::from_yaml_str(SAMPLE).unwrap();

        manifest.api_version = "wrong/v1".to_string();
        assert!(manifest.validate().is_err());
        manifest.api_version = API_VERSION.to_string();

        manifest.kind = "WrongKind".to_string();
        assert!(manifest.validate().is_err());
        manifest.kind = KIND.to_string();

        manifest.spec.directory.token = "  ".to_string();
        assert!(manifest.validate().is_err());
        manifest.spec.directory.token = "test-token".to_string();

        manifest.spec.automation.webhook_url = "ftp://hooks.example.com".to_string();
        assert!(manifest.validate().is_err());
        manifest.spec.automation.webhook_url = "https://hooks.example.com/".to_string();

        manifest.spec.relay_url = Some("not a url".to_string());
        assert!(manifest.validate().is_err());
        manifest.spec.relay_url = None;

        manifest.spec.request_timeout_secs = Some(0);
        assert!(manifest.validate().is_err());
        manifest.spec.request_timeout_secs = None;

        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_resolve_secret_literal_and_missing_env() {
        assert_eq!(resolve_secret("plain").unwrap(), "plain");
        assert!(resolve_secret("env:ACCESS_REQUEST_TEST_SURELY_UNSET_VAR").is_err());
    }
}
