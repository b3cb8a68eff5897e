use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable overriding the Hub API base URL
pub const API_URL_ENV: &str = "DOCKER_HUB_API_URL";
/// Environment variable overriding the registry host
pub const REGISTRY_URL_ENV: &str = "DOCKER_REGISTRY_URL";

const DEFAULT_API_BASE_URL: &str = "https://hub.docker.com";
const DEFAULT_REGISTRY_HOST: &str = "registry-1.docker.io";
const DEFAULT_RATE_LIMIT_TOKEN_URL: &str =
    "https://auth.docker.io/token?service=registry.docker.io&scope=repository:ratelimitpreview/test:pull";
const RATE_LIMIT_MANIFEST_PATH: &str = "/v2/ratelimitpreview/test/manifests/latest";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TlsBackend {
    Rustls,
    NativeTls,
}

impl Default for TlsBackend {
    fn default() -> Self {
        Self::Rustls
    }
}

/// hub-rs configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_registry_host")]
    pub registry_host: String,

    /// Token endpoint used by the rate-limit probe
    #[serde(default = "default_rate_limit_token_url")]
    pub rate_limit_token_url: String,

    /// Manifest probed with HEAD, derived from the registry host if not configured
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_manifest_url: Option<String>,

    #[serde(default)]
    pub tls_backend: TlsBackend,

    /// Request timeout in seconds (0 = HTTP client default)
    #[serde(default)]
    pub timeout_secs: u64,

    /// Items requested per page on list endpoints
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// HTTP proxy URL (optional)
    /// Supported formats: http://host:port, https://host:port, socks5://host:port
    #[serde(default)]
    pub proxy_url: Option<String>,

    #[serde(default)]
    pub proxy_username: Option<String>,

    #[serde(default)]
    pub proxy_password: Option<String>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_registry_host() -> String {
    DEFAULT_REGISTRY_HOST.to_string()
}

fn default_rate_limit_token_url() -> String {
    DEFAULT_RATE_LIMIT_TOKEN_URL.to_string()
}

fn default_page_size() -> usize {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            registry_host: default_registry_host(),
            rate_limit_token_url: default_rate_limit_token_url(),
            rate_limit_manifest_url: None,
            tls_backend: TlsBackend::default(),
            timeout_secs: 0,
            page_size: default_page_size(),
            proxy_url: None,
            proxy_username: None,
            proxy_password: None,
        }
    }
}

/// Resolved Hub endpoints
///
/// Built once at startup and passed by reference to the client; never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub api_base_url: String,
    pub registry_host: String,
    pub rate_limit_token_url: String,
    pub rate_limit_manifest_url: String,
    pub page_size: usize,
}

impl Config {
    /// Get default config file path
    pub fn default_config_path() -> &'static str {
        "config.json"
    }

    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            // Config file doesn't exist, return default config
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Proxy credentials, only when both halves are set
    pub fn proxy_auth(&self) -> Option<(&str, &str)> {
        match (&self.proxy_username, &self.proxy_password) {
            (Some(username), Some(password)) => Some((username.as_str(), password.as_str())),
            _ => None,
        }
    }

    /// Resolve endpoints from the process environment
    pub fn resolve_instance(&self) -> Instance {
        self.resolve_instance_with(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(REGISTRY_URL_ENV).ok(),
        )
    }

    /// Resolve endpoints from explicit override values
    ///
    /// The overrides apply only when both are non-empty.
    pub fn resolve_instance_with(
        &self,
        api_override: Option<String>,
        registry_override: Option<String>,
    ) -> Instance {
        let overrides = match (api_override, registry_override) {
            (Some(api), Some(registry)) if !api.is_empty() && !registry.is_empty() => {
                Some((api, registry))
            }
            _ => None,
        };

        let (api_base_url, registry_host, manifest_url) = match overrides {
            Some((api, registry)) => {
                tracing::debug!("Using alternate Hub instance: {} / {}", api, registry);
                let manifest = manifest_url_for(&registry);
                (api, registry, manifest)
            }
            None => (
                self.api_base_url.clone(),
                self.registry_host.clone(),
                self.rate_limit_manifest_url
                    .clone()
                    .unwrap_or_else(|| manifest_url_for(&self.registry_host)),
            ),
        };

        Instance {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            registry_host,
            rate_limit_token_url: self.rate_limit_token_url.clone(),
            rate_limit_manifest_url: manifest_url,
            page_size: self.page_size.max(1),
        }
    }
}

fn manifest_url_for(registry: &str) -> String {
    let registry = registry.trim_end_matches('/');
    if registry.starts_with("http://") || registry.starts_with("https://") {
        format!("{}{}", registry, RATE_LIMIT_MANIFEST_PATH)
    } else {
        format!("https://{}{}", registry, RATE_LIMIT_MANIFEST_PATH)
    }
}
