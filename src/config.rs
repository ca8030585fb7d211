use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable that overrides `backend.base_url`.
pub const BASE_URL_ENV: &str = "DSC_BASE_URL";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    /// Absent means requests wait until the transport itself fails.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Preloaded session credential, sent as a `Cookie` header on every call.
    #[serde(default)]
    pub session_cookie: Option<String>,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: None,
            session_cookie: None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Joins an absolute API path (`/api/...`) onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

fn default_max_results() -> usize {
    20
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config = parse_config(&content)?;

    if let Ok(url) = std::env::var(BASE_URL_ENV) {
        if !url.trim().is_empty() {
            config.backend.base_url = url;
        }
    }

    validate(&mut config)?;
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).with_context(|| "Failed to parse config file")
}

/// Checks invariants and normalizes the base URL (no trailing slash).
pub fn validate(config: &mut Config) -> Result<()> {
    let trimmed = config.backend.base_url.trim().trim_end_matches('/').to_string();
    if trimmed.is_empty() {
        anyhow::bail!("backend.base_url must not be empty");
    }

    let url = Url::parse(&trimmed)
        .with_context(|| format!("backend.base_url is not a valid URL: '{}'", trimmed))?;
    match url.scheme() {
        "http" | "https" => {}
        other => anyhow::bail!(
            "Unsupported backend.base_url scheme: '{}'. Must be http or https.",
            other
        ),
    }
    config.backend.base_url = trimmed;

    if config.backend.timeout_secs == Some(0) {
        anyhow::bail!("backend.timeout_secs must be > 0 when set");
    }

    if config.display.max_results == 0 {
        anyhow::bail!("display.max_results must be >= 1");
    }

    Ok(())
}
