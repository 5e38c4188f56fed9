use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    /// API root of the remote instance, e.g. `https://wiki.example.com/api`.
    pub base_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    /// Name of an environment variable holding the token. Checked when
    /// `api_token` is absent.
    #[serde(default)]
    pub api_token_env: Option<String>,
}

impl RemoteConfig {
    pub fn token(&self) -> Result<String> {
        if let Some(token) = &self.api_token {
            return Ok(token.clone());
        }
        if let Some(var) = &self.api_token_env {
            return std::env::var(var)
                .with_context(|| format!("environment variable {} is not set", var));
        }
        anyhow::bail!("[remote] needs api_token or api_token_env")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    /// Admissions allowed per period.
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,
    /// Window length in seconds.
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            period_secs: default_period_secs(),
        }
    }
}

fn default_max_requests() -> usize {
    10
}
fn default_period_secs() -> u64 {
    60
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if let Some(remote) = &mut config.remote {
        while remote.base_url.ends_with('/') {
            remote.base_url.pop();
        }
        if remote.base_url.is_empty() {
            anyhow::bail!("remote.base_url must not be empty");
        }
    }

    if config.rate_limit.max_requests == 0 {
        anyhow::bail!("rate_limit.max_requests must be >= 1");
    }
    if config.rate_limit.period_secs == 0 {
        anyhow::bail!("rate_limit.period_secs must be >= 1");
    }

    Ok(config)
}
