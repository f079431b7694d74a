//! Client configuration and retry policy.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Retry behavior for transport-level failures.
///
/// Immutable once the client is constructed. Non-2xx responses are never
/// retried; only transport failures consume the retry budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total tries per request, including the first.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the first retry.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Backoff growth factor between retries.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based): pure exponential
    /// backoff, `initial · multiplier^(retry−1)`, no jitter.
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        let millis = self.initial_delay_ms as f64
            * self.backoff_multiplier.powi(retry.saturating_sub(1) as i32);
        Duration::from_millis(millis as u64)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

fn default_max_retries() -> u32 {
    5
}
fn default_initial_delay_ms() -> u64 {
    1000
}
fn default_backoff_multiplier() -> f64 {
    2.0
}

/// Configuration for the Ollama client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the inference server.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds (pull streams are exempt).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            retry: RetryPolicy::default(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `graderbench.toml` in the current directory
/// 2. `~/.config/graderbench/config.toml`
///
/// `GRADERBENCH_OLLAMA_URL` overrides the base URL from either source.
pub fn load_config() -> Result<ClientConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ClientConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("graderbench.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            global.exists().then_some(global)
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ClientConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ClientConfig::default(),
    };

    if let Ok(url) = std::env::var("GRADERBENCH_OLLAMA_URL") {
        config.base_url = url;
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("graderbench"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.initial_delay_ms, 1000);
    }

    #[test]
    fn backoff_is_pure_exponential() {
        let policy = RetryPolicy {
            max_retries: 4,
            initial_delay_ms: 1000,
            backoff_multiplier: 2.0,
        };
        assert_eq!(policy.delay_before_retry(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_before_retry(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_before_retry(3), Duration::from_millis(4000));
    }

    #[test]
    fn parse_config_with_partial_retry_section() {
        let toml_str = r#"
base_url = "http://10.0.0.5:11434"

[retry]
max_retries = 3
"#;
        let config: ClientConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.base_url, "http://10.0.0.5:11434");
        assert_eq!(config.retry.max_retries, 3);
        // Unspecified retry fields keep their defaults.
        assert_eq!(config.retry.initial_delay_ms, 1000);
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = \"http://example:11434\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.base_url, "http://example:11434");
    }

    #[test]
    fn load_from_missing_path_fails() {
        let result = load_config_from(Some(Path::new("/nonexistent/graderbench.toml")));
        assert!(result.is_err());
    }
}
