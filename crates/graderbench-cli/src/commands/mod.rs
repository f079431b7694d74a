pub mod models;
pub mod pull;
pub mod run;

use std::path::Path;

use anyhow::Result;

use graderbench_client::{load_config_from, ClientConfig, OllamaClient};

/// Build a client from the config file search path plus CLI overrides.
pub fn build_client(endpoint: Option<String>, config_path: Option<&Path>) -> Result<OllamaClient> {
    let mut config: ClientConfig = load_config_from(config_path)?;
    if let Some(endpoint) = endpoint {
        config.base_url = endpoint;
    }
    Ok(OllamaClient::new(config))
}
