//! The `graderbench pull` command.

use std::path::PathBuf;

use anyhow::Result;
use futures::StreamExt;

use graderbench_core::traits::InferenceClient;

use super::build_client;

pub async fn execute(
    model: String,
    endpoint: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let client = build_client(endpoint, config_path.as_deref())?;

    if client.model_exists(&model).await {
        println!("Model '{model}' is already installed.");
        return Ok(());
    }

    println!("Pulling {model}...");
    let mut stream = std::pin::pin!(client.pull_model(&model));
    let mut last_status = String::new();

    while let Some(event) = stream.next().await {
        if let Some(error) = &event.error {
            anyhow::bail!("pull failed: {error}");
        }

        if let (Some(completed), Some(total)) = (event.completed, event.total) {
            if total > 0 {
                let digest = event.digest.as_deref().unwrap_or("layer");
                eprintln!(
                    "  {digest}: {completed}/{total} bytes ({:.1}%)",
                    completed as f64 / total as f64 * 100.0
                );
            }
        } else if let Some(status) = &event.status {
            if *status != last_status {
                eprintln!("  {status}");
                last_status = status.clone();
            }
        }

        if event.is_success() {
            println!("Successfully pulled {model}.");
            return Ok(());
        }
    }

    anyhow::bail!("pull stream ended without a success status")
}
