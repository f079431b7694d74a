//! The `graderbench models` command.

use std::path::PathBuf;

use anyhow::Result;

use super::build_client;

pub async fn execute(endpoint: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let client = build_client(endpoint, config_path.as_deref())?;
    let models = client.list_models().await?;

    if models.is_empty() {
        println!("No models installed. Pull one with: graderbench pull <model>");
        return Ok(());
    }

    println!("Available models:");
    for model in models {
        println!("  {model}");
    }
    Ok(())
}
