//! graderbench CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "graderbench", version, about = "LLM grading-consistency eval harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a grading evaluation
    Run {
        /// Path to a .toml question file
        #[arg(long)]
        questions: PathBuf,

        /// Models to evaluate, comma-separated (e.g. "llama3.1:8b,gemma3:4b")
        #[arg(long)]
        models: String,

        /// Grading attempts per question per model
        #[arg(long, default_value = "5")]
        attempts: u32,

        /// Inference server base URL (overrides config)
        #[arg(long)]
        endpoint: Option<String>,

        /// Output directory
        #[arg(long, default_value = "./graderbench-results")]
        output: PathBuf,

        /// Output format: json, csv, markdown, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List models available on the inference server
    Models {
        /// Inference server base URL (overrides config)
        #[arg(long)]
        endpoint: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Pull a model, streaming download progress
    Pull {
        /// Model to pull (e.g. "llama3.1:8b")
        model: String,

        /// Inference server base URL (overrides config)
        #[arg(long)]
        endpoint: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("graderbench=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            questions,
            models,
            attempts,
            endpoint,
            output,
            format,
            config,
        } => commands::run::execute(questions, models, attempts, endpoint, output, format, config).await,
        Commands::Models { endpoint, config } => {
            commands::models::execute(endpoint, config).await
        }
        Commands::Pull {
            model,
            endpoint,
            config,
        } => commands::pull::execute(model, endpoint, config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
