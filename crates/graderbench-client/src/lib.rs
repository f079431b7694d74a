//! graderbench-client — Ollama inference client.
//!
//! Implements the [`graderbench_core::traits::InferenceClient`] seam over the
//! Ollama HTTP API: retried transport, grading generation, model listing, and
//! a streaming model-pull interface.

pub mod config;
pub mod mock;
pub mod ollama;
pub mod pull;

pub use config::{load_config, load_config_from, ClientConfig, RetryPolicy};
pub use ollama::OllamaClient;
pub use pull::ProgressEvent;
