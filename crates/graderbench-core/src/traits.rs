//! The inference client trait the eval engine drives.
//!
//! Implemented by `graderbench-client` for the Ollama HTTP API and by test
//! doubles.

use async_trait::async_trait;

use crate::error::ClientError;

/// Response from one generation request.
#[derive(Debug, Clone)]
pub struct Generation {
    /// The model's raw free-text response.
    pub text: String,
    /// Wall-clock request duration in seconds.
    pub response_time_secs: f64,
}

/// A backend that can answer grading prompts.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Human-readable backend name (e.g. "ollama").
    fn name(&self) -> &str;

    /// Send `prompt` to `model` and return its free-text response.
    ///
    /// Transport failures are retried inside the implementation; the error
    /// returned here is final.
    async fn generate(&self, model: &str, prompt: &str) -> Result<Generation, ClientError>;

    /// Whether the named model is available on the server.
    ///
    /// Any transport error collapses to `false`; callers that need to
    /// distinguish "absent" from "server down" must go through the raw
    /// request interface instead.
    async fn model_exists(&self, model: &str) -> bool;
}
