//! Ollama HTTP inference client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use tracing::instrument;

use graderbench_core::error::ClientError;
use graderbench_core::traits::{Generation, InferenceClient};

use crate::config::{ClientConfig, RetryPolicy};

/// Client for an Ollama-compatible inference server.
///
/// Holds only the endpoint and an immutable retry policy; per-run model
/// selection is passed with every call, so there is no hidden cross-run
/// state.
pub struct OllamaClient {
    base_url: String,
    retry: RetryPolicy,
    request_timeout: Duration,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    name: String,
}

impl OllamaClient {
    pub fn new(config: ClientConfig) -> Self {
        // No default timeout on the client itself: `request` applies one per
        // call and the pull stream must be allowed to run for minutes.
        let http = reqwest::Client::builder()
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: config.retry,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Perform one HTTP request with transport-level retry.
    ///
    /// Transport failures (refused connection, timeout, DNS) are retried up
    /// to the policy's budget with exponential backoff; all transport errors
    /// are treated alike. Non-2xx responses are returned to the caller for
    /// inspection and never retried. After exhaustion the last failure is
    /// propagated as [`ClientError::Transport`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        timeout: Duration,
    ) -> Result<reqwest::Response, ClientError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut last_error: Option<reqwest::Error> = None;

        for attempt in 1..=self.retry.max_retries.max(1) {
            if attempt > 1 {
                let delay = self.retry.delay_before_retry(attempt - 1);
                tracing::debug!(
                    attempt,
                    max_retries = self.retry.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    %url,
                    "retrying request"
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self.http.request(method.clone(), &url).timeout(timeout);
            if let Some(body) = &body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_retries = self.retry.max_retries,
                        error = %e,
                        %url,
                        "transport failure"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(ClientError::Transport(
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "all retry attempts failed".to_string()),
        ))
    }

    /// List the models available on the server.
    pub async fn list_models(&self) -> Result<Vec<String>, ClientError> {
        let response = self
            .request(Method::GET, "api/tags", None, self.request_timeout)
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("malformed tags response: {e}")))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    #[instrument(skip(self, prompt), fields(model = %model))]
    async fn generate(&self, model: &str, prompt: &str) -> Result<Generation, ClientError> {
        let start = Instant::now();
        let body = serde_json::json!({
            "model": model,
            "prompt": prompt,
            "stream": false,
        });

        let response = self
            .request(Method::POST, "api/generate", Some(body), self.request_timeout)
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("malformed generate response: {e}")))?;

        Ok(Generation {
            text: parsed.response,
            response_time_secs: start.elapsed().as_secs_f64(),
        })
    }

    async fn model_exists(&self, model: &str) -> bool {
        match self.list_models().await {
            Ok(models) => models.iter().any(|name| name == model),
            Err(e) => {
                tracing::warn!(error = %e, model, "model existence check failed");
                false
            }
        }
    }
}
