//! Mock inference client for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use graderbench_core::error::ClientError;
use graderbench_core::traits::{Generation, InferenceClient};

/// A mock inference client for exercising the eval engine without a server.
///
/// Outcomes are scripted per call; once the script runs dry the default
/// response repeats.
pub struct MockClient {
    script: Mutex<VecDeque<Result<String, ClientError>>>,
    default_response: String,
    call_count: AtomicU32,
    known_models: Vec<String>,
}

impl MockClient {
    /// A mock that always answers with `response`.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_response: response.to_string(),
            call_count: AtomicU32::new(0),
            known_models: vec!["mock-model".into()],
        }
    }

    /// Queue a successful response for the next unscripted call.
    pub fn push_response(&self, response: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(response.to_string()));
    }

    /// Queue a failure for the next unscripted call.
    pub fn push_error(&self, error: ClientError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Models reported by `model_exists`.
    pub fn with_models(mut self, models: &[&str]) -> Self {
        self.known_models = models.iter().map(|m| m.to_string()).collect();
        self
    }

    /// Number of `generate` calls made so far (warm-ups included).
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl InferenceClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, _model: &str, _prompt: &str) -> Result<Generation, ClientError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(Ok(text)) => Ok(Generation {
                text,
                response_time_secs: 0.01,
            }),
            Some(Err(e)) => Err(e),
            None => Ok(Generation {
                text: self.default_response.clone(),
                response_time_secs: 0.01,
            }),
        }
    }

    async fn model_exists(&self, model: &str) -> bool {
        self.known_models.iter().any(|m| m == model)
    }
}
