//! Streaming model-pull progress.
//!
//! `/api/pull` answers with newline-delimited JSON; each line is parsed
//! independently so one malformed line never aborts the download watch.

use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::ollama::OllamaClient;

/// One line of the NDJSON pull progress stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Bytes downloaded so far for the current layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<u64>,
    /// Total bytes of the current layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// Set when a line could not be parsed, the server reported an error, or
    /// the connection failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressEvent {
    fn from_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Terminal success line from the server.
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

fn parse_line(line: &str) -> ProgressEvent {
    serde_json::from_str(line)
        .unwrap_or_else(|e| ProgressEvent::from_error(format!("malformed progress line: {e}")))
}

type ChunkStream = BoxStream<'static, reqwest::Result<Vec<u8>>>;

enum PullState {
    Connect {
        http: reqwest::Client,
        url: String,
        model: String,
    },
    Streaming {
        chunks: ChunkStream,
        buf: Vec<u8>,
    },
    Done,
}

impl OllamaClient {
    /// Stream pull progress for `model` as one [`ProgressEvent`] per NDJSON
    /// line, lazily, until the server closes the stream.
    ///
    /// A connection that cannot be opened (or a non-2xx status) yields a
    /// single error event and ends the sequence. The sequence is not
    /// resumable; calling again reopens the pull from scratch.
    pub fn pull_model(&self, model: &str) -> impl Stream<Item = ProgressEvent> + Send + 'static {
        let state = PullState::Connect {
            http: self.http().clone(),
            url: format!("{}/api/pull", self.base_url()),
            model: model.to_string(),
        };

        stream::unfold(state, |state| async move {
            let mut state = state;
            loop {
                match state {
                    PullState::Connect { http, url, model } => {
                        let body = serde_json::json!({ "model": model, "stream": true });
                        // Pulls can run for minutes; no request timeout here.
                        match http.post(&url).json(&body).send().await {
                            Ok(response) if response.status().is_success() => {
                                let chunks = response
                                    .bytes_stream()
                                    .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
                                    .boxed();
                                state = PullState::Streaming {
                                    chunks,
                                    buf: Vec::new(),
                                };
                            }
                            Ok(response) => {
                                let status = response.status().as_u16();
                                let text = response.text().await.unwrap_or_default();
                                let event = ProgressEvent::from_error(format!(
                                    "failed to start pull (HTTP {status}): {text}"
                                ));
                                return Some((event, PullState::Done));
                            }
                            Err(e) => {
                                let event = ProgressEvent::from_error(format!(
                                    "failed to open pull stream: {e}"
                                ));
                                return Some((event, PullState::Done));
                            }
                        }
                    }
                    PullState::Streaming { mut chunks, mut buf } => {
                        if let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                            let line_bytes: Vec<u8> = buf.drain(..=pos).collect();
                            let line = String::from_utf8_lossy(&line_bytes);
                            let line = line.trim();
                            if line.is_empty() {
                                state = PullState::Streaming { chunks, buf };
                                continue;
                            }
                            let event = parse_line(line);
                            return Some((event, PullState::Streaming { chunks, buf }));
                        }

                        match chunks.next().await {
                            Some(Ok(chunk)) => {
                                buf.extend_from_slice(&chunk);
                                state = PullState::Streaming { chunks, buf };
                            }
                            Some(Err(e)) => {
                                let event = ProgressEvent::from_error(format!(
                                    "pull stream interrupted: {e}"
                                ));
                                return Some((event, PullState::Done));
                            }
                            None => {
                                let rest = String::from_utf8_lossy(&buf);
                                let rest = rest.trim();
                                if rest.is_empty() {
                                    return None;
                                }
                                let event = parse_line(rest);
                                return Some((event, PullState::Done));
                            }
                        }
                    }
                    PullState::Done => return None,
                }
            }
        })
    }
}
