//! Inference client error types.
//!
//! These error types represent failures when talking to the inference server.
//! Defined in `graderbench-core` so the eval engine can classify errors for
//! record keeping without string matching.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when calling the inference server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A transport-level failure (refused connection, timeout, DNS) that
    /// survived the client's retry budget.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status. Never retried.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The server answered 2xx but the body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// The coarse classification recorded on attempt records.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::Http { .. } => ErrorKind::Http,
            ClientError::Parse(_) => ErrorKind::Parse,
        }
    }
}

/// Coarse error classification carried on attempt records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    Http,
    Parse,
}

/// A failed attempt's error, as data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ClientError> for ErrorInfo {
    fn from(err: &ClientError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
