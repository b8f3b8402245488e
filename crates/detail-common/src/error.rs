/// Error type for every call made against the detail-library backend.
///
/// Failures are classified once, at the HTTP boundary, so callers can pick a
/// user-facing message from the `kind` without inspecting raw status codes.
use std::fmt;

use schemars::JsonSchema;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Backend unreachable or the transport failed. Status is always 0.
    Network,
    /// 4xx response.
    Client,
    /// 5xx response.
    Server,
    /// 2xx response whose body could not be decoded, or a local setup failure.
    Unknown,
}

impl ErrorKind {
    /// Classify a non-2xx HTTP status. Status 0 means no response was received.
    pub fn from_status(status: u16) -> Self {
        match status {
            0 => ErrorKind::Network,
            500.. => ErrorKind::Server,
            _ => ErrorKind::Client,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Client => "client",
            ErrorKind::Server => "server",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Short advice appended to user-facing failure messages.
    pub fn hint(self) -> &'static str {
        match self {
            ErrorKind::Network => "Make sure the backend is running and check your connection.",
            ErrorKind::Client => "The backend rejected the request.",
            ErrorKind::Server => "The backend reported an error. Try again later.",
            ErrorKind::Unknown => "The backend sent an unexpected response.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} error (status {status}): {message}")]
pub struct ApiError {
    pub message: String,
    pub status: u16,
    pub kind: ErrorKind,
}

impl ApiError {
    pub fn new(kind: ErrorKind, status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status,
            kind,
        }
    }

    /// Transport-level failure: nothing usable came back from the backend.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, 0, message)
    }

    /// Non-2xx response, classified by status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::from_status(status), status, message)
    }

    /// 2xx response with a body we could not make sense of.
    pub fn decode(status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, status, message)
    }

    /// Message suitable for display: `context` followed by the kind's hint.
    pub fn display_message(&self, context: &str) -> String {
        format!("{context} {}", self.kind.hint())
    }
}
