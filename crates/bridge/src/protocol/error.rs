use http::StatusCode;
use thiserror::Error;

/// Raised when a live attribute source is written to while being merged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("attributes modified while merging, generation moved from {expected} to {observed}")]
pub struct ConcurrentModification {
    pub expected: u64,
    pub observed: u64,
}

impl ConcurrentModification {
    pub fn new(expected: u64, observed: u64) -> Self {
        Self { expected, observed }
    }
}

/// A fault reported by the transport, together with the response it produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProtocolFault {
    message: String,
    status: StatusCode,
    status_message: String,
}

impl ProtocolFault {
    pub fn new<M: ToString, S: ToString>(message: M, status: StatusCode, status_message: S) -> Self {
        Self { message: message.to_string(), status, status_message: status_message.to_string() }
    }

    /// Builds a fault whose status message is the canonical reason phrase.
    pub fn with_status<M: ToString>(message: M, status: StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or("");
        Self::new(message, status, reason)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }
}

#[derive(Error, Debug)]
pub enum RequestBuildError {
    #[error("invalid request uri {uri:?}: {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: http::uri::InvalidUri,
    },

    #[error("invalid content type header: {source}")]
    InvalidContentType {
        #[from]
        source: http::header::InvalidHeaderValue,
    },
}

impl RequestBuildError {
    pub fn invalid_uri<S: ToString>(uri: S, source: http::uri::InvalidUri) -> Self {
        Self::InvalidUri { uri: uri.to_string(), source }
    }
}
