//! Sink errors
//!
//! A sink error means the batched write call itself failed. Individual
//! entries refused inside a completed call are not errors; they are
//! reported through `PutRecordsResponse`.

use thiserror::Error;

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Batched write call failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The service rejected the call (throttling, auth, missing stream, validation)
    #[error("{message}")]
    Service { code: String, message: String },

    /// The call never completed (connection, timeout)
    #[error("{0}")]
    Transport(String),

    /// The service answered with a payload that could not be decoded
    #[error("{0}")]
    Decode(String),

    /// The sink could not be constructed from its configuration
    #[error("{0}")]
    Configuration(String),
}

impl SinkError {
    /// Service error with code and message
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Message surfaced to callers as the response body
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Service error code, or a fixed label for non-service failures
    pub fn code(&self) -> &str {
        match self {
            Self::Service { code, .. } => code,
            Self::Transport(_) => "TransportError",
            Self::Decode(_) => "DecodeError",
            Self::Configuration(_) => "ConfigurationError",
        }
    }
}

impl From<reqwest::Error> for SinkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::transport(format!("Request timed out: {}", e))
        } else if e.is_decode() {
            Self::decode(e.to_string())
        } else {
            Self::transport(e.to_string())
        }
    }
}
