//! # Relay Errors
//!
//! Every failure of an invocation resolves here into a status code and body.

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use super::response::RelayResponse;
use crate::enrichment::EnrichmentError;
use crate::sink::SinkError;

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Relay errors
#[derive(Debug, Clone, Error)]
pub enum RelayError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Missing or undecodable query parameters, or malformed body
    #[error("{0}")]
    Enrichment(#[from] EnrichmentError),

    /// Method other than OPTIONS or POST
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(Method),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// The batched write call failed
    #[error("{0}")]
    Sink(#[from] SinkError),
}

impl RelayError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Enrichment(_) => StatusCode::BAD_REQUEST,
            RelayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::Sink(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert into the response returned to the caller.
    ///
    /// Sink failures carry the sink's message verbatim as the body; client
    /// errors carry a JSON [`ErrorResponse`].
    pub fn to_relay_response(&self) -> RelayResponse {
        let status = self.status_code();
        match self {
            RelayError::Sink(err) => RelayResponse::json(status, err.message()),
            RelayError::MethodNotAllowed(_) => {
                RelayResponse::json(status, ErrorResponse::from(self).to_body())
                    .with_header("Allow", "OPTIONS, POST")
            }
            RelayError::Enrichment(_) => {
                RelayResponse::json(status, ErrorResponse::from(self).to_body())
            }
        }
    }
}

/// Error response body for client errors
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

impl ErrorResponse {
    fn to_body(&self) -> String {
        // Only strings and integers: serialization cannot fail
        serde_json::to_string(self).unwrap_or_else(|_| self.error.clone())
    }
}

impl From<&RelayError> for ErrorResponse {
    fn from(err: &RelayError) -> Self {
        let missing = match err {
            RelayError::Enrichment(inner) => inner.missing().to_vec(),
            _ => Vec::new(),
        };
        Self {
            error: err.to_string(),
            code: err.status_code().as_u16(),
            missing,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        self.to_relay_response().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RelayError::from(EnrichmentError::malformed("x")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::MethodNotAllowed(Method::GET).status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            RelayError::from(SinkError::transport("down")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_parameters_body_lists_fields() {
        let err = RelayError::from(EnrichmentError::MissingParameters(vec![
            "asn".to_string(),
            "epoch".to_string(),
        ]));
        let response = err.to_relay_response();

        let body: serde_json::Value =
            serde_json::from_str(response.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["code"], 400);
        assert_eq!(body["missing"], serde_json::json!(["asn", "epoch"]));
        assert_eq!(body["error"], "Missing required parameters: asn, epoch");
    }

    #[test]
    fn test_sink_error_body_is_raw_message() {
        let err = RelayError::from(SinkError::service("ResourceNotFoundException", "Stream gone"));
        let response = err.to_relay_response();

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body.as_deref(), Some("Stream gone"));
        assert_eq!(
            response.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let response = RelayError::MethodNotAllowed(Method::PUT).to_relay_response();
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers.get("Allow").map(String::as_str),
            Some("OPTIONS, POST")
        );
    }
}
