//! # Relay Response
//!
//! Status, headers and optional body of one invocation. Serializes to the
//! proxy-integration shape (`statusCode`, `headers`, `body`) and converts
//! into an axum response for the HTTP front door.

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Serialize, Serializer};

/// Body returned when the sink accepted the batched write
pub const ACCEPTED_BODY: &str = "ok";

/// Response of a single invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayResponse {
    #[serde(rename = "statusCode", serialize_with = "serialize_status")]
    pub status: StatusCode,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

fn serialize_status<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u16(status.as_u16())
}

impl RelayResponse {
    /// Empty response with the given status
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Response with a body and `Content-Type: application/json`
    pub fn json(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(body)
    }

    /// CORS preflight answer: 204, no body
    pub fn preflight() -> Self {
        Self::new(StatusCode::NO_CONTENT)
            .with_header("Access-Control-Allow-Methods", "POST")
            .with_header("Access-Control-Allow-Origin", "*")
            .with_header("Access-Control-Allow-Headers", "Content-Type")
    }

    /// Batch handed to the sink
    pub fn accepted() -> Self {
        Self::json(StatusCode::CREATED, ACCEPTED_BODY)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Header lookup ignoring case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(match self.body {
            Some(body) => Body::from(body),
            None => Body::empty(),
        });
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        for (name, value) in self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                headers.insert(name, value);
            }
        }

        response
    }
}
