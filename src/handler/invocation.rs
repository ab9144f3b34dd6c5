//! Invocation input
//!
//! Method, query-string parameters and raw body of one request. Built by
//! the HTTP front door, or decoded from a proxy-integration event
//! (`httpMethod`, `queryStringParameters`, `body`, `isBase64Encoded`).

use axum::http::Method;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer};

use crate::enrichment::{EnrichmentError, EnrichmentResult, QueryParams};

/// One request handed to the relay
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    #[serde(rename = "httpMethod", deserialize_with = "deserialize_method")]
    pub method: Method,
    /// `None` when the request carried no query string at all
    #[serde(rename = "queryStringParameters", default)]
    pub query_parameters: Option<QueryParams>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
    /// Set when the raw query string could not be decoded
    #[serde(skip)]
    pub query_error: Option<String>,
}

fn deserialize_method<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Method, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes()).map_err(serde::de::Error::custom)
}

impl Invocation {
    /// Invocation with no query string and no body
    pub fn new(method: Method) -> Self {
        Self {
            method,
            query_parameters: None,
            body: None,
            is_base64_encoded: false,
            query_error: None,
        }
    }

    /// POST with the given parameters and body
    pub fn post(params: QueryParams, body: impl Into<String>) -> Self {
        Self::new(Method::POST).with_query(params).with_body(body)
    }

    /// CORS preflight
    pub fn options() -> Self {
        Self::new(Method::OPTIONS)
    }

    pub fn with_query(mut self, params: QueryParams) -> Self {
        self.query_parameters = Some(params);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Carry raw body bytes; text stays as is, anything else is base64-encoded
    pub fn with_raw_body(mut self, bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            return self;
        }
        match String::from_utf8(bytes) {
            Ok(text) => self.body = Some(text),
            Err(e) => {
                self.body = Some(STANDARD.encode(e.into_bytes()));
                self.is_base64_encoded = true;
            }
        }
        self
    }

    pub fn with_query_error(mut self, error: impl Into<String>) -> Self {
        self.query_error = Some(error.into());
        self
    }

    /// Query parameters, empty when the request had none.
    ///
    /// Fails when the query string was present but undecodable.
    pub fn parameters(&self) -> EnrichmentResult<QueryParams> {
        if let Some(error) = &self.query_error {
            return Err(EnrichmentError::MalformedQuery(error.clone()));
        }
        Ok(self.query_parameters.clone().unwrap_or_default())
    }

    /// Decode a proxy-integration event
    pub fn from_event_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Body as text, base64-decoded when the event says so
    pub fn decoded_body(&self) -> EnrichmentResult<Option<String>> {
        let Some(body) = &self.body else {
            return Ok(None);
        };
        if !self.is_base64_encoded {
            return Ok(Some(body.clone()));
        }

        let bytes = STANDARD
            .decode(body)
            .map_err(|e| EnrichmentError::malformed(format!("Invalid base64 body: {}", e)))?;
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| EnrichmentError::malformed(format!("Body is not UTF-8: {}", e)))
    }
}
