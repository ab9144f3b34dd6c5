//! Kinesis stream sink
//!
//! Speaks the service's JSON 1.1 protocol directly over HTTPS. Requests are
//! SigV4-signed when credentials are configured and sent unsigned otherwise,
//! which is what local emulators expect.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::errors::{SinkError, SinkResult};
use super::sigv4::{self, Credentials, SignableRequest};
use super::types::{PutRecordsRequest, PutRecordsResponse};
use super::StreamSink;

const TARGET: &str = "Kinesis_20131202.PutRecords";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const SERVICE: &str = "kinesis";

/// Settings for [`KinesisStreamSink`]
#[derive(Debug, Clone)]
pub struct KinesisSinkConfig {
    pub region: String,
    /// Overrides `https://kinesis.{region}.amazonaws.com`
    pub endpoint: Option<String>,
    pub timeout: Duration,
    pub credentials: Option<Credentials>,
}

impl KinesisSinkConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint: None,
            timeout: Duration::from_secs(10),
            credentials: None,
        }
    }

    /// Endpoint requests are sent to
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://kinesis.{}.amazonaws.com", self.region),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct WireEntry<'a> {
    data: String,
    partition_key: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct WireRequest<'a> {
    stream_name: &'a str,
    records: Vec<WireEntry<'a>>,
}

#[derive(Deserialize)]
struct WireError {
    #[serde(rename = "__type", default)]
    kind: Option<String>,
    #[serde(alias = "Message", default)]
    message: Option<String>,
}

/// Sink that appends batches to a Kinesis data stream
#[derive(Debug, Clone)]
pub struct KinesisStreamSink {
    client: reqwest::Client,
    config: KinesisSinkConfig,
    url: Url,
}

impl KinesisStreamSink {
    /// Build a sink; fails on an unparseable endpoint or client setup error
    pub fn new(config: KinesisSinkConfig) -> SinkResult<Self> {
        let url = Url::parse(&config.endpoint_url()).map_err(|e| {
            SinkError::configuration(format!(
                "Invalid endpoint '{}': {}",
                config.endpoint_url(),
                e
            ))
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("nel-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SinkError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            url,
        })
    }

    fn encode(request: &PutRecordsRequest) -> SinkResult<Vec<u8>> {
        let wire = WireRequest {
            stream_name: &request.stream_name,
            records: request
                .records
                .iter()
                .map(|entry| WireEntry {
                    data: STANDARD.encode(&entry.data),
                    partition_key: &entry.partition_key,
                })
                .collect(),
        };
        serde_json::to_vec(&wire)
            .map_err(|e| SinkError::configuration(format!("Unencodable request: {}", e)))
    }

    fn host_header(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }
}

#[async_trait]
impl StreamSink for KinesisStreamSink {
    async fn put_records(&self, request: PutRecordsRequest) -> SinkResult<PutRecordsResponse> {
        let payload = Self::encode(&request)?;

        let mut http_request = self
            .client
            .post(self.url.clone())
            .header("content-type", CONTENT_TYPE)
            .header("x-amz-target", TARGET);

        if let Some(credentials) = &self.config.credentials {
            let signable = SignableRequest {
                method: "POST",
                path: self.url.path(),
                headers: vec![
                    ("content-type".to_string(), CONTENT_TYPE.to_string()),
                    ("host".to_string(), self.host_header()),
                    ("x-amz-target".to_string(), TARGET.to_string()),
                ],
                payload: &payload,
            };
            let signed = sigv4::sign(&signable, credentials, &self.config.region, SERVICE, Utc::now());
            http_request = http_request
                .header("authorization", signed.authorization)
                .header("x-amz-date", signed.amz_date);
            if let Some(token) = signed.security_token {
                http_request = http_request.header("x-amz-security-token", token);
            }
        }

        debug!(
            stream = %request.stream_name,
            entries = request.len(),
            bytes = payload.len(),
            "Sending put-records call"
        );

        let response = http_request.body(payload).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return serde_json::from_slice(&body)
                .map_err(|e| SinkError::decode(format!("Undecodable put-records response: {}", e)));
        }

        let error = match serde_json::from_slice::<WireError>(&body) {
            Ok(wire) => {
                let code = wire
                    .kind
                    .as_deref()
                    .map(|kind| kind.rsplit('#').next().unwrap_or(kind).to_string())
                    .unwrap_or_else(|| status.to_string());
                let message = wire.message.unwrap_or_else(|| code.clone());
                SinkError::service(code, message)
            }
            Err(_) => SinkError::service(
                status.to_string(),
                String::from_utf8_lossy(&body).into_owned(),
            ),
        };

        warn!(status = status.as_u16(), code = error.code(), "Put-records call rejected");
        Err(error)
    }
}
