//! Relay handler
//!
//! Dispatches an invocation by method:
//!
//! - `OPTIONS`: CORS preflight, never touches the sink
//! - `POST`: validate parameters, parse and enrich the batch, one batched
//!   write to the configured stream
//! - anything else: 405
//!
//! A completed write is reported as 201 even when the sink refused some or
//! all entries. Callers cannot tell a full ingest from a partial one; the
//! refused count only shows up in logs and metrics.

use std::sync::Arc;

use axum::http::Method;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::errors::{RelayError, RelayResult};
use super::invocation::Invocation;
use super::response::RelayResponse;
use crate::enrichment::{build_entries, EnrichmentError, Envelope};
use crate::observability::MetricsRegistry;
use crate::sink::{PutRecordsRequest, StreamSink};

/// Stateless request handler bound to one stream
///
/// Cheap to clone; clones share the sink and the metrics registry.
#[derive(Clone)]
pub struct RelayHandler {
    stream_name: String,
    sink: Arc<dyn StreamSink>,
    metrics: Arc<MetricsRegistry>,
}

impl RelayHandler {
    /// Create a handler writing to `stream_name` through `sink`
    pub fn new(stream_name: impl Into<String>, sink: Arc<dyn StreamSink>) -> Self {
        Self {
            stream_name: stream_name.into(),
            sink,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Share an existing metrics registry
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Handle one invocation; every outcome becomes a response
    #[instrument(
        name = "relay_invocation",
        skip(self, invocation),
        fields(method = %invocation.method, request_id = %Uuid::new_v4())
    )]
    pub async fn handle(&self, invocation: Invocation) -> RelayResponse {
        match self.dispatch(invocation).await {
            Ok(response) => response,
            Err(err) => {
                match &err {
                    RelayError::Sink(sink_err) => {
                        error!(code = sink_err.code(), error = %sink_err, "Put-records call failed");
                    }
                    other => {
                        self.metrics.increment_rejected();
                        warn!(status = other.status_code().as_u16(), error = %other, "Invocation rejected");
                    }
                }
                err.to_relay_response()
            }
        }
    }

    async fn dispatch(&self, invocation: Invocation) -> RelayResult<RelayResponse> {
        match invocation.method {
            Method::OPTIONS => {
                self.metrics.increment_preflights();
                Ok(RelayResponse::preflight())
            }
            Method::POST => self.forward(invocation).await,
            ref other => Err(RelayError::MethodNotAllowed(other.clone())),
        }
    }

    async fn forward(&self, invocation: Invocation) -> RelayResult<RelayResponse> {
        self.metrics.increment_requests();

        let params = invocation.parameters()?;
        let envelope = Envelope::from_query(&params)?;

        let body = invocation
            .decoded_body()?
            .ok_or_else(|| EnrichmentError::malformed("Missing request body"))?;
        let entries = build_entries(&body, &envelope)?;
        let entry_count = entries.len();

        debug!(
            account = %envelope.account,
            site = %envelope.site,
            entries = entry_count,
            "Batch enriched"
        );

        let request = PutRecordsRequest::new(self.stream_name.as_str(), entries);
        self.metrics.record_sink_call(entry_count as u64);

        let response = self.sink.put_records(request).await.map_err(|e| {
            self.metrics.increment_sink_errors();
            RelayError::from(e)
        })?;

        match response.failed_record_count {
            Some(0) => {
                info!(stream = %self.stream_name, entries = entry_count, "Batch forwarded");
            }
            Some(failed) => {
                self.metrics.record_partial_failure(u64::from(failed));
                warn!(
                    stream = %self.stream_name,
                    entries = entry_count,
                    failed,
                    "Batch forwarded with refused entries"
                );
            }
            None => {
                info!(
                    stream = %self.stream_name,
                    entries = entry_count,
                    "Batch forwarded, no failed count reported"
                );
            }
        }

        Ok(RelayResponse::accepted())
    }
}

impl std::fmt::Debug for RelayHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayHandler")
            .field("stream_name", &self.stream_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::QueryParams;
    use crate::sink::{MemoryStreamSink, SinkError};
    use axum::http::StatusCode;
    use serde_json::Value;

    fn params() -> QueryParams {
        [
            ("account", "acct-1"),
            ("asn", "1"),
            ("site", "s"),
            ("epoch", "0"),
            ("state", "CA"),
            ("city", "SF"),
            ("country", "US"),
            ("postalcode", "94110"),
            ("latitude", "37.7"),
            ("longitude", "-122.4"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn handler() -> (RelayHandler, MemoryStreamSink) {
        let sink = MemoryStreamSink::new();
        (RelayHandler::new("nel-stream", Arc::new(sink.clone())), sink)
    }

    #[tokio::test]
    async fn test_post_forwards_enriched_batch() {
        let (handler, sink) = handler();

        let response = handler
            .handle(Invocation::post(params(), r#"[{"id":1},{"id":2}]"#))
            .await;

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body.as_deref(), Some("ok"));

        let requests = sink.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].stream_name, "nel-stream");
        assert_eq!(requests[0].records.len(), 2);

        for (index, entry) in requests[0].records.iter().enumerate() {
            assert_eq!(entry.partition_key, "acct-1");
            let payload: Value = serde_json::from_slice(&entry.data).unwrap();
            assert_eq!(payload["id"], index as u64 + 1);
            assert_eq!(payload["enrichment"]["address"]["city"], "SF");
        }
    }

    #[tokio::test]
    async fn test_options_never_calls_sink() {
        let (handler, sink) = handler();

        let invocation = Invocation::options()
            .with_query(QueryParams::new())
            .with_body("not json");
        let response = handler.handle(invocation).await;

        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert_eq!(response.header("Access-Control-Allow-Methods"), Some("POST"));
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(response.header("Access-Control-Allow-Headers"), Some("Content-Type"));
        assert_eq!(sink.call_count(), 0);
    }

    #[tokio::test]
    async fn test_sink_error_yields_500_with_message() {
        let (handler, sink) = handler();
        sink.fail_next(SinkError::service(
            "ProvisionedThroughputExceededException",
            "Rate exceeded for stream nel-stream",
        ));

        let response = handler.handle(Invocation::post(params(), r#"[{"id":1}]"#)).await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body.as_deref(), Some("Rate exceeded for stream nel-stream"));
        assert_eq!(handler.metrics().snapshot().sink_errors, 1);
    }

    #[tokio::test]
    async fn test_partial_failure_still_201() {
        let (handler, sink) = handler();
        sink.fail_entries_next(2);

        let response = handler
            .handle(Invocation::post(params(), r#"[{"id":1},{"id":2}]"#))
            .await;

        assert_eq!(response.status, StatusCode::CREATED);
        let snapshot = handler.metrics().snapshot();
        assert_eq!(snapshot.partial_failures, 1);
        assert_eq!(snapshot.records_failed, 2);
    }

    #[tokio::test]
    async fn test_missing_count_still_201() {
        let (handler, sink) = handler();
        sink.omit_count_next();

        let response = handler.handle(Invocation::post(params(), r#"[{"id":1}]"#)).await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_missing_parameters_rejected_before_sink() {
        let (handler, sink) = handler();
        let mut incomplete = params();
        incomplete.remove("account");
        incomplete.remove("latitude");

        let response = handler.handle(Invocation::post(incomplete, "[]")).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(response.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["missing"], serde_json::json!(["account", "latitude"]));
        assert_eq!(sink.call_count(), 0);
        assert_eq!(handler.metrics().snapshot().requests_rejected, 1);
    }

    #[tokio::test]
    async fn test_no_query_string_reports_every_parameter() {
        let (handler, _sink) = handler();
        let response = handler
            .handle(Invocation::new(Method::POST).with_body("[]"))
            .await;

        let body: Value = serde_json::from_str(response.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["missing"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_malformed_body_rejected() {
        let (handler, sink) = handler();

        for body in ["{", r#"{"id":1}"#, "[1,2]"] {
            let response = handler.handle(Invocation::post(params(), body)).await;
            assert_eq!(response.status, StatusCode::BAD_REQUEST, "body {}", body);
        }

        let response = handler.handle(Invocation::new(Method::POST).with_query(params())).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(sink.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_input_only_matters_for_post() {
        let (handler, sink) = handler();

        let options = Invocation::options()
            .with_raw_body(vec![0xff, 0xfe])
            .with_query_error("invalid escape");
        assert_eq!(handler.handle(options).await.status, StatusCode::NO_CONTENT);

        let get = Invocation::new(Method::GET).with_raw_body(vec![0xff]);
        assert_eq!(handler.handle(get).await.status, StatusCode::METHOD_NOT_ALLOWED);

        let post = Invocation::new(Method::POST)
            .with_query(params())
            .with_raw_body(vec![0xff, 0xfe]);
        let response = handler.handle(post).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(response.body.as_deref().unwrap()).unwrap();
        assert!(body["error"].as_str().unwrap().contains("not UTF-8"));

        assert_eq!(sink.call_count(), 0);
        assert_eq!(handler.metrics().snapshot().requests_rejected, 2);
    }

    #[tokio::test]
    async fn test_undecodable_query_is_not_reported_as_missing() {
        let (handler, sink) = handler();

        let post = Invocation::new(Method::POST)
            .with_body("[]")
            .with_query_error("invalid escape");
        let response = handler.handle(post).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(response.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["error"], "Malformed query string: invalid escape");
        assert!(body.get("missing").is_none());
        assert_eq!(sink.call_count(), 0);
    }

    #[tokio::test]
    async fn test_other_methods_are_405() {
        let (handler, sink) = handler();

        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            let response = handler
                .handle(Invocation::new(method).with_query(params()).with_body("[]"))
                .await;
            assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(response.header("Allow"), Some("OPTIONS, POST"));
        }
        assert_eq!(sink.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_still_one_call() {
        let (handler, sink) = handler();

        let response = handler.handle(Invocation::post(params(), "[]")).await;
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(sink.call_count(), 1);
        assert_eq!(sink.entry_count(), 0);
    }
}
