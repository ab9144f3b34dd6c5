//! CLI command implementations
//!
//! Every command loads configuration the same way: optional JSON file,
//! then environment overrides, then validation. The stream name is read
//! once here and injected into the handler.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::RelayConfig;
use crate::handler::{Invocation, RelayHandler, RelayResponse};
use crate::http_server::HttpServer;
use crate::observability::{init_tracing, MetricsRegistry};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_event, write_json};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(config.as_deref(), port),
        Command::Invoke { event, config } => invoke(&event, config.as_deref()),
        Command::CheckConfig { config } => check_config(config.as_deref()),
    }
}

/// Build the handler described by `config`
pub fn build_handler(config: &RelayConfig) -> CliResult<RelayHandler> {
    let sink = config.build_sink()?;
    Ok(RelayHandler::new(config.stream_name.clone(), sink)
        .with_metrics(Arc::new(MetricsRegistry::new())))
}

/// Serve the relay over HTTP until shutdown
pub fn serve(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    let mut config = RelayConfig::load(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
        config.validate()?;
    }

    init_tracing(&config.log_level);
    info!(
        stream = %config.stream_name,
        addr = %config.http.socket_addr(),
        "Starting relay"
    );

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        let handler = build_handler(&config)?;
        HttpServer::new(config.http.clone(), handler)
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Run one proxy-integration event through the relay and print the response
pub fn invoke(event_source: &str, config_path: Option<&Path>) -> CliResult<()> {
    let config = RelayConfig::load(config_path)?;
    init_tracing(&config.log_level);

    let event = read_event(event_source)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))?;

    let response = rt.block_on(async {
        let handler = build_handler(&config)?;
        invoke_event(&handler, &event).await
    })?;

    write_json(&response)
}

/// Decode `event` and hand it to `handler`
pub async fn invoke_event(handler: &RelayHandler, event: &str) -> CliResult<RelayResponse> {
    let invocation = Invocation::from_event_json(event)
        .map_err(|e| CliError::invalid_event(e.to_string()))?;
    Ok(handler.handle(invocation).await)
}

/// Validate configuration and print it with secrets omitted
pub fn check_config(config_path: Option<&Path>) -> CliResult<()> {
    let config = RelayConfig::load(config_path)?;
    write_json(&config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliErrorCode;
    use crate::config::SinkConfig;
    use crate::sink::MemoryStreamSink;
    use axum::http::StatusCode;

    fn memory_handler() -> (RelayHandler, MemoryStreamSink) {
        let sink = MemoryStreamSink::new();
        (RelayHandler::new("nel-stream", Arc::new(sink.clone())), sink)
    }

    #[tokio::test]
    async fn test_invoke_event_post() {
        let (handler, sink) = memory_handler();
        let event = r#"{
            "httpMethod": "POST",
            "queryStringParameters": {
                "asn": "1", "site": "s", "account": "acct-1", "epoch": "0",
                "state": "CA", "city": "SF", "country": "US", "postalcode": "94110",
                "latitude": "37.7", "longitude": "-122.4"
            },
            "body": "[{\"id\":1}]"
        }"#;

        let response = invoke_event(&handler, event).await.unwrap();
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(sink.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_invoke_event_rejects_garbage() {
        let (handler, _sink) = memory_handler();
        let err = invoke_event(&handler, "not an event").await.unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::InvalidEvent);
    }

    #[test]
    fn test_build_handler_uses_stream_name() {
        let config = RelayConfig {
            stream_name: "nel-stream".to_string(),
            sink: SinkConfig::Memory,
            ..Default::default()
        };
        let handler = build_handler(&config).unwrap();
        assert_eq!(handler.stream_name(), "nel-stream");
    }
}
