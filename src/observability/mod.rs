//! Observability for the relay
//!
//! - Structured logging via `tracing`, rendered as JSON lines
//! - Monotonic counters exposed at `/metrics`
//!
//! Observability is read-only: nothing here influences a response.

mod metrics;
mod telemetry;

pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use telemetry::init_tracing;
