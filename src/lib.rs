//! nel-relay - request-triggered enrichment relay
//!
//! Accepts batches of browser-reported telemetry records, tags each record
//! with the account and location metadata carried in the query string, and
//! forwards the batch to a partitioned stream in a single call.

pub mod cli;
pub mod config;
pub mod enrichment;
pub mod handler;
pub mod http_server;
pub mod observability;
pub mod sink;
