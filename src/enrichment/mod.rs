//! # Enrichment
//!
//! Builds the envelope from query parameters and merges it into every
//! record of a batch, producing stream entries ready for the sink.
//!
//! # Invariants
//!
//! - One envelope per invocation, identical across all records
//! - Entry `i` corresponds to body element `i`
//! - All entries of a batch share the `account` partition key

mod batch;
mod envelope;
mod errors;

pub use batch::{build_entries, enrich, parse_batch, Record, ENRICHMENT_KEY};
pub use envelope::{Address, Envelope, QueryParams, REQUIRED_PARAMETERS};
pub use errors::{EnrichmentError, EnrichmentResult};
