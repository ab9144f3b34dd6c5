//! # Stream Sink
//!
//! The partitioned, append-only stream that enriched batches are written to.
//! The service is opaque: one batched write per call, a per-call failed
//! count, and per-entry outcomes.
//!
//! - `MemoryStreamSink` records calls in process (tests, dry runs)
//! - `KinesisStreamSink` talks to a Kinesis-compatible endpoint

mod errors;
mod kinesis;
mod memory;
pub mod sigv4;
mod types;

pub use errors::{SinkError, SinkResult};
pub use kinesis::{KinesisSinkConfig, KinesisStreamSink};
pub use memory::MemoryStreamSink;
pub use sigv4::Credentials;
pub use types::{PutRecordsRequest, PutRecordsResponse, PutRecordsResultEntry, StreamEntry};

use async_trait::async_trait;

/// A partitioned stream accepting batched appends
#[async_trait]
pub trait StreamSink: Send + Sync {
    /// Append all entries of `request` in one call.
    ///
    /// `Err` means the call itself failed. Entries refused by an otherwise
    /// completed call are reported in the response, not as an error.
    async fn put_records(&self, request: PutRecordsRequest) -> SinkResult<PutRecordsResponse>;
}
