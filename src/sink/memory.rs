//! In-memory stream sink
//!
//! Keeps every batched write it receives and answers like the real service.
//! Outcomes of upcoming calls can be scripted, which is how the handler's
//! failure contract is exercised without a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::errors::{SinkError, SinkResult};
use super::types::{PutRecordsRequest, PutRecordsResponse, PutRecordsResultEntry};
use super::StreamSink;

const SHARD_ID: &str = "shardId-000000000000";

/// Scripted outcome for one upcoming call
#[derive(Debug, Clone)]
enum Outcome {
    /// The call itself fails
    Fail(SinkError),
    /// The call completes with the last `n` entries refused
    PartialFailure(u32),
    /// The call completes but the response carries no failed count
    OmitCount,
}

#[derive(Debug, Default)]
struct State {
    requests: Vec<PutRecordsRequest>,
    scripted: VecDeque<Outcome>,
    next_sequence: u64,
}

/// Recording sink; clones share the same state
#[derive(Debug, Clone, Default)]
pub struct MemoryStreamSink {
    state: Arc<Mutex<State>>,
}

impl MemoryStreamSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&self, error: SinkError) {
        self.lock().scripted.push_back(Outcome::Fail(error));
    }

    /// Make the next call refuse its last `failed` entries
    pub fn fail_entries_next(&self, failed: u32) {
        self.lock().scripted.push_back(Outcome::PartialFailure(failed));
    }

    /// Make the next call answer without a failed count
    pub fn omit_count_next(&self) {
        self.lock().scripted.push_back(Outcome::OmitCount);
    }

    /// All requests received so far, in arrival order
    pub fn requests(&self) -> Vec<PutRecordsRequest> {
        self.lock().requests.clone()
    }

    /// Number of calls received
    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Total entries received across all calls
    pub fn entry_count(&self) -> usize {
        self.lock().requests.iter().map(|r| r.records.len()).sum()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl StreamSink for MemoryStreamSink {
    async fn put_records(&self, request: PutRecordsRequest) -> SinkResult<PutRecordsResponse> {
        let mut state = self.lock();
        let outcome = state.scripted.pop_front();
        let total = request.len();
        state.requests.push(request);

        let (refused, omit_count) = match outcome {
            Some(Outcome::Fail(error)) => return Err(error),
            Some(Outcome::PartialFailure(n)) => ((n as usize).min(total), false),
            Some(Outcome::OmitCount) => (0, true),
            None => (0, false),
        };

        let mut records = Vec::with_capacity(total);
        for index in 0..total {
            if index >= total - refused {
                records.push(PutRecordsResultEntry::rejected(
                    "ProvisionedThroughputExceededException",
                    "Rate exceeded for shard shardId-000000000000",
                ));
            } else {
                state.next_sequence += 1;
                records.push(PutRecordsResultEntry::accepted(
                    SHARD_ID,
                    state.next_sequence.to_string(),
                ));
            }
        }

        let failed_record_count = if omit_count {
            None
        } else {
            Some(refused as u32)
        };

        Ok(PutRecordsResponse {
            failed_record_count,
            records,
        })
    }
}
