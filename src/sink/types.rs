//! Put-records request and response types
//!
//! Shapes follow the partitioned stream service's batched write call. The
//! wire names (`StreamName`, `PartitionKey`, `FailedRecordCount`, ...) are
//! fixed by that service.

use serde::{Deserialize, Serialize};

/// One record to append: opaque bytes plus the key that picks its partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    pub data: Vec<u8>,
    pub partition_key: String,
}

impl StreamEntry {
    pub fn new(data: Vec<u8>, partition_key: impl Into<String>) -> Self {
        Self {
            data,
            partition_key: partition_key.into(),
        }
    }
}

/// A batched write against one named stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecordsRequest {
    pub stream_name: String,
    pub records: Vec<StreamEntry>,
}

impl PutRecordsRequest {
    pub fn new(stream_name: impl Into<String>, records: Vec<StreamEntry>) -> Self {
        Self {
            stream_name: stream_name.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Per-entry outcome of a batched write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutRecordsResultEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl PutRecordsResultEntry {
    /// Entry admitted at the given position
    pub fn accepted(shard_id: impl Into<String>, sequence_number: impl Into<String>) -> Self {
        Self {
            sequence_number: Some(sequence_number.into()),
            shard_id: Some(shard_id.into()),
            ..Default::default()
        }
    }

    /// Entry refused by the service
    pub fn rejected(error_code: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_code: Some(error_code.into()),
            error_message: Some(error_message.into()),
            ..Default::default()
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error_code.is_some()
    }
}

/// Response of a completed batched write
///
/// `failed_record_count` is `None` when the service omitted the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutRecordsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_record_count: Option<u32>,
    #[serde(default)]
    pub records: Vec<PutRecordsResultEntry>,
}

impl PutRecordsResponse {
    /// Failed entries as reported by the count field, zero when absent
    pub fn failed(&self) -> u32 {
        self.failed_record_count.unwrap_or(0)
    }
}
