//! Batch parsing and record enrichment
//!
//! A batch is the request body decoded as a JSON array of objects. Each
//! object gains an `enrichment` key and becomes one stream entry.

use serde_json::{Map, Value};

use super::envelope::Envelope;
use super::errors::{EnrichmentError, EnrichmentResult};
use crate::sink::StreamEntry;

/// A single telemetry record
pub type Record = Map<String, Value>;

/// Key under which the envelope is merged into each record
pub const ENRICHMENT_KEY: &str = "enrichment";

/// Parse a request body into a batch of records.
///
/// Empty arrays are valid. Any element that is not an object rejects the
/// whole batch.
pub fn parse_batch(body: &str) -> EnrichmentResult<Vec<Record>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| EnrichmentError::malformed(format!("Invalid JSON: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(EnrichmentError::malformed(format!(
                "expected a JSON array of objects, found {}",
                json_kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(EnrichmentError::malformed(format!(
                "element {} is {}, expected an object",
                index,
                json_kind(&other)
            ))),
        })
        .collect()
}

/// Merge the envelope into a record, replacing any existing `enrichment` key
pub fn enrich(mut record: Record, envelope: &Value) -> Record {
    record.insert(ENRICHMENT_KEY.to_string(), envelope.clone());
    record
}

/// Turn a request body into stream entries, one per record, in body order.
///
/// Every entry is keyed by the envelope's account.
pub fn build_entries(body: &str, envelope: &Envelope) -> EnrichmentResult<Vec<StreamEntry>> {
    let records = parse_batch(body)?;

    // Serialized once; every record carries an identical copy.
    let envelope_value = serde_json::to_value(envelope)
        .map_err(|e| EnrichmentError::malformed(format!("Unencodable envelope: {}", e)))?;

    records
        .into_iter()
        .map(|record| {
            let enriched = enrich(record, &envelope_value);
            let data = serde_json::to_vec(&enriched)
                .map_err(|e| EnrichmentError::malformed(format!("Unencodable record: {}", e)))?;
            Ok(StreamEntry::new(data, envelope.partition_key()))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
