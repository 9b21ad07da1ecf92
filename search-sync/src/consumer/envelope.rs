//! Decoding of Debezium change envelopes.
//!
//! Two layouts are accepted: the schema-carrying envelope
//! `{"schema": {...}, "payload": {...}}` and the schemaless form where the
//! payload fields sit at the top level. The schema descriptor is never read.

use serde::Deserialize;
use serde_json::Value;

use crate::consumer::messages::{ChangeEvent, Operation, RowImage};
use crate::errors::IngestError;

#[derive(Debug, Deserialize)]
struct RawPayload {
    #[serde(default)]
    before: Option<RowImage>,
    #[serde(default)]
    after: Option<RowImage>,
    op: Option<String>,
    source: Option<RawSource>,
    ts_ms: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    table: Option<String>,
    ts_ms: Option<i64>,
}

/// Decode one message value into a change event.
///
/// Returns `Ok(None)` for a `null` value or a `null` payload, which the
/// connector emits as tombstones.
pub fn decode(bytes: &[u8]) -> Result<Option<ChangeEvent>, IngestError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| IngestError::decode(format!("Invalid JSON envelope: {}", e)))?;

    let payload = match value {
        Value::Null => return Ok(None),
        Value::Object(mut envelope) => {
            if !envelope.contains_key("op") && envelope.contains_key("payload") {
                envelope.remove("payload").unwrap_or(Value::Null)
            } else {
                Value::Object(envelope)
            }
        }
        other => {
            return Err(IngestError::decode(format!(
                "Envelope must be a JSON object, got {}",
                json_type(&other)
            )))
        }
    };

    if payload.is_null() {
        return Ok(None);
    }

    let raw: RawPayload = serde_json::from_value(payload)
        .map_err(|e| IngestError::decode(format!("Malformed payload: {}", e)))?;

    let op = raw
        .op
        .ok_or_else(|| IngestError::decode("Payload is missing 'op'"))?;
    let operation = Operation::from_code(&op)
        .ok_or_else(|| IngestError::decode(format!("Unknown operation code '{}'", op)))?;

    let source = raw
        .source
        .ok_or_else(|| IngestError::decode("Payload is missing 'source'"))?;
    let source_table = source
        .table
        .ok_or_else(|| IngestError::decode("Payload source is missing 'table'"))?;

    Ok(Some(ChangeEvent {
        operation,
        before: raw.before,
        after: raw.after,
        source_table,
        timestamp_millis: raw.ts_ms.or(source.ts_ms).unwrap_or(0),
    }))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
