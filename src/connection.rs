//! Connection assembly: a page of records, each tagged with an opaque
//! position token, plus continuation info.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

use crate::ast::{Cursor, Record, Value};
use crate::error::{SiftError, SiftResult};

/// Turns a record into an opaque position token.
pub trait PositionEncoder {
    fn encode(&self, record: &Record) -> SiftResult<String>;
}

/// Encodes the whole record as base64 JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordEncoder;

impl PositionEncoder for RecordEncoder {
    fn encode(&self, record: &Record) -> SiftResult<String> {
        let json = serde_json::to_vec(record)?;
        Ok(BASE64.encode(json))
    }
}

/// Encodes only the given fields (the ordered fields plus the id), which is
/// all a cursor needs.
#[derive(Debug, Clone, Default)]
pub struct KeysetEncoder {
    fields: Vec<String>,
}

impl KeysetEncoder {
    pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl PositionEncoder for KeysetEncoder {
    fn encode(&self, record: &Record) -> SiftResult<String> {
        let keyset: Record = self
            .fields
            .iter()
            .filter_map(|f| record.get(f).map(|v| (f.clone(), v.clone())))
            .collect();
        RecordEncoder.encode(&keyset)
    }
}

/// Decode a position token produced by one of the encoders back into a cursor.
pub fn decode_position(token: &str) -> SiftResult<Cursor> {
    let bytes = BASE64
        .decode(token.trim())
        .map_err(|e| SiftError::InvalidPosition(e.to_string()))?;
    let json: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|e| SiftError::InvalidPosition(e.to_string()))?;
    match json {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect()),
        other => Err(SiftError::InvalidPosition(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// One item of a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge<T> {
    pub value: T,
    pub position: String,
}

/// A page of items with continuation info.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub items: Vec<Edge<T>>,
    pub has_more: bool,
    pub end_position: Option<String>,
}

impl<T> Connection<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Wrap records as a connection. `end_position` is the last item's position.
pub fn assemble<E: PositionEncoder + ?Sized>(
    records: Vec<Record>,
    encoder: &E,
    has_more: bool,
) -> SiftResult<Connection<Record>> {
    let items = records
        .into_iter()
        .map(|value| {
            let position = encoder.encode(&value)?;
            Ok(Edge { value, position })
        })
        .collect::<SiftResult<Vec<_>>>()?;
    let end_position = items.last().map(|e| e.position.clone());
    tracing::debug!(items = items.len(), has_more, "assembled connection");
    Ok(Connection {
        items,
        has_more,
        end_position,
    })
}
