//! GET replies.

use crate::error::ProtocolError;
use crate::value::{decode_bool, decode_number, decode_text, Value, ValueKind};
use crate::ABSENT_SENTINEL;
use bytes::Bytes;

/// Raw GET reply, decoded on demand.
///
/// Values carry no type tag, so the caller names the type it expects. A reply
/// equal to [`ABSENT_SENTINEL`] means the key does not exist. A stored
/// boolean `false` encodes to the same byte and cannot be told apart from a
/// missing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetResponse {
    raw: Bytes,
}

impl GetResponse {
    pub fn new(raw: Bytes) -> Self {
        Self { raw }
    }

    /// Returns whether the server reported the key as absent.
    pub fn is_absent(&self) -> bool {
        self.raw.as_ref() == ABSENT_SENTINEL
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn into_bytes(self) -> Bytes {
        self.raw
    }

    /// Decodes the payload as the given kind.
    pub fn decode(&self, kind: ValueKind) -> Result<Value, ProtocolError> {
        Value::from_bytes(kind, &self.raw)
    }

    pub fn as_text(&self) -> Result<String, ProtocolError> {
        decode_text(&self.raw)
    }

    pub fn as_number(&self) -> Result<f64, ProtocolError> {
        decode_number(&self.raw)
    }

    pub fn as_bool(&self) -> Result<bool, ProtocolError> {
        decode_bool(&self.raw)
    }
}
