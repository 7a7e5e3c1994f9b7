//! Stored value types and their byte encodings.
//!
//! Values travel without a type tag. The writer picks the encoding from the
//! value's type and the reader must know the expected type out of band:
//!
//! | Type   | Encoding                                  |
//! |--------|-------------------------------------------|
//! | bool   | 1 byte, `0` or `1`                        |
//! | number | 8 bytes, IEEE-754 binary64, big-endian    |
//! | text   | UTF-8 bytes                               |

use crate::error::ProtocolError;
use crate::NUMBER_WIDTH;
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use std::str::FromStr;

/// A value that can be stored under a key.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// The type of a [`Value`], used to decode untagged GET payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Number,
    Text,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::Text(_) => ValueKind::Text,
        }
    }

    /// Size counted against the configured value limit.
    ///
    /// Numbers are measured by [`number_text`], text by its UTF-8 length.
    /// Booleans are always accepted and return `None`.
    pub fn measured_size(&self) -> Option<usize> {
        match self {
            Value::Bool(_) => None,
            Value::Number(n) => Some(number_text(*n).len()),
            Value::Text(s) => Some(s.len()),
        }
    }

    /// Encodes the value without any size check.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Value::Bool(b) => encode_bool_value(*b),
            Value::Number(n) => encode_number(*n),
            Value::Text(s) => Bytes::copy_from_slice(s.as_bytes()),
        }
    }

    /// Decodes raw bytes as a value of the given kind.
    pub fn from_bytes(kind: ValueKind, bytes: &[u8]) -> Result<Self, ProtocolError> {
        match kind {
            ValueKind::Bool => decode_bool(bytes).map(Value::Bool),
            ValueKind::Number => decode_number(bytes).map(Value::Number),
            ValueKind::Text => decode_text(bytes).map(Value::Text),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl ValueKind {
    /// Parses a textual value of this kind, as typed on a command line.
    pub fn parse_value(self, input: &str) -> Result<Value, String> {
        match self {
            ValueKind::Bool => match input.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(format!("not a boolean: {}", input)),
            },
            ValueKind::Number => input
                .parse::<f64>()
                .map(Value::Number)
                .map_err(|e| format!("not a number: {} ({})", input, e)),
            ValueKind::Text => Ok(Value::Text(input.to_string())),
        }
    }
}

impl FromStr for ValueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(ValueKind::Bool),
            "number" | "num" => Ok(ValueKind::Number),
            "string" | "text" | "str" => Ok(ValueKind::Text),
            other => Err(format!("unknown value type: {}", other)),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::Number => write!(f, "number"),
            ValueKind::Text => write!(f, "string"),
        }
    }
}

/// Shortest text that reads back as `n`.
///
/// Plain decimal for magnitudes in `1e-6..1e21`, exponent notation with an
/// explicit sign outside it (`1e+21`, `1.5e-7`). Zero is `0` whatever its
/// sign; the non-finite values are `NaN`, `Infinity` and `-Infinity`.
pub fn number_text(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return n.to_string();
    }

    // `{:e}` is already the shortest mantissa; only the sign is missing.
    let text = format!("{:e}", n);
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => text,
    }
}

/// Encodes a boolean as a single `0`/`1` byte.
pub fn encode_bool_value(b: bool) -> Bytes {
    if b {
        Bytes::from_static(&[1])
    } else {
        Bytes::from_static(&[0])
    }
}

/// Encodes a number as 8 big-endian bytes.
pub fn encode_number(n: f64) -> Bytes {
    let mut buf = BytesMut::with_capacity(NUMBER_WIDTH);
    buf.put_f64(n);
    buf.freeze()
}

/// Decodes a number produced by [`encode_number`].
pub fn decode_number(bytes: &[u8]) -> Result<f64, ProtocolError> {
    let raw: [u8; NUMBER_WIDTH] = bytes
        .try_into()
        .map_err(|_| ProtocolError::InvalidNumber {
            expected: NUMBER_WIDTH,
            actual: bytes.len(),
        })?;
    Ok(f64::from_be_bytes(raw))
}

/// Decodes a boolean produced by [`encode_bool_value`].
pub fn decode_bool(bytes: &[u8]) -> Result<bool, ProtocolError> {
    match bytes {
        [0] => Ok(false),
        [1] => Ok(true),
        other => Err(ProtocolError::InvalidBool(other.to_vec())),
    }
}

/// Decodes UTF-8 text.
pub fn decode_text(bytes: &[u8]) -> Result<String, ProtocolError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| ProtocolError::InvalidUtf8)
}
