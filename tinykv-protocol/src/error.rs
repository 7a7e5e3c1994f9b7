//! Protocol error types.

use thiserror::Error;

/// Errors raised while encoding or decoding tinykv frames.
///
/// The size and encoding variants are local validation failures: they are
/// produced before a frame exists and never imply that anything was sent.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("key too large: {size} bytes (max {max})")]
    KeyTooLarge { size: usize, max: usize },

    #[error("key {key:?} has unencodable character {ch:?} at position {position}")]
    KeyEncoding {
        key: String,
        position: usize,
        ch: char,
    },

    #[error("value too large: {size} bytes (max {max})")]
    ValueTooLarge { size: usize, max: usize },

    #[error("unknown command code: {0:#04x}")]
    UnknownCommand(u8),

    #[error("incomplete frame: need {needed} more bytes")]
    IncompleteFrame { needed: usize },

    #[error("unexpected {0} trailing bytes after key region")]
    TrailingBytes(usize),

    #[error("invalid number encoding: expected {expected} bytes, got {actual}")]
    InvalidNumber { expected: usize, actual: usize },

    #[error("invalid boolean encoding: {0:?}")]
    InvalidBool(Vec<u8>),

    #[error("invalid UTF-8 in value")]
    InvalidUtf8,
}

impl ProtocolError {
    /// Returns whether this error comes from validating caller input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ProtocolError::KeyTooLarge { .. }
                | ProtocolError::KeyEncoding { .. }
                | ProtocolError::ValueTooLarge { .. }
        )
    }
}
