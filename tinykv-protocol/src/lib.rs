//! # tinykv-protocol
//!
//! Wire codec for the tinykv key-value protocol.
//!
//! This crate provides:
//! - Command codes shared with the server
//! - Key and value encoding with size validation
//! - Fixed-layout frame building and parsing
//! - Status and GET response decoding
//!
//! Nothing in here touches a socket.

pub mod codec;
pub mod command;
pub mod error;
pub mod frame;
pub mod response;
pub mod value;

pub use codec::{
    decode_get_response, decode_key_region, decode_status_response, encode_key, encode_value,
};
pub use command::Command;
pub use error::ProtocolError;
pub use frame::{build_frame, RequestFrame};
pub use response::GetResponse;
pub use value::{Value, ValueKind};

/// Default server host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default server port.
pub const DEFAULT_PORT: u16 = 9055;

/// Default width of the key region in bytes.
pub const DEFAULT_MAX_KEY_SIZE: usize = 32;

/// Default maximum encoded value size in bytes.
pub const DEFAULT_MAX_VALUE_SIZE: usize = 1024;

/// Status byte reported by the server on success.
pub const STATUS_OK: u8 = 1;

/// Width of an encoded number (IEEE-754 binary64, big-endian).
pub const NUMBER_WIDTH: usize = 8;

/// GET reply meaning "no such key".
pub const ABSENT_SENTINEL: &[u8] = &[0x00];
