//! Fixed-layout request frames.
//!
//! Frame layout (K = configured max key size):
//!
//! ```text
//! +---------+--------------------------+-----------------------+
//! | command | key region               | value (SET only)      |
//! | 1 byte  | K bytes, zero-padded     | variable              |
//! +---------+--------------------------+-----------------------+
//! 0         1                          1+K
//! ```
//!
//! PING frames are the single command byte.

use crate::codec::decode_key_region;
use crate::command::Command;
use crate::error::ProtocolError;
use bytes::{BufMut, Bytes, BytesMut};

/// Builds a request frame.
///
/// The value offset is always `1 + max_key_size`; callers pass the live
/// configured size, never a fixed constant. `key` must already be validated
/// by [`encode_key`](crate::codec::encode_key) against the same size.
pub fn build_frame(
    command: Command,
    key: &[u8],
    max_key_size: usize,
    value: Option<&[u8]>,
) -> Result<BytesMut, ProtocolError> {
    if !command.has_key() {
        let mut buf = BytesMut::with_capacity(1);
        buf.put_u8(command.code());
        return Ok(buf);
    }

    if key.len() > max_key_size {
        return Err(ProtocolError::KeyTooLarge {
            size: key.len(),
            max: max_key_size,
        });
    }

    let value_len = value.map_or(0, <[u8]>::len);
    let mut buf = BytesMut::with_capacity(1 + max_key_size + value_len);

    buf.put_u8(command.code());

    // Key region, left-aligned
    buf.put_slice(key);
    buf.put_bytes(0, max_key_size - key.len());

    if let Some(value) = value {
        buf.put_slice(value);
    }

    Ok(buf)
}

/// A request frame as seen by the receiving side.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestFrame {
    pub command: Command,
    /// Key with padding removed; empty for PING.
    pub key: String,
    /// Raw value bytes for SET.
    pub value: Option<Bytes>,
}

impl RequestFrame {
    /// Parses one complete request frame.
    pub fn parse(bytes: &[u8], max_key_size: usize) -> Result<Self, ProtocolError> {
        let (&code, rest) = bytes
            .split_first()
            .ok_or(ProtocolError::IncompleteFrame { needed: 1 })?;
        let command = Command::try_from(code)?;

        if !command.has_key() {
            if !rest.is_empty() {
                return Err(ProtocolError::TrailingBytes(rest.len()));
            }
            return Ok(Self {
                command,
                key: String::new(),
                value: None,
            });
        }

        if rest.len() < max_key_size {
            return Err(ProtocolError::IncompleteFrame {
                needed: max_key_size - rest.len(),
            });
        }

        let (region, tail) = rest.split_at(max_key_size);
        let key = decode_key_region(region)?;

        let value = if command.has_value() {
            Some(Bytes::copy_from_slice(tail))
        } else if !tail.is_empty() {
            return Err(ProtocolError::TrailingBytes(tail.len()));
        } else {
            None
        };

        Ok(Self {
            command,
            key,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_key;
    use proptest::prelude::*;

    #[test]
    fn test_ping_frame_is_one_byte() {
        let frame = build_frame(Command::Ping, &[], 32, None).unwrap();
        assert_eq!(frame.as_ref(), &[Command::Ping.code()]);
    }

    #[test]
    fn test_key_only_frame() {
        let key = encode_key("abc", 8).unwrap();
        let frame = build_frame(Command::Get, &key, 8, None).unwrap();
        assert_eq!(frame.len(), 9);
        assert_eq!(frame[0], Command::Get.code());
        assert_eq!(&frame[1..], b"abc\0\0\0\0\0");
    }

    #[test]
    fn test_set_frame_layout() {
        let key = encode_key("user1", 8).unwrap();
        let frame = build_frame(Command::Set, &key, 8, Some(&b"abc"[..])).unwrap();

        let mut expected = vec![Command::Set.code()];
        expected.extend_from_slice(b"user1\0\0\0abc");
        assert_eq!(frame.as_ref(), expected.as_slice());
    }

    #[test]
    fn test_value_offset_follows_configured_key_size() {
        // With the default K the value starts at 33; with K = 4 it must
        // start at 5, not at a fixed offset.
        let frame = build_frame(Command::Set, b"k", 4, Some(&[0xAA, 0xBB][..])).unwrap();
        assert_eq!(frame.len(), 1 + 4 + 2);
        assert_eq!(frame[5], 0xAA);
        assert_eq!(frame[6], 0xBB);

        let frame = build_frame(Command::Set, b"k", 32, Some(&[0xAA][..])).unwrap();
        assert_eq!(frame[33], 0xAA);
    }

    #[test]
    fn test_build_rejects_oversized_key() {
        assert_eq!(
            build_frame(Command::Get, b"toolong", 4, None),
            Err(ProtocolError::KeyTooLarge { size: 7, max: 4 })
        );
    }

    #[test]
    fn test_parse_ping() {
        let parsed = RequestFrame::parse(&[Command::Ping.code()], 32).unwrap();
        assert_eq!(parsed.command, Command::Ping);
        assert!(parsed.key.is_empty());
        assert!(parsed.value.is_none());
    }

    #[test]
    fn test_parse_set() {
        let frame = build_frame(Command::Set, b"user1", 8, Some(&b"abc"[..])).unwrap();
        let parsed = RequestFrame::parse(&frame, 8).unwrap();
        assert_eq!(parsed.command, Command::Set);
        assert_eq!(parsed.key, "user1");
        assert_eq!(parsed.value.as_deref(), Some(&b"abc"[..]));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            RequestFrame::parse(&[], 8),
            Err(ProtocolError::IncompleteFrame { needed: 1 })
        );
        assert_eq!(
            RequestFrame::parse(&[0x42], 8),
            Err(ProtocolError::UnknownCommand(0x42))
        );
        assert_eq!(
            RequestFrame::parse(&[Command::Get.code(), b'a', 0], 8),
            Err(ProtocolError::IncompleteFrame { needed: 6 })
        );

        let mut frame = build_frame(Command::Delete, b"a", 2, None).unwrap();
        frame.put_u8(7);
        assert_eq!(
            RequestFrame::parse(&frame, 2),
            Err(ProtocolError::TrailingBytes(1))
        );
        assert_eq!(
            RequestFrame::parse(&[Command::Ping.code(), 0], 2),
            Err(ProtocolError::TrailingBytes(1))
        );
    }

    proptest! {
        #[test]
        fn prop_set_frame_layout(
            key in "[a-zA-Z0-9_:]{0,16}",
            extra in 0usize..48,
            value in proptest::collection::vec(any::<u8>(), 1..64),
        ) {
            let k = key.len() + extra;
            let encoded = encode_key(&key, k).unwrap();
            let frame = build_frame(Command::Set, &encoded, k, Some(value.as_slice())).unwrap();

            prop_assert_eq!(frame.len(), 1 + k + value.len());
            prop_assert_eq!(frame[0], Command::Set.code());
            prop_assert_eq!(frame[1 + k], value[0]);

            let parsed = RequestFrame::parse(&frame, k).unwrap();
            prop_assert_eq!(parsed.key, key);
            prop_assert_eq!(parsed.value.as_deref(), Some(value.as_slice()));
        }
    }
}
