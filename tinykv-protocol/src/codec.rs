//! Key, value and response codec.
//!
//! Keys are byte-oriented: every character maps to exactly one byte. Only
//! ASCII characters other than NUL are accepted, so that a key always
//! survives the trip through the zero-padded key region unchanged. Anything
//! else is rejected with [`ProtocolError::KeyEncoding`] rather than truncated.

use crate::error::ProtocolError;
use crate::response::GetResponse;
use crate::value::Value;
use crate::STATUS_OK;
use bytes::Bytes;

/// Encodes a key into its unpadded byte form.
///
/// The returned bytes are exactly as long as the key; placing them into the
/// fixed key region is left to [`build_frame`](crate::frame::build_frame).
pub fn encode_key(key: &str, max_key_size: usize) -> Result<Bytes, ProtocolError> {
    let size = key.chars().count();
    if size > max_key_size {
        return Err(ProtocolError::KeyTooLarge {
            size,
            max: max_key_size,
        });
    }

    let mut bytes = Vec::with_capacity(size);
    for (position, ch) in key.chars().enumerate() {
        match u8::try_from(ch) {
            Ok(b) if (0x01..=0x7F).contains(&b) => bytes.push(b),
            _ => {
                return Err(ProtocolError::KeyEncoding {
                    key: key.to_string(),
                    position,
                    ch,
                })
            }
        }
    }

    Ok(Bytes::from(bytes))
}

/// Decodes a key region back into the key, dropping the zero padding.
pub fn decode_key_region(region: &[u8]) -> Result<String, ProtocolError> {
    let end = region
        .iter()
        .rposition(|&b| b != 0)
        .map(|pos| pos + 1)
        .unwrap_or(0);

    region[..end]
        .iter()
        .enumerate()
        .map(|(position, &b)| {
            if (0x01..=0x7F).contains(&b) {
                Ok(char::from(b))
            } else {
                Err(ProtocolError::KeyEncoding {
                    key: String::from_utf8_lossy(&region[..end]).into_owned(),
                    position,
                    ch: char::from(b),
                })
            }
        })
        .collect()
}

/// Validates and encodes a value.
///
/// Booleans are exempt from the size limit; numbers are measured by their
/// textual form and text by its UTF-8 length.
pub fn encode_value(value: &Value, max_value_size: usize) -> Result<Bytes, ProtocolError> {
    if let Some(size) = value.measured_size() {
        if size > max_value_size {
            return Err(ProtocolError::ValueTooLarge {
                size,
                max: max_value_size,
            });
        }
    }
    Ok(value.to_bytes())
}

/// Interprets a SET/EXISTS/DELETE reply.
///
/// Only a leading `1` means success. Anything else, including an empty
/// reply, is a plain `false`; the protocol has no way to report an error.
pub fn decode_status_response(bytes: &[u8]) -> bool {
    bytes.first() == Some(&STATUS_OK)
}

/// Wraps a GET reply for decoding by the caller.
pub fn decode_get_response(bytes: Bytes) -> GetResponse {
    GetResponse::new(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::encode_bool_value;
    use crate::DEFAULT_MAX_KEY_SIZE;
    use proptest::prelude::*;

    #[test]
    fn test_encode_key_is_unpadded() {
        let encoded = encode_key("user1", DEFAULT_MAX_KEY_SIZE).unwrap();
        assert_eq!(encoded.as_ref(), b"user1");
    }

    #[test]
    fn test_encode_key_at_limit() {
        let key = "k".repeat(8);
        assert_eq!(encode_key(&key, 8).unwrap().len(), 8);
    }

    #[test]
    fn test_encode_key_too_large() {
        let key = "k".repeat(9);
        assert_eq!(
            encode_key(&key, 8),
            Err(ProtocolError::KeyTooLarge { size: 9, max: 8 })
        );
    }

    #[test]
    fn test_encode_key_rejects_non_ascii() {
        let err = encode_key("caf\u{e9}", 32).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::KeyEncoding {
                key: "caf\u{e9}".to_string(),
                position: 3,
                ch: '\u{e9}',
            }
        );

        assert!(matches!(
            encode_key("\u{1F600}", 32),
            Err(ProtocolError::KeyEncoding { position: 0, .. })
        ));
    }

    #[test]
    fn test_encode_key_rejects_nul() {
        assert!(matches!(
            encode_key("a\0b", 32),
            Err(ProtocolError::KeyEncoding { position: 1, .. })
        ));
    }

    #[test]
    fn test_size_checked_before_encoding() {
        // Oversized and non-ASCII: size wins.
        let key = "\u{e9}".repeat(5);
        assert!(matches!(
            encode_key(&key, 4),
            Err(ProtocolError::KeyTooLarge { size: 5, max: 4 })
        ));
    }

    #[test]
    fn test_decode_key_region_strips_padding() {
        assert_eq!(decode_key_region(b"abc\0\0\0").unwrap(), "abc");
        assert_eq!(decode_key_region(&[0; 8]).unwrap(), "");
        assert_eq!(decode_key_region(b"full").unwrap(), "full");
    }

    #[test]
    fn test_decode_key_region_rejects_high_bytes() {
        assert!(matches!(
            decode_key_region(&[b'a', 0xC3, 0]),
            Err(ProtocolError::KeyEncoding { position: 1, .. })
        ));
    }

    #[test]
    fn test_encode_value_dispatch() {
        assert_eq!(encode_value(&Value::Bool(true), 4).unwrap().as_ref(), &[1]);
        assert_eq!(encode_value(&Value::Number(2.0), 4).unwrap().len(), 8);
        assert_eq!(
            encode_value(&Value::from("abc"), 4).unwrap().as_ref(),
            b"abc"
        );
    }

    #[test]
    fn test_encode_value_too_large() {
        assert_eq!(
            encode_value(&Value::from("abcde"), 4),
            Err(ProtocolError::ValueTooLarge { size: 5, max: 4 })
        );
        // "12345.5" is 7 characters even though it encodes to 8 bytes.
        assert_eq!(
            encode_value(&Value::Number(12345.5), 6),
            Err(ProtocolError::ValueTooLarge { size: 7, max: 6 })
        );
        assert!(encode_value(&Value::Number(12345.5), 7).is_ok());
    }

    #[test]
    fn test_booleans_exempt_from_size() {
        assert!(encode_value(&Value::Bool(false), 0).is_ok());
        assert!(encode_value(&Value::Bool(true), 0).is_ok());
    }

    #[test]
    fn test_status_response_is_lenient() {
        assert!(decode_status_response(&[1]));
        assert!(decode_status_response(&[1, 0, 0]));
        assert!(!decode_status_response(&[0]));
        assert!(!decode_status_response(&[2]));
        assert!(!decode_status_response(&[]));
    }

    #[test]
    fn test_status_of_encoded_booleans() {
        assert!(decode_status_response(&encode_bool_value(true)));
        assert!(!decode_status_response(&encode_bool_value(false)));
    }

    proptest! {
        #[test]
        fn prop_key_region_roundtrip(key in "[\\x01-\\x7f]{0,32}", pad in 0usize..16) {
            let k = key.chars().count() + pad;
            let encoded = encode_key(&key, k).unwrap();
            let mut region = vec![0u8; k];
            region[..encoded.len()].copy_from_slice(&encoded);
            prop_assert_eq!(decode_key_region(&region).unwrap(), key);
        }

        #[test]
        fn prop_oversized_key_rejected(key in "[a-z]{1,40}") {
            let max = key.len() - 1;
            let result = encode_key(&key, max);
            let is_key_too_large = matches!(result, Err(ProtocolError::KeyTooLarge { .. }));
            prop_assert!(is_key_too_large);
        }
    }
}
