//! Command codes.

use crate::error::ProtocolError;
use std::fmt;

/// Commands understood by the server.
///
/// The discriminants are the bytes placed at offset 0 of every frame and are
/// shared with the server; they must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    Ping = 0x01,
    Get = 0x02,
    Set = 0x03,
    Exists = 0x04,
    Delete = 0x05,
}

impl Command {
    /// Returns the wire code of this command.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Returns whether frames for this command carry a key region.
    pub fn has_key(self) -> bool {
        !matches!(self, Command::Ping)
    }

    /// Returns whether frames for this command carry value bytes.
    pub fn has_value(self) -> bool {
        matches!(self, Command::Set)
    }
}

impl TryFrom<u8> for Command {
    type Error = ProtocolError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x01 => Ok(Command::Ping),
            0x02 => Ok(Command::Get),
            0x03 => Ok(Command::Set),
            0x04 => Ok(Command::Exists),
            0x05 => Ok(Command::Delete),
            other => Err(ProtocolError::UnknownCommand(other)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Ping => write!(f, "PING"),
            Command::Get => write!(f, "GET"),
            Command::Set => write!(f, "SET"),
            Command::Exists => write!(f, "EXISTS"),
            Command::Delete => write!(f, "DELETE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_and_stable() {
        assert_eq!(Command::Ping.code(), 0x01);
        assert_eq!(Command::Get.code(), 0x02);
        assert_eq!(Command::Set.code(), 0x03);
        assert_eq!(Command::Exists.code(), 0x04);
        assert_eq!(Command::Delete.code(), 0x05);
    }

    #[test]
    fn test_try_from_code() {
        for cmd in [
            Command::Ping,
            Command::Get,
            Command::Set,
            Command::Exists,
            Command::Delete,
        ] {
            assert_eq!(Command::try_from(cmd.code()).unwrap(), cmd);
        }

        assert_eq!(
            Command::try_from(0x00),
            Err(ProtocolError::UnknownCommand(0x00))
        );
        assert_eq!(
            Command::try_from(0xFF),
            Err(ProtocolError::UnknownCommand(0xFF))
        );
    }

    #[test]
    fn test_frame_shape() {
        assert!(!Command::Ping.has_key());
        assert!(Command::Get.has_key());
        assert!(Command::Set.has_value());
        assert!(!Command::Delete.has_value());
    }

    #[test]
    fn test_display() {
        assert_eq!(Command::Exists.to_string(), "EXISTS");
        assert_eq!(Command::Delete.to_string(), "DELETE");
    }
}
