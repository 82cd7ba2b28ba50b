//! Reply Types
//!
//! Every accepted command produces exactly one reply, and a reply is always
//! one of four shapes. The byte layout borrows the Redis conventions so that
//! naive line-oriented clients can read it:
//!
//! - `+` Simple status: `+OK\r\n`, `+PONG\r\n`
//! - `-` Error: `-ERR <message>\r\n`
//! - `$` Bulk value: `$<len>\r\n<value>\r\n`
//! - `$-1` Null bulk (not found): `$-1\r\n`

use bytes::Bytes;
use std::fmt;

/// The CRLF terminator that ends every reply line
pub const CRLF: &[u8] = b"\r\n";

/// Reply type prefixes
pub mod prefix {
    pub const SIMPLE_STRING: u8 = b'+';
    pub const ERROR: u8 = b'-';
    pub const BULK: u8 = b'$';
}

/// A reply sent back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Status line. Must not contain CRLF.
    /// Format: `+<string>\r\n`
    SimpleString(String),

    /// Error line. Must not contain CRLF.
    /// Format: `-<message>\r\n`
    Error(String),

    /// Length-prefixed, binary-safe value.
    /// Format: `$<length>\r\n<data>\r\n`
    Bulk(Bytes),

    /// "No value".
    /// Format: `$-1\r\n`
    NullBulk,
}

impl Reply {
    /// Creates a status reply.
    ///
    /// # Example
    /// ```
    /// use litekv::protocol::types::Reply;
    /// assert_eq!(Reply::simple_string("OK").serialize(), b"+OK\r\n");
    /// ```
    pub fn simple_string(s: impl Into<String>) -> Self {
        Reply::SimpleString(s.into())
    }

    /// Creates an error reply. The message should carry its own `ERR` tag.
    ///
    /// # Example
    /// ```
    /// use litekv::protocol::types::Reply;
    /// let err = Reply::error("ERR unknown command 'FOO'");
    /// assert_eq!(err.serialize(), b"-ERR unknown command 'FOO'\r\n");
    /// ```
    pub fn error(s: impl Into<String>) -> Self {
        Reply::Error(s.into())
    }

    /// Creates a bulk reply.
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Reply::Bulk(data.into())
    }

    /// Creates a null bulk reply.
    pub fn null() -> Self {
        Reply::NullBulk
    }

    /// `+OK`
    pub fn ok() -> Self {
        Reply::SimpleString("OK".to_string())
    }

    /// `+PONG`
    pub fn pong() -> Self {
        Reply::SimpleString("PONG".to_string())
    }

    /// Serializes the reply to its wire bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes the reply into an existing buffer.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        match self {
            Reply::SimpleString(s) => {
                buf.push(prefix::SIMPLE_STRING);
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            Reply::Error(s) => {
                buf.push(prefix::ERROR);
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            Reply::Bulk(data) => {
                buf.reserve(data.len() + 16);
                buf.push(prefix::BULK);
                buf.extend_from_slice(data.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                buf.extend_from_slice(data);
                buf.extend_from_slice(CRLF);
            }
            Reply::NullBulk => {
                buf.push(prefix::BULK);
                buf.extend_from_slice(b"-1");
                buf.extend_from_slice(CRLF);
            }
        }
    }

    /// Returns true if this is the null bulk reply.
    pub fn is_null(&self) -> bool {
        matches!(self, Reply::NullBulk)
    }

    /// Returns true if this is an error reply.
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::SimpleString(s) => write!(f, "{}", s),
            Reply::Error(s) => write!(f, "(error) {}", s),
            Reply::Bulk(data) => match std::str::from_utf8(data) {
                Ok(s) => write!(f, "\"{}\"", s),
                Err(_) => write!(f, "(binary data, {} bytes)", data.len()),
            },
            Reply::NullBulk => write!(f, "(nil)"),
        }
    }
}
