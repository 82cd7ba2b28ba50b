//! Line Framing and Tokenization
//!
//! Requests are plain text lines: a command verb followed by arguments,
//! separated by ASCII whitespace or vertical tab and terminated by `\n` (usually `\r\n`).
//!
//! ```text
//! SET foo bar EX 10\r\n   ->   ["SET", "foo", "bar", "EX", "10"]
//! ```
//!
//! The tokenizer works directly on the connection's `BytesMut` read buffer.
//! A complete line is split off and frozen, and every token is a `Bytes`
//! slice into that line, so no payload bytes are copied.
//!
//! It returns:
//! - `Ok(Some(tokens))` - a full line was consumed (tokens may be empty for a blank line)
//! - `Ok(None)` - no line terminator buffered yet, read more
//! - `Err(FrameError)` - the pending line grew past [`MAX_LINE_LENGTH`]

use bytes::{Bytes, BytesMut};
use thiserror::Error;

/// Longest line accepted without a terminator (64 KB)
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Errors raised while framing lines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The client kept sending bytes without ever ending the line
    #[error("line too long: {size} bytes buffered without a terminator (max: {max})")]
    LineTooLong { size: usize, max: usize },
}

/// Result type for framing operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// Incremental line tokenizer.
///
/// Remembers how much of the buffer has already been searched for a line
/// terminator, so a slowly arriving line is not rescanned from the start
/// on every read.
///
/// # Example
///
/// ```
/// use litekv::protocol::LineTokenizer;
/// use bytes::{Bytes, BytesMut};
///
/// let mut tokenizer = LineTokenizer::new();
/// let mut buffer = BytesMut::from(&b"GET foo\r\nPI"[..]);
///
/// let tokens = tokenizer.next_line(&mut buffer).unwrap().unwrap();
/// assert_eq!(tokens, vec![Bytes::from("GET"), Bytes::from("foo")]);
///
/// // "PI" is still waiting for the rest of its line
/// assert_eq!(tokenizer.next_line(&mut buffer).unwrap(), None);
/// assert_eq!(&buffer[..], b"PI");
/// ```
#[derive(Debug, Default)]
pub struct LineTokenizer {
    /// Bytes at the front of the buffer known to contain no `\n`
    scanned: usize,
}

impl LineTokenizer {
    /// Creates a new tokenizer.
    pub fn new() -> Self {
        Self { scanned: 0 }
    }

    /// Splits the next complete line off the front of `buf` and tokenizes it.
    pub fn next_line(&mut self, buf: &mut BytesMut) -> FrameResult<Option<Vec<Bytes>>> {
        let start = self.scanned.min(buf.len());

        match buf[start..].iter().position(|&b| b == b'\n') {
            Some(offset) => {
                let line = buf.split_to(start + offset + 1).freeze();
                self.scanned = 0;
                Ok(Some(tokenize(&line)))
            }
            None => {
                self.scanned = buf.len();
                if buf.len() > MAX_LINE_LENGTH {
                    return Err(FrameError::LineTooLong {
                        size: buf.len(),
                        max: MAX_LINE_LENGTH,
                    });
                }
                Ok(None)
            }
        }
    }

    /// Tokenizes whatever is left in `buf` once the stream has ended.
    ///
    /// Returns `None` when nothing was buffered.
    pub fn finish(&mut self, buf: &mut BytesMut) -> Option<Vec<Bytes>> {
        self.scanned = 0;
        if buf.is_empty() {
            return None;
        }
        let rest = buf.split().freeze();
        Some(tokenize(&rest))
    }
}

/// Token separators: ASCII whitespace plus vertical tab (`\x0B`), which
/// `u8::is_ascii_whitespace` leaves out.
#[inline]
fn is_separator(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == 0x0B
}

/// Splits a line into whitespace-separated tokens.
///
/// Each token shares the line's allocation. Leading, trailing and repeated
/// whitespace (including `\r` and `\n`) never yield empty tokens.
pub fn tokenize(line: &Bytes) -> Vec<Bytes> {
    let mut tokens = Vec::new();
    let mut token_start: Option<usize> = None;

    for (i, byte) in line.iter().enumerate() {
        match (is_separator(*byte), token_start) {
            (true, Some(start)) => {
                tokens.push(line.slice(start..i));
                token_start = None;
            }
            (false, None) => token_start = Some(i),
            _ => {}
        }
    }

    if let Some(start) = token_start {
        tokens.push(line.slice(start..));
    }

    tokens
}
