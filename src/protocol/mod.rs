//! Wire Protocol
//!
//! Requests arrive as whitespace-separated text lines; replies go out in one
//! of four Redis-style shapes (status, error, bulk, null bulk).
//!
//! ## Modules
//!
//! - `tokenizer`: splits buffered bytes into lines and lines into tokens
//! - `types`: defines the `Reply` enum and its serialization
//!
//! ## Example
//!
//! ```
//! use litekv::protocol::{LineTokenizer, Reply};
//! use bytes::{Bytes, BytesMut};
//!
//! let mut buffer = BytesMut::from(&b"GET name\r\n"[..]);
//! let tokens = LineTokenizer::new().next_line(&mut buffer).unwrap().unwrap();
//! assert_eq!(tokens[1], Bytes::from("name"));
//!
//! let reply = Reply::bulk(Bytes::from("Ariel"));
//! assert_eq!(reply.serialize(), b"$5\r\nAriel\r\n");
//! ```

pub mod tokenizer;
pub mod types;

// Re-export commonly used types for convenience
pub use tokenizer::{tokenize, FrameError, FrameResult, LineTokenizer, MAX_LINE_LENGTH};
pub use types::Reply;
