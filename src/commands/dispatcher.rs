//! Command Dispatcher
//!
//! Turns one tokenized request line into exactly one reply.
//!
//! ## Supported Commands
//!
//! - `PING` - `+PONG`
//! - `SET key value [EX seconds]` - `+OK`
//! - `GET key` - bulk value or null bulk
//!
//! The verb is case-insensitive; keys and values are taken byte-for-byte.
//!
//! ## Tolerant `EX` parsing
//!
//! `SET` never fails because of its options. The TTL is applied only when the
//! fourth token is `EX` (any case) and the fifth parses as a positive
//! integer. Anything else after the value, including a malformed `EX`
//! clause, is ignored and the key is stored without a TTL.
//!
//! ```text
//! SET k v EX 10        -> expires in 10s
//! SET k v EX 10 junk   -> expires in 10s
//! SET k v EX ten       -> never expires
//! SET k v EX -5        -> never expires
//! SET k v PX 10        -> never expires
//! ```

use crate::protocol::Reply;
use crate::storage::Store;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

/// Dispatches tokenized commands against the shared store.
///
/// Stateless apart from the store handle; each connection gets its own clone.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    store: Arc<Store>,
}

impl CommandDispatcher {
    /// Creates a dispatcher over the given store.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Executes one command line.
    ///
    /// # Returns
    ///
    /// `None` for an empty token list (a blank line gets no reply),
    /// otherwise the reply to send back.
    pub fn execute(&self, tokens: &[Bytes]) -> Option<Reply> {
        let (verb, args) = tokens.split_first()?;
        let cmd_name = String::from_utf8_lossy(verb).to_uppercase();

        Some(self.dispatch(&cmd_name, args))
    }

    fn dispatch(&self, cmd: &str, args: &[Bytes]) -> Reply {
        match cmd {
            "PING" => self.cmd_ping(args),
            "SET" => self.cmd_set(args),
            "GET" => self.cmd_get(args),
            _ => Reply::error(format!("ERR unknown command '{}'", cmd)),
        }
    }

    /// PING
    ///
    /// Arguments are accepted and ignored.
    fn cmd_ping(&self, _args: &[Bytes]) -> Reply {
        Reply::pong()
    }

    /// SET key value [EX seconds]
    fn cmd_set(&self, args: &[Bytes]) -> Reply {
        if args.len() < 2 {
            return Reply::error("ERR wrong number of arguments for 'set' command");
        }

        let key = args[0].clone();
        let value = args[1].clone();
        let ttl = parse_expiry(&args[2..]);

        self.store.set(key, value, ttl);
        Reply::ok()
    }

    /// GET key
    fn cmd_get(&self, args: &[Bytes]) -> Reply {
        if args.len() != 1 {
            return Reply::error("ERR wrong number of arguments for 'get' command");
        }

        match self.store.get(&args[0]) {
            Some(value) => Reply::bulk(value),
            None => Reply::null(),
        }
    }
}

/// Reads an optional `EX seconds` clause from the tokens after the value.
fn parse_expiry(options: &[Bytes]) -> Option<Duration> {
    match options {
        [flag, seconds, ..] if flag.eq_ignore_ascii_case(b"EX") => {
            let seconds: i64 = std::str::from_utf8(seconds).ok()?.parse().ok()?;
            (seconds > 0).then(|| Duration::from_secs(seconds as u64))
        }
        _ => None,
    }
}
