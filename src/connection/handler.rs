//! Connection Handler
//!
//! One handler runs per accepted client, as its own task, until the client
//! goes away.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects
//!        │
//!        ▼
//! 2. ConnectionHandler spawned
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │  Main Loop                   │
//!    │                              │
//!    │  for each buffered line:     │
//!    │    tokenize -> dispatch      │
//!    │    queue reply               │
//!    │  flush replies               │
//!    │  read more bytes             │
//!    └──────────────────────────────┘
//!        │ EOF / error
//!        ▼
//! 4. Trailing partial line (if any) is answered
//!        │
//!        ▼
//! 5. Handler task ends
//! ```
//!
//! TCP is a byte stream: one read may hold half a line or several lines.
//! Bytes accumulate in a `BytesMut` until the tokenizer finds a terminator.
//! There is no idle timeout; a silent client keeps its task parked on the
//! read.

use crate::commands::CommandDispatcher;
use crate::protocol::{FrameError, LineTokenizer, Reply};
use bytes::{Bytes, BytesMut};
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, info, trace, warn};

/// Initial read buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Connection counters shared by every handler task.
///
/// Updated with relaxed atomics; read through [`ConnectionStats::snapshot`].
#[derive(Debug, Default)]
pub struct ConnectionStats {
    accepted: AtomicU64,
    active: AtomicU64,
    commands: AtomicU64,
}

/// A point-in-time copy of [`ConnectionStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSnapshot {
    /// Connections accepted since startup
    pub accepted: u64,
    /// Connections currently open
    pub active: u64,
    /// Commands that produced a reply
    pub commands: u64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn opened(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
        self.active.fetch_add(1, Ordering::Relaxed);
    }

    fn closed(&self) {
        self.active.fetch_sub(1, Ordering::Relaxed);
    }

    fn replied(&self) {
        self.commands.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        ConnectionSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            active: self.active.load(Ordering::Relaxed),
            commands: self.commands.load(Ordering::Relaxed),
        }
    }
}

/// Handles a single client connection.
///
/// Generic over the stream so it runs the same over a `TcpStream` or any
/// other duplex byte stream.
pub struct ConnectionHandler<S> {
    /// Client stream; replies are buffered and flushed before each read
    stream: BufWriter<S>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Bytes received but not yet consumed as lines
    buffer: BytesMut,

    /// Splits the buffer into token lines
    tokenizer: LineTokenizer,

    /// Executes commands against the shared store
    dispatcher: CommandDispatcher,

    /// Scratch space for serializing replies
    reply_buf: Vec<u8>,

    stats: Arc<ConnectionStats>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The client's byte stream
    /// * `addr` - The client's socket address
    /// * `dispatcher` - Executes commands for this connection
    /// * `stats` - Shared connection counters
    pub fn new(
        stream: S,
        addr: SocketAddr,
        dispatcher: CommandDispatcher,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            tokenizer: LineTokenizer::new(),
            dispatcher,
            reply_buf: Vec::with_capacity(64),
            stats,
        }
    }

    /// Serves the client until it disconnects or an error occurs.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected"),
            Err(e) if e.is_disconnect() => {
                debug!(client = %self.addr, error = %e, "Connection dropped by client")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
        }

        self.stats.closed();
        result
    }

    /// The read-execute-respond loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            while let Some(tokens) = self.tokenizer.next_line(&mut self.buffer)? {
                self.execute(&tokens).await?;
            }
            self.stream.flush().await?;

            if self.read_more_data().await? == 0 {
                break;
            }
        }

        // The client may have half-closed right after an unterminated line
        if let Some(tokens) = self.tokenizer.finish(&mut self.buffer) {
            self.execute(&tokens).await?;
            self.stream.flush().await?;
        }

        Ok(())
    }

    /// Runs one command and queues its reply.
    async fn execute(&mut self, tokens: &[Bytes]) -> Result<(), ConnectionError> {
        let Some(reply) = self.dispatcher.execute(tokens) else {
            trace!(client = %self.addr, "Ignoring blank line");
            return Ok(());
        };

        self.stats.replied();
        trace!(client = %self.addr, args = tokens.len(), reply = %reply, "Executed command");

        self.write_reply(&reply).await
    }

    /// Reads more data from the stream into the buffer.
    ///
    /// Returns the number of bytes read; 0 means end of stream.
    async fn read_more_data(&mut self) -> Result<usize, ConnectionError> {
        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(INITIAL_BUFFER_SIZE);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

        trace!(client = %self.addr, bytes = n, "Read data");

        Ok(n)
    }

    /// Queues a reply in the write buffer.
    async fn write_reply(&mut self, reply: &Reply) -> Result<(), ConnectionError> {
        self.reply_buf.clear();
        reply.serialize_into(&mut self.reply_buf);

        self.stream.write_all(&self.reply_buf).await?;
        Ok(())
    }
}

/// Errors that end a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The client sent something that cannot be framed
    #[error("Framing error: {0}")]
    Frame(#[from] FrameError),
}

impl ConnectionError {
    /// Whether this is just the peer going away.
    pub fn is_disconnect(&self) -> bool {
        match self {
            ConnectionError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ),
            ConnectionError::Frame(_) => false,
        }
    }
}

/// Serves a client connection to completion.
///
/// Errors are logged by the handler and never propagate to the caller.
///
/// # Arguments
///
/// * `stream` - The client's byte stream
/// * `addr` - The client's socket address
/// * `dispatcher` - Executes commands for this connection
/// * `stats` - Shared connection counters
pub async fn handle_connection<S>(
    stream: S,
    addr: SocketAddr,
    dispatcher: CommandDispatcher,
    stats: Arc<ConnectionStats>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let handler = ConnectionHandler::new(stream, addr, dispatcher, stats);
    let _ = handler.run().await;
}
