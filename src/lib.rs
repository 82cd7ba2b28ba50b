//! # LiteKV - A Small In-Memory Key-Value Cache
//!
//! LiteKV keeps string values in memory, optionally with a time-to-live, and
//! serves them over TCP using a tiny line-based text protocol. It is a
//! single-node, volatile cache: no persistence, no replication, no auth.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                             LiteKV                             │
//! │                                                                │
//! │  ┌─────────────┐    ┌─────────────┐    ┌───────────────────┐   │
//! │  │ TCP Server  │───>│ Connection  │───>│ CommandDispatcher │   │
//! │  │ (Listener)  │    │  Handler    │    └─────────┬─────────┘   │
//! │  └─────────────┘    └─────────────┘              │             │
//! │                           │                      ▼             │
//! │                     ┌─────┴───────┐    ┌───────────────────┐   │
//! │                     │    Line     │    │       Store       │   │
//! │                     │  Tokenizer  │    │ RwLock<HashMap>   │   │
//! │                     └─────────────┘    └─────────▲─────────┘   │
//! │                                                  │             │
//! │                                        ┌─────────┴─────────┐   │
//! │                                        │      Janitor      │   │
//! │                                        │ (Background Task) │   │
//! │                                        └───────────────────┘   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use litekv::commands::CommandDispatcher;
//! use litekv::connection::{handle_connection, ConnectionStats};
//! use litekv::storage::{start_janitor, Store};
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let store = Arc::new(Store::new());
//!     let _janitor = start_janitor(Arc::clone(&store));
//!     let stats = Arc::new(ConnectionStats::new());
//!
//!     let listener = TcpListener::bind("127.0.0.1:6379").await?;
//!     loop {
//!         let (stream, addr) = listener.accept().await?;
//!         let dispatcher = CommandDispatcher::new(Arc::clone(&store));
//!         tokio::spawn(handle_connection(stream, addr, dispatcher, Arc::clone(&stats)));
//!     }
//! }
//! ```
//!
//! ## Protocol
//!
//! One command per line, tokens separated by whitespace:
//!
//! ```text
//! PING                    -> +PONG
//! SET key value [EX secs] -> +OK
//! GET key                 -> $<len>\r\n<value>  or  $-1
//! ```
//!
//! ## Expiry
//!
//! Keys with a TTL are removed two ways:
//! 1. **Lazy**: `GET` deletes an expired key in the same locked section that
//!    found it, so an expired value is never returned
//! 2. **Active**: the janitor sweeps the whole store once per second
//!
//! ## Module Overview
//!
//! - [`protocol`]: line tokenizer and reply encoding
//! - [`storage`]: the store and its janitor
//! - [`commands`]: command validation and dispatch
//! - [`connection`]: per-client connection handling

pub mod commands;
pub mod connection;
pub mod protocol;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::CommandDispatcher;
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{FrameError, LineTokenizer, Reply};
pub use storage::{start_janitor, Janitor, JanitorConfig, Store, StoreStats};

/// The default port (same as Redis)
pub const DEFAULT_PORT: u16 = 6379;

/// The default host to bind to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of LiteKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
