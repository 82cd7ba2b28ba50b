//! Command Module
//!
//! Validates tokenized requests and runs them against the store.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌───────────────────┐
//! │  LineTokenizer    │  (protocol module)
//! └────────┬──────────┘
//!          │ [verb, args...]
//!          ▼
//! ┌───────────────────┐
//! │ CommandDispatcher │  (this module)
//! │                   │
//! │  - Dispatch       │
//! │  - Check arity    │
//! │  - Execute        │
//! └────────┬──────────┘
//!          │
//!          ▼
//! ┌───────────────────┐
//! │      Store        │  (storage module)
//! └───────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `PING`
//! - `SET key value [EX seconds]`
//! - `GET key`

pub mod dispatcher;

pub use dispatcher::CommandDispatcher;
