//! Storage Module
//!
//! The shared key-value store and the background janitor that sweeps it.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │                  Store                   │
//! │   RwLock<HashMap<Bytes, Entry>>          │
//! │   (every command takes the write lock)   │
//! └──────────────────────────────────────────┘
//!                      ▲
//!                      │ sweep_expired() once per second
//!        ┌─────────────┴─────────────┐
//!        │          Janitor          │
//!        │  (Background Tokio Task)  │
//!        └───────────────────────────┘
//! ```
//!
//! ## Expiry
//!
//! - **Lazy**: `get` deletes an expired entry in the same critical section
//!   that found it
//! - **Active**: the janitor removes expired entries nobody reads again
//!
//! ## Example
//!
//! ```
//! use litekv::storage::Store;
//! use bytes::Bytes;
//! use std::time::Duration;
//!
//! let store = Store::new();
//!
//! store.set(Bytes::from("name"), Bytes::from("Ariel"), None);
//! assert_eq!(store.get(&Bytes::from("name")), Some(Bytes::from("Ariel")));
//!
//! store.set(
//!     Bytes::from("session"),
//!     Bytes::from("token123"),
//!     Some(Duration::from_secs(3600)),
//! );
//! ```

pub mod janitor;
pub mod store;

// Re-export commonly used types
pub use janitor::{start_janitor, Janitor, JanitorConfig};
pub use store::{Entry, Store, StoreStats};
