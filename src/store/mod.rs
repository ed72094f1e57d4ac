//! Key-value store seam.
//!
//! # Data Flow
//! ```text
//! RecordGateway
//!     → KvStore (get / set / keys_with_prefix / ping)
//!         → redis.rs   (production: Redis over a managed connection)
//!         → memory.rs  (tests: DashMap)
//! ```
//!
//! # Design Decisions
//! - The store is the sole owner of persisted state; nothing is cached here
//! - Values are opaque bytes; encoding belongs to the records layer
//! - No retries: every backend failure is surfaced to the caller as-is

pub mod memory;
pub mod redis;

use async_trait::async_trait;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Errors raised by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Redis reported an error or the connection failed.
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    /// The backend could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Minimal key-value operations the service relies on.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a key. `Ok(None)` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Write a key without expiry, replacing any existing value.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), BackendError>;

    /// Enumerate every key starting with `prefix`.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, BackendError>;

    /// Round-trip connectivity check.
    async fn ping(&self) -> Result<(), BackendError>;
}
