//! In-memory store backed by `DashMap`.
//!
//! Used by tests. Failures can be injected per operation so callers can
//! exercise their error paths.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{BackendError, KvStore};

/// A thread-safe in-memory key-value store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, Vec<u8>>>,
    faults: Arc<Faults>,
}

#[derive(Default)]
struct Faults {
    writes: AtomicBool,
    discard_writes: AtomicBool,
    mangle_writes: AtomicBool,
    enumeration: AtomicBool,
    ping: AtomicBool,
    read_keys: Mutex<HashSet<String>>,
    vanishing_keys: Mutex<HashSet<String>>,
    write_count: AtomicUsize,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes directly, bypassing fault injection and write counting.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.inner.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of `set` calls that reached the store, successful or not.
    pub fn write_count(&self) -> usize {
        self.faults.write_count.load(Ordering::SeqCst)
    }

    /// Make every subsequent `set` fail.
    pub fn fail_writes(&self, fail: bool) {
        self.faults.writes.store(fail, Ordering::SeqCst);
    }

    /// Acknowledge every subsequent `set` without storing anything.
    pub fn discard_writes(&self, discard: bool) {
        self.faults.discard_writes.store(discard, Ordering::SeqCst);
    }

    /// Store bytes that are not valid JSON in place of every subsequent `set` value.
    pub fn mangle_writes(&self, mangle: bool) {
        self.faults.mangle_writes.store(mangle, Ordering::SeqCst);
    }

    /// Let `key` be enumerated once more, then delete it before anyone reads it.
    pub fn vanish_after_enumeration(&self, key: impl Into<String>) {
        if let Ok(mut keys) = self.faults.vanishing_keys.lock() {
            keys.insert(key.into());
        }
    }

    /// Make `keys_with_prefix` fail.
    pub fn fail_enumeration(&self, fail: bool) {
        self.faults.enumeration.store(fail, Ordering::SeqCst);
    }

    /// Make `ping` fail.
    pub fn fail_ping(&self, fail: bool) {
        self.faults.ping.store(fail, Ordering::SeqCst);
    }

    /// Make every `get` of `key` fail.
    pub fn fail_reads_of(&self, key: impl Into<String>) {
        if let Ok(mut keys) = self.faults.read_keys.lock() {
            keys.insert(key.into());
        }
    }

    fn read_fails(&self, key: &str) -> bool {
        self.faults
            .read_keys
            .lock()
            .map(|keys| keys.contains(key))
            .unwrap_or(false)
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        if self.read_fails(key) {
            return Err(BackendError::Unavailable(format!("injected read failure for {}", key)));
        }
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), BackendError> {
        self.faults.write_count.fetch_add(1, Ordering::SeqCst);
        if self.faults.writes.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable(format!("injected write failure for {}", key)));
        }
        if self.faults.discard_writes.load(Ordering::SeqCst) {
            return Ok(());
        }
        let value = if self.faults.mangle_writes.load(Ordering::SeqCst) {
            b"\x00mangled".to_vec()
        } else {
            value
        };
        self.inner.insert(key.to_string(), value);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, BackendError> {
        if self.faults.enumeration.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("injected enumeration failure".into()));
        }
        // DashMap iteration order is unspecified; sort so listings are stable.
        let mut keys: Vec<String> = self
            .inner
            .iter()
            .filter(|r| r.key().starts_with(prefix))
            .map(|r| r.key().clone())
            .collect();
        keys.sort();

        if let Ok(mut vanishing) = self.faults.vanishing_keys.lock() {
            for key in vanishing.drain() {
                self.inner.remove(&key);
            }
        }
        Ok(keys)
    }

    async fn ping(&self) -> Result<(), BackendError> {
        if self.faults.ping.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("injected ping failure".into()));
        }
        Ok(())
    }
}
