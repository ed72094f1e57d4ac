//! Store gateway for records.
//!
//! # Responsibilities
//! - Form namespaced keys (`prefix + id`)
//! - Encode/decode records for the store
//! - Translate store outcomes (found / absent / failure) into `StoreError`
//!
//! # Design Decisions
//! - Create reads the record back and returns what the store holds
//! - Listing is fail-fast: one unreadable record fails the whole listing
//! - No retries and no in-process copies of records

use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::observability::metrics;
use crate::records::error::{StoreError, StoreResult};
use crate::records::model::{Record, RecordDraft};
use crate::store::{BackendError, KvStore};

/// Performs record operations against a key-value store.
#[derive(Clone)]
pub struct RecordGateway {
    store: Arc<dyn KvStore>,
    prefix: String,
}

impl RecordGateway {
    /// Create a gateway storing records under `prefix`.
    pub fn new(store: Arc<dyn KvStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Store key for a record id.
    pub fn key_for(&self, id: &str) -> String {
        format!("{}{}", self.prefix, id)
    }

    /// Persist a draft and return the record as read back from the store.
    pub async fn create(&self, draft: RecordDraft) -> StoreResult<Record> {
        let start = Instant::now();
        let result = self.create_inner(draft).await;
        metrics::record_store_op("create", outcome(&result), start);
        result
    }

    async fn create_inner(&self, draft: RecordDraft) -> StoreResult<Record> {
        let id = match draft.id {
            Some(id) if !id.is_empty() => id,
            _ => Uuid::new_v4().to_string(),
        };
        let record = Record {
            id,
            name: draft.name,
        };
        let key = self.key_for(&record.id);

        let payload = serde_json::to_vec(&record).map_err(|source| StoreError::Encode { source })?;

        self.store
            .set(&key, payload)
            .await
            .map_err(|source| StoreError::WriteFailed {
                key: key.clone(),
                source,
            })?;

        tracing::debug!(key = %key, "Record written");

        let stored = match self.store.get(&key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                return Err(StoreError::ReadFailed {
                    source: BackendError::Unavailable(format!("{} missing after write", key)),
                    key,
                })
            }
            Err(source) => return Err(StoreError::ReadFailed { key, source }),
        };

        decode(&key, &stored)
    }

    /// Fetch one record by id.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Record> {
        let start = Instant::now();
        let result = self.get_by_id_inner(id).await;
        metrics::record_store_op("get", outcome(&result), start);
        result
    }

    async fn get_by_id_inner(&self, id: &str) -> StoreResult<Record> {
        let key = self.key_for(id);
        tracing::debug!(key = %key, "Fetching record");

        match self.store.get(&key).await {
            Ok(Some(bytes)) => decode(&key, &bytes),
            Ok(None) => Err(StoreError::NotFound { key }),
            Err(source) => Err(StoreError::Transport { source }),
        }
    }

    /// Fetch every record under the prefix, in store enumeration order.
    ///
    /// An empty store yields an empty vector. Any failed read or corrupt
    /// payload aborts the whole listing.
    pub async fn list_all(&self) -> StoreResult<Vec<Record>> {
        let start = Instant::now();
        let result = self.list_all_inner().await;
        metrics::record_store_op("list", outcome(&result), start);
        result
    }

    async fn list_all_inner(&self) -> StoreResult<Vec<Record>> {
        let keys = self
            .store
            .keys_with_prefix(&self.prefix)
            .await
            .map_err(|source| StoreError::Transport { source })?;

        tracing::debug!(prefix = %self.prefix, count = keys.len(), "Listing records");

        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let bytes = match self.store.get(&key).await {
                Ok(Some(bytes)) => bytes,
                // Deleted between KEYS and GET. Still a listing failure, not a 404.
                Ok(None) => {
                    return Err(StoreError::Transport {
                        source: BackendError::Unavailable(format!("{} vanished during listing", key)),
                    })
                }
                Err(source) => return Err(StoreError::Transport { source }),
            };
            records.push(decode(&key, &bytes)?);
        }
        Ok(records)
    }
}

fn decode(key: &str, bytes: &[u8]) -> StoreResult<Record> {
    serde_json::from_slice(bytes).map_err(|source| StoreError::Corrupt {
        key: key.to_string(),
        source,
    })
}

fn outcome<T>(result: &StoreResult<T>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(e) => e.label(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::collections::HashSet;

    fn gateway() -> (RecordGateway, MemoryStore) {
        let store = MemoryStore::new();
        (RecordGateway::new(Arc::new(store.clone()), "record:"), store)
    }

    fn draft(name: &str) -> RecordDraft {
        RecordDraft {
            id: None,
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_unique_ids() {
        let (gateway, store) = gateway();

        let mut ids = HashSet::new();
        for _ in 0..20 {
            let record = gateway.create(draft("alice")).await.unwrap();
            assert!(!record.id.is_empty());
            assert!(ids.insert(record.id));
        }
        assert_eq!(store.len(), 20);
    }

    #[tokio::test]
    async fn test_create_keeps_preassigned_id() {
        let (gateway, store) = gateway();
        let record = gateway
            .create(RecordDraft {
                id: Some("fixed".into()),
                name: "alice".into(),
            })
            .await
            .unwrap();
        assert_eq!(record.id, "fixed");
        assert!(store.get("record:fixed").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (gateway, _) = gateway();
        let created = gateway.create(draft("alice")).await.unwrap();

        let fetched = gateway.get_by_id(&created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "alice");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (gateway, _) = gateway();
        let err = gateway.get_by_id("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref key } if key == "record:nope"));
    }

    #[tokio::test]
    async fn test_get_transport_failure() {
        let (gateway, store) = gateway();
        store.fail_reads_of("record:x");
        let err = gateway.get_by_id("x").await.unwrap_err();
        assert!(matches!(err, StoreError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_get_corrupt_payload() {
        let (gateway, store) = gateway();
        store.insert_raw("record:x", "{not json");
        let err = gateway.get_by_id("x").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_create_write_failure() {
        let (gateway, store) = gateway();
        store.fail_writes(true);
        let err = gateway.create(draft("alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::WriteFailed { .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_create_read_back_failure() {
        let (gateway, store) = gateway();
        store.fail_reads_of("record:fixed");
        let err = gateway
            .create(RecordDraft {
                id: Some("fixed".into()),
                name: "alice".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ReadFailed { .. }));
    }

    #[tokio::test]
    async fn test_create_read_back_absent() {
        let (gateway, store) = gateway();
        store.discard_writes(true);
        let err = gateway.create(draft("alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::ReadFailed { .. }));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_create_read_back_corrupt() {
        let (gateway, store) = gateway();
        store.mangle_writes(true);
        let err = gateway
            .create(RecordDraft {
                id: Some("fixed".into()),
                name: "alice".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == "record:fixed"));
    }

    #[tokio::test]
    async fn test_get_lowercase_stored_keys() {
        let (gateway, store) = gateway();
        store.insert_raw("record:x", r#"{"id":"x","name":"lower"}"#);
        let record = gateway.get_by_id("x").await.unwrap();
        assert_eq!(record.name, "lower");
    }

    #[tokio::test]
    async fn test_list_empty() {
        let (gateway, store) = gateway();
        store.insert_raw("other:1", r#"{"ID":"1","Name":"zed"}"#);
        assert!(gateway.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_returns_all_records() {
        let (gateway, _) = gateway();
        gateway.create(draft("alice")).await.unwrap();
        gateway.create(draft("bob")).await.unwrap();

        let records = gateway.list_all().await.unwrap();
        let mut names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["alice", "bob"]);
        assert!(records.iter().all(|r| !r.id.is_empty()));
    }

    #[tokio::test]
    async fn test_list_aborts_on_corrupt_record() {
        let (gateway, store) = gateway();
        gateway.create(draft("alice")).await.unwrap();
        store.insert_raw("record:broken", "garbage");

        let err = gateway.list_all().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == "record:broken"));
    }

    #[tokio::test]
    async fn test_list_aborts_on_failed_read() {
        let (gateway, store) = gateway();
        let record = gateway.create(draft("alice")).await.unwrap();
        gateway.create(draft("bob")).await.unwrap();
        store.fail_reads_of(gateway.key_for(&record.id));

        let err = gateway.list_all().await.unwrap_err();
        assert!(matches!(err, StoreError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_list_key_vanished_is_not_not_found() {
        let (gateway, store) = gateway();
        gateway.create(draft("alice")).await.unwrap();
        let gone = gateway.create(draft("bob")).await.unwrap();
        store.vanish_after_enumeration(gateway.key_for(&gone.id));

        let err = gateway.list_all().await.unwrap_err();
        assert!(matches!(err, StoreError::Transport { .. }));
        assert_eq!(err.kind(), crate::records::ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_list_enumeration_failure() {
        let (gateway, store) = gateway();
        store.fail_enumeration(true);
        let err = gateway.list_all().await.unwrap_err();
        assert!(matches!(err, StoreError::Transport { .. }));
    }
}
