//! Startup orchestration.
//!
//! # Responsibilities
//! - Connect to the key-value store
//! - Verify connectivity once, within a bounded time
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, there is no retry loop
//! - The listener is bound only after the store answered

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use crate::config::StoreConfig;
use crate::store::{BackendError, KvStore, RedisStore};

/// Fatal errors raised before the service accepts traffic.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("store connectivity check failed: {0}")]
    Store(#[source] BackendError),

    #[error("store did not answer within {0} seconds")]
    StoreTimeout(u64),
}

/// Run the connectivity check against an already-constructed store.
pub async fn verify_store(store: &dyn KvStore, timeout_secs: u64) -> Result<(), StartupError> {
    let deadline = Instant::now() + Duration::from_secs(timeout_secs);
    ping_before(store, deadline, timeout_secs).await
}

async fn ping_before(
    store: &dyn KvStore,
    deadline: Instant,
    timeout_secs: u64,
) -> Result<(), StartupError> {
    match timeout_at(deadline, store.ping()).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(StartupError::Store(e)),
        Err(_) => Err(StartupError::StoreTimeout(timeout_secs)),
    }
}

/// Connect to Redis and ping it.
pub async fn connect_store(config: &StoreConfig) -> Result<Arc<dyn KvStore>, StartupError> {
    let store = connect_within(RedisStore::connect(config), config.connect_timeout_secs).await?;
    tracing::info!(address = %config.address, db = config.db, "Store connectivity verified");
    Ok(store)
}

/// Await `connect`, then ping the result. Both steps share one deadline.
async fn connect_within<F, S>(
    connect: F,
    timeout_secs: u64,
) -> Result<Arc<dyn KvStore>, StartupError>
where
    F: Future<Output = Result<S, BackendError>>,
    S: KvStore + 'static,
{
    let deadline = Instant::now() + Duration::from_secs(timeout_secs);

    let store = match timeout_at(deadline, connect).await {
        Ok(Ok(store)) => store,
        Ok(Err(e)) => return Err(StartupError::Store(e)),
        Err(_) => return Err(StartupError::StoreTimeout(timeout_secs)),
    };

    ping_before(&store, deadline, timeout_secs).await?;
    Ok(Arc::new(store))
}
