//! Redis-backed store.
//!
//! # Responsibilities
//! - Resolve the configured address into Redis connection info
//! - Hold one managed connection shared by all requests
//! - Translate GET / SET / KEYS / PING into the `KvStore` contract

use ::redis::aio::{ConnectionManager, ConnectionManagerConfig};
use ::redis::{AsyncCommands, Client, ConnectionInfo, IntoConnectionInfo};
use async_trait::async_trait;

use super::{BackendError, KvStore};
use crate::config::StoreConfig;

/// Store client talking to a single Redis instance.
///
/// Cloning is cheap; clones share the underlying connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Open a connection to the configured instance.
    pub async fn connect(config: &StoreConfig) -> Result<Self, BackendError> {
        let info = connection_info(config)?;
        tracing::debug!(addr = ?info.addr, db = info.redis.db, "Connecting to redis");

        let client = Client::open(info)?;
        // One dial per attempt. A dropped link is re-dialed on the next
        // command, but the command that saw the failure still fails.
        let manager = ConnectionManagerConfig::new().set_number_of_retries(0);
        let conn = client.get_connection_manager_with_config(manager).await?;
        Ok(Self { conn })
    }
}

/// Build connection info from config.
///
/// A bare `host:port` gets the configured db and password. A full
/// `redis://` or `rediss://` URL is taken as-is, except that a configured
/// password is still applied.
pub fn connection_info(config: &StoreConfig) -> Result<ConnectionInfo, BackendError> {
    let address = config.address.trim();
    let has_scheme = address.starts_with("redis://")
        || address.starts_with("rediss://")
        || address.starts_with("redis+unix://")
        || address.starts_with("unix://");

    let mut info = if has_scheme {
        address.into_connection_info()?
    } else {
        let mut info = format!("redis://{}", address).into_connection_info()?;
        info.redis.db = config.db;
        info
    };

    if let Some(password) = &config.password {
        info.redis.password = Some(password.clone());
    }
    Ok(info)
}

/// Escape glob metacharacters so `prefix` matches literally in `KEYS`.
pub fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), BackendError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, BackendError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", escape_glob(prefix));
        let keys: Vec<String> = conn.keys(pattern).await?;
        Ok(keys)
    }

    async fn ping(&self) -> Result<(), BackendError> {
        let mut conn = self.conn.clone();
        let reply: String = ::redis::cmd("PING").query_async(&mut conn).await?;
        if reply != "PONG" {
            return Err(BackendError::Unavailable(format!("unexpected PING reply: {}", reply)));
        }
        Ok(())
    }
}
