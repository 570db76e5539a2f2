//! Redis implementation of the URL repository.

use async_trait::async_trait;
use chrono::TimeDelta;
use redis::{AsyncCommands, Client, RedisError, aio::ConnectionManager};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, info};

use crate::domain::entities::UrlRecord;
use crate::domain::repositories::{StoreError, UrlRepository, ensure_key};

/// Redis repository storing each record as a plain string key with expiry.
///
/// Holds `pool_size` multiplexed connections and spreads commands across them
/// round-robin. Each `ConnectionManager` reconnects on its own after a dropped
/// connection.
pub struct RedisUrlRepository {
    connections: Vec<ConnectionManager>,
    next: AtomicUsize,
    key_prefix: String,
}

impl RedisUrlRepository {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379/0"`)
    /// - `pool_size` - Number of multiplexed connections to open (at least one)
    /// - `key_prefix` - Namespace prepended to every short code
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the URL is invalid, a connection
    /// cannot be established, or the PING fails.
    pub async fn connect(
        redis_url: &str,
        pool_size: usize,
        key_prefix: impl Into<String>,
    ) -> Result<Self, StoreError> {
        info!("Connecting to Redis store ({} connections)", pool_size.max(1));

        let client = Client::open(redis_url).map_err(|e| {
            StoreError::Unavailable(format!("Failed to create Redis client: {}", e))
        })?;

        let mut connections = Vec::with_capacity(pool_size.max(1));
        for _ in 0..pool_size.max(1) {
            let manager = ConnectionManager::new(client.clone()).await.map_err(|e| {
                StoreError::Unavailable(format!("Failed to connect to Redis: {}", e))
            })?;
            connections.push(manager);
        }

        let mut test_conn = connections[0].clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| StoreError::Unavailable(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis store");

        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
            key_prefix: key_prefix.into(),
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, short_code: &str) -> String {
        format!("{}{}", self.key_prefix, short_code)
    }

    fn connection(&self) -> ConnectionManager {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        self.connections[idx].clone()
    }
}

#[async_trait]
impl UrlRepository for RedisUrlRepository {
    async fn save(&self, record: &UrlRecord, ttl: TimeDelta) -> Result<(), StoreError> {
        ensure_key(&record.short_code)?;

        let key = self.build_key(&record.short_code);
        let mut conn = self.connection();

        let mut cmd = redis::cmd("SET");
        cmd.arg(&key).arg(&record.original_url);
        if let Some(millis) = expiry_millis(ttl) {
            cmd.arg("PX").arg(millis);
        }

        cmd.query_async::<()>(&mut conn).await.map_err(|e| {
            error!(short_code = %record.short_code, error = %e, "Failed to save url");
            map_redis_error(e)
        })?;

        debug!(short_code = %record.short_code, ttl_ms = ttl.num_milliseconds(), "Url saved");
        Ok(())
    }

    async fn get(&self, short_code: &str) -> Result<UrlRecord, StoreError> {
        ensure_key(short_code)?;

        let key = self.build_key(short_code);
        let mut conn = self.connection();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(original_url)) => {
                debug!(short_code, "Url retrieved");
                Ok(UrlRecord::with_code(short_code, original_url))
            }
            Ok(None) => {
                debug!(short_code, "Url not found");
                Err(StoreError::NotFound)
            }
            Err(e) => {
                error!(short_code, error = %e, "Failed to get url");
                Err(map_redis_error(e))
            }
        }
    }

    async fn delete(&self, short_code: &str) -> Result<(), StoreError> {
        ensure_key(short_code)?;

        let key = self.build_key(short_code);
        let mut conn = self.connection();

        match conn.del::<_, i64>(&key).await {
            Ok(removed) => {
                debug!(short_code, removed, "Url deleted");
                Ok(())
            }
            Err(e) => {
                error!(short_code, error = %e, "Failed to delete url");
                Err(map_redis_error(e))
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.connection();
        conn.ping::<()>().await.is_ok()
    }
}

/// Converts a ttl into the `PX` argument.
///
/// Zero means no expiry and yields `None`. Positive sub-millisecond values
/// round up to one millisecond. Negative values are passed through so Redis
/// can reject them.
fn expiry_millis(ttl: TimeDelta) -> Option<i64> {
    if ttl.is_zero() {
        return None;
    }
    let millis = ttl.num_milliseconds();
    if millis == 0 && ttl > TimeDelta::zero() {
        return Some(1);
    }
    Some(millis)
}

/// Translates a client error into the repository error set.
fn map_redis_error(e: RedisError) -> StoreError {
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout()
    {
        StoreError::Unavailable(e.to_string())
    } else {
        StoreError::Backend(e.to_string())
    }
}
