//! Redis Streams event transport.

use super::service::{EventPublisher, PublishError, PublishResult};
use crate::domain::url_event::UrlEvent;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, Pipeline, aio::ConnectionManager};
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

/// Delivery acknowledgement level required before a write counts as published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredAcks {
    /// Fire and forget: write errors are logged and ignored.
    None,
    /// The primary must accept the write.
    Leader,
    /// The write must also reach at least one replica (`WAIT`).
    All,
}

impl RequiredAcks {
    /// Parses the numeric acknowledgement level: `0`, `1` or `-1`.
    pub fn from_level(level: i32) -> Option<Self> {
        match level {
            0 => Some(Self::None),
            1 => Some(Self::Leader),
            -1 => Some(Self::All),
            _ => None,
        }
    }
}

/// Transport settings for [`RedisStreamPublisher`].
#[derive(Debug, Clone)]
pub struct StreamPublisherConfig {
    /// Stream key events are appended to.
    pub topic: String,
    /// Upper bound for a single pipeline round trip, also used as the `WAIT` timeout.
    pub write_timeout: Duration,
    pub required_acks: RequiredAcks,
    /// Maximum accumulated payload bytes per pipeline.
    pub batch_bytes: usize,
    /// Total write attempts per pipeline, including the first one.
    pub max_attempts: usize,
    /// Approximate stream length cap (`MAXLEN ~`).
    pub max_len: Option<usize>,
}

impl StreamPublisherConfig {
    /// Longest time one pipeline can take: every attempt hitting `write_timeout`
    /// plus the longest backoff between attempts.
    ///
    /// The caller's own publish timeout must be at least this long, otherwise
    /// retries are cut off before they run.
    pub fn worst_case_write_duration(&self) -> Duration {
        let attempts = u32::try_from(self.max_attempts.max(1)).unwrap_or(u32::MAX);
        let backoff: Duration = retry_delays(self.max_attempts).sum();
        self.write_timeout.saturating_mul(attempts) + backoff
    }
}

/// Backoff delays between attempts, before jitter: 100ms, 200ms, 400ms, ... capped at 1s.
fn retry_delays(max_attempts: usize) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(50)
        .max_delay(Duration::from_secs(1))
        .take(max_attempts.saturating_sub(1))
}

/// Publishes events by appending them to a Redis Stream.
///
/// Each event becomes one stream entry with two fields, `key` (the event kind)
/// and `payload` (the encoded event body). A batch is written as a single
/// pipeline, split so that no pipeline carries more than `batch_bytes` of
/// payload. Failed pipelines are retried with exponential backoff up to
/// `max_attempts` times; retries belong to the transport, not to callers.
pub struct RedisStreamPublisher {
    conn: ConnectionManager,
    config: StreamPublisherConfig,
}

impl RedisStreamPublisher {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Connection`] if the URL is invalid, the connection
    /// cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, config: StreamPublisherConfig) -> PublishResult<Self> {
        info!(topic = %config.topic, "Connecting event transport");

        let client = Client::open(redis_url).map_err(|e| {
            PublishError::Connection(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            PublishError::Connection(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| PublishError::Connection(format!("Redis PING failed: {}", e)))?;

        info!("✓ Event transport connected");

        Ok(Self {
            conn: manager,
            config,
        })
    }

    async fn send_chunk(&self, chunk: &[UrlEvent]) -> PublishResult<()> {
        let pipe = build_pipeline(&self.config, chunk);
        let strategy = retry_delays(self.config.max_attempts).map(jitter);

        Retry::spawn(strategy, || self.write_once(&pipe, chunk.len())).await
    }

    async fn write_once(&self, pipe: &Pipeline, count: usize) -> PublishResult<()> {
        let mut conn = self.conn.clone();
        let timeout = self.config.write_timeout;

        let write = async {
            match self.config.required_acks {
                RequiredAcks::None => {
                    if let Err(e) = pipe.query_async::<()>(&mut conn).await {
                        debug!(error = %e, count, "Unacknowledged stream write failed");
                    }
                    Ok(())
                }
                RequiredAcks::Leader => pipe
                    .query_async::<()>(&mut conn)
                    .await
                    .map_err(|e| PublishError::Write(e.to_string())),
                RequiredAcks::All => {
                    let replicas: Vec<i64> = pipe
                        .query_async(&mut conn)
                        .await
                        .map_err(|e| PublishError::Write(e.to_string()))?;
                    ensure_replicated(&replicas)
                }
            }
        };

        match tokio::time::timeout(timeout, write).await {
            Ok(result) => {
                if let Err(e) = &result {
                    warn!(error = %e, count, "Stream write attempt failed");
                }
                result
            }
            Err(_) => {
                warn!(count, ?timeout, "Stream write attempt timed out");
                Err(PublishError::Timeout(timeout))
            }
        }
    }
}

#[async_trait]
impl EventPublisher for RedisStreamPublisher {
    async fn publish(&self, event: &UrlEvent) -> PublishResult<()> {
        self.send_chunk(std::slice::from_ref(event)).await
    }

    async fn publish_batch(&self, events: &[UrlEvent]) -> PublishResult<()> {
        for chunk in chunk_by_bytes(events, self.config.batch_bytes) {
            self.send_chunk(chunk).await?;
            debug!(count = chunk.len(), topic = %self.config.topic, "Events appended to stream");
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        conn.ping::<()>().await.is_ok()
    }
}

/// Builds one pipeline of `XADD` commands, followed by `WAIT` when replica
/// acknowledgement is required.
///
/// `XADD` replies are ignored, so the pipeline yields either nothing or the
/// single `WAIT` reply.
fn build_pipeline(config: &StreamPublisherConfig, events: &[UrlEvent]) -> Pipeline {
    let mut pipe = redis::pipe();

    for event in events {
        let cmd = pipe.cmd("XADD").arg(&config.topic);
        if let Some(max_len) = config.max_len {
            cmd.arg("MAXLEN").arg("~").arg(max_len);
        }
        cmd.arg("*")
            .arg("key")
            .arg(event.key())
            .arg("payload")
            .arg(event.payload())
            .ignore();
    }

    if config.required_acks == RequiredAcks::All {
        pipe.cmd("WAIT")
            .arg(1)
            .arg(config.write_timeout.as_millis() as u64);
    }

    pipe
}

fn ensure_replicated(replies: &[i64]) -> PublishResult<()> {
    match replies.last() {
        Some(&replicas) if replicas >= 1 => Ok(()),
        Some(&replicas) => Err(PublishError::NotAcknowledged(format!(
            "{} replicas acknowledged the write",
            replicas
        ))),
        None => Err(PublishError::NotAcknowledged(
            "missing WAIT reply".to_string(),
        )),
    }
}

/// Splits `events` into consecutive chunks whose payloads total at most `limit` bytes.
///
/// A single event larger than `limit` still forms its own chunk.
fn chunk_by_bytes(events: &[UrlEvent], limit: usize) -> Vec<&[UrlEvent]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut size = 0;

    for (i, event) in events.iter().enumerate() {
        let len = event.payload().len();
        if i > start && size + len > limit {
            chunks.push(&events[start..i]);
            start = i;
            size = 0;
        }
        size += len;
    }

    if start < events.len() {
        chunks.push(&events[start..]);
    }

    chunks
}
