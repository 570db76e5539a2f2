//! Background dispatch of mutation events.
//!
//! Request handlers never publish directly. They hand events to an
//! [`EventNotifier`], which enqueues them without waiting, and a single
//! dispatcher task ([`run_event_worker`]) publishes them in the background.
//!
//! # Guarantees
//!
//! - Enqueueing never blocks and never fails the caller; a full or closed queue
//!   drops the event (at-most-once delivery)
//! - At most `concurrency` publishes are in flight at any time
//! - Every publish runs under its own timeout, detached from the request that
//!   produced the event, so a cancelled request does not cancel its event
//! - Publish failures are logged and counted, never retried here

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use crate::domain::url_event::UrlEvent;
use crate::infrastructure::events::EventPublisher;

/// Settings for the event dispatcher.
#[derive(Debug, Clone)]
pub struct EventWorkerConfig {
    /// Maximum queued events before new ones are dropped.
    pub queue_capacity: usize,
    /// Maximum concurrent publish tasks.
    pub concurrency: usize,
    /// Maximum events handed to the publisher in one call.
    pub batch_size: usize,
    /// Timeout applied to each publish task.
    pub publish_timeout: Duration,
}

impl Default for EventWorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 10_000,
            concurrency: 4,
            batch_size: 100,
            publish_timeout: Duration::from_secs(2),
        }
    }
}

/// Non-blocking handle for enqueueing events.
///
/// Cloneable; the worker stops once every handle has been dropped and the
/// queue is drained.
#[derive(Debug, Clone)]
pub struct EventNotifier {
    sender: mpsc::Sender<UrlEvent>,
}

impl EventNotifier {
    /// Creates a notifier and the receiving end of its queue.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<UrlEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Enqueues an event without waiting.
    ///
    /// Drops the event with a warning if the queue is full or the worker has stopped.
    pub fn notify(&self, event: UrlEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(
                    event = event.key(),
                    short_code = event.short_code(),
                    "Event queue full, dropping event"
                );
                counter!("url_events_dropped_total", "reason" => "queue_full").increment(1);
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                warn!(
                    event = event.key(),
                    short_code = event.short_code(),
                    "Event worker stopped, dropping event"
                );
                counter!("url_events_dropped_total", "reason" => "closed").increment(1);
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Free slots currently available in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

/// Creates the event queue and spawns its dispatcher task.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_event_worker(
    publisher: Arc<dyn EventPublisher>,
    config: EventWorkerConfig,
) -> (EventNotifier, JoinHandle<()>) {
    let (notifier, receiver) = EventNotifier::channel(config.queue_capacity);
    let handle = tokio::spawn(run_event_worker(receiver, publisher, config));
    (notifier, handle)
}

/// Drains the event queue until every [`EventNotifier`] is dropped.
///
/// Pulls up to `batch_size` queued events at a time and publishes each batch on
/// its own task, gated by a semaphore of `concurrency` permits. Returns after the
/// queue closes and all in-flight publishes have finished or timed out.
pub async fn run_event_worker(
    mut receiver: mpsc::Receiver<UrlEvent>,
    publisher: Arc<dyn EventPublisher>,
    config: EventWorkerConfig,
) {
    let batch_size = config.batch_size.max(1);
    let permits = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let mut in_flight = JoinSet::new();
    let mut batch = Vec::with_capacity(batch_size);

    info!(
        concurrency = config.concurrency,
        batch_size, "Event worker started"
    );

    while receiver.recv_many(&mut batch, batch_size).await > 0 {
        let events = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));

        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let publisher = publisher.clone();
        let timeout = config.publish_timeout;
        in_flight.spawn(async move {
            let _permit = permit;
            publish_with_timeout(publisher.as_ref(), &events, timeout).await;
        });

        while let Some(result) = in_flight.try_join_next() {
            if let Err(e) = result {
                error!(error = %e, "Event publish task panicked");
            }
        }
    }

    while let Some(result) = in_flight.join_next().await {
        if let Err(e) = result {
            error!(error = %e, "Event publish task panicked");
        }
    }

    info!("Event worker stopped");
}

async fn publish_with_timeout(
    publisher: &dyn EventPublisher,
    events: &[UrlEvent],
    timeout: Duration,
) {
    let count = events.len() as u64;

    match tokio::time::timeout(timeout, publisher.publish_batch(events)).await {
        Ok(Ok(())) => {
            debug!(count, "Events published");
            counter!("url_events_published_total").increment(count);
        }
        Ok(Err(e)) => {
            for event in events {
                error!(
                    error = %e,
                    event = event.key(),
                    short_code = event.short_code(),
                    "Event publish failed"
                );
            }
            counter!("url_events_failed_total", "reason" => "error").increment(count);
        }
        Err(_) => {
            for event in events {
                error!(
                    ?timeout,
                    event = event.key(),
                    short_code = event.short_code(),
                    "Event publish timed out"
                );
            }
            counter!("url_events_failed_total", "reason" => "timeout").increment(count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::events::{MockEventPublisher, PublishError, PublishResult};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records published events, optionally failing or stalling.
    #[derive(Default)]
    struct RecordingPublisher {
        events: Mutex<Vec<UrlEvent>>,
        fail: bool,
        delay: Option<Duration>,
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl RecordingPublisher {
        fn published(&self) -> Vec<UrlEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish(&self, event: &UrlEvent) -> PublishResult<()> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.active.fetch_sub(1, Ordering::SeqCst);

            if self.fail {
                return Err(PublishError::Write("broker down".to_string()));
            }
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }

        async fn health_check(&self) -> bool {
            !self.fail
        }
    }

    fn config(concurrency: usize, batch_size: usize, timeout_ms: u64) -> EventWorkerConfig {
        EventWorkerConfig {
            queue_capacity: 100,
            concurrency,
            batch_size,
            publish_timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[tokio::test]
    async fn test_worker_publishes_queued_events() {
        let publisher = Arc::new(RecordingPublisher::default());
        let (notifier, handle) = spawn_event_worker(publisher.clone(), config(2, 10, 1000));

        notifier.notify(UrlEvent::created("aaaa1111", "https://a.com"));
        notifier.notify(UrlEvent::deleted("aaaa1111"));
        drop(notifier);

        handle.await.unwrap();

        let published = publisher.published();
        assert_eq!(published.len(), 2);
        assert!(published.contains(&UrlEvent::created("aaaa1111", "https://a.com")));
        assert!(published.contains(&UrlEvent::deleted("aaaa1111")));
    }

    #[tokio::test]
    async fn test_worker_survives_publish_failures() {
        let publisher = Arc::new(RecordingPublisher {
            fail: true,
            ..Default::default()
        });
        let (notifier, handle) = spawn_event_worker(publisher.clone(), config(1, 1, 1000));

        for i in 0..5 {
            notifier.notify(UrlEvent::deleted(format!("code{:04}", i)));
        }
        drop(notifier);

        handle.await.unwrap();
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn test_failed_batch_is_published_once_and_not_retried() {
        let mut publisher = MockEventPublisher::new();
        publisher
            .expect_publish_batch()
            .withf(|events| events.len() == 1 && events[0] == UrlEvent::deleted("once0000"))
            .times(1)
            .returning(|_| Err(PublishError::Write("broker down".to_string())));
        publisher.expect_publish().times(0);

        let (notifier, handle) = spawn_event_worker(Arc::new(publisher), config(1, 10, 1000));

        notifier.notify(UrlEvent::deleted("once0000"));
        drop(notifier);

        // Expectations are checked when the worker drops the last publisher handle
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_stalled_publish_is_abandoned_after_timeout() {
        let publisher = Arc::new(RecordingPublisher {
            delay: Some(Duration::from_secs(30)),
            ..Default::default()
        });
        let (notifier, handle) = spawn_event_worker(publisher.clone(), config(1, 1, 50));

        notifier.notify(UrlEvent::deleted("slow0000"));
        drop(notifier);

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("worker should stop once the publish times out")
            .unwrap();
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn test_in_flight_publishes_are_bounded() {
        let publisher = Arc::new(RecordingPublisher {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let (notifier, handle) = spawn_event_worker(publisher.clone(), config(2, 1, 1000));

        for i in 0..10 {
            notifier.notify(UrlEvent::deleted(format!("code{:04}", i)));
        }
        drop(notifier);

        handle.await.unwrap();
        assert_eq!(publisher.published().len(), 10);
        assert!(publisher.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_notify_drops_when_queue_full() {
        let (notifier, mut receiver) = EventNotifier::channel(1);

        notifier.notify(UrlEvent::deleted("first000"));
        notifier.notify(UrlEvent::deleted("second00"));
        notifier.notify(UrlEvent::deleted("third000"));
        drop(notifier);

        assert_eq!(receiver.recv().await, Some(UrlEvent::deleted("first000")));
        assert_eq!(receiver.recv().await, None);
    }

    #[tokio::test]
    async fn test_notify_after_worker_stopped_does_not_panic() {
        let (notifier, receiver) = EventNotifier::channel(4);
        drop(receiver);

        assert!(notifier.is_closed());
        notifier.notify(UrlEvent::deleted("orphan00"));
    }

    #[tokio::test]
    async fn test_notifier_reports_capacity() {
        let (notifier, _receiver) = EventNotifier::channel(8);

        assert_eq!(notifier.max_capacity(), 8);
        notifier.notify(UrlEvent::deleted("abcd0000"));
        assert_eq!(notifier.capacity(), 7);
    }
}
