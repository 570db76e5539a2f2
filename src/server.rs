//! HTTP server initialization and runtime setup.
//!
//! Handles store and event transport connections, event worker spawning, and
//! the Axum server lifecycle including graceful shutdown.

use crate::application::services::UrlService;
use crate::config::{Config, StoreBackend};
use crate::domain::event_worker::{EventNotifier, spawn_event_worker};
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::events::{EventPublisher, NullPublisher, RedisStreamPublisher};
use crate::infrastructure::persistence::{MemoryUrlRepository, RedisUrlRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Extra time granted to the event worker after the last publish timeout.
const WORKER_DRAIN_GRACE: Duration = Duration::from_secs(5);

/// Fully wired service components shared by the HTTP server and the admin CLI.
pub struct Components {
    pub url_service: Arc<UrlService>,
    pub publisher: Arc<dyn EventPublisher>,
    pub event_notifier: EventNotifier,
    pub event_worker: JoinHandle<()>,
}

impl Components {
    /// Splits the components into handler state and the worker handle.
    pub fn into_state(self) -> (AppState, JoinHandle<()>) {
        let state = AppState::new(self.url_service, self.publisher, self.event_notifier);
        (state, self.event_worker)
    }
}

/// Connects the record store and event transport and starts the event worker.
///
/// The store is required: a Redis store that cannot be reached aborts startup.
/// The event transport is optional: when disabled or unreachable, events are
/// dropped by a [`NullPublisher`] and the service keeps serving requests.
///
/// # Errors
///
/// Returns an error if the Redis store cannot be reached.
pub async fn build_components(config: &Config) -> Result<Components> {
    let repository: Arc<dyn UrlRepository> = match config.store_backend {
        StoreBackend::Redis => Arc::new(
            RedisUrlRepository::connect(
                &config.redis_url,
                config.redis_pool_size,
                config.redis_key_prefix.clone(),
            )
            .await
            .context("Failed to connect to Redis store")?,
        ),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; records are lost on restart");
            Arc::new(MemoryUrlRepository::new())
        }
    };

    let publisher: Arc<dyn EventPublisher> = if config.events_enabled {
        match RedisStreamPublisher::connect(
            &config.events_redis_url,
            config.stream_publisher_config(),
        )
        .await
        {
            Ok(publisher) => {
                tracing::info!("Event notifications enabled (Redis stream)");
                Arc::new(publisher)
            }
            Err(e) => {
                tracing::warn!("Failed to connect event transport: {}. Using NullPublisher.", e);
                Arc::new(NullPublisher::new())
            }
        }
    } else {
        tracing::info!("Event notifications disabled (NullPublisher)");
        Arc::new(NullPublisher::new())
    };

    let (event_notifier, event_worker) =
        spawn_event_worker(publisher.clone(), config.event_worker_config());
    tracing::info!("Event worker started");

    let url_service = Arc::new(UrlService::new(repository, event_notifier.clone()));

    Ok(Components {
        url_service,
        publisher,
        event_notifier,
        event_worker,
    })
}

/// Waits for the event worker to drain queued and in-flight events.
///
/// Every [`EventNotifier`] must be dropped before calling this, otherwise the
/// worker keeps waiting for new events until `limit` elapses.
pub async fn drain_event_worker(handle: JoinHandle<()>, limit: Duration) {
    match tokio::time::timeout(limit, handle).await {
        Ok(Ok(())) => tracing::info!("Event worker drained"),
        Ok(Err(e)) => tracing::error!(error = %e, "Event worker terminated abnormally"),
        Err(_) => tracing::warn!(?limit, "Event worker did not drain in time; pending events dropped"),
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Record store (Redis or in-memory)
/// - Event transport (Redis stream or NullPublisher fallback)
/// - Background event worker
/// - Axum HTTP server
///
/// On Ctrl+C or SIGTERM the server stops accepting connections, finishes
/// in-flight requests and then waits for queued events to be published.
///
/// # Errors
///
/// Returns an error if:
/// - Store connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let components = build_components(&config).await?;
    let (state, event_worker) = components.into_state();

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped, draining event worker");
    let limit = Duration::from_millis(config.event_publish_timeout_ms) + WORKER_DRAIN_GRACE;
    drain_event_worker(event_worker, limit).await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
