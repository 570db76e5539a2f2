//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /api/health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Store**: Record store PING
/// 2. **Event Queue**: Checks the notification queue is open and reports free slots
/// 3. **Event Transport**: Transport PING
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "store": { "status": "ok", "message": "Store reachable" },
///     "event_queue": { "status": "ok", "message": "Free slots: 10000/10000" },
///     "event_transport": { "status": "ok", "message": "Transport reachable" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let (store, event_transport) = tokio::join!(check_store(&state), check_transport(&state));
    let event_queue = check_event_queue(&state);

    let all_healthy = store.is_ok() && event_queue.is_ok() && event_transport.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            store,
            event_queue,
            event_transport,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_store(state: &AppState) -> CheckStatus {
    if state.url_service.store_healthy().await {
        CheckStatus::ok("Store reachable")
    } else {
        CheckStatus::error("Store connection failed")
    }
}

fn check_event_queue(state: &AppState) -> CheckStatus {
    let notifier = &state.event_notifier;
    if notifier.is_closed() {
        CheckStatus::error("Event queue is closed")
    } else {
        CheckStatus::ok(format!(
            "Free slots: {}/{}",
            notifier.capacity(),
            notifier.max_capacity()
        ))
    }
}

async fn check_transport(state: &AppState) -> CheckStatus {
    if state.publisher.health_check().await {
        CheckStatus::ok("Transport reachable")
    } else {
        CheckStatus::error("Transport connection failed")
    }
}
