//! Axum router assembly.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use homelink_app::ports::{DeviceHost, KeyValueStore, Uplink};
use homelink_domain::smarthome::{FulfillmentRequest, FulfillmentResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<H, S, U>(state: AppState<H, S, U>) -> Router
where
    H: DeviceHost + Clone + Send + Sync + 'static,
    S: KeyValueStore + Send + Sync + 'static,
    U: Uplink + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/fulfillment", post(fulfillment::<H, S, U>))
        .route("/link/reset", post(reset_link::<H, S, U>))
        .route("/sync", post(request_sync::<H, S, U>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

/// `POST /fulfillment`
async fn fulfillment<H, S, U>(
    State(state): State<AppState<H, S, U>>,
    Json(request): Json<FulfillmentRequest>,
) -> Json<FulfillmentResponse>
where
    H: DeviceHost + Clone + Send + Sync + 'static,
    S: KeyValueStore + Send + Sync + 'static,
    U: Uplink + Send + Sync + 'static,
{
    tracing::debug!(
        body = %serde_json::to_string(&request).unwrap_or_default(),
        "fulfillment request"
    );
    let response = state.fulfillment.handle(request).await;
    tracing::debug!(
        body = %serde_json::to_string(&response).unwrap_or_default(),
        "fulfillment response"
    );
    Json(response)
}

/// `POST /link/reset`
///
/// Every device counts as newly linked under the fresh token, so a sync is
/// requested right away.
async fn reset_link<H, S, U>(
    State(state): State<AppState<H, S, U>>,
) -> Result<StatusCode, ApiError>
where
    H: DeviceHost + Clone + Send + Sync + 'static,
    S: KeyValueStore + Send + Sync + 'static,
    U: Uplink + Send + Sync + 'static,
{
    let token = state.session.reset_link().await?;
    tracing::info!(link_token = %token, "account link reset");
    state.sync_requester.request_sync().await;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /sync`
async fn request_sync<H, S, U>(State(state): State<AppState<H, S, U>>) -> StatusCode
where
    H: DeviceHost + Clone + Send + Sync + 'static,
    S: KeyValueStore + Send + Sync + 'static,
    U: Uplink + Send + Sync + 'static,
{
    state.sync_requester.request_sync().await;
    StatusCode::ACCEPTED
}
