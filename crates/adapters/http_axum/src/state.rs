//! Shared application state for axum handlers.

use std::sync::Arc;

use homelink_app::ports::{DeviceHost, KeyValueStore, Uplink};
use homelink_app::services::fulfillment::Fulfillment;
use homelink_app::services::session::Session;
use homelink_app::services::sync_requester::SyncRequester;

/// Application state shared across all axum handlers.
///
/// Generic over the host, the key/value store and the uplink to avoid
/// dynamic dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<H, S, U> {
    /// SYNC / QUERY / EXECUTE / DISCONNECT orchestration.
    pub fulfillment: Arc<Fulfillment<H, S, U>>,
    /// Link token and agent user id bookkeeping.
    pub session: Arc<Session<S>>,
    pub sync_requester: Arc<SyncRequester<U>>,
}

impl<H, S, U> Clone for AppState<H, S, U> {
    fn clone(&self) -> Self {
        Self {
            fulfillment: Arc::clone(&self.fulfillment),
            session: Arc::clone(&self.session),
            sync_requester: Arc::clone(&self.sync_requester),
        }
    }
}

impl<H, S, U> AppState<H, S, U>
where
    H: DeviceHost + Clone + Send + Sync + 'static,
    S: KeyValueStore + Send + Sync + 'static,
    U: Uplink + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// The session and sync requester are shared with the state reporter
    /// and the fulfillment service, so they are handed in already wrapped.
    pub fn from_arcs(
        fulfillment: Arc<Fulfillment<H, S, U>>,
        session: Arc<Session<S>>,
        sync_requester: Arc<SyncRequester<U>>,
    ) -> Self {
        Self {
            fulfillment,
            session,
            sync_requester,
        }
    }
}
