//! Application services: use-case orchestration over the ports.

pub mod dispatcher;
pub mod fulfillment;
pub mod session;
pub mod state_reporter;
pub mod sync_requester;

#[cfg(test)]
mod testing;

use homelink_domain::error::HomelinkError;

/// Outbound failures are never retried; a missing credential is expected
/// on unconfigured installs and only warrants a warning.
pub(crate) fn log_uplink_failure(operation: &'static str, error: &HomelinkError) {
    match error {
        HomelinkError::MissingCredential => {
            tracing::warn!(operation, "no uplink credential configured, call skipped");
        }
        other => tracing::error!(operation, error = ?other, "uplink call failed"),
    }
}
