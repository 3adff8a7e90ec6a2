//! Uplink port: outbound calls to the assistant cloud.

use std::future::Future;

use homelink_domain::error::HomelinkError;
use homelink_domain::id::AgentUserId;
use homelink_domain::smarthome::ReportStateRequest;

/// Outbound path to the assistant cloud.
///
/// Implementations return [`HomelinkError::MissingCredential`] when no
/// route is configured, so callers can log it as a warning and move on.
pub trait Uplink {
    fn report_state(
        &self,
        report: &ReportStateRequest,
    ) -> impl Future<Output = Result<(), HomelinkError>> + Send;

    fn request_sync(
        &self,
        agent_user_id: &AgentUserId,
    ) -> impl Future<Output = Result<(), HomelinkError>> + Send;
}

impl<T: Uplink + Send + Sync> Uplink for std::sync::Arc<T> {
    fn report_state(
        &self,
        report: &ReportStateRequest,
    ) -> impl Future<Output = Result<(), HomelinkError>> + Send {
        (**self).report_state(report)
    }

    fn request_sync(
        &self,
        agent_user_id: &AgentUserId,
    ) -> impl Future<Output = Result<(), HomelinkError>> + Send {
        (**self).request_sync(agent_user_id)
    }
}
