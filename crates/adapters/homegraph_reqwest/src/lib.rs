//! # homelink-adapter-homegraph-reqwest
//!
//! [`Uplink`] implementation built on [reqwest](https://docs.rs/reqwest).
//!
//! ## Routes
//!
//! | Route | When | Calls |
//! |-------|------|-------|
//! | Direct | a service-account credential parses | `POST {endpoint}/v1/devices:reportStateAndNotification`, `POST {endpoint}/v1/devices:requestSync` |
//! | Relay | otherwise, if a relay token file is configured | `POST {relay}/_punch/reportState`, `GET {relay}/_punch/requestSync?agentUserId=` |
//!
//! With neither route available every call fails with
//! [`HomelinkError::MissingCredential`], which callers log as a warning.
//!
//! ## Dependency rule
//!
//! Depends on `homelink-app` (port traits) and `homelink-domain` only.

pub mod config;
mod direct;
pub mod error;
mod relay;
pub mod service_account;

use homelink_app::ports::Uplink;
use homelink_domain::error::HomelinkError;
use homelink_domain::id::AgentUserId;
use homelink_domain::smarthome::ReportStateRequest;

pub use config::{HomeGraphConfig, RelayConfig};
pub use error::UplinkError;
pub use service_account::ServiceAccount;

use direct::DirectClient;
use relay::RelayClient;

/// Outbound path to the assistant cloud, picking the direct route over the
/// relay once at construction.
pub struct HomeGraphUplink {
    direct: Option<DirectClient>,
    relay: Option<RelayClient>,
}

impl HomeGraphUplink {
    /// Build the uplink from an optional service-account JSON blob.
    ///
    /// A credential that does not parse is logged and ignored, leaving the
    /// relay (if any) in charge.
    ///
    /// # Errors
    ///
    /// Returns [`UplinkError::Http`] if the HTTP client cannot be built.
    pub fn new(
        homegraph: &HomeGraphConfig,
        relay: &RelayConfig,
        credential: Option<&str>,
    ) -> Result<Self, UplinkError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("homelink/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let direct = credential.and_then(|blob| match ServiceAccount::from_json(blob) {
            Ok(account) => {
                tracing::info!(client_email = account.client_email(), "using direct Home Graph route");
                Some(DirectClient::new(client.clone(), homegraph, account))
            }
            Err(err) => {
                tracing::warn!(error = ?err, "ignoring unusable service account credential");
                None
            }
        });

        let relay = if direct.is_none() {
            let relay = RelayClient::new(client, relay);
            if relay.is_some() {
                tracing::info!("using relay route");
            } else {
                tracing::warn!("no uplink route configured, state reports will be skipped");
            }
            relay
        } else {
            None
        };

        Ok(Self { direct, relay })
    }

    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.direct.is_some()
    }
}

impl Uplink for HomeGraphUplink {
    async fn report_state(&self, report: &ReportStateRequest) -> Result<(), HomelinkError> {
        tracing::debug!(
            request_id = %report.request_id,
            devices = report.states().len(),
            "sending state report"
        );
        match (&self.direct, &self.relay) {
            (Some(direct), _) => Ok(direct.report_state(report).await?),
            (None, Some(relay)) => Ok(relay.report_state(report).await?),
            (None, None) => Err(HomelinkError::MissingCredential),
        }
    }

    async fn request_sync(&self, agent_user_id: &AgentUserId) -> Result<(), HomelinkError> {
        match (&self.direct, &self.relay) {
            (Some(direct), _) => Ok(direct.request_sync(agent_user_id).await?),
            (None, Some(relay)) => Ok(relay.request_sync(agent_user_id).await?),
            (None, None) => Err(HomelinkError::MissingCredential),
        }
    }
}

/// Drain the response, turning a non-2xx status into an error carrying the body.
async fn read_status(
    operation: &'static str,
    response: reqwest::Response,
) -> Result<(), UplinkError> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if status.is_success() {
        tracing::debug!(operation, %status, body = %body, "uplink call succeeded");
        Ok(())
    } else {
        Err(UplinkError::Status {
            operation,
            status,
            body,
        })
    }
}
