//! Relay route: a companion service forwarding calls with its own credential.

use std::io::ErrorKind;
use std::path::PathBuf;

use homelink_domain::id::AgentUserId;
use homelink_domain::smarthome::ReportStateRequest;

use crate::config::RelayConfig;
use crate::error::UplinkError;
use crate::read_status;

pub struct RelayClient {
    client: reqwest::Client,
    base_url: String,
    token_path: PathBuf,
}

impl RelayClient {
    /// `None` when no token file is configured.
    pub fn new(client: reqwest::Client, config: &RelayConfig) -> Option<Self> {
        let token_path = config.token_path.clone()?;
        Some(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token_path,
        })
    }

    /// The token may be rotated by the relay's own tooling, so it is read
    /// on every call.
    async fn token(&self) -> Result<String, UplinkError> {
        match tokio::fs::read_to_string(&self.token_path).await {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Err(UplinkError::MissingToken)
                } else {
                    Ok(token.to_string())
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Err(UplinkError::MissingToken),
            Err(err) => Err(UplinkError::TokenFile(err)),
        }
    }

    pub async fn report_state(&self, report: &ReportStateRequest) -> Result<(), UplinkError> {
        let token = self.token().await?;
        let response = self
            .client
            .post(format!("{}/_punch/reportState", self.base_url))
            .bearer_auth(token)
            .json(report)
            .send()
            .await?;
        read_status("report state", response).await
    }

    pub async fn request_sync(&self, agent_user_id: &AgentUserId) -> Result<(), UplinkError> {
        let token = self.token().await?;
        let response = self
            .client
            .get(format!("{}/_punch/requestSync", self.base_url))
            .query(&[("agentUserId", agent_user_id.as_str())])
            .bearer_auth(token)
            .send()
            .await?;
        read_status("request sync", response).await
    }
}
