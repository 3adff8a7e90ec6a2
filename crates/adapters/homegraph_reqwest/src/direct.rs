//! Direct route: Home Graph API with a service-account access token.

use homelink_domain::id::AgentUserId;
use homelink_domain::smarthome::{ReportStateRequest, RequestSyncRequest};

use crate::config::HomeGraphConfig;
use crate::error::UplinkError;
use crate::service_account::{ServiceAccount, TokenSource};
use crate::read_status;

pub struct DirectClient {
    client: reqwest::Client,
    endpoint: String,
    tokens: TokenSource,
}

impl DirectClient {
    pub fn new(client: reqwest::Client, config: &HomeGraphConfig, account: ServiceAccount) -> Self {
        Self {
            tokens: TokenSource::new(
                account,
                client.clone(),
                config.token_url.clone(),
                config.scope.clone(),
            ),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub async fn report_state(&self, report: &ReportStateRequest) -> Result<(), UplinkError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .post(format!(
                "{}/v1/devices:reportStateAndNotification",
                self.endpoint
            ))
            .bearer_auth(token)
            .json(report)
            .send()
            .await?;
        read_status("report state", response).await
    }

    pub async fn request_sync(&self, agent_user_id: &AgentUserId) -> Result<(), UplinkError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .post(format!("{}/v1/devices:requestSync", self.endpoint))
            .bearer_auth(token)
            .json(&RequestSyncRequest::new(agent_user_id.clone()))
            .send()
            .await?;
        read_status("request sync", response).await
    }
}
