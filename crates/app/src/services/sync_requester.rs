//! Sync requester: asks the assistant cloud to send a fresh SYNC.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use homelink_domain::id::AgentUserId;

use super::log_uplink_failure;
use crate::ports::Uplink;

pub struct SyncRequester<U> {
    uplink: U,
    agent_user_id: AgentUserId,
}

impl<U> SyncRequester<U>
where
    U: Uplink + Send + Sync + 'static,
{
    pub fn new(uplink: U, agent_user_id: AgentUserId) -> Self {
        Self {
            uplink,
            agent_user_id,
        }
    }

    /// Request a sync now. Failures are logged, not returned.
    #[tracing::instrument(skip(self), fields(agent_user_id = %self.agent_user_id))]
    pub async fn request_sync(&self) {
        match self.uplink.request_sync(&self.agent_user_id).await {
            Ok(()) => tracing::info!("sync requested"),
            Err(err) => log_uplink_failure("request sync", &err),
        }
    }

    /// Request a sync once `delay` has elapsed.
    pub fn schedule(self: &Arc<Self>, delay: Duration) -> JoinHandle<()> {
        tracing::debug!(delay_secs = delay.as_secs(), "sync request scheduled");
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.request_sync().await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::RecordingUplink;

    #[tokio::test]
    async fn should_request_sync_for_agent_user() {
        let uplink = Arc::new(RecordingUplink::default());
        let requester = SyncRequester::new(Arc::clone(&uplink), AgentUserId::new("agent"));

        requester.request_sync().await;

        assert_eq!(
            *uplink.syncs.lock().unwrap(),
            vec![AgentUserId::new("agent")]
        );
    }

    #[tokio::test]
    async fn should_swallow_missing_credential() {
        let uplink = Arc::new(RecordingUplink::without_credential());
        let requester = SyncRequester::new(Arc::clone(&uplink), AgentUserId::new("agent"));

        requester.request_sync().await;

        assert_eq!(uplink.sync_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_request_sync_only_after_delay() {
        let uplink = Arc::new(RecordingUplink::default());
        let requester = Arc::new(SyncRequester::new(
            Arc::clone(&uplink),
            AgentUserId::new("agent"),
        ));

        let handle = requester.schedule(Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(uplink.sync_count(), 0);

        handle.await.unwrap();
        assert_eq!(uplink.sync_count(), 1);
    }
}
