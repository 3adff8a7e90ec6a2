//! Session: the few values homelink persists between restarts.
//!
//! | Key | Value |
//! |-----|-------|
//! | `linkTracker` | current [`LinkToken`] |
//! | `agentUserId` | [`AgentUserId`] sent with every SYNC and report |
//! | `link-<device id>` | token the device was last synced under |
//! | `disconnected` | present once the account has been unlinked |
//! | `jwt` | optional service-account credential (JSON) |

use std::sync::{PoisonError, RwLock};

use homelink_domain::error::HomelinkError;
use homelink_domain::id::{AgentUserId, DeviceId, LinkToken};

use crate::ports::KeyValueStore;

pub mod keys {
    pub const LINK_TRACKER: &str = "linkTracker";
    pub const AGENT_USER_ID: &str = "agentUserId";
    pub const DISCONNECTED: &str = "disconnected";
    pub const CREDENTIAL: &str = "jwt";

    /// Key holding the link token `device_id` was synced under.
    #[must_use]
    pub fn device_link(device_id: &str) -> String {
        format!("link-{device_id}")
    }
}

/// Link bookkeeping over an injected [`KeyValueStore`].
pub struct Session<S> {
    store: S,
    agent_user_id: AgentUserId,
    link_token: RwLock<LinkToken>,
}

impl<S: KeyValueStore + Send + Sync> Session<S> {
    /// Read the persisted tracker and agent id, creating and persisting
    /// whichever is missing.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    #[tracing::instrument(skip(store))]
    pub async fn load(store: S) -> Result<Self, HomelinkError> {
        let link_token = match non_empty(store.get(keys::LINK_TRACKER).await?) {
            Some(value) => LinkToken::new(value),
            None => {
                let token = LinkToken::generate();
                store.set(keys::LINK_TRACKER, token.as_str()).await?;
                tracing::info!("created link tracker");
                token
            }
        };

        let agent_user_id = match non_empty(store.get(keys::AGENT_USER_ID).await?) {
            Some(value) => AgentUserId::new(value),
            None => {
                let id = AgentUserId::generate();
                store.set(keys::AGENT_USER_ID, id.as_str()).await?;
                tracing::info!(agent_user_id = %id, "created agent user id");
                id
            }
        };

        Ok(Self {
            store,
            agent_user_id,
            link_token: RwLock::new(link_token),
        })
    }

    #[must_use]
    pub fn agent_user_id(&self) -> &AgentUserId {
        &self.agent_user_id
    }

    /// Snapshot of the active link token.
    #[must_use]
    pub fn link_token(&self) -> LinkToken {
        self.link_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether `id` was synced under the active link token.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn is_linked(&self, id: &DeviceId) -> Result<bool, HomelinkError> {
        let token = self.link_token();
        let recorded = self.store.get(&keys::device_link(id.as_str())).await?;
        Ok(recorded.as_deref() == Some(token.as_str()))
    }

    /// Record `id` under the active link token.
    ///
    /// Returns `true` when the device was not linked under this token before.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn mark_linked(&self, id: &DeviceId) -> Result<bool, HomelinkError> {
        let token = self.link_token();
        let key = keys::device_link(id.as_str());
        if self.store.get(&key).await?.as_deref() == Some(token.as_str()) {
            return Ok(false);
        }
        self.store.set(&key, token.as_str()).await?;
        Ok(true)
    }

    /// Start a new link generation. Every device counts as new again.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store; the active token
    /// is left unchanged in that case.
    #[tracing::instrument(skip(self))]
    pub async fn reset_link(&self) -> Result<LinkToken, HomelinkError> {
        let token = LinkToken::generate();
        self.store.set(keys::LINK_TRACKER, token.as_str()).await?;
        *self
            .link_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token.clone();
        tracing::info!("link tracker reset");
        Ok(token)
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn mark_disconnected(&self) -> Result<(), HomelinkError> {
        self.store.set(keys::DISCONNECTED, "").await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn is_disconnected(&self) -> Result<bool, HomelinkError> {
        Ok(self.store.get(keys::DISCONNECTED).await?.is_some())
    }

    /// Service-account credential stored under `jwt`, if any.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn credential_blob(&self) -> Result<Option<String>, HomelinkError> {
        Ok(non_empty(self.store.get(keys::CREDENTIAL).await?))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
