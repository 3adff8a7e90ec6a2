//! Endpoint configuration for both outbound routes.

use std::path::PathBuf;

pub const DEFAULT_ENDPOINT: &str = "https://homegraph.googleapis.com";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const HOMEGRAPH_SCOPE: &str = "https://www.googleapis.com/auth/homegraph";
pub const DEFAULT_RELAY_URL: &str = "https://home.scrypted.app";

/// Direct route: Home Graph API authenticated with a service account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeGraphConfig {
    /// Base URL, without the `/v1/...` path.
    pub endpoint: String,
    /// OAuth endpoint the signed assertion is exchanged at.
    pub token_url: String,
    pub scope: String,
}

impl Default for HomeGraphConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            scope: HOMEGRAPH_SCOPE.to_string(),
        }
    }
}

/// Relay route: a companion service holding the cloud credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub base_url: String,
    /// File holding the relay bearer token. Re-read on every call; the route
    /// is disabled when unset.
    pub token_path: Option<PathBuf>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RELAY_URL.to_string(),
            token_path: None,
        }
    }
}
