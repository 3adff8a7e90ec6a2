//! Service-account credential and the OAuth access token it buys.
//!
//! The credential is the JSON key file issued for the cloud project. A
//! short-lived RS256 assertion signed with its private key is exchanged for
//! an access token, which is reused until five minutes before it expires.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::UplinkError;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
const EXPIRY_MARGIN_SECS: u64 = 300;

#[derive(Deserialize)]
struct KeyFile {
    client_email: String,
    private_key: String,
}

/// Parsed service-account credential, ready to sign assertions.
#[derive(Clone)]
pub struct ServiceAccount {
    client_email: String,
    key: EncodingKey,
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

impl ServiceAccount {
    /// Parse the JSON key file contents.
    ///
    /// # Errors
    ///
    /// Returns [`UplinkError::InvalidCredential`] if the blob is not a key
    /// file, or [`UplinkError::InvalidKey`] if the private key is not RSA PEM.
    pub fn from_json(blob: &str) -> Result<Self, UplinkError> {
        let file: KeyFile = serde_json::from_str(blob).map_err(UplinkError::InvalidCredential)?;
        let key =
            EncodingKey::from_rsa_pem(file.private_key.as_bytes()).map_err(UplinkError::InvalidKey)?;
        Ok(Self {
            client_email: file.client_email,
            key,
        })
    }

    #[must_use]
    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    fn assertion(&self, scope: &str, audience: &str, now: u64) -> Result<String, UplinkError> {
        let claims = Claims {
            iss: &self.client_email,
            scope,
            aud: audience,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(UplinkError::Signing)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    expires_at: u64,
}

impl CachedToken {
    fn is_fresh(&self, now: u64) -> bool {
        self.expires_at > now + EXPIRY_MARGIN_SECS
    }
}

/// Hands out access tokens, fetching a new one only when the cached token
/// is missing or about to expire.
pub struct TokenSource {
    account: ServiceAccount,
    client: reqwest::Client,
    token_url: String,
    scope: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    #[must_use]
    pub fn new(
        account: ServiceAccount,
        client: reqwest::Client,
        token_url: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            account,
            client,
            token_url: token_url.into(),
            scope: scope.into(),
            cached: Mutex::new(None),
        }
    }

    /// A bearer token valid for at least the next five minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if signing the assertion or the token exchange fails.
    pub async fn access_token(&self) -> Result<String, UplinkError> {
        // Held across the exchange so concurrent callers share one fetch.
        let mut cached = self.cached.lock().await;
        let now = unix_now();
        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh(now)) {
            return Ok(token.access_token.clone());
        }

        let assertion = self.account.assertion(&self.scope, &self.token_url, now)?;
        let response = self
            .client
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UplinkError::Status {
                operation: "token exchange",
                status,
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!(
            client_email = self.account.client_email(),
            expires_in = token.expires_in,
            "access token refreshed"
        );
        let access_token = token.access_token.clone();
        *cached = Some(CachedToken {
            access_token: token.access_token,
            expires_at: now + token.expires_in,
        });
        Ok(access_token)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
