//! Uplink adapter errors.

use homelink_domain::error::HomelinkError;

/// Failures talking to Home Graph or the relay.
#[derive(Debug, thiserror::Error)]
pub enum UplinkError {
    #[error("service account credential is not valid JSON")]
    InvalidCredential(#[source] serde_json::Error),

    #[error("service account private key rejected")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token assertion")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("http request failed")]
    Http(#[from] reqwest::Error),

    #[error("{operation} answered {status}: {body}")]
    Status {
        operation: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to read relay token file")]
    TokenFile(#[source] std::io::Error),

    /// The relay token file is absent or empty.
    #[error("relay token is not available")]
    MissingToken,
}

impl From<UplinkError> for HomelinkError {
    fn from(err: UplinkError) -> Self {
        match err {
            UplinkError::MissingToken => HomelinkError::MissingCredential,
            other => HomelinkError::Uplink(Box::new(other)),
        }
    }
}
