//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`HomelinkError`] via `From` at port boundaries.

use crate::device::Capability;

/// Boxed error used for adapter failures crossing a port boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error shared by the domain, the application layer and the ports.
#[derive(Debug, thiserror::Error)]
pub enum HomelinkError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("capability error")]
    Capability(#[from] CapabilityError),

    #[error("command error")]
    Command(#[from] CommandError),

    /// Neither a direct credential nor a relay token is configured.
    #[error("no credential available for the outbound call")]
    MissingCredential,

    #[error("storage error")]
    Storage(#[source] BoxError),

    #[error("uplink error")]
    Uplink(#[source] BoxError),
}

/// Invariant violations detected while building domain values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("identifier must not be empty")]
    EmptyId,
}

/// A lookup that did not find anything.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A device was read through a capability it cannot serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CapabilityError {
    #[error("device does not declare {0}")]
    Missing(Capability),

    #[error("device declares {0} but reports no value for it")]
    NoValue(Capability),
}

/// An execution could not be translated into a host command.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("invalid parameters for {command}: {reason}")]
    InvalidParams {
        command: &'static str,
        reason: String,
    },

    #[error("target device cannot run the command")]
    Capability(#[from] CapabilityError),
}
