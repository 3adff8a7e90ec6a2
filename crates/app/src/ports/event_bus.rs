//! Event bus port: publish host events.

use std::future::Future;

use homelink_domain::error::HomelinkError;
use homelink_domain::event::HostEvent;

/// Publishes host events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: HostEvent) -> impl Future<Output = Result<(), HomelinkError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: HostEvent) -> impl Future<Output = Result<(), HomelinkError>> + Send {
        (**self).publish(event)
    }
}
