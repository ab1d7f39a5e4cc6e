//! Subscription handles for state change delivery.

use std::fmt;

use tokio::sync::mpsc;

use crate::event::StateChangedEvent;
use crate::registry::WeakRegistry;

/// Identifier of a registered subscription within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A handle to a registered state change subscription.
///
/// Events for the watched entities arrive on an unbounded channel in write
/// order. Dropping the handle unregisters it from the registry; events
/// written afterwards are not delivered.
pub struct Subscription {
    pub(crate) id: SubscriptionId,
    pub(crate) registry: WeakRegistry,
    pub(crate) rx: mpsc::UnboundedReceiver<StateChangedEvent>,
}

impl Subscription {
    /// The identifier assigned by the registry.
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Receive the next event, waiting until one is written.
    ///
    /// Returns `None` if the registry has been dropped.
    pub async fn recv(&mut self) -> Option<StateChangedEvent> {
        self.rx.recv().await
    }

    /// Receive the next already-delivered event without waiting.
    #[must_use]
    pub fn try_recv(&mut self) -> Option<StateChangedEvent> {
        self.rx.try_recv().ok()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unsubscribe(self.id);
        }
    }
}
