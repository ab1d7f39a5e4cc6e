//! State change events.

use light_sync_core::{EntityId, StateSnapshot};

/// A notification that an entity's state was written.
///
/// Delivered to every subscription watching `entity_id`, in write order.
/// `old` is `None` when the entity was seen for the first time.
#[derive(Debug, Clone)]
pub struct StateChangedEvent {
    /// The entity whose state changed.
    pub entity_id: EntityId,
    /// The snapshot the write replaced, if any.
    pub old: Option<StateSnapshot>,
    /// The snapshot that is now current.
    pub new: StateSnapshot,
}
