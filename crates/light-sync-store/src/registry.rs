//! The state registry.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tokio::sync::mpsc;

use light_sync_core::{ContextId, EntityId, OnOffState, StateSnapshot};

use crate::event::StateChangedEvent;
use crate::subscription::{Subscription, SubscriptionId};

/// The in-process source of truth for entity states.
///
/// The registry keeps the latest [`StateSnapshot`] per entity and fans every
/// write out to the subscriptions watching that entity. It is a cheap handle
/// over shared state; clones observe and mutate the same registry.
#[derive(Debug, Clone, Default)]
pub struct StateRegistry {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    states: HashMap<EntityId, StateSnapshot>,
    subscribers: HashMap<SubscriptionId, Subscriber>,
    next_subscription: u64,
}

#[derive(Debug)]
struct Subscriber {
    entities: HashSet<EntityId>,
    tx: mpsc::UnboundedSender<StateChangedEvent>,
}

impl StateRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current snapshot of an entity, if it has reported one.
    #[must_use]
    pub fn get(&self, entity_id: &EntityId) -> Option<StateSnapshot> {
        self.inner.read().states.get(entity_id).cloned()
    }

    /// Get the current snapshots of the given entities.
    ///
    /// Entities with no recorded state are skipped, not reported as
    /// unavailable.
    #[must_use]
    pub fn states_of(&self, entity_ids: &[EntityId]) -> Vec<StateSnapshot> {
        let inner = self.inner.read();
        entity_ids
            .iter()
            .filter_map(|id| inner.states.get(id).cloned())
            .collect()
    }

    /// Check whether an entity has a recorded state.
    #[must_use]
    pub fn contains(&self, entity_id: &EntityId) -> bool {
        self.inner.read().states.contains_key(entity_id)
    }

    /// Number of entities with a recorded state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().states.len()
    }

    /// Check whether no entity has a recorded state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().states.is_empty()
    }

    /// Write an entity's state and notify its subscribers.
    ///
    /// A write always produces an event, even when the state value is
    /// unchanged; subscribers that only care about transitions filter on the
    /// event's `old`/`new` pair.
    pub fn set(&self, entity_id: EntityId, state: OnOffState, context: ContextId) {
        let new = StateSnapshot::new(entity_id.clone(), state, context);
        let mut inner = self.inner.write();
        let old = inner.states.insert(entity_id.clone(), new.clone());

        tracing::trace!(entity_id = %entity_id, state = %state, context = %context, "State written");

        let event = StateChangedEvent { entity_id, old, new };
        // A closed channel means the subscription handle is gone; prune it.
        inner.subscribers.retain(|_, subscriber| {
            if !subscriber.entities.contains(&event.entity_id) {
                return true;
            }
            subscriber.tx.send(event.clone()).is_ok()
        });
    }

    /// Register a subscription for the given entities.
    ///
    /// The returned handle delivers one event per write to any watched
    /// entity, in write order. Dropping the handle unregisters it.
    #[must_use]
    pub fn subscribe(&self, entity_ids: impl IntoIterator<Item = EntityId>) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.write();
        let id = SubscriptionId(inner.next_subscription);
        inner.next_subscription += 1;
        inner.subscribers.insert(
            id,
            Subscriber {
                entities: entity_ids.into_iter().collect(),
                tx,
            },
        );

        tracing::debug!(subscription_id = %id, "Registered state subscription");

        Subscription {
            id,
            registry: self.downgrade(),
            rx,
        }
    }

    /// Number of registered subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner.read().subscribers.len()
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) {
        if self.inner.write().subscribers.remove(&id).is_some() {
            tracing::debug!(subscription_id = %id, "Removed state subscription");
        }
    }

    fn downgrade(&self) -> WeakRegistry {
        WeakRegistry {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

/// A non-owning reference to a registry, held by subscription handles.
#[derive(Debug)]
pub(crate) struct WeakRegistry {
    inner: Weak<RwLock<Inner>>,
}

impl WeakRegistry {
    pub(crate) fn upgrade(&self) -> Option<StateRegistry> {
        self.inner.upgrade().map(|inner| StateRegistry { inner })
    }
}
