//! In-process state store for light-sync.
//!
//! This crate provides the [`StateRegistry`]: the source of truth for entity
//! states, with typed change notifications delivered per subscription handle.
//! A sync group never owns member state; it reads snapshots from the registry
//! and reacts to the events its subscription delivers.
//!
//! Each subscriber holds its own [`Subscription`] handle with its own event
//! channel. There is no process-wide callback bus; dropping the handle
//! unregisters it, so teardown and unsubscription cannot be separated.
//!
//! # Example
//!
//! ```
//! use light_sync_core::{ContextId, EntityId, OnOffState};
//! use light_sync_store::StateRegistry;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let registry = StateRegistry::new();
//! let kitchen = EntityId::new("light.kitchen").unwrap();
//!
//! let mut subscription = registry.subscribe([kitchen.clone()]);
//! registry.set(kitchen.clone(), OnOffState::On, ContextId::generate());
//!
//! let event = subscription.recv().await.unwrap();
//! assert_eq!(event.new.state, OnOffState::On);
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod event;
pub mod registry;
pub mod subscription;

pub use event::StateChangedEvent;
pub use registry::StateRegistry;
pub use subscription::{Subscription, SubscriptionId};
