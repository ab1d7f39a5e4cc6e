//! Bidirectional on/off sync group over light entities.
//!
//! A sync group is a virtual light aggregating several member lights and
//! keeping their on/off state mirrored in both directions: turning the group
//! on or off propagates to every member, and a member toggled elsewhere
//! (wall switch, another automation) propagates its new state to the other
//! members. The group also exposes an aggregated state with "all" semantics:
//! it reads on only when every member is on.
//!
//! # Architecture
//!
//! ```text
//!   external command                         member state change
//!         │                                         │
//!         ▼                                         ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       LightSyncGroup                        │
//! │  ┌──────────────┐ ┌──────────────┐ ┌────────────────────┐  │
//! │  │   Command    │ │    Sync      │ │      State         │  │
//! │  │  forwarding  │ │   reactor    │ │    aggregator      │  │
//! │  └──────────────┘ └──────────────┘ └────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//!         │                   │                     │
//!         ▼                   ▼                     ▼
//!  ┌─────────────┐     ┌─────────────┐      ┌─────────────┐
//!  │ Dispatcher  │     │ StateStore  │      │   watch     │
//!  │  (trait)    │     │ (registry)  │      │  (publish)  │
//!  └─────────────┘     └─────────────┘      └─────────────┘
//! ```
//!
//! Echo storms are prevented by the target sync state: every command sets it
//! before dispatching, so the member notifications that command produces are
//! recognized as self-caused and suppressed. A divergent observation resets
//! it and propagates exactly one hop.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use light_sync_core::{ContextId, EntityId, OnOffState};
//! use light_sync_group::{
//!     GroupConfig, LightSyncGroup, RegistryDispatcher, ServiceOptions,
//! };
//! use light_sync_store::StateRegistry;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = StateRegistry::new();
//! let kitchen: EntityId = "light.kitchen".parse()?;
//! let hallway: EntityId = "light.hallway".parse()?;
//! registry.set(kitchen.clone(), OnOffState::Off, ContextId::generate());
//! registry.set(hallway.clone(), OnOffState::Off, ContextId::generate());
//!
//! let config = GroupConfig::new("downstairs", vec![kitchen, hallway])?;
//! let dispatcher = Arc::new(RegistryDispatcher::new(registry.clone()));
//! let group = LightSyncGroup::new(config, registry, dispatcher);
//!
//! group.turn_on(&ServiceOptions::new().with_transition(1.0)).await?;
//!
//! group.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Known inconsistency window
//!
//! The target sync state is set optimistically before a command is
//! dispatched and is not rolled back if the dispatch fails. Until the next
//! divergent observation, a legitimate correction matching the failed value
//! would be suppressed. Callers that need stronger guarantees should retry
//! the failed command.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod aggregate;
pub mod dispatch;
pub mod error;
pub mod reactor;
pub mod service;
pub mod types;

pub use aggregate::{reduce_group_state, GroupState};
pub use dispatch::{CommandDispatcher, LightService, RegistryDispatcher};
pub use error::{DispatchError, GroupError, Result};
pub use service::LightSyncGroup;
pub use types::{
    GroupConfig, ServiceOptions, DEFAULT_GROUP_NAME, FORWARDED_OFF_OPTIONS, FORWARDED_ON_OPTIONS,
};

// Re-export commonly used types from dependencies for convenience
pub use light_sync_core::{ContextId, EntityId, GroupId, OnOffState, StateSnapshot};
pub use light_sync_store::{StateChangedEvent, StateRegistry, Subscription};
