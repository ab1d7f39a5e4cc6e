//! Core types for light-sync.
//!
//! This crate provides the foundational types shared by the state store and
//! the sync group:
//!
//! - **Identifiers**: Strongly-typed IDs for light entities, group instances,
//!   and causal contexts
//! - **States**: The on/off state of a light and timestamped state snapshots
//!
//! # Example
//!
//! ```
//! use light_sync_core::{ContextId, EntityId, OnOffState, StateSnapshot};
//!
//! // Parse an entity ID
//! let entity_id: EntityId = "light.kitchen".parse().unwrap();
//! assert_eq!(entity_id.domain(), "light");
//!
//! // Take a snapshot of its state
//! let snapshot = StateSnapshot::new(entity_id, OnOffState::On, ContextId::generate());
//! assert!(snapshot.state.is_definite());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;
pub mod state;

pub use ids::{ContextId, EntityId, GroupId, IdError};
pub use state::{OnOffState, StateSnapshot};
