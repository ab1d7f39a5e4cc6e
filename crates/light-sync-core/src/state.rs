//! Light state types.
//!
//! The on/off state of a light and the timestamped snapshot the state store
//! keeps per entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{ContextId, EntityId};

/// The on/off state of a light entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnOffState {
    /// The light is on.
    On,
    /// The light is off.
    Off,
    /// The light has not reported a state yet.
    Unknown,
    /// The light is unreachable.
    Unavailable,
}

impl OnOffState {
    /// Returns true for `On` and `Off`.
    ///
    /// Only definite states participate in sync decisions; `Unknown` and
    /// `Unavailable` observations are never propagated to other members.
    #[must_use]
    pub const fn is_definite(self) -> bool {
        matches!(self, Self::On | Self::Off)
    }
}

impl fmt::Display for OnOffState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Unknown => "unknown",
            Self::Unavailable => "unavailable",
        };
        write!(f, "{s}")
    }
}

/// A point-in-time record of one entity's state.
///
/// Snapshots are owned by the state store; the sync group only observes them
/// through notifications and on-demand queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// The entity this snapshot belongs to.
    pub entity_id: EntityId,
    /// The recorded on/off state.
    pub state: OnOffState,
    /// The causal context of the change that produced this snapshot.
    pub context: ContextId,
    /// When the snapshot was recorded.
    pub updated_at: DateTime<Utc>,
}

impl StateSnapshot {
    /// Create a snapshot timestamped now.
    #[must_use]
    pub fn new(entity_id: EntityId, state: OnOffState, context: ContextId) -> Self {
        Self {
            entity_id,
            state,
            context,
            updated_at: Utc::now(),
        }
    }
}
