//! The command dispatcher seam.
//!
//! The group never drives member lights directly; it hands `turn_on` and
//! `turn_off` calls to a [`CommandDispatcher`]. The trait keeps the sync core
//! testable with recording doubles and lets the host decide how commands
//! actually reach the lights.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use light_sync_core::{ContextId, EntityId, OnOffState};
use light_sync_store::StateRegistry;

use crate::error::DispatchError;
use crate::types::ServiceOptions;

/// The light services a group can call on its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightService {
    /// Turn the addressed lights on.
    TurnOn,
    /// Turn the addressed lights off.
    TurnOff,
}

impl LightService {
    /// The service that drives a light into `state`.
    ///
    /// Only definite states map to a service.
    #[must_use]
    pub const fn for_state(state: OnOffState) -> Option<Self> {
        match state {
            OnOffState::On => Some(Self::TurnOn),
            OnOffState::Off => Some(Self::TurnOff),
            OnOffState::Unknown | OnOffState::Unavailable => None,
        }
    }

    /// The state this service drives a light into.
    #[must_use]
    pub const fn target_state(self) -> OnOffState {
        match self {
            Self::TurnOn => OnOffState::On,
            Self::TurnOff => OnOffState::Off,
        }
    }
}

impl fmt::Display for LightService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TurnOn => "turn_on",
            Self::TurnOff => "turn_off",
        };
        write!(f, "{s}")
    }
}

/// Trait for dispatching light commands to member entities.
///
/// The call is blocking from the caller's perspective: the returned future
/// resolves once the command has been applied to every addressed target, or
/// fails without partial retry.
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    /// Call a light service on the given targets.
    ///
    /// # Errors
    ///
    /// Returns an error if any target cannot be commanded. The command
    /// either reaches all addressed targets or surfaces an error.
    async fn call(
        &self,
        service: LightService,
        targets: &[EntityId],
        options: &ServiceOptions,
        context: ContextId,
    ) -> Result<(), DispatchError>;
}

/// A dispatcher that applies commands directly to a [`StateRegistry`].
///
/// The in-process equivalent of a light platform: every addressed entity's
/// state is written to the registry, which in turn fans out change events.
/// Useful when the member lights live in the same process as the group, and
/// as the executor in integration tests.
#[derive(Debug, Clone)]
pub struct RegistryDispatcher {
    registry: StateRegistry,
}

impl RegistryDispatcher {
    /// Create a dispatcher writing into the given registry.
    #[must_use]
    pub fn new(registry: StateRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl CommandDispatcher for RegistryDispatcher {
    async fn call(
        &self,
        service: LightService,
        targets: &[EntityId],
        options: &ServiceOptions,
        context: ContextId,
    ) -> Result<(), DispatchError> {
        // Validate every target before mutating any, so a failed call leaves
        // no partial writes behind.
        for target in targets {
            if !self.registry.contains(target) {
                return Err(DispatchError::UnknownEntity(target.clone()));
            }
        }

        tracing::debug!(
            service = %service,
            targets = targets.len(),
            options = ?options,
            context = %context,
            "Applying light command to registry"
        );

        let state = service.target_state();
        for target in targets {
            self.registry.set(target.clone(), state, context);
        }

        Ok(())
    }
}
