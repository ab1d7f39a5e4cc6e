//! The group state reducer.
//!
//! A pure function from the current member snapshots to the group's
//! externally observable state. Recomputed whole on every member
//! notification and at setup; never partially mutated.

use serde::{Deserialize, Serialize};

use light_sync_core::{OnOffState, StateSnapshot};

/// The derived, externally observable state of a sync group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupState {
    /// `Some(true)` when every member is on, `Some(false)` when every member
    /// reports a definite state but at least one is off, `None` when any
    /// member is unknown or unavailable.
    pub is_on: Option<bool>,
    /// True while at least one member is not unavailable.
    pub available: bool,
}

impl Default for GroupState {
    fn default() -> Self {
        Self {
            is_on: None,
            available: false,
        }
    }
}

/// Reduce the member snapshots to a [`GroupState`].
///
/// Members with no recorded snapshot are excluded from the reduction rather
/// than counted as unavailable; the caller gathers only the snapshots that
/// exist. The group uses "all" semantics: it is on only when every member is
/// simultaneously on.
#[must_use]
pub fn reduce_group_state(states: &[StateSnapshot]) -> GroupState {
    let valid = states.iter().all(|s| s.state.is_definite());

    let is_on = if valid {
        Some(states.iter().all(|s| s.state == OnOffState::On))
    } else {
        // Unknown if any member is unknown or unavailable.
        None
    };

    let available = states.iter().any(|s| s.state != OnOffState::Unavailable);

    GroupState { is_on, available }
}

#[cfg(test)]
mod tests {
    use super::*;
    use light_sync_core::{ContextId, EntityId};

    fn snapshots(states: &[OnOffState]) -> Vec<StateSnapshot> {
        states
            .iter()
            .enumerate()
            .map(|(i, state)| {
                StateSnapshot::new(
                    EntityId::new(format!("light.member_{i}")).unwrap(),
                    *state,
                    ContextId::generate(),
                )
            })
            .collect()
    }

    #[test]
    fn all_on_means_on() {
        use OnOffState::On;
        let state = reduce_group_state(&snapshots(&[On, On, On]));
        assert_eq!(state.is_on, Some(true));
        assert!(state.available);
    }

    #[test]
    fn any_off_means_off() {
        use OnOffState::{Off, On};
        let state = reduce_group_state(&snapshots(&[On, Off, On]));
        assert_eq!(state.is_on, Some(false));
        assert!(state.available);

        let state = reduce_group_state(&snapshots(&[Off, Off]));
        assert_eq!(state.is_on, Some(false));
    }

    #[test]
    fn unknown_dominates() {
        use OnOffState::{On, Unknown};
        let state = reduce_group_state(&snapshots(&[On, Unknown, On]));
        assert_eq!(state.is_on, None);
        assert!(state.available);
    }

    #[test]
    fn unavailable_dominates_is_on() {
        use OnOffState::{Off, On, Unavailable};
        let state = reduce_group_state(&snapshots(&[On, Unavailable, Off]));
        assert_eq!(state.is_on, None);
        assert!(state.available);
    }

    #[test]
    fn unavailable_only_when_every_member_is() {
        use OnOffState::{On, Unavailable};

        let state = reduce_group_state(&snapshots(&[Unavailable, Unavailable]));
        assert_eq!(state.is_on, None);
        assert!(!state.available);

        let state = reduce_group_state(&snapshots(&[Unavailable, On]));
        assert!(state.available);
    }

    #[test]
    fn no_snapshots_reads_unavailable() {
        // With nothing reported the reductions are vacuous; the availability
        // flag is what consumers should look at.
        let state = reduce_group_state(&[]);
        assert_eq!(state.is_on, Some(true));
        assert!(!state.available);
    }

    #[test]
    fn group_state_serde_roundtrip() {
        let state = GroupState {
            is_on: Some(false),
            available: true,
        };
        let json = serde_json::to_string(&state).unwrap();
        let parsed: GroupState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, parsed);
    }
}
