//! The sync decision state machine.
//!
//! A state machine over the target sync state, triggered by one event type:
//! "member state changed". The decision itself is a pure function; the
//! service task applies it and performs the dispatch.
//!
//! ```text
//!   observation v           target        action
//!   ─────────────────────── ──────────── ─────────────────────────────
//!   unknown / unavailable   (any)        ignore, target unchanged
//!   v == target             Some(v)      suppress (self-caused echo)
//!   v != target             (any)        target := v, forward v to the
//!                                        other members (one hop)
//! ```
//!
//! Setting the target *before* the forwarded command is dispatched is what
//! terminates the recursion: the notifications that command produces match
//! the target and fall into the suppress row.

use light_sync_core::{EntityId, OnOffState};

/// Decide whether an observed member state must be propagated.
///
/// Returns `Some(state)` when the observation diverges from the current
/// target and the other members must be converged to `state`; `None` when
/// the observation is ignored or suppressed.
#[must_use]
pub const fn sync_action(target: Option<OnOffState>, observed: OnOffState) -> Option<OnOffState> {
    if !observed.is_definite() {
        return None;
    }
    if matches!(
        (target, observed),
        (Some(OnOffState::On), OnOffState::On) | (Some(OnOffState::Off), OnOffState::Off)
    ) {
        return None;
    }
    Some(observed)
}

/// The members a corrective command is addressed to.
///
/// The originator is excluded; it already reports the state being forwarded.
#[must_use]
pub fn correction_targets(members: &[EntityId], originator: &EntityId) -> Vec<EntityId> {
    members
        .iter()
        .filter(|member| *member != originator)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use OnOffState::{Off, On, Unavailable, Unknown};

    #[test]
    fn indefinite_observations_are_ignored() {
        assert_eq!(sync_action(None, Unknown), None);
        assert_eq!(sync_action(None, Unavailable), None);
        assert_eq!(sync_action(Some(On), Unknown), None);
        assert_eq!(sync_action(Some(Off), Unavailable), None);
    }

    #[test]
    fn expected_observation_is_suppressed() {
        assert_eq!(sync_action(Some(On), On), None);
        assert_eq!(sync_action(Some(Off), Off), None);
    }

    #[test]
    fn divergent_observation_propagates() {
        assert_eq!(sync_action(None, On), Some(On));
        assert_eq!(sync_action(None, Off), Some(Off));
        assert_eq!(sync_action(Some(On), Off), Some(Off));
        assert_eq!(sync_action(Some(Off), On), Some(On));
    }

    #[test]
    fn correction_excludes_originator() {
        let members: Vec<EntityId> = ["light.a", "light.b", "light.c"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();

        let targets = correction_targets(&members, &members[1]);
        assert_eq!(targets, vec![members[0].clone(), members[2].clone()]);
    }

    #[test]
    fn correction_for_single_member_group_is_empty() {
        let members: Vec<EntityId> = vec!["light.a".parse().unwrap()];
        assert!(correction_targets(&members, &members[0]).is_empty());
    }
}
