//! The sync group service.
//!
//! [`LightSyncGroup`] binds the pieces together: it forwards group commands
//! to the members, runs the reactor task over its state subscription, and
//! publishes the aggregated group state through a watch channel.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use light_sync_core::{ContextId, EntityId, GroupId, OnOffState};
use light_sync_store::{StateRegistry, Subscription};

use crate::aggregate::{reduce_group_state, GroupState};
use crate::dispatch::{CommandDispatcher, LightService};
use crate::error::Result;
use crate::reactor;
use crate::types::{GroupConfig, ServiceOptions, FORWARDED_OFF_OPTIONS, FORWARDED_ON_OPTIONS};

/// A virtual light aggregating several member lights with mirrored state.
///
/// Commands on the group propagate to all members; a member transition
/// caused elsewhere (a wall switch, another automation) propagates to the
/// remaining members. The group's own state is the logical AND of its
/// members, published through [`LightSyncGroup::watch_state`].
///
/// The group and its subscription are created together and torn down
/// together: dropping the group (or calling [`shutdown`]) stops the reactor
/// task, which releases the subscription.
///
/// [`shutdown`]: LightSyncGroup::shutdown
pub struct LightSyncGroup {
    config: GroupConfig,
    dispatcher: Arc<dyn CommandDispatcher>,
    sync: Arc<Mutex<SyncState>>,
    state_rx: watch::Receiver<GroupState>,
    reactor: JoinHandle<()>,
}

/// The group's transient sync state, touched only under the group mutex.
#[derive(Debug, Default)]
struct SyncState {
    /// The on/off value the group itself most recently drove or propagated.
    ///
    /// Set before the corresponding dispatch so the resulting member
    /// notifications are recognized as self-caused and suppressed.
    target: Option<OnOffState>,
}

impl LightSyncGroup {
    /// Create the group and start its reactor.
    ///
    /// Subscribes to state changes of every member and computes the initial
    /// aggregated state from the registry.
    #[must_use]
    pub fn new(
        config: GroupConfig,
        registry: StateRegistry,
        dispatcher: Arc<dyn CommandDispatcher>,
    ) -> Self {
        let subscription = registry.subscribe(config.members().iter().cloned());
        let initial = reduce_group_state(&registry.states_of(config.members()));
        let (state_tx, state_rx) = watch::channel(initial);
        let sync = Arc::new(Mutex::new(SyncState::default()));

        tracing::info!(
            group_id = %config.group_id(),
            name = %config.name(),
            members = config.members().len(),
            "Starting light sync group"
        );

        let reactor = tokio::spawn(run_reactor(
            config.group_id(),
            config.members().to_vec(),
            registry,
            Arc::clone(&dispatcher),
            Arc::clone(&sync),
            state_tx,
            subscription,
        ));

        Self {
            config,
            dispatcher,
            sync,
            state_rx,
            reactor,
        }
    }

    /// Turn all members on.
    ///
    /// Only the forwardable subset of `options` (transition, flash) is
    /// passed along. The call returns once every member command completed.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's failure unchanged; no retry is attempted.
    /// The target sync state keeps the attempted value on failure.
    pub async fn turn_on(&self, options: &ServiceOptions) -> Result<()> {
        let mut sync = self.sync.lock().await;
        sync.target = Some(OnOffState::On);

        let data = options.filtered(FORWARDED_ON_OPTIONS);
        tracing::debug!(group_id = %self.config.group_id(), options = ?data, "Forwarding turn_on to members");

        self.dispatcher
            .call(
                LightService::TurnOn,
                self.config.members(),
                &data,
                ContextId::generate(),
            )
            .await?;
        Ok(())
    }

    /// Turn all members off.
    ///
    /// Only a transition duration is forwarded, if present. Same blocking
    /// and failure contract as [`turn_on`](Self::turn_on).
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's failure unchanged; no retry is attempted.
    pub async fn turn_off(&self, options: &ServiceOptions) -> Result<()> {
        let mut sync = self.sync.lock().await;
        sync.target = Some(OnOffState::Off);

        let data = options.filtered(FORWARDED_OFF_OPTIONS);
        tracing::debug!(group_id = %self.config.group_id(), options = ?data, "Forwarding turn_off to members");

        self.dispatcher
            .call(
                LightService::TurnOff,
                self.config.members(),
                &data,
                ContextId::generate(),
            )
            .await?;
        Ok(())
    }

    /// The current aggregated group state.
    #[must_use]
    pub fn state(&self) -> GroupState {
        *self.state_rx.borrow()
    }

    /// A receiver following the aggregated group state.
    ///
    /// The reactor publishes after every processed member notification, so
    /// the channel also serves as a "notification handled" signal.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<GroupState> {
        self.state_rx.clone()
    }

    /// The on/off value the group most recently drove or propagated.
    pub async fn target_sync_state(&self) -> Option<OnOffState> {
        self.sync.lock().await.target
    }

    /// The group's identifier.
    #[must_use]
    pub const fn group_id(&self) -> GroupId {
        self.config.group_id()
    }

    /// The group's configured name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// The member entities, in configuration order.
    #[must_use]
    pub fn members(&self) -> &[EntityId] {
        self.config.members()
    }

    /// Tear the group down.
    ///
    /// Stops the reactor task and waits for it to finish, which releases the
    /// state subscription. Afterwards stale store notifications for former
    /// members cause no command forwarding.
    pub async fn shutdown(mut self) {
        tracing::info!(group_id = %self.config.group_id(), "Shutting down light sync group");
        self.reactor.abort();
        // The task ends with a cancellation "error"; nothing to surface.
        let _ = (&mut self.reactor).await;
    }
}

impl Drop for LightSyncGroup {
    fn drop(&mut self) {
        self.reactor.abort();
    }
}

impl std::fmt::Debug for LightSyncGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightSyncGroup")
            .field("group_id", &self.config.group_id())
            .field("name", &self.config.name())
            .field("members", &self.config.members())
            .finish_non_exhaustive()
    }
}

/// The per-group reactor task.
///
/// Drains the subscription in delivery order, one notification end-to-end at
/// a time. Holds the group mutex across the corrective dispatch so commands
/// and notifications never interleave their updates to the sync state.
async fn run_reactor(
    group_id: GroupId,
    members: Vec<EntityId>,
    registry: StateRegistry,
    dispatcher: Arc<dyn CommandDispatcher>,
    sync: Arc<Mutex<SyncState>>,
    state_tx: watch::Sender<GroupState>,
    mut subscription: Subscription,
) {
    while let Some(event) = subscription.recv().await {
        let mut sync = sync.lock().await;

        if let Some(desired) = reactor::sync_action(sync.target, event.new.state) {
            sync.target = Some(desired);

            let targets = reactor::correction_targets(&members, &event.entity_id);
            if let (Some(service), false) = (LightService::for_state(desired), targets.is_empty()) {
                tracing::info!(
                    group_id = %group_id,
                    entity_id = %event.entity_id,
                    state = %desired,
                    targets = targets.len(),
                    "Propagating observed member state"
                );

                // Attributed to the causal context of the triggering change,
                // not to a fresh action of the group.
                if let Err(err) = dispatcher
                    .call(service, &targets, &ServiceOptions::new(), event.new.context)
                    .await
                {
                    tracing::warn!(
                        group_id = %group_id,
                        service = %service,
                        error = %err,
                        "Forwarded sync command failed"
                    );
                }
            }
        } else {
            tracing::debug!(
                group_id = %group_id,
                entity_id = %event.entity_id,
                state = %event.new.state,
                "Notification ignored or suppressed"
            );
        }

        let group_state = reduce_group_state(&registry.states_of(&members));
        state_tx.send_replace(group_state);
    }

    tracing::debug!(group_id = %group_id, "State store gone, reactor stopping");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DispatchError, GroupError};
    use async_trait::async_trait;
    use std::time::Duration;

    fn entity(s: &str) -> EntityId {
        EntityId::new(s).unwrap()
    }

    #[derive(Debug, Clone, PartialEq)]
    struct RecordedCall {
        service: LightService,
        targets: Vec<EntityId>,
        options: ServiceOptions,
        context: ContextId,
    }

    /// Records calls without driving any light.
    #[derive(Debug, Default, Clone)]
    struct RecordingDispatcher {
        calls: Arc<parking_lot::Mutex<Vec<RecordedCall>>>,
        fail: bool,
    }

    impl RecordingDispatcher {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl CommandDispatcher for RecordingDispatcher {
        async fn call(
            &self,
            service: LightService,
            targets: &[EntityId],
            options: &ServiceOptions,
            context: ContextId,
        ) -> std::result::Result<(), DispatchError> {
            self.calls.lock().push(RecordedCall {
                service,
                targets: targets.to_vec(),
                options: options.clone(),
                context,
            });
            if self.fail {
                return Err(DispatchError::Rejected {
                    service,
                    reason: "recording dispatcher set to fail".to_string(),
                });
            }
            Ok(())
        }
    }

    fn three_member_setup() -> (StateRegistry, GroupConfig, Vec<EntityId>) {
        let registry = StateRegistry::new();
        let members = vec![entity("light.a"), entity("light.b"), entity("light.c")];
        for member in &members {
            registry.set(member.clone(), OnOffState::On, ContextId::generate());
        }
        let config = GroupConfig::new("test group", members.clone()).unwrap();
        (registry, config, members)
    }

    async fn next_publish(rx: &mut watch::Receiver<GroupState>) {
        tokio::time::timeout(Duration::from_secs(1), rx.changed())
            .await
            .expect("no notification was processed")
            .expect("state channel closed");
    }

    #[tokio::test]
    async fn turn_on_forwards_allow_listed_options_to_all_members() {
        let (registry, config, members) = three_member_setup();
        let dispatcher = RecordingDispatcher::default();
        let group = LightSyncGroup::new(config, registry, Arc::new(dispatcher.clone()));

        let mut options = ServiceOptions::new().with_transition(5.0);
        options.insert("some_unknown_option", 1);
        group.turn_on(&options).await.unwrap();

        let calls = dispatcher.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].service, LightService::TurnOn);
        assert_eq!(calls[0].targets, members);
        assert_eq!(
            calls[0].options,
            ServiceOptions::new().with_transition(5.0)
        );
        assert_eq!(group.target_sync_state().await, Some(OnOffState::On));
    }

    #[tokio::test]
    async fn turn_off_forwards_transition_only() {
        let (registry, config, members) = three_member_setup();
        let dispatcher = RecordingDispatcher::default();
        let group = LightSyncGroup::new(config, registry, Arc::new(dispatcher.clone()));

        let options = ServiceOptions::new().with_transition(2.0).with_flash("short");
        group.turn_off(&options).await.unwrap();

        let calls = dispatcher.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].service, LightService::TurnOff);
        assert_eq!(calls[0].targets, members);
        assert_eq!(
            calls[0].options,
            ServiceOptions::new().with_transition(2.0)
        );
        assert_eq!(group.target_sync_state().await, Some(OnOffState::Off));
    }

    #[tokio::test]
    async fn command_failure_surfaces_and_leaves_target_set() {
        let (registry, config, _) = three_member_setup();
        let dispatcher = RecordingDispatcher::failing();
        let group = LightSyncGroup::new(config, registry, Arc::new(dispatcher.clone()));

        let result = group.turn_on(&ServiceOptions::new()).await;
        assert!(matches!(result, Err(GroupError::Dispatch(_))));

        // Optimistically set before dispatch; not rolled back on failure.
        assert_eq!(group.target_sync_state().await, Some(OnOffState::On));
        assert_eq!(dispatcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn expected_notification_is_suppressed() {
        let (registry, config, members) = three_member_setup();
        let dispatcher = RecordingDispatcher::default();
        let group =
            LightSyncGroup::new(config, registry.clone(), Arc::new(dispatcher.clone()));
        let mut rx = group.watch_state();

        group.turn_on(&ServiceOptions::new()).await.unwrap();

        // A member reports the commanded state back.
        registry.set(members[0].clone(), OnOffState::On, ContextId::generate());
        next_publish(&mut rx).await;

        // Only the original group command was dispatched, no correction.
        assert_eq!(dispatcher.calls().len(), 1);
        assert_eq!(group.target_sync_state().await, Some(OnOffState::On));
    }

    #[tokio::test]
    async fn divergent_notification_propagates_one_hop() {
        let (registry, config, members) = three_member_setup();
        let dispatcher = RecordingDispatcher::default();
        let group =
            LightSyncGroup::new(config, registry.clone(), Arc::new(dispatcher.clone()));
        let mut rx = group.watch_state();

        let external = ContextId::generate();
        registry.set(members[0].clone(), OnOffState::Off, external);
        next_publish(&mut rx).await;

        let calls = dispatcher.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].service, LightService::TurnOff);
        assert_eq!(calls[0].targets, vec![members[1].clone(), members[2].clone()]);
        assert!(calls[0].options.is_empty());
        // The correction is attributed to the triggering change.
        assert_eq!(calls[0].context, external);
        assert_eq!(group.target_sync_state().await, Some(OnOffState::Off));
    }

    #[tokio::test]
    async fn correction_failure_keeps_target_and_reactor_running() {
        let (registry, config, members) = three_member_setup();
        let dispatcher = RecordingDispatcher::failing();
        let group =
            LightSyncGroup::new(config, registry.clone(), Arc::new(dispatcher.clone()));
        let mut rx = group.watch_state();

        // A divergent member change triggers a correction that fails.
        registry.set(members[0].clone(), OnOffState::Off, ContextId::generate());
        next_publish(&mut rx).await;

        assert_eq!(dispatcher.calls().len(), 1);
        // The attempted value stays, not rolled back on failure.
        assert_eq!(group.target_sync_state().await, Some(OnOffState::Off));

        // The reactor survives the failure and still handles later changes.
        registry.set(members[1].clone(), OnOffState::On, ContextId::generate());
        next_publish(&mut rx).await;

        let calls = dispatcher.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].service, LightService::TurnOn);
        assert_eq!(group.target_sync_state().await, Some(OnOffState::On));
    }

    #[tokio::test]
    async fn indefinite_notification_is_ignored_but_republished() {
        let (registry, config, members) = three_member_setup();
        let dispatcher = RecordingDispatcher::default();
        let group =
            LightSyncGroup::new(config, registry.clone(), Arc::new(dispatcher.clone()));
        let mut rx = group.watch_state();

        assert_eq!(group.state().is_on, Some(true));

        registry.set(
            members[0].clone(),
            OnOffState::Unavailable,
            ContextId::generate(),
        );
        next_publish(&mut rx).await;

        assert!(dispatcher.calls().is_empty());
        assert_eq!(group.target_sync_state().await, None);
        let state = group.state();
        assert_eq!(state.is_on, None);
        assert!(state.available);
    }

    #[tokio::test]
    async fn initial_state_is_computed_at_setup() {
        let (registry, config, _) = three_member_setup();
        let group = LightSyncGroup::new(
            config,
            registry,
            Arc::new(RecordingDispatcher::default()),
        );

        let state = group.state();
        assert_eq!(state.is_on, Some(true));
        assert!(state.available);
    }
}
