//! Configuration and service call option types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use light_sync_core::{EntityId, GroupId};

use crate::error::{GroupError, Result};

/// Name used when a group is configured without one.
pub const DEFAULT_GROUP_NAME: &str = "Light Sync Group";

/// Options a group forwards with `turn_on` member commands.
///
/// Anything outside this list is a per-call option of the group itself and
/// is dropped before dispatch.
pub const FORWARDED_ON_OPTIONS: &[&str] = &["transition", "flash"];

/// Options a group forwards with `turn_off` member commands.
pub const FORWARDED_OFF_OPTIONS: &[&str] = &["transition"];

/// Configuration of one sync group instance.
///
/// The member set is validated and frozen at construction; reconfiguring a
/// group means building a replacement instance. The fields are private so
/// neither direct construction nor deserialization can bypass the
/// validation; serde routes through the validating constructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "UncheckedGroupConfig")]
pub struct GroupConfig {
    group_id: GroupId,
    name: String,
    members: Vec<EntityId>,
}

/// The raw, not-yet-validated shape a [`GroupConfig`] deserializes from.
#[derive(Deserialize)]
struct UncheckedGroupConfig {
    group_id: GroupId,
    name: String,
    members: Vec<EntityId>,
}

impl TryFrom<UncheckedGroupConfig> for GroupConfig {
    type Error = GroupError;

    fn try_from(raw: UncheckedGroupConfig) -> Result<Self> {
        Self::with_group_id(raw.group_id, raw.name, raw.members)
    }
}

impl GroupConfig {
    /// Create a configuration with a freshly generated group ID.
    ///
    /// Duplicate members are removed, keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::EmptyGroup` if no members are given.
    pub fn new(name: impl Into<String>, members: Vec<EntityId>) -> Result<Self> {
        Self::with_group_id(GroupId::generate(), name, members)
    }

    /// Create a configuration with the default group name.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::EmptyGroup` if no members are given.
    pub fn with_default_name(members: Vec<EntityId>) -> Result<Self> {
        Self::new(DEFAULT_GROUP_NAME, members)
    }

    /// Create a configuration with an explicit group ID.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::EmptyGroup` if no members are given.
    pub fn with_group_id(
        group_id: GroupId,
        name: impl Into<String>,
        members: Vec<EntityId>,
    ) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        let members: Vec<EntityId> = members
            .into_iter()
            .filter(|member| seen.insert(member.clone()))
            .collect();

        if members.is_empty() {
            return Err(GroupError::EmptyGroup);
        }

        Ok(Self {
            group_id,
            name: name.into(),
            members,
        })
    }

    /// Unique identifier of this group instance.
    #[must_use]
    pub const fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The member entities, in configuration order, without duplicates.
    ///
    /// Non-empty and immutable for the lifetime of the configuration.
    #[must_use]
    pub fn members(&self) -> &[EntityId] {
        &self.members
    }
}

/// Options attached to a light service call.
///
/// An ordered string-to-JSON map, mirroring the open keyword set of light
/// commands. The group filters it down to the forwardable subset before
/// dispatching to members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOptions(BTreeMap<String, Value>);

impl ServiceOptions {
    /// Create an empty option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a transition duration in seconds.
    #[must_use]
    pub fn with_transition(mut self, seconds: f64) -> Self {
        self.0.insert("transition".to_string(), seconds.into());
        self
    }

    /// Set a flash mode (`"short"` or `"long"`).
    #[must_use]
    pub fn with_flash(mut self, flash: impl Into<String>) -> Self {
        self.0.insert("flash".to_string(), flash.into().into());
        self
    }

    /// Insert an arbitrary option.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Get an option by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Check whether no options are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of options set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keep only the options named in `allowed`.
    #[must_use]
    pub fn filtered(&self, allowed: &[&str]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(key, _)| allowed.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }
}
