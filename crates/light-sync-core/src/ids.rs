//! Core identifier types for light-sync.
//!
//! This module provides strongly-typed identifiers for light entities, group
//! instances, and causal contexts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An identifier for a light entity, in `domain.object_id` form.
///
/// Entity IDs name the members of a sync group, e.g. `light.kitchen`. The
/// `domain` and `object_id` parts are lowercase ASCII words (letters, digits
/// and underscores) separated by a single dot.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Parse an `EntityId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not in valid `domain.object_id` form.
    pub fn new(s: impl Into<String>) -> Result<Self, IdError> {
        let s = s.into();
        if is_valid_entity_id(&s) {
            Ok(Self(s))
        } else {
            Err(IdError::InvalidEntityId(s))
        }
    }

    /// Return the domain part, e.g. `light` for `light.kitchen`.
    #[must_use]
    pub fn domain(&self) -> &str {
        // Validated at construction, the dot is always present.
        self.0.split_once('.').map_or("", |(domain, _)| domain)
    }

    /// Return the object ID part, e.g. `kitchen` for `light.kitchen`.
    #[must_use]
    pub fn object_id(&self) -> &str {
        self.0.split_once('.').map_or("", |(_, object_id)| object_id)
    }

    /// Return the full identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Check that a string is a well-formed `domain.object_id` identifier.
fn is_valid_entity_id(s: &str) -> bool {
    let Some((domain, object_id)) = s.split_once('.') else {
        return false;
    };
    let word_ok = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    };
    word_ok(domain) && word_ok(object_id)
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntityId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A 16-byte group instance identifier based on UUID v4.
///
/// Group IDs are randomly generated when a group is configured and stay with
/// the group instance for its lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupId(uuid::Uuid);

impl GroupId {
    /// Create a new `GroupId` from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random `GroupId`.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Return the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl FromStr for GroupId {
    type Err = IdError;

    /// Parse a `GroupId` from a UUID string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = uuid::Uuid::parse_str(s).map_err(|_| IdError::InvalidUuid)?;
        Ok(Self(uuid))
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupId({})", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for GroupId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GroupId> for String {
    fn from(id: GroupId) -> Self {
        id.0.to_string()
    }
}

/// A causal context identifier based on UUID v4.
///
/// Every state change and every dispatched command carries a context. A
/// correction forwarded by the sync reactor reuses the context of the state
/// change that triggered it, so downstream consumers can attribute the whole
/// cascade to one cause instead of seeing a fresh user action per member.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContextId(uuid::Uuid);

impl ContextId {
    /// Create a new `ContextId` from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random `ContextId`.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Return the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl FromStr for ContextId {
    type Err = IdError;

    /// Parse a `ContextId` from a UUID string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = uuid::Uuid::parse_str(s).map_err(|_| IdError::InvalidUuid)?;
        Ok(Self(uuid))
    }
}

impl fmt::Debug for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextId({})", self.0)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ContextId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContextId> for String {
    fn from(id: ContextId) -> Self {
        id.0.to_string()
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a well-formed `domain.object_id` identifier.
    #[error("invalid entity id {0:?}: expected \"domain.object_id\"")]
    InvalidEntityId(String),

    /// The input is not a valid UUID.
    #[error("invalid UUID format")]
    InvalidUuid,
}
