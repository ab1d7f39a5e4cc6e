//! Error types for the sync group.

use light_sync_core::EntityId;
use thiserror::Error;

use crate::dispatch::LightService;

/// A result type using `GroupError`.
pub type Result<T> = std::result::Result<T, GroupError>;

/// Errors that can occur in sync group operations.
#[derive(Debug, Error)]
pub enum GroupError {
    /// A group must have at least one member.
    #[error("a sync group requires at least one member")]
    EmptyGroup,

    /// A forwarded member command failed.
    ///
    /// No retry is attempted; the target sync state keeps the attempted
    /// value (see the crate documentation on the inconsistency window).
    #[error("command dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Errors returned by a [`CommandDispatcher`](crate::dispatch::CommandDispatcher).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A command addressed an entity the dispatcher does not know.
    #[error("unknown entity: {0}")]
    UnknownEntity(EntityId),

    /// The dispatcher rejected the command.
    #[error("{service} rejected: {reason}")]
    Rejected {
        /// The service that was being called.
        service: LightService,
        /// Why the dispatcher refused it.
        reason: String,
    },
}
