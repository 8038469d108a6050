//! # Scheduler Error Types
//!
//! All recoverable errors of the scheduler and gateway.
//!
//! Out-of-range definition lookups are not errors (they return sentinels),
//! and invariant violations inside the advance pass panic.

use keyframe_core::AnimatorHandle;
use thiserror::Error;

/// Errors that can occur in the scheduler and gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyframeError {
    /// A request was made with the null (unset) handle.
    #[error("animator handle is not set")]
    NullHandle,

    /// Register was called without a definition.
    #[error("no animation definition supplied for animator {0}")]
    MissingDefinition(AnimatorHandle),

    /// The gateway already routes to a scheduler.
    #[error("gateway is already attached to a scheduler")]
    AlreadyAttached,

    /// Invalid configuration file or value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The dedicated worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),
}

/// Result type for scheduler operations.
pub type KeyframeResult<T> = Result<T, KeyframeError>;
