//! # Keel Core Kernel Errors
//!
//! Defines error types specific to the Keel kernel.
//!
//! This module includes [`Error`], the primary enum encompassing various
//! errors that can occur during kernel operations, such as boot sequencing
//! failures, dependency graph validation problems, or errors surfaced by
//! the event, service, or lifecycle subsystems.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::event::error::EventSystemError;
use crate::kernel::bootstrap::KernelState;
use crate::lifecycle::error::LifecycleError;
use crate::service::error::ServiceRegistryError;
use crate::service::graph::DependencyError;

/// Custom error type for the Keel kernel
#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed service registry error
    #[error("Service registry error: {0}")]
    Registry(#[from] ServiceRegistryError),

    /// Dependency graph validation error
    #[error("Dependency resolution error: {0}")]
    Dependency(#[from] DependencyError),

    /// Lifecycle phase execution error
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Event system error
    #[error("Event system error: {0}")]
    EventSystem(#[from] EventSystemError),

    /// `boot()` called again after the kernel reached a terminal state
    #[error("boot() is not re-entrant: kernel state is already '{state:?}'")]
    AlreadyBooted { state: KernelState },

    /// Attempt to reconfigure the kernel after boot started
    #[error("Kernel configuration error: {0}")]
    Configuration(String),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
