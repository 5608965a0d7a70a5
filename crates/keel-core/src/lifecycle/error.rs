//! # Keel Core Lifecycle Errors
//!
//! Defines error types specific to lifecycle phase execution.
use thiserror::Error;

use crate::service::error::ServiceRegistryError;
use crate::service::ServiceId;

#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A service's hook failed, aborting the phase.
    #[error("Hook '{phase}' failed for service '{service}': {source}")]
    HookExecution {
        phase: String,
        service: ServiceId,
        #[source]
        source: Box<crate::kernel::error::Error>,
    },

    /// A service selected for the phase could not be resolved mid-phase.
    #[error("Service '{service}' could not be resolved during phase '{phase}': {source}")]
    ServiceLookup {
        phase: String,
        service: ServiceId,
        #[source]
        source: ServiceRegistryError,
    },
}

impl LifecycleError {
    /// The service this error concerns, for boot diagnostics.
    pub fn service(&self) -> &str {
        match self {
            LifecycleError::HookExecution { service, .. } => service,
            LifecycleError::ServiceLookup { service, .. } => service,
        }
    }

    /// The phase this error occurred in.
    pub fn phase(&self) -> &str {
        match self {
            LifecycleError::HookExecution { phase, .. } => phase,
            LifecycleError::ServiceLookup { phase, .. } => phase,
        }
    }
}
