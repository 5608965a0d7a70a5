//! # Keel Core Service Registry Errors
//!
//! Defines error types specific to service registration and lookup.
use thiserror::Error;

use crate::service::ServiceId;

#[derive(Debug, Error)]
pub enum ServiceRegistryError {
    #[error("Service '{0}' is already registered")]
    DuplicateService(ServiceId),

    #[error("Unknown service '{0}'")]
    UnknownService(ServiceId),

    #[error("Registry is frozen: operation '{operation}' is not legal after boot reached a terminal state")]
    RegistryFrozen { operation: String },

    #[error("Service '{service}' declares a hook for unknown phase '{hook}'")]
    UnknownHook { service: ServiceId, hook: String },

    #[error("Invalid hook name '{hook}' on service '{service}': {reason}")]
    InvalidHookName {
        service: ServiceId,
        hook: String,
        reason: String,
    },

    #[error("Invalid service id '{id}': {reason}")]
    InvalidServiceId { id: String, reason: String },
}
