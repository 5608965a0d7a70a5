//! # Keel Core Event System Errors
//!
//! Defines error types specific to the Keel event bus.
//!
//! This module includes [`EventSystemError`], the primary enum encompassing
//! various errors that can occur while compiling subscription patterns,
//! validating emitted keys, or running subscriber callbacks.
use thiserror::Error;

use crate::event::{HandlerError, SubscriptionId};

#[derive(Debug, Error)]
pub enum EventSystemError {
    #[error("Invalid subscription pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid event key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Handler for subscription {subscription} failed on event '{key}': {source}")]
    HandlerFailed {
        subscription: SubscriptionId,
        key: String,
        #[source]
        source: HandlerError,
    },

    #[error("Internal event system error: {0}")]
    InternalError(String),
}
