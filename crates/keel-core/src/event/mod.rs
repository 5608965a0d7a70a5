pub mod bus;
pub mod error;
pub mod pattern;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use serde::Serialize;

/// Type for subscription identifiers handed out by the bus.
pub type SubscriptionId = u64;

/// Error type subscriber callbacks may fail with.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type subscriber callbacks return.
pub type HandlerResult = std::result::Result<(), HandlerError>;

// Owned future returned by closure-based handlers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Metadata attached to every emitted event.
#[derive(Debug, Clone, Serialize)]
pub struct EventMeta {
    /// Identifier of the emitting service (or `kernel` for kernel events).
    pub source: String,
    /// Wall-clock time the event was emitted.
    pub timestamp: SystemTime,
}

impl EventMeta {
    /// Create metadata for the given source, stamped with the current time.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            timestamp: SystemTime::now(),
        }
    }
}

/// An immutable event record flowing through the bus.
///
/// Events are transient: the bus never persists or replays them.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub key: pattern::EventKey,
    pub payload: serde_json::Value,
    pub meta: EventMeta,
}

/// Outcome of one handler invocation during a single `emit`.
#[derive(Debug)]
pub struct HandlerOutcome {
    /// The subscription whose handler ran.
    pub subscription: SubscriptionId,
    /// The captured failure, if the handler returned an error.
    pub error: Option<error::EventSystemError>,
}

impl HandlerOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Asynchronous subscriber callback trait.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &EventRecord) -> HandlerResult;
}

/// Closure-backed handler (internal helper).
struct FnHandler {
    handler: Box<dyn for<'a> Fn(&'a EventRecord) -> BoxFuture<'a, HandlerResult> + Send + Sync>,
}

impl fmt::Debug for FnHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl EventHandler for FnHandler {
    async fn handle(&self, event: &EventRecord) -> HandlerResult {
        (self.handler)(event).await
    }
}

/// Wrap an async closure into a subscribable handler.
pub fn event_handler(
    f: Box<dyn for<'a> Fn(&'a EventRecord) -> BoxFuture<'a, HandlerResult> + Send + Sync>,
) -> Arc<dyn EventHandler> {
    Arc::new(FnHandler { handler: f })
}

/// Wrap a synchronous closure into a handler compatible with the async bus.
pub fn sync_event_handler<F>(f: F) -> Arc<dyn EventHandler>
where
    F: Fn(&EventRecord) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(FnHandler {
        handler: Box::new(move |event| {
            let result = f(event);
            Box::pin(async move { result })
        }),
    })
}

/// Re-export important types
pub use bus::{EventBus, SharedEventBus};
pub use error::EventSystemError;
pub use pattern::{EventKey, EventPattern, Segment, WILDCARD};
