use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex; // Use tokio's Mutex

use crate::event::error::EventSystemError;
use crate::event::pattern::{EventKey, EventPattern};
use crate::event::{EventHandler, EventMeta, EventRecord, HandlerOutcome, SubscriptionId};

//--------------------------------------------------
// EventBus (Internal, wrapped by SharedEventBus)
//--------------------------------------------------

/// One live subscription: compiled pattern plus its callback.
struct Subscription {
    id: SubscriptionId,
    pattern: EventPattern,
    handler: Arc<dyn EventHandler>,
}

/// Publish/subscribe engine with hierarchical wildcard matching
/// (Internal Implementation).
///
/// Subscriptions are kept in registration order; an emitted key is matched
/// against every live pattern and matching handlers run in that order.
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_subscription_id: SubscriptionId,
}

// Manual Debug implementation for EventBus
impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscription_count", &self.subscriptions.len())
            .field("next_subscription_id", &self.next_subscription_id)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_subscription_id: 1,
        }
    }

    /// Compile `pattern` and register `handler` for every future matching
    /// event. Past events are never replayed.
    pub fn subscribe(
        &mut self,
        pattern: &str,
        handler: Arc<dyn EventHandler>,
    ) -> Result<SubscriptionId, EventSystemError> {
        let pattern = EventPattern::compile(pattern)?;
        let id = self.next_subscription_id;
        self.next_subscription_id += 1;
        self.subscriptions.push(Subscription {
            id,
            pattern,
            handler,
        });
        Ok(id)
    }

    /// Remove a subscription. Idempotent: an unknown or already-removed id
    /// returns `false` rather than an error.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let len_before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() < len_before
    }

    /// Snapshot the handlers matching `key`, in registration order.
    fn select(&self, key: &EventKey) -> Vec<(SubscriptionId, Arc<dyn EventHandler>)> {
        self.subscriptions
            .iter()
            .filter(|s| s.pattern.matches(key))
            .map(|s| (s.id, Arc::clone(&s.handler)))
            .collect()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

//--------------------------------------------------
// SharedEventBus (Public API)
//--------------------------------------------------

/// Thread-safe shared event bus using Tokio Mutex
#[derive(Clone)] // Only Clone
pub struct SharedEventBus {
    bus: Arc<Mutex<EventBus>>,
}

// Manual Debug impl for SharedEventBus
impl fmt::Debug for SharedEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedEventBus").finish_non_exhaustive()
    }
}

impl SharedEventBus {
    pub fn new() -> Self {
        Self {
            bus: Arc::new(Mutex::new(EventBus::new())),
        }
    }

    pub async fn subscribe(
        &self,
        pattern: &str,
        handler: Arc<dyn EventHandler>,
    ) -> Result<SubscriptionId, EventSystemError> {
        let mut bus = self.bus.lock().await;
        bus.subscribe(pattern, handler)
    }

    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut bus = self.bus.lock().await;
        bus.unsubscribe(id)
    }

    /// Emit an event to every matching subscriber.
    ///
    /// The matching handler list is snapshotted before any handler runs, so
    /// subscription changes made by in-flight handlers do not affect the
    /// current emit. Handlers run sequentially in subscription order; a
    /// failing handler is captured in its [`HandlerOutcome`] and never
    /// prevents the remaining handlers from running. Zero matches returns
    /// an empty list.
    ///
    /// Fails only if `key` itself is invalid (empty, empty segments,
    /// control characters, or the wildcard token).
    pub async fn emit(
        &self,
        key: &str,
        payload: serde_json::Value,
        meta: EventMeta,
    ) -> Result<Vec<HandlerOutcome>, EventSystemError> {
        let key = EventKey::parse(key)?;
        let selected = {
            let bus = self.bus.lock().await;
            bus.select(&key)
        }; // Lock released: handlers may subscribe/unsubscribe reentrantly.

        if selected.is_empty() {
            return Ok(Vec::new());
        }

        let record = EventRecord { key, payload, meta };
        let mut outcomes = Vec::with_capacity(selected.len());
        for (id, handler) in selected {
            match handler.handle(&record).await {
                Ok(()) => outcomes.push(HandlerOutcome {
                    subscription: id,
                    error: None,
                }),
                Err(source) => {
                    log::warn!(
                        "Handler for subscription {} failed on event '{}': {}",
                        id,
                        record.key,
                        source
                    );
                    outcomes.push(HandlerOutcome {
                        subscription: id,
                        error: Some(EventSystemError::HandlerFailed {
                            subscription: id,
                            key: record.key.to_string(),
                            source,
                        }),
                    });
                }
            }
        }
        Ok(outcomes)
    }

    pub async fn subscription_count(&self) -> usize {
        let bus = self.bus.lock().await;
        bus.subscription_count()
    }
}

impl Default for SharedEventBus {
    fn default() -> Self {
        Self::new()
    }
}
