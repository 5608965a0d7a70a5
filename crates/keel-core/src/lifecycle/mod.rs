pub mod dispatcher;
pub mod error;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;

use crate::event::{
    EventHandler, EventMeta, EventSystemError, HandlerOutcome, SubscriptionId,
};
use crate::event::bus::SharedEventBus;
use crate::kernel::constants::KERNEL_SOURCE;
use crate::kernel::error::Result;
use crate::service::registry::SharedServiceRegistry;

// Owned future returned by closure-based hooks.
pub type BoxFuture<'a, T> = crate::event::BoxFuture<'a, T>;

/// A service's callback for one named lifecycle phase.
///
/// Hooks are opt-in per service; a service without a hook for a phase is
/// simply skipped. A hook may suspend on asynchronous work, and the
/// dispatcher awaits its completion before the next service's hook starts.
#[async_trait]
pub trait Hook: Send + Sync {
    async fn run(&self, ctx: &HookContext) -> Result<()>;
}

/// Closure-backed hook (internal helper).
struct FnHook {
    hook: Box<dyn for<'a> Fn(&'a HookContext) -> BoxFuture<'a, Result<()>> + Send + Sync>,
}

impl fmt::Debug for FnHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHook").finish_non_exhaustive()
    }
}

#[async_trait]
impl Hook for FnHook {
    async fn run(&self, ctx: &HookContext) -> Result<()> {
        (self.hook)(ctx).await
    }
}

/// Wrap an async closure into a hook.
pub fn hook_fn(
    f: Box<dyn for<'a> Fn(&'a HookContext) -> BoxFuture<'a, Result<()>> + Send + Sync>,
) -> Arc<dyn Hook> {
    Arc::new(FnHook { hook: f })
}

/// Wrap a synchronous closure into a hook compatible with the async dispatcher.
pub fn sync_hook<F>(f: F) -> Arc<dyn Hook>
where
    F: Fn(&HookContext) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(FnHook {
        hook: Box::new(move |ctx| {
            let result = f(ctx);
            Box::pin(async move { result })
        }),
    })
}

type SharedData = Arc<StdMutex<HashMap<String, Box<dyn Any + Send + Sync>>>>;

/// Context threaded through every hook invocation.
///
/// This is the only sanctioned way a service reaches kernel state: the
/// service registry, the event bus, and a shared data table through which
/// hooks contribute resources (e.g. request routes) to later hooks in the
/// same boot. Cloning is cheap; clones share the same table, so a service
/// may capture a clone in steady-state event handlers.
#[derive(Clone)]
pub struct HookContext {
    registry: SharedServiceRegistry,
    bus: SharedEventBus,
    /// Phase being executed, if invoked by the dispatcher.
    phase: Option<String>,
    /// Service whose hook is running, if invoked by the dispatcher.
    service: Option<String>,
    shared: SharedData,
}

impl fmt::Debug for HookContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookContext")
            .field("phase", &self.phase)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl HookContext {
    /// Create the boot-wide base context.
    pub fn new(registry: SharedServiceRegistry, bus: SharedEventBus) -> Self {
        Self {
            registry,
            bus,
            phase: None,
            service: None,
            shared: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    /// Derive a per-invocation context for one service's hook in one phase.
    /// The shared data table is shared with the parent context.
    pub fn scoped(&self, phase: &str, service: &str) -> Self {
        Self {
            registry: self.registry.clone(),
            bus: self.bus.clone(),
            phase: Some(phase.to_string()),
            service: Some(service.to_string()),
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn registry(&self) -> &SharedServiceRegistry {
        &self.registry
    }

    pub fn bus(&self) -> &SharedEventBus {
        &self.bus
    }

    pub fn phase(&self) -> Option<&str> {
        self.phase.as_deref()
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// Emit an event, stamping the invoking service id (or `kernel` for an
    /// unscoped context) as the source.
    pub async fn emit(
        &self,
        key: &str,
        payload: serde_json::Value,
    ) -> std::result::Result<Vec<HandlerOutcome>, EventSystemError> {
        let source = self.service.as_deref().unwrap_or(KERNEL_SOURCE);
        self.bus.emit(key, payload, EventMeta::new(source)).await
    }

    /// Subscribe to events on the bus.
    pub async fn subscribe(
        &self,
        pattern: &str,
        handler: Arc<dyn EventHandler>,
    ) -> std::result::Result<SubscriptionId, EventSystemError> {
        self.bus.subscribe(pattern, handler).await
    }

    /// Set a shared data value
    pub fn set_data<T: 'static + Send + Sync>(&self, key: &str, value: T) {
        let mut shared = self.shared.lock().unwrap_or_else(|e| e.into_inner());
        shared.insert(key.to_string(), Box::new(value));
    }

    /// Check whether a shared data value exists
    pub fn has_data(&self, key: &str) -> bool {
        let shared = self.shared.lock().unwrap_or_else(|e| e.into_inner());
        shared.contains_key(key)
    }

    /// Get a clone of a shared data value
    pub fn get_data<T: 'static + Send + Sync + Clone>(&self, key: &str) -> Option<T> {
        let shared = self.shared.lock().unwrap_or_else(|e| e.into_inner());
        shared
            .get(key)
            .and_then(|data| data.downcast_ref::<T>())
            .cloned()
    }

    /// Mutate a shared data value in place, returning the closure's result.
    pub fn update_data<T: 'static + Send + Sync, R>(
        &self,
        key: &str,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        let mut shared = self.shared.lock().unwrap_or_else(|e| e.into_inner());
        shared
            .get_mut(key)
            .and_then(|data| data.downcast_mut::<T>())
            .map(f)
    }

    /// Remove and return a shared data value
    pub fn take_data<T: 'static + Send + Sync>(&self, key: &str) -> Option<T> {
        let mut shared = self.shared.lock().unwrap_or_else(|e| e.into_inner());
        let value = shared.remove(key)?;
        match value.downcast::<T>() {
            Ok(boxed) => Some(*boxed),
            Err(value) => {
                // Wrong type requested: put it back untouched.
                shared.insert(key.to_string(), value);
                None
            }
        }
    }
}

/// Re-export important types
pub use dispatcher::LifecycleDispatcher;
pub use error::LifecycleError;
